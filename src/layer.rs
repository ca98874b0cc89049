//! Tower integration.
//!
//! [`ExchangeLoggerLayer`] wraps any service handling axum requests, so the
//! logger can sit in a [`tower::ServiceBuilder`] stack or on an axum `Router`.
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use exchange_log::{ExchangeLogger, LoggerConfig};
//!
//! # async fn hello() -> &'static str { "Hello" }
//! # #[tokio::main]
//! # async fn main() {
//! let logger = ExchangeLogger::new(LoggerConfig::default()).unwrap();
//! let app = Router::new()
//!     .route("/hello", get(hello))
//!     .layer(logger.layer());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

use axum::{extract::Request, response::Response};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::pipeline::ExchangeLogger;

#[derive(Clone, Debug)]
pub struct ExchangeLoggerLayer {
    logger: ExchangeLogger,
}

impl ExchangeLoggerLayer {
    pub fn new(logger: ExchangeLogger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for ExchangeLoggerLayer {
    type Service = ExchangeLoggerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExchangeLoggerService {
            inner,
            logger: self.logger.clone(),
        }
    }
}

/// Service created by [`ExchangeLoggerLayer`].
#[derive(Clone, Debug)]
pub struct ExchangeLoggerService<S> {
    inner: S,
    logger: ExchangeLogger,
}

impl<S> Service<Request> for ExchangeLoggerService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // The request body is read before the inner service is called, so take
        // the instance that was driven to readiness and leave a fresh clone.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let logger = self.logger.clone();

        Box::pin(async move {
            logger
                .intercept(request, move |request| inner.call(request))
                .await
        })
    }
}
