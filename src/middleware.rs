//! Exchange logging as an axum middleware function.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;

use crate::pipeline::ExchangeLogger;

/// Logs the request line, runs the rest of the stack, then logs the response line.
///
/// Install with `axum::middleware::from_fn_with_state(logger, log_exchanges)`.
///
/// Excluded paths and a disabled sink skip capture entirely, so the
/// [`ExchangeId`](crate::pipeline::ExchangeId) and
/// [`ParameterSet`](crate::request::ParameterSet) extensions are diagnostics
/// only. Handler output must not depend on them.
pub async fn log_exchanges(
    State(logger): State<ExchangeLogger>,
    request: Request,
    next: Next,
) -> Response {
    let Ok(response) = logger
        .intercept(request, |request| async move {
            Ok::<_, Infallible>(next.run(request).await)
        })
        .await;
    response
}
