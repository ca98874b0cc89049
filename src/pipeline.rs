//! Orchestration of one exchange: gate, capture, invoke, summarize, flush.

use axum::{extract::Request, response::Response};
use nanoid::nanoid;
use std::{future::Future, sync::Arc};
use tracing::warn;

use crate::config::LoggerConfig;
use crate::error::{ConfigError, EncodeError};
use crate::layer::ExchangeLoggerLayer;
use crate::request::RequestCapture;
use crate::response::ResponseCapture;
use crate::sink::{LogEntry, LogSink, Side, TracingSink, Verbosity};
use crate::summary::{JsonEncoder, SummaryBuilder, SummaryEncoder};

/// Id of a captured exchange, inserted into the forwarded request.
///
/// Absent when the exchange was excluded or the sink is off, so it is only
/// good for correlating diagnostics with the exchange log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeId(pub String);

/// Logs each exchange as one request line and one response line.
///
/// Cheap to clone: configuration, sink and encoder are shared behind `Arc`s
/// and never mutated after construction.
#[derive(Clone)]
pub struct ExchangeLogger {
    config: Arc<LoggerConfig>,
    sink: Arc<dyn LogSink>,
    encoder: Arc<dyn SummaryEncoder>,
    summaries: SummaryBuilder,
}

impl ExchangeLogger {
    /// Validates `config` and logs through a [`TracingSink`] with a [`JsonEncoder`].
    pub fn new(config: LoggerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sink = TracingSink::new(config.logger_name.clone());
        let encoder = if config.pretty_json {
            JsonEncoder::pretty()
        } else {
            JsonEncoder::new()
        };

        Ok(Self {
            summaries: SummaryBuilder::new(config.max_content_size),
            config: Arc::new(config),
            sink: Arc::new(sink),
            encoder: Arc::new(encoder),
        })
    }

    /// Replaces the default [`TracingSink`].
    ///
    /// The sink decides both where lines go and, through
    /// [`LogSink::verbosity`], whether an exchange is captured at all.
    pub fn with_sink(mut self, sink: impl LogSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Replaces the JSON encoder. A failing encoder costs only the line it failed on.
    pub fn with_encoder(mut self, encoder: impl SummaryEncoder) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Tower layer running every request through [`intercept`](Self::intercept).
    pub fn layer(&self) -> ExchangeLoggerLayer {
        ExchangeLoggerLayer::new(self.clone())
    }

    /// Runs `handler` for `request`, logging both sides of the exchange.
    ///
    /// When the sink is off or the path is excluded the handler gets the
    /// untouched request and nothing is captured. Otherwise:
    /// 1. a 5 character [`ExchangeId`] is drawn and the request line is emitted
    /// 2. the handler runs on the replayed request
    /// 3. its response is drained, the response line is emitted, and the same
    ///    bytes are handed back
    ///
    /// An `Err` from the handler is returned as is, without a response line.
    pub async fn intercept<F, Fut, E>(&self, request: Request, handler: F) -> Result<Response, E>
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = Result<Response, E>>,
    {
        let verbosity = self.sink.verbosity();
        if verbosity == Verbosity::Off || self.config.is_excluded(request.uri().path()) {
            return handler(request).await;
        }

        let exchange_id = nanoid!(5);
        let mut request = RequestCapture::wrap(request).await;
        let summary = self.summaries.request(&mut request, verbosity).await;
        self.emit(&exchange_id, Side::Request, self.encoder.encode_request(&summary));

        request
            .extensions_mut()
            .insert(ExchangeId(exchange_id.clone()));
        let response = handler(request.into_request()).await?;

        let response = ResponseCapture::wrap(response).await;
        let summary = self.summaries.response(&response, verbosity);
        self.emit(&exchange_id, Side::Response, self.encoder.encode_response(&summary));

        Ok(response.into_response())
    }

    fn emit(&self, exchange_id: &str, side: Side, encoded: Result<String, EncodeError>) {
        let json = match encoded {
            Ok(json) => json,
            Err(err) => {
                warn!(exchange = %exchange_id, side = %side, error = %err, "Cannot serialize exchange summary");
                return;
            }
        };

        let line = format!("{}{}", self.config.prefix(side), json);
        self.sink.emit(&LogEntry {
            exchange_id,
            side,
            label: self.config.label(side),
            line: &line,
        });
    }
}

impl std::fmt::Debug for ExchangeLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeLogger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
