//! Exchange-log library - request/response logging for axum and tower services.
//!
//! Each exchange that is not excluded produces two lines through a [`LogSink`]:
//! a request summary emitted before the handler runs and a response summary
//! emitted after it returned. Bodies are captured without changing what the
//! handler reads or what the client receives.

pub mod buffer;
pub mod charset;
pub mod cli;
pub mod colors;
pub mod config;
pub mod error;
pub mod handlers;
pub mod headers;
pub mod layer;
pub mod middleware;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod sink;
pub mod summary;

pub use buffer::BodyBuffer;
pub use config::{LoggerConfig, LoggerConfigBuilder};
pub use error::{CaptureError, ConfigError, EncodeError};
pub use layer::{ExchangeLoggerLayer, ExchangeLoggerService};
pub use middleware::log_exchanges;
pub use pipeline::{ExchangeId, ExchangeLogger};
pub use request::{ParameterSet, RequestCapture};
pub use response::ResponseCapture;
pub use sink::{LogEntry, LogSink, Side, TracingSink, Verbosity};
pub use summary::{JsonEncoder, RequestSummary, ResponseSummary, SummaryBuilder, SummaryEncoder};
