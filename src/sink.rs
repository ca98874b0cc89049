//! The logging collaborator: decides verbosity and receives finished lines.

use std::fmt;
use tracing::{Level, debug};

use crate::colors::{colored_id, side_arrow};

/// Target used by [`TracingSink`] for its level checks and events.
pub const TARGET: &str = "exchange_log";

/// How much of an exchange is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Nothing is captured.
    Off,
    /// Bodies are truncated to the configured maximum.
    Normal,
    /// Bodies are logged whole.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Request,
    Response,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Request => f.write_str("request"),
            Side::Response => f.write_str("response"),
        }
    }
}

/// One line of an exchange log.
#[derive(Debug, Clone, Copy)]
pub struct LogEntry<'a> {
    /// Short id shared by the request and response entries of one exchange
    pub exchange_id: &'a str,
    pub side: Side,
    /// Category tag, absent when labels are disabled
    pub label: Option<&'a str>,
    /// Prefix followed by the JSON summary
    pub line: &'a str,
}

/// Destination for exchange log lines.
///
/// Implementations decide the verbosity once per exchange; the pipeline does not
/// capture anything while it reports [`Verbosity::Off`].
pub trait LogSink: Send + Sync + 'static {
    fn verbosity(&self) -> Verbosity;

    fn emit(&self, entry: &LogEntry<'_>);
}

/// [`LogSink`] writing `debug` events through `tracing`.
///
/// Verbosity follows the subscriber: `TRACE` enabled for [`TARGET`] means
/// [`Verbosity::Full`], `DEBUG` means [`Verbosity::Normal`]. The configured
/// name only labels events; filter on [`TARGET`] to change what is captured.
#[derive(Debug, Clone)]
pub struct TracingSink {
    name: String,
    colored_ids: bool,
}

impl TracingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colored_ids: false,
        }
    }

    /// Renders exchange ids with ANSI colors.
    pub fn with_colored_ids(mut self, colored_ids: bool) -> Self {
        self.colored_ids = colored_ids;
        self
    }

    fn exchange(&self, entry: &LogEntry<'_>) -> String {
        if self.colored_ids {
            format!("{} {}", colored_id(entry.exchange_id), side_arrow(entry.side))
        } else {
            let arrow = match entry.side {
                Side::Request => "→",
                Side::Response => "←",
            };
            format!("[{}] {}", entry.exchange_id, arrow)
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(TARGET)
    }
}

impl LogSink for TracingSink {
    fn verbosity(&self) -> Verbosity {
        if tracing::enabled!(target: TARGET, Level::TRACE) {
            Verbosity::Full
        } else if tracing::enabled!(target: TARGET, Level::DEBUG) {
            Verbosity::Normal
        } else {
            Verbosity::Off
        }
    }

    fn emit(&self, entry: &LogEntry<'_>) {
        let exchange = self.exchange(entry);
        match entry.label {
            Some(label) => debug!(
                target: TARGET,
                logger = %self.name,
                exchange = %exchange,
                label = %label,
                "{}",
                entry.line
            ),
            None => debug!(
                target: TARGET,
                logger = %self.name,
                exchange = %exchange,
                "{}",
                entry.line
            ),
        }
    }
}
