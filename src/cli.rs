//! Command-line interface configuration.

use argh::FromArgs;
use std::net::SocketAddr;

use crate::config::{DEFAULT_MAX_CONTENT_SIZE, LoggerConfig};
use crate::error::ConfigError;

/// A demo server logging every request/response exchange
#[derive(Debug, FromArgs)]
pub struct Cli {
    /// server bind address (default: '127.0.0.1:8000')
    #[argh(option, default = "SocketAddr::from(([127, 0, 0, 1], 8000))")]
    pub bind: SocketAddr,

    /// max characters of a logged body unless tracing at TRACE (default: 1024)
    #[argh(option, long = "max-content-size", default = "DEFAULT_MAX_CONTENT_SIZE")]
    pub max_content_size: usize,

    /// path prefix left out of the exchange log (repeatable, e.g. '/health')
    #[argh(option)]
    pub exclude: Vec<String>,

    /// text placed before each request line (default: 'REQUEST: ')
    #[argh(option, long = "request-prefix")]
    pub request_prefix: Option<String>,

    /// text placed before each response line (default: 'RESPONSE: ')
    #[argh(option, long = "response-prefix")]
    pub response_prefix: Option<String>,

    /// emit lines without the request/response prefix
    #[argh(switch, long = "no-prefix")]
    pub no_prefix: bool,

    /// emit lines without the request/response label
    #[argh(switch, long = "no-label")]
    pub no_label: bool,

    /// pretty-print the JSON summaries
    #[argh(switch)]
    pub pretty: bool,

    /// render exchange ids in color
    #[argh(switch, long = "color-ids")]
    pub color_ids: bool,

    /// log whole bodies (enables TRACE for the exchange log)
    #[argh(switch)]
    pub trace: bool,
}

impl Cli {
    /// Resolves the flags into a validated [`LoggerConfig`].
    pub fn config(&self) -> Result<LoggerConfig, ConfigError> {
        let mut builder = LoggerConfig::builder()
            .max_content_size(self.max_content_size)
            .excluded_paths(self.exclude.iter().cloned())
            .disable_prefix(self.no_prefix)
            .disable_label(self.no_label)
            .pretty_json(self.pretty);

        if let Some(prefix) = &self.request_prefix {
            builder = builder.request_prefix(prefix.as_str());
        }
        if let Some(prefix) = &self.response_prefix {
            builder = builder.response_prefix(prefix.as_str());
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Side;

    fn parse(args: &[&str]) -> Cli {
        Cli::from_args(&["exchange-log"], args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.bind, "127.0.0.1:8000".parse().unwrap());
        assert!(!cli.trace);

        let config = cli.config().unwrap();
        assert_eq!(config, LoggerConfig::default());
    }

    #[test]
    fn test_flags_reach_config() {
        let cli = parse(&[
            "--bind",
            "0.0.0.0:9000",
            "--max-content-size",
            "16",
            "--exclude",
            "/health",
            "--exclude",
            "/static",
            "--request-prefix",
            "IN ",
            "--no-label",
            "--pretty",
        ]);
        let config = cli.config().unwrap();

        assert_eq!(cli.bind.port(), 9000);
        assert_eq!(config.max_content_size, 16);
        assert!(config.is_excluded("/static/app.js"));
        assert!(config.is_excluded("/health"));
        assert_eq!(config.prefix(Side::Request), "IN ");
        assert_eq!(config.prefix(Side::Response), "RESPONSE: ");
        assert_eq!(config.label(Side::Request), None);
        assert!(config.pretty_json);
    }

    #[test]
    fn test_relative_exclude_is_rejected() {
        let cli = parse(&["--exclude", "health"]);
        assert!(matches!(
            cli.config(),
            Err(ConfigError::RelativeExcludedPath(_))
        ));
    }
}
