//! Resolved logger configuration.

use std::collections::{BTreeSet, HashMap};

use crate::error::ConfigError;
use crate::sink::{Side, TARGET};

pub const DEFAULT_MAX_CONTENT_SIZE: usize = 1024;
pub const DEFAULT_REQUEST_PREFIX: &str = "REQUEST: ";
pub const DEFAULT_RESPONSE_PREFIX: &str = "RESPONSE: ";
pub const DEFAULT_REQUEST_LABEL: &str = "request";
pub const DEFAULT_RESPONSE_LABEL: &str = "response";

/// Settings shared read-only by every exchange.
///
/// # Examples
///
/// ```rust
/// use exchange_log::LoggerConfig;
///
/// let config = LoggerConfig::builder()
///     .max_content_size(256)
///     .exclude_path("/health")
///     .disable_label(true)
///     .build()
///     .unwrap();
///
/// assert!(config.is_excluded("/health/live"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Max characters of a logged body below full verbosity
    pub max_content_size: usize,
    /// Requests whose path starts with one of these are not captured
    pub excluded_paths: BTreeSet<String>,
    pub request_prefix: String,
    pub response_prefix: String,
    /// Drop both prefixes from the emitted lines
    pub disable_prefix: bool,
    pub request_label: String,
    pub response_label: String,
    /// Emit entries without a label
    pub disable_label: bool,
    /// Name reported in the `logger` field of every event from the default
    /// tracing sink.
    ///
    /// It does not select what is enabled: verbosity is always decided by the
    /// level enabled for the `exchange_log` target, whatever this name is.
    pub logger_name: String,
    pub pretty_json: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
            excluded_paths: BTreeSet::new(),
            request_prefix: DEFAULT_REQUEST_PREFIX.to_string(),
            response_prefix: DEFAULT_RESPONSE_PREFIX.to_string(),
            disable_prefix: false,
            request_label: DEFAULT_REQUEST_LABEL.to_string(),
            response_label: DEFAULT_RESPONSE_LABEL.to_string(),
            disable_label: false,
            logger_name: TARGET.to_string(),
            pretty_json: false,
        }
    }
}

impl LoggerConfig {
    pub fn builder() -> LoggerConfigBuilder {
        LoggerConfigBuilder::default()
    }

    /// Reads servlet-style init parameters such as `maxContentSize` and
    /// `excludedPaths` (comma separated). Blank values keep the defaults.
    pub fn from_init_params(params: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let value = |name: &str| {
            params
                .get(name)
                .map(|value| value.as_str())
                .filter(|value| !value.trim().is_empty())
        };
        let mut config = Self::default();

        if let Some(size) = value("maxContentSize") {
            config.max_content_size =
                size.trim()
                    .parse()
                    .map_err(|source| ConfigError::InvalidMaxContentSize {
                        value: size.to_string(),
                        source,
                    })?;
        }
        if let Some(paths) = value("excludedPaths") {
            config.excluded_paths = paths
                .split(',')
                .map(str::trim)
                .filter(|path| !path.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(prefix) = value("requestPrefix") {
            config.request_prefix = prefix.to_string();
        }
        if let Some(prefix) = value("responsePrefix") {
            config.response_prefix = prefix.to_string();
        }
        if let Some(label) = value("requestLabel") {
            config.request_label = label.to_string();
        }
        if let Some(label) = value("responseLabel") {
            config.response_label = label.to_string();
        }
        if let Some(name) = value("loggerName") {
            config.logger_name = name.to_string();
        }
        if let Some(flag) = value("disablePrefix") {
            config.disable_prefix = parse_flag("disablePrefix", flag)?;
        }
        if let Some(flag) = value("disableLabel") {
            config.disable_label = parse_flag("disableLabel", flag)?;
        }
        if let Some(flag) = value("prettyJson") {
            config.pretty_json = parse_flag("prettyJson", flag)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in &self.excluded_paths {
            if path.is_empty() {
                return Err(ConfigError::EmptyExcludedPath);
            }
            if !path.starts_with('/') {
                return Err(ConfigError::RelativeExcludedPath(path.clone()));
            }
        }
        Ok(())
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths
            .iter()
            .any(|excluded| path.starts_with(excluded.as_str()))
    }

    pub fn prefix(&self, side: Side) -> &str {
        match (self.disable_prefix, side) {
            (true, _) => "",
            (false, Side::Request) => self.request_prefix.as_str(),
            (false, Side::Response) => self.response_prefix.as_str(),
        }
    }

    pub fn label(&self, side: Side) -> Option<&str> {
        match (self.disable_label, side) {
            (true, _) => None,
            (false, Side::Request) => Some(self.request_label.as_str()),
            (false, Side::Response) => Some(self.response_label.as_str()),
        }
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    value
        .trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|source| ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
            source,
        })
}

/// Fluent construction of a [`LoggerConfig`], validated by [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct LoggerConfigBuilder {
    config: LoggerConfig,
}

impl LoggerConfigBuilder {
    pub fn max_content_size(mut self, max_content_size: usize) -> Self {
        self.config.max_content_size = max_content_size;
        self
    }

    pub fn exclude_path(mut self, path: impl Into<String>) -> Self {
        self.config.excluded_paths.insert(path.into());
        self
    }

    pub fn excluded_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.config.excluded_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn request_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.request_prefix = prefix.into();
        self
    }

    pub fn response_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.response_prefix = prefix.into();
        self
    }

    pub fn disable_prefix(mut self, disable: bool) -> Self {
        self.config.disable_prefix = disable;
        self
    }

    pub fn request_label(mut self, label: impl Into<String>) -> Self {
        self.config.request_label = label.into();
        self
    }

    pub fn response_label(mut self, label: impl Into<String>) -> Self {
        self.config.response_label = label.into();
        self
    }

    pub fn disable_label(mut self, disable: bool) -> Self {
        self.config.disable_label = disable;
        self
    }

    pub fn logger_name(mut self, name: impl Into<String>) -> Self {
        self.config.logger_name = name.into();
        self
    }

    pub fn pretty_json(mut self, pretty: bool) -> Self {
        self.config.pretty_json = pretty;
        self
    }

    pub fn build(self) -> Result<LoggerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
