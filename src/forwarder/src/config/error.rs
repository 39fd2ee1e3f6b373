use crate::constants::BATCH_MAX_EVENTS_CEILING;
use std::fmt;

/// Reasons a configuration is rejected before the sink is built
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required option is missing or blank
    MissingField(&'static str),

    /// `batch_max_events` is above what the Insights API accepts
    BatchTooLarge { requested: usize },

    /// `batch_max_events` is zero
    EmptyBatch,

    /// A duration option is zero, negative or not a number
    InvalidDuration { field: &'static str, value: f64 },

    /// Proxy credentials or port given without a proxy host
    IncompleteProxy,

    /// The endpoint or proxy address could not be assembled into a URL
    InvalidUrl { url: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingField(field) => write!(f, "`{}` is required", field),
            ConfigError::BatchTooLarge { requested } => write!(
                f,
                "New Relic Insights only allows a batch_max_events of {} or less, got {}",
                BATCH_MAX_EVENTS_CEILING, requested
            ),
            ConfigError::EmptyBatch => write!(f, "batch_max_events must be at least 1"),
            ConfigError::InvalidDuration { field, value } => {
                write!(f, "`{}` must be a positive number of seconds, got {}", field, value)
            }
            ConfigError::IncompleteProxy => {
                write!(f, "proxy_port, proxy_user and proxy_password require proxy_host")
            }
            ConfigError::InvalidUrl { url, reason } => {
                write!(f, "invalid url `{}`: {}", url, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
