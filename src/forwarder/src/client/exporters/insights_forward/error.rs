use crate::config::ConfigError;
use std::fmt;

/// Broad classes of delivery failure, used as a structured log field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    SerializationFailure,
    NetworkFailure,
    Non2xxResponse,
    ClientSetup,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::SerializationFailure => write!(f, "serialization_failure"),
            ErrorCategory::NetworkFailure => write!(f, "network_failure"),
            ErrorCategory::Non2xxResponse => write!(f, "non_2xx_response"),
            ErrorCategory::ClientSetup => write!(f, "client_setup"),
        }
    }
}

/// Errors that can occur while sending events to Insights
#[derive(Debug)]
pub enum InsightsForwardError {
    /// Failed to serialize the payload to JSON
    Serialization(serde_json::Error),

    /// Network request failed: connect, TLS, proxy or timeout
    Network(reqwest::Error),

    /// Collector returned a non-2XX status code
    Server { status: u16, body: String },

    /// HTTP client could not be built from the configuration
    ClientBuild(reqwest::Error),

    /// Endpoint or proxy settings are unusable
    Config(ConfigError),
}

impl fmt::Display for InsightsForwardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightsForwardError::Serialization(e) => {
                write!(f, "Failed to serialize events: {}", e)
            }
            InsightsForwardError::Network(e) => write!(f, "Network request failed: {}", e),
            InsightsForwardError::Server { status, body } => {
                write!(f, "Server error {}: {}", status, body)
            }
            InsightsForwardError::ClientBuild(e) => {
                write!(f, "Failed to build HTTP client: {}", e)
            }
            InsightsForwardError::Config(e) => write!(f, "Invalid delivery settings: {}", e),
        }
    }
}

impl std::error::Error for InsightsForwardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InsightsForwardError::Serialization(e) => Some(e),
            InsightsForwardError::Network(e) => Some(e),
            InsightsForwardError::Server { .. } => None,
            InsightsForwardError::ClientBuild(e) => Some(e),
            InsightsForwardError::Config(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for InsightsForwardError {
    fn from(err: serde_json::Error) -> Self {
        InsightsForwardError::Serialization(err)
    }
}

impl From<reqwest::Error> for InsightsForwardError {
    fn from(err: reqwest::Error) -> Self {
        InsightsForwardError::Network(err)
    }
}

impl From<ConfigError> for InsightsForwardError {
    fn from(err: ConfigError) -> Self {
        InsightsForwardError::Config(err)
    }
}

impl InsightsForwardError {
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            InsightsForwardError::Serialization(_) => ErrorCategory::SerializationFailure,
            InsightsForwardError::Network(_) => ErrorCategory::NetworkFailure,
            InsightsForwardError::Server { .. } => ErrorCategory::Non2xxResponse,
            InsightsForwardError::ClientBuild(_) | InsightsForwardError::Config(_) => {
                ErrorCategory::ClientSetup
            }
        }
    }

    pub fn server_error(status: u16, body: String) -> Self {
        InsightsForwardError::Server { status, body }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            InsightsForwardError::Server { status, .. } => Some(*status),
            InsightsForwardError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for Insights delivery operations
pub type InsightsForwardResult<T> = Result<T, InsightsForwardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_keeps_status_and_body() {
        let err = InsightsForwardError::server_error(403, "{\"error\":\"bad key\"}".into());

        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.error_category(), ErrorCategory::Non2xxResponse);
        assert_eq!(err.to_string(), "Server error 403: {\"error\":\"bad key\"}");
    }

    #[test]
    fn config_error_is_a_setup_failure() {
        let err = InsightsForwardError::from(ConfigError::IncompleteProxy);

        assert_eq!(err.error_category(), ErrorCategory::ClientSetup);
        assert_eq!(err.status_code(), None);
    }
}
