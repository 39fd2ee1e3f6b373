use crate::client::exporters::insights_forward::InsightsForwardError;
use crate::config::ConfigError;
use std::fmt;

#[derive(Debug)]
pub enum SinkError {
    /// The configuration was rejected; the sink was not built
    Configuration(ConfigError),

    /// The delivery client could not be set up
    Client(InsightsForwardError),

    /// The final flush already ran; no more events are accepted
    Closed,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Configuration(e) => write!(f, "Configuration error: {}", e),
            SinkError::Client(e) => write!(f, "Delivery client error: {}", e),
            SinkError::Closed => write!(f, "Sink is shut down and no longer accepts events"),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Configuration(e) => Some(e),
            SinkError::Client(e) => Some(e),
            SinkError::Closed => None,
        }
    }
}

impl From<ConfigError> for SinkError {
    fn from(err: ConfigError) -> Self {
        SinkError::Configuration(err)
    }
}

impl From<InsightsForwardError> for SinkError {
    fn from(err: InsightsForwardError) -> Self {
        match err {
            InsightsForwardError::Config(e) => SinkError::Configuration(e),
            other => SinkError::Client(other),
        }
    }
}
