use crate::config::{Config, Protocol, Secret};
use crate::constants::{
    ACCEPT_INVALID_CERTS, BATCH_ENABLED, BATCH_MAX_EVENTS, BATCH_TIMEOUT_SECONDS,
    DEFAULT_COLLECTOR_HOST, DEFAULT_EVENT_TYPE, DEFAULT_LOG_LEVEL, REQUEST_TIMEOUT_SECONDS,
};

impl Default for Config {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            insert_key: Secret::default(),
            event_type: DEFAULT_EVENT_TYPE.to_string(),

            protocol: Protocol::Https,
            collector_host: DEFAULT_COLLECTOR_HOST.to_string(),

            proxy_host: None,
            proxy_port: None,
            proxy_user: None,
            proxy_password: None,

            batch_enabled: BATCH_ENABLED,
            batch_max_events: BATCH_MAX_EVENTS,
            batch_timeout_seconds: BATCH_TIMEOUT_SECONDS,

            request_timeout_seconds: REQUEST_TIMEOUT_SECONDS,
            accept_invalid_certs: ACCEPT_INVALID_CERTS,

            tags: vec![],
            exclude_tags: vec![],

            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Defaults for everything except the two required options.
    pub fn new(account_id: impl Into<String>, insert_key: impl Into<Secret>) -> Self {
        Self {
            account_id: account_id.into(),
            insert_key: insert_key.into(),
            ..Default::default()
        }
    }
}
