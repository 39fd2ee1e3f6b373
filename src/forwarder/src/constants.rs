pub const DEFAULT_EVENT_TYPE: &str = "logstashEvent";
pub const DEFAULT_PROTOCOL: &str = "https";
pub const DEFAULT_COLLECTOR_HOST: &str = "insights-collector.newrelic.com";

pub const BATCH_ENABLED: bool = true;
pub const BATCH_MAX_EVENTS: usize = 10;
pub const BATCH_TIMEOUT_SECONDS: f64 = 5.0;
// the Insights API rejects larger payloads
pub const BATCH_MAX_EVENTS_CEILING: usize = 1000;

pub const REQUEST_TIMEOUT_SECONDS: f64 = 30.0;
pub const ACCEPT_INVALID_CERTS: bool = false;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_PREFIX: &str = "INSIGHTS";

pub const INSERT_KEY_HEADER: &str = "X-Insert-Key";
pub const EVENT_TYPE_FIELD: &str = "eventType";
pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const TAGS_FIELD: &str = "tags";
