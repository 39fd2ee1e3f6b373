use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config as RConfig, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{ConfigError, Secret};
use crate::constants::{
    ACCEPT_INVALID_CERTS, BATCH_ENABLED, BATCH_MAX_EVENTS, BATCH_MAX_EVENTS_CEILING,
    BATCH_TIMEOUT_SECONDS, DEFAULT_COLLECTOR_HOST, DEFAULT_EVENT_TYPE, DEFAULT_LOG_LEVEL,
    DEFAULT_PROTOCOL, ENV_PREFIX, REQUEST_TIMEOUT_SECONDS,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub account_id: String,
    pub insert_key: Secret,
    pub event_type: String,

    pub protocol: Protocol,
    pub collector_host: String,

    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
    pub proxy_user: Option<String>,
    pub proxy_password: Option<Secret>,

    pub batch_enabled: bool,
    pub batch_max_events: usize,
    pub batch_timeout_seconds: f64,

    pub request_timeout_seconds: f64,
    pub accept_invalid_certs: bool,

    pub tags: Vec<String>,
    pub exclude_tags: Vec<String>,

    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Checks every option the sink depends on. Called by the loader and again
    /// by the sink constructor, so hand-built configs are covered too.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.account_id.trim().is_empty() {
            return Err(ConfigError::MissingField("account_id"));
        }
        if self.insert_key.is_empty() {
            return Err(ConfigError::MissingField("insert_key"));
        }
        if self.event_type.trim().is_empty() {
            return Err(ConfigError::MissingField("event_type"));
        }
        if self.batch_max_events > BATCH_MAX_EVENTS_CEILING {
            return Err(ConfigError::BatchTooLarge {
                requested: self.batch_max_events,
            });
        }
        if self.batch_max_events == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        validate_seconds("batch_timeout_seconds", self.batch_timeout_seconds)?;
        validate_seconds("request_timeout_seconds", self.request_timeout_seconds)?;

        if self.proxy_host.is_none()
            && (self.proxy_port.is_some()
                || self.proxy_user.is_some()
                || self.proxy_password.is_some())
        {
            return Err(ConfigError::IncompleteProxy);
        }

        self.endpoint()?;
        self.proxy_url()?;
        Ok(())
    }

    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let raw = format!(
            "{}://{}/v1/accounts/{}/events",
            self.protocol,
            self.collector_host.trim_end_matches('/'),
            self.account_id
        );
        Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }

    /// Proxy address without credentials, `None` when no proxy is configured.
    pub fn proxy_url(&self) -> Result<Option<Url>, ConfigError> {
        let Some(host) = self.proxy_host.as_deref() else {
            return Ok(None);
        };

        let raw = match (host.contains("://"), self.proxy_port) {
            (true, Some(port)) => format!("{}:{}", host.trim_end_matches('/'), port),
            (true, None) => host.to_string(),
            (false, Some(port)) => format!("http://{}:{}", host, port),
            (false, None) => format!("http://{}", host),
        };

        Url::parse(&raw)
            .map(Some)
            .map_err(|e| ConfigError::InvalidUrl {
                url: raw,
                reason: e.to_string(),
            })
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.batch_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_seconds)
    }

    /// Config rendered for display; secrets are redacted by their serializer.
    pub fn to_safe_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

// must also fit in a `Duration`
fn validate_seconds(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && Duration::try_from_secs_f64(value).is_ok() {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { field, value })
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    fn builder() -> Result<ConfigBuilder<DefaultState>> {
        let builder = RConfig::builder()
            .set_default("event_type", DEFAULT_EVENT_TYPE)?
            .set_default("protocol", DEFAULT_PROTOCOL)?
            .set_default("collector_host", DEFAULT_COLLECTOR_HOST)?
            .set_default("batch_enabled", BATCH_ENABLED)?
            .set_default("batch_max_events", BATCH_MAX_EVENTS as u64)?
            .set_default("batch_timeout_seconds", BATCH_TIMEOUT_SECONDS)?
            .set_default("request_timeout_seconds", REQUEST_TIMEOUT_SECONDS)?
            .set_default("accept_invalid_certs", ACCEPT_INVALID_CERTS)?
            .set_default::<&str, Vec<&str>>("tags", vec![])?
            .set_default::<&str, Vec<&str>>("exclude_tags", vec![])?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?;

        Ok(builder)
    }

    // values stay strings so ids and keys like "0042" or "1e5" are kept as is
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .list_separator(",")
            .with_list_parse_key("tags")
            .with_list_parse_key("exclude_tags")
    }

    /// Defaults, then the optional TOML file, then `INSIGHTS_*` environment
    /// variables. The result is validated before it is returned.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut builder = Self::builder()?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let config: Config = builder
            .add_source(Self::environment())
            .build()
            .context("failed to read configuration sources")?
            .try_deserialize()
            .context("failed to parse config file")?;

        config.validate().context("invalid configuration")?;

        Ok(config)
    }
}
