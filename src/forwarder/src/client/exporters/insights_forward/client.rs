use super::error::{InsightsForwardError, InsightsForwardResult};
use crate::client::exporters::event_writer::{DeliveryResult, EventWriter, Payload};
use crate::config::{Config, Secret};
use crate::constants::INSERT_KEY_HEADER;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Proxy};
use std::time::Instant;
use tracing::{debug, trace, warn};
use url::Url;

/// Everything needed to POST a payload to the collector
#[derive(Clone)]
pub struct InsightsForwardConfig {
    pub endpoint: Url,
    pub insert_key: Secret,
    pub client: Client,
}

/// Builds the endpoint URL and an HTTP client honouring proxy, timeout and
/// certificate settings.
pub fn create_insights_forward_config(config: &Config) -> InsightsForwardResult<InsightsForwardConfig> {
    config.validate()?;

    Ok(InsightsForwardConfig {
        endpoint: config.endpoint()?,
        insert_key: config.insert_key.clone(),
        client: build_client(config)?,
    })
}

fn build_client(config: &Config) -> InsightsForwardResult<Client> {
    let mut builder = Client::builder().timeout(config.request_timeout());

    if config.accept_invalid_certs {
        warn!("TLS certificate verification is disabled for the Insights endpoint");
        builder = builder.danger_accept_invalid_certs(true);
    }

    // only the configured proxy is used, never *_PROXY from the environment
    let Some(proxy_url) = config.proxy_url()? else {
        return builder
            .no_proxy()
            .build()
            .map_err(InsightsForwardError::ClientBuild);
    };

    let mut proxy = Proxy::all(proxy_url.as_str()).map_err(InsightsForwardError::ClientBuild)?;
    if let Some(user) = config.proxy_user.as_deref() {
        let password = config
            .proxy_password
            .as_ref()
            .map(Secret::expose)
            .unwrap_or_default();
        proxy = proxy.basic_auth(user, password);
    }
    debug!("Routing Insights traffic through proxy {}", proxy_url);

    builder
        .proxy(proxy)
        .build()
        .map_err(InsightsForwardError::ClientBuild)
}

/// Serializes and sends one payload. Never fails: the outcome, including
/// network and HTTP errors, comes back as a [`DeliveryResult`].
pub async fn forward_payload(config: &InsightsForwardConfig, payload: &Payload) -> DeliveryResult {
    let event_count = payload.len();
    let start_time = Instant::now();

    match send_payload(config, payload).await {
        Ok(status) => {
            debug!(
                "Event sent to New Relic SUCCEEDED! Response code: {}, events: {}, elapsed: {:?}",
                status,
                event_count,
                start_time.elapsed()
            );
            DeliveryResult::delivered(status, event_count)
        }
        Err(e) => {
            warn!(
                category = %e.error_category(),
                "Event sent to New Relic FAILED, dropping {} events: {}, elapsed: {:?}",
                event_count,
                e,
                start_time.elapsed()
            );
            DeliveryResult::failed(e.status_code(), &e, event_count)
        }
    }
}

async fn send_payload(config: &InsightsForwardConfig, payload: &Payload) -> InsightsForwardResult<u16> {
    let body = payload.to_json_bytes()?;
    trace!("Request body: {}", String::from_utf8_lossy(&body));

    send_request(config, body).await
}

/// Send a single HTTP request, 2XX is success
async fn send_request(config: &InsightsForwardConfig, body: Vec<u8>) -> InsightsForwardResult<u16> {
    let response = config
        .client
        .post(config.endpoint.clone())
        .header(CONTENT_TYPE, "application/json")
        .header(INSERT_KEY_HEADER, config.insert_key.expose())
        .body(body)
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        Ok(status.as_u16())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(InsightsForwardError::server_error(status.as_u16(), body))
    }
}

/// HTTP client for the Insights insert API
pub struct InsightsForward {
    config: InsightsForwardConfig,
}

impl InsightsForward {
    pub fn try_new(config: &Config) -> InsightsForwardResult<Self> {
        Ok(InsightsForward {
            config: create_insights_forward_config(config)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }
}

impl EventWriter for InsightsForward {
    async fn deliver(&self, payload: Payload) -> DeliveryResult {
        forward_payload(&self.config, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::exporters::insights_forward::ErrorCategory;
    use crate::config::Protocol;

    #[test]
    fn builds_endpoint_from_config() {
        let config = Config::new("284929", "key");

        let forward = InsightsForward::try_new(&config).unwrap();

        assert_eq!(
            forward.endpoint().as_str(),
            "https://insights-collector.newrelic.com/v1/accounts/284929/events"
        );
    }

    #[test]
    fn rejects_unrepresentable_timeout() {
        let config = Config {
            request_timeout_seconds: 1e20,
            ..Config::new("284929", "key")
        };

        let err = InsightsForward::try_new(&config).err().unwrap();

        assert_eq!(err.error_category(), ErrorCategory::ClientSetup);
    }

    #[test]
    fn accepts_authenticated_proxy() {
        let config = Config {
            protocol: Protocol::Http,
            proxy_host: Some("proxy.internal".into()),
            proxy_port: Some(3128),
            proxy_user: Some("svc".into()),
            proxy_password: Some("hunter2".into()),
            ..Config::new("284929", "key")
        };

        assert!(InsightsForward::try_new(&config).is_ok());
    }
}
