//! Delivery client for the New Relic Insights insert API
//!
//! Serializes a [`Payload`](crate::client::exporters::event_writer::Payload)
//! and POSTs it to `/v1/accounts/{account_id}/events` with the insert key
//! header. One request per payload; failed deliveries are logged and dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! # use insights_forwarder::client::exporters::event_writer::{EventWriter, Payload};
//! # use insights_forwarder::client::exporters::insights_forward::InsightsForward;
//! # use insights_forwarder::config::Config;
//! # use insights_forwarder::normalize::normalize;
//! #
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::new("284929", "insert-key");
//! let forwarder = InsightsForward::try_new(&config)?;
//! let event = normalize(serde_json::json!({ "message": "hello" }).as_object().unwrap(), "logstashEvent");
//! let result = forwarder.deliver(Payload::Single(event)).await;
//! println!("delivered: {}", result.success);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{create_insights_forward_config, forward_payload, InsightsForward, InsightsForwardConfig};
pub use error::{ErrorCategory, InsightsForwardError, InsightsForwardResult};
