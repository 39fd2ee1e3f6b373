use crate::client::error::SinkError;
use crate::client::exporters::batch::{BatchAccumulator, BatchSettings};
use crate::client::exporters::event_writer::{DeliveryResult, EventWriter, Payload};
use crate::client::exporters::insights_forward::InsightsForward;
use crate::client::exporters::stats::{DeliveryStats, DeliveryStatsSnapshot};
use crate::config::Config;
use crate::events::{EventFilter, RawEvent};
use crate::normalize::Normalizer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

enum Dispatch<W: EventWriter> {
    Batched(BatchAccumulator),
    Direct(Arc<W>),
}

/// Entry point for the host pipeline: one `on_event` per event, one
/// `on_shutdown` at the end.
pub struct InsightsSink<W: EventWriter = InsightsForward> {
    normalizer: Normalizer,
    filter: EventFilter,
    dispatch: Dispatch<W>,
    stats: Arc<DeliveryStats>,
    shut_down: AtomicBool,
}

impl InsightsSink<InsightsForward> {
    /// Validates the configuration and builds the HTTP delivery client.
    /// When batching is enabled this must run inside a Tokio runtime.
    pub fn new(config: &Config) -> Result<Self, SinkError> {
        config.validate()?;
        let writer = InsightsForward::try_new(config)?;
        info!(
            "Initialized Insights sink for account {}, url: {}",
            config.account_id,
            writer.endpoint()
        );
        Self::with_writer(config, writer)
    }
}

impl<W: EventWriter> InsightsSink<W> {
    pub fn with_writer(config: &Config, writer: W) -> Result<Self, SinkError> {
        config.validate()?;

        let stats = Arc::new(DeliveryStats::default());
        let writer = Arc::new(writer);
        let dispatch = if config.batch_enabled {
            Dispatch::Batched(BatchAccumulator::spawn(
                writer,
                BatchSettings::from_config(config),
                stats.clone(),
            ))
        } else {
            Dispatch::Direct(writer)
        };

        Ok(InsightsSink {
            normalizer: Normalizer::new(config.event_type.clone()),
            filter: EventFilter::new(config.tags.clone(), config.exclude_tags.clone()),
            dispatch,
            stats,
            shut_down: AtomicBool::new(false),
        })
    }

    /// Normalizes one event and forwards it, directly or through the batch.
    /// Failures are logged and counted; the sink stays usable.
    pub async fn on_event(&self, raw: &RawEvent) {
        if !self.filter.accepts(raw) {
            debug!("Event filtered out by tag settings, skipping");
            return;
        }

        if self.shut_down.load(Ordering::SeqCst) {
            warn!("Event received after shutdown, dropping it");
            self.stats.record_rejected(1);
            return;
        }

        let event = self.normalizer.normalize(raw);

        match &self.dispatch {
            Dispatch::Batched(batch) => {
                if let Err(e) = batch.add(event).await {
                    warn!("Could not queue event: {}", e);
                }
            }
            Dispatch::Direct(writer) => {
                let result = writer.deliver(Payload::Single(event)).await;
                self.stats.record(&result);
            }
        }
    }

    /// Performs the final flush when batching and stops accepting events.
    /// Completes whether or not that flush succeeds.
    pub async fn on_shutdown(&self) -> DeliveryStatsSnapshot {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            debug!("Insights sink already shut down");
            return self.stats.snapshot();
        }

        if let Dispatch::Batched(batch) = &self.dispatch {
            match batch.close().await {
                Some(DeliveryResult { success: false, error, .. }) => warn!(
                    "Final flush failed: {}",
                    error.unwrap_or_else(|| "unknown error".into())
                ),
                Some(result) => debug!("Final flush sent {} events", result.event_count),
                None => debug!("Nothing left to flush at shutdown"),
            }
        }

        let stats = self.stats.snapshot();
        info!(
            "Insights sink shut down: {} payloads sent, {} failed, {} events sent, {} dropped",
            stats.payloads_sent, stats.payloads_failed, stats.events_sent, stats.events_dropped
        );
        stats
    }

    pub fn stats(&self) -> DeliveryStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn event_type(&self) -> &str {
        self.normalizer.event_type()
    }

    pub fn is_batching(&self) -> bool {
        matches!(self.dispatch, Dispatch::Batched(_))
    }
}
