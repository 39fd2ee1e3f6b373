use crate::client::exporters::event_writer::DeliveryResult;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Delivery counters shared by the sink and its delivery worker
#[derive(Debug, Default)]
pub struct DeliveryStats {
    payloads_sent: AtomicU64,
    payloads_failed: AtomicU64,
    events_sent: AtomicU64,
    events_dropped: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStatsSnapshot {
    pub payloads_sent: u64,
    pub payloads_failed: u64,
    pub events_sent: u64,
    /// Events lost to failed deliveries or refused after shutdown
    pub events_dropped: u64,
}

impl DeliveryStats {
    pub fn record(&self, result: &DeliveryResult) {
        let events = result.event_count as u64;
        if result.success {
            self.payloads_sent.fetch_add(1, Ordering::Relaxed);
            self.events_sent.fetch_add(events, Ordering::Relaxed);
        } else {
            self.payloads_failed.fetch_add(1, Ordering::Relaxed);
            self.events_dropped.fetch_add(events, Ordering::Relaxed);
        }
    }

    pub fn record_rejected(&self, events: usize) {
        self.events_dropped
            .fetch_add(events as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DeliveryStatsSnapshot {
        DeliveryStatsSnapshot {
            payloads_sent: self.payloads_sent.load(Ordering::Relaxed),
            payloads_failed: self.payloads_failed.load(Ordering::Relaxed),
            events_sent: self.events_sent.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
        }
    }
}
