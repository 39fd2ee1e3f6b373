use crate::events::NormalizedEvent;
use serde::Serialize;
use std::fmt;
use std::future::Future;

/// Request body for the Insights API: a bare object for one event, an array
/// of objects for several.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Single(NormalizedEvent),
    Batch(Vec<NormalizedEvent>),
}

impl Payload {
    pub fn from_events(mut events: Vec<NormalizedEvent>) -> Self {
        if events.len() == 1 {
            if let Some(event) = events.pop() {
                return Payload::Single(event);
            }
        }
        Payload::Batch(events)
    }

    pub fn len(&self) -> usize {
        match self {
            Payload::Single(_) => 1,
            Payload::Batch(events) => events.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn events(&self) -> Vec<&NormalizedEvent> {
        match self {
            Payload::Single(event) => vec![event],
            Payload::Batch(events) => events.iter().collect(),
        }
    }

    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Outcome of one delivery attempt. Failures are values, not errors: the
/// sink logs them and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub success: bool,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    pub event_count: usize,
}

impl DeliveryResult {
    pub fn delivered(status_code: u16, event_count: usize) -> Self {
        DeliveryResult {
            success: true,
            status_code: Some(status_code),
            error: None,
            event_count,
        }
    }

    pub fn failed(status_code: Option<u16>, error: impl fmt::Display, event_count: usize) -> Self {
        DeliveryResult {
            success: false,
            status_code,
            error: Some(error.to_string()),
            event_count,
        }
    }
}

/// Sends one payload somewhere and reports how it went.
pub trait EventWriter: Send + Sync + 'static {
    fn deliver(&self, payload: Payload) -> impl Future<Output = DeliveryResult> + Send;
}
