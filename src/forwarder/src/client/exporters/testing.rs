use crate::client::exporters::event_writer::{DeliveryResult, EventWriter, Payload};
use std::sync::{Arc, Mutex};

/// Writer that keeps every payload it is given and answers with a fixed
/// status.
#[derive(Clone, Default)]
pub struct RecordingWriter {
    payloads: Arc<Mutex<Vec<Payload>>>,
    fail_with: Option<u16>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(status: u16) -> Self {
        RecordingWriter {
            fail_with: Some(status),
            ..Self::default()
        }
    }

    pub fn payloads(&self) -> Vec<Payload> {
        self.payloads.lock().unwrap().clone()
    }
}

impl EventWriter for RecordingWriter {
    async fn deliver(&self, payload: Payload) -> DeliveryResult {
        let count = payload.len();
        self.payloads.lock().unwrap().push(payload);

        match self.fail_with {
            Some(status) => DeliveryResult::failed(Some(status), format!("Server error {}", status), count),
            None => DeliveryResult::delivered(200, count),
        }
    }
}
