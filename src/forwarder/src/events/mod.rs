mod filter;

pub use filter::EventFilter;

use serde::Serialize;
use serde_json::{Map, Value};

/// A field map handed over by the host pipeline. Field order is preserved.
pub type RawEvent = Map<String, Value>;

/// An Insights-compliant event: no reserved attribute names and exactly one
/// `eventType`. Only the normalizer builds these.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedEvent(Map<String, Value>);

impl NormalizedEvent {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        NormalizedEvent(Map::with_capacity(capacity))
    }

    pub(crate) fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
