use crate::constants::{EVENT_TYPE_FIELD, TIMESTAMP_FIELD};
use crate::events::{NormalizedEvent, RawEvent};
use crate::normalize::reserved_words::ReservedWordTable;
use crate::normalize::timestamp::coerce_timestamp_value;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, warn};

/// Turns one raw event into an Insights-compliant one.
///
/// Reserved attribute names are rewritten according to `table`, `timestamp`
/// is coerced to epoch seconds (and, being reserved itself, emitted as
/// `timestamp_moved`), and `eventType` is always set to `event_type`,
/// replacing anything the event carried under that name. Never fails: a
/// timestamp that cannot be coerced is kept as it was.
pub fn normalize_with(table: &ReservedWordTable, raw: &RawEvent, event_type: &str) -> NormalizedEvent {
    normalize_inner(raw, event_type, |key| {
        if table.is_reserved(key) {
            debug!(reserved_word = key, "Reserved word found");
        }
        table.compliant_name(key)
    })
}

/// [`normalize_with`] against the Insights reserved-word table.
pub fn normalize(raw: &RawEvent, event_type: &str) -> NormalizedEvent {
    normalize_with(ReservedWordTable::insights(), raw, event_type)
}

fn normalize_inner(
    raw: &RawEvent,
    event_type: &str,
    mut compliant_name: impl FnMut(&str) -> String,
) -> NormalizedEvent {
    let mut output = NormalizedEvent::with_capacity(raw.len() + 1);
    output.insert(
        EVENT_TYPE_FIELD.to_string(),
        Value::String(event_type.to_string()),
    );

    for (key, value) in raw {
        if key == EVENT_TYPE_FIELD {
            debug!("Dropping event-supplied eventType in favour of the configured one");
            continue;
        }

        let value = if key == TIMESTAMP_FIELD {
            coerce_field(value)
        } else {
            value.clone()
        };

        output.insert(compliant_name(key), value);
    }

    output
}

fn coerce_field(value: &Value) -> Value {
    match coerce_timestamp_value(value) {
        Ok(seconds) => Value::from(seconds),
        Err(e) => {
            warn!("Keeping original timestamp: {}", e);
            value.clone()
        }
    }
}

/// Normalizer bound to one sink: carries the configured `eventType` and
/// memoizes compliant names per field so repeated fields skip the table.
#[derive(Debug)]
pub struct Normalizer {
    event_type: String,
    table: &'static ReservedWordTable,
    rename_cache: DashMap<String, String>,
}

impl Normalizer {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self::with_table(event_type, ReservedWordTable::insights())
    }

    pub fn with_table(event_type: impl Into<String>, table: &'static ReservedWordTable) -> Self {
        Normalizer {
            event_type: event_type.into(),
            table,
            rename_cache: DashMap::new(),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn normalize(&self, raw: &RawEvent) -> NormalizedEvent {
        normalize_inner(raw, &self.event_type, |key| self.compliant_name(key))
    }

    fn compliant_name(&self, key: &str) -> String {
        if let Some(cached) = self.rename_cache.get(key) {
            return cached.value().clone();
        }

        if self.table.is_reserved(key) {
            debug!(reserved_word = key, "Reserved word found");
        }
        let name = self.table.compliant_name(key);
        self.rename_cache.insert(key.to_string(), name.clone());
        name
    }

    pub fn cached_names(&self) -> usize {
        self.rename_cache.len()
    }
}
