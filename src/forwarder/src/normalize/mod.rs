//! Schema compliance for outgoing events: reserved attribute names,
//! timestamp coercion and `eventType` tagging.

mod normalizer;
pub mod reserved_words;
pub mod timestamp;

pub use normalizer::{normalize, normalize_with, Normalizer};
pub use reserved_words::{ReservedPolicy, ReservedWordTable};
pub use timestamp::{coerce_timestamp, coerce_timestamp_value, TimestampError};
