pub mod error;
pub mod exporters;
pub mod sink;

pub use error::SinkError;
pub use sink::InsightsSink;
