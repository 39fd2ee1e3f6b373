pub mod batch;
pub mod event_writer;
pub mod insights_forward;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;
