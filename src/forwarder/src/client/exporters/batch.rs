//! Count/time triggered batching in front of an [`EventWriter`].
//!
//! Events are appended under one lock. Whoever fills the batch, or the timer
//! noticing `timeout` has passed since the last flush, cuts it while still
//! holding that lock and hands it to a single delivery worker. A batch is
//! therefore sent exactly once, never grows past `max_items`, and batches
//! reach the writer in the order they were cut.

use crate::client::error::SinkError;
use crate::client::exporters::event_writer::{DeliveryResult, EventWriter, Payload};
use crate::client::exporters::stats::DeliveryStats;
use crate::config::Config;
use crate::events::NormalizedEvent;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub max_items: usize,
    pub timeout: Duration,
}

impl BatchSettings {
    pub fn from_config(config: &Config) -> Self {
        BatchSettings {
            max_items: config.batch_max_events,
            timeout: config.batch_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Accumulating,
    Flushing,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    Size,
    Timer,
    Manual,
    Final,
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushReason::Size => write!(f, "size"),
            FlushReason::Timer => write!(f, "timer"),
            FlushReason::Manual => write!(f, "manual"),
            FlushReason::Final => write!(f, "final"),
        }
    }
}

struct FlushRequest {
    events: Vec<NormalizedEvent>,
    reason: FlushReason,
    done: oneshot::Sender<DeliveryResult>,
}

struct BatchState {
    events: Vec<NormalizedEvent>,
    last_flush: Instant,
    // None once the final flush has been cut
    flush_tx: Option<mpsc::UnboundedSender<FlushRequest>>,
}

struct Shared {
    state: Mutex<BatchState>,
    settings: BatchSettings,
    in_flight: AtomicUsize,
}

type PendingFlush = Option<oneshot::Receiver<DeliveryResult>>;

impl Shared {
    /// Takes the current batch and queues it for delivery. Must be called with
    /// the state lock held; restarts the timeout either way.
    fn cut(&self, state: &mut BatchState, reason: FlushReason) -> PendingFlush {
        state.last_flush = Instant::now();

        if state.events.is_empty() {
            return None;
        }
        let flush_tx = state.flush_tx.as_ref()?;

        let events = std::mem::replace(
            &mut state.events,
            Vec::with_capacity(self.settings.max_items),
        );
        let (done, pending) = oneshot::channel();

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if let Err(mpsc::error::SendError(request)) = flush_tx.send(FlushRequest {
            events,
            reason,
            done,
        }) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            warn!(
                "Delivery worker is gone, dropping {} events",
                request.events.len()
            );
            return None;
        }

        Some(pending)
    }

    async fn on_timer(&self) -> Option<DeliveryResult> {
        let pending = {
            let mut state = self.state.lock().await;
            if state.last_flush.elapsed() < self.settings.timeout {
                return None;
            }
            self.cut(&mut state, FlushReason::Timer)
        };
        wait_for(pending).await
    }
}

async fn wait_for(pending: PendingFlush) -> Option<DeliveryResult> {
    match pending {
        Some(done) => done.await.ok(),
        None => None,
    }
}

pub struct BatchAccumulator {
    shared: Arc<Shared>,
    stats: Arc<DeliveryStats>,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl BatchAccumulator {
    /// Starts the delivery worker and the flush timer. Must be called from
    /// within a Tokio runtime.
    pub fn spawn<W: EventWriter>(
        writer: Arc<W>,
        settings: BatchSettings,
        stats: Arc<DeliveryStats>,
    ) -> Self {
        let (flush_tx, flush_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            state: Mutex::new(BatchState {
                events: Vec::with_capacity(settings.max_items),
                last_flush: Instant::now(),
                flush_tx: Some(flush_tx),
            }),
            settings,
            in_flight: AtomicUsize::new(0),
        });
        let shutdown = CancellationToken::new();

        let worker = tokio::spawn(run_delivery_worker(
            writer,
            flush_rx,
            shared.clone(),
            stats.clone(),
        ));
        let timer = tokio::spawn(run_flush_timer(shared.clone(), shutdown.clone()));

        debug!(
            "Batch accumulator started: max_items={}, timeout={:?}",
            settings.max_items, settings.timeout
        );

        BatchAccumulator {
            shared,
            stats,
            shutdown,
            tasks: Mutex::new(vec![worker, timer]),
        }
    }

    /// Appends an event. When this fills the batch it is flushed before
    /// returning, and the result of that delivery is returned.
    pub async fn add(&self, event: NormalizedEvent) -> Result<Option<DeliveryResult>, SinkError> {
        let pending = {
            let mut state = self.shared.state.lock().await;
            if state.flush_tx.is_none() {
                self.stats.record_rejected(1);
                return Err(SinkError::Closed);
            }

            state.events.push(event);
            if state.events.len() >= self.shared.settings.max_items {
                self.shared.cut(&mut state, FlushReason::Size)
            } else {
                None
            }
        };

        Ok(wait_for(pending).await)
    }

    /// Timer entry point; flushes only when `timeout` has elapsed since the
    /// last flush. An empty batch just restarts the timeout.
    pub async fn on_timer(&self) -> Option<DeliveryResult> {
        self.shared.on_timer().await
    }

    /// Flushes whatever is buffered. A final flush also closes the
    /// accumulator and waits for every queued delivery to finish.
    pub async fn flush(&self, final_flush: bool) -> Option<DeliveryResult> {
        let reason = if final_flush {
            FlushReason::Final
        } else {
            FlushReason::Manual
        };

        let pending = {
            let mut state = self.shared.state.lock().await;
            let pending = self.shared.cut(&mut state, reason);
            if final_flush {
                // dropping the sender lets the worker drain and exit
                state.flush_tx = None;
            }
            pending
        };

        let result = wait_for(pending).await;

        if final_flush {
            self.shutdown.cancel();
            let tasks = std::mem::take(&mut *self.tasks.lock().await);
            for task in tasks {
                if let Err(e) = task.await {
                    warn!("Batch task ended abnormally: {}", e);
                }
            }
        }

        result
    }

    pub async fn close(&self) -> Option<DeliveryResult> {
        self.flush(true).await
    }

    pub async fn pending(&self) -> usize {
        self.shared.state.lock().await.events.len()
    }

    pub async fn phase(&self) -> BatchPhase {
        let state = self.shared.state.lock().await;
        if state.flush_tx.is_none() {
            BatchPhase::Closed
        } else if self.shared.in_flight.load(Ordering::SeqCst) > 0 {
            BatchPhase::Flushing
        } else if !state.events.is_empty() {
            BatchPhase::Accumulating
        } else {
            BatchPhase::Idle
        }
    }
}

impl Drop for BatchAccumulator {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Ok(mut state) = self.shared.state.try_lock() {
            if state.flush_tx.is_some() && !state.events.is_empty() {
                warn!(
                    "Batch accumulator dropped without a final flush, losing {} events",
                    state.events.len()
                );
            }
            // releases the delivery worker
            state.flush_tx = None;
        }
    }
}

async fn run_delivery_worker<W: EventWriter>(
    writer: Arc<W>,
    mut flush_rx: mpsc::UnboundedReceiver<FlushRequest>,
    shared: Arc<Shared>,
    stats: Arc<DeliveryStats>,
) {
    while let Some(request) = flush_rx.recv().await {
        debug!(
            "Sending batch of {} events to insights ({} flush)",
            request.events.len(),
            request.reason
        );

        let result = writer.deliver(Payload::from_events(request.events)).await;
        stats.record(&result);
        shared.in_flight.fetch_sub(1, Ordering::SeqCst);

        // the caller may have stopped waiting
        let _ = request.done.send(result);
    }
    debug!("Delivery worker stopped");
}

async fn run_flush_timer(shared: Arc<Shared>, shutdown: CancellationToken) {
    loop {
        let deadline = shared.state.lock().await.last_flush + shared.settings.timeout;

        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Flush timer cancelled");
                break;
            }
            _ = tokio::time::sleep_until(deadline) => {
                shared.on_timer().await;
            }
        }
    }
}
