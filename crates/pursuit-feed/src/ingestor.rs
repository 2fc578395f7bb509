//! Telemetry ingestor: a background thread keeping the latest snapshot.
//!
//! The receive loop polls its source with a short timeout so that the
//! running flag is checked at least once per timeout. Decoded snapshots are
//! published by swapping an `Arc` under a mutex; the lock is held only for
//! the swap (writer) or the clone (reader).

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use pursuit_core::constants::{FEED_ERROR_BACKOFF, FEED_RECV_TIMEOUT, FEED_SHUTDOWN_TIMEOUT};
use pursuit_core::snapshot::TelemetrySnapshot;
use pursuit_core::wire::parse_snapshot;

use crate::source::FeedSource;

type Slot = Arc<Mutex<Option<Arc<TelemetrySnapshot>>>>;

/// Ingestor timing.
#[derive(Debug, Clone)]
pub struct IngestorConfig {
    /// Per-iteration receive timeout. Bounds how long a stop request can go unseen.
    pub recv_timeout: Duration,
    /// Pause after a transport error.
    pub error_backoff: Duration,
    /// How long `stop` waits for the thread to finish.
    pub shutdown_timeout: Duration,
    pub thread_name: String,
}

impl Default for IngestorConfig {
    fn default() -> Self {
        Self {
            recv_timeout: FEED_RECV_TIMEOUT,
            error_backoff: FEED_ERROR_BACKOFF,
            shutdown_timeout: FEED_SHUTDOWN_TIMEOUT,
            thread_name: "pursuit-ingest".into(),
        }
    }
}

#[derive(Debug)]
pub enum IngestError {
    /// The receive loop did not exit within the shutdown timeout.
    /// It has been told to stop and is left to finish on its own.
    ShutdownTimeout { waited: Duration },
    /// No feed source to run. It went with an earlier thread that failed to
    /// spawn, panicked or did not stop in time.
    SourceUnavailable,
    /// The OS refused to spawn the thread.
    Spawn(std::io::Error),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::ShutdownTimeout { waited } => {
                write!(f, "ingest thread did not stop within {waited:?}")
            }
            IngestError::SourceUnavailable => {
                f.write_str("feed source unavailable")
            }
            IngestError::Spawn(e) => write!(f, "failed to spawn ingest thread: {e}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

/// Counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub received: u64,
    pub published: u64,
    pub malformed: u64,
    pub transport_errors: u64,
}

#[derive(Default)]
struct Counters {
    received: AtomicU64,
    published: AtomicU64,
    malformed: AtomicU64,
    transport_errors: AtomicU64,
}

impl Counters {
    fn load(&self) -> IngestStats {
        IngestStats {
            received: self.received.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
        }
    }
}

/// Cloneable read handle on the latest snapshot.
#[derive(Clone, Default)]
pub struct SnapshotReader {
    slot: Slot,
}

impl SnapshotReader {
    /// The most recently published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<TelemetrySnapshot>> {
        match self.slot.lock() {
            Ok(lock) => lock.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

struct Worker {
    handle: JoinHandle<Box<dyn FeedSource>>,
    done_rx: mpsc::Receiver<()>,
}

/// Owns the feed source and the thread that drains it.
pub struct TelemetryIngestor {
    config: IngestorConfig,
    source: Option<Box<dyn FeedSource>>,
    slot: Slot,
    running: Arc<AtomicBool>,
    counters: Arc<Counters>,
    worker: Option<Worker>,
}

impl TelemetryIngestor {
    pub fn new(source: impl FeedSource + 'static, config: IngestorConfig) -> Self {
        Self {
            config,
            source: Some(Box::new(source)),
            slot: Slot::default(),
            running: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(Counters::default()),
            worker: None,
        }
    }

    /// Spawn the receive loop. No-op while it is already running.
    pub fn start(&mut self) -> Result<(), IngestError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let source = self.source.take().ok_or(IngestError::SourceUnavailable)?;
        let label = source.describe();

        self.running.store(true, Ordering::Release);
        let (done_tx, done_rx) = mpsc::channel();
        let ctx = LoopContext {
            slot: Arc::clone(&self.slot),
            running: Arc::clone(&self.running),
            counters: Arc::clone(&self.counters),
            recv_timeout: self.config.recv_timeout,
            error_backoff: self.config.error_backoff,
        };

        let handle = std::thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || {
                let source = run_ingest_loop(source, &ctx);
                let _ = done_tx.send(());
                source
            })
            .map_err(|e| {
                // The closure, and the source with it, is gone.
                self.running.store(false, Ordering::Release);
                IngestError::Spawn(e)
            })?;

        info!(feed = %label, "telemetry ingestor started");
        self.worker = Some(Worker { handle, done_rx });
        Ok(())
    }

    /// Signal the loop to exit and wait up to the shutdown timeout.
    /// No-op when not running.
    pub fn stop(&mut self) -> Result<(), IngestError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        self.running.store(false, Ordering::Release);

        match worker.done_rx.recv_timeout(self.config.shutdown_timeout) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => match worker.handle.join() {
                Ok(source) => {
                    self.source = Some(source);
                    info!("telemetry ingestor stopped");
                    Ok(())
                }
                Err(_) => {
                    warn!("ingest thread panicked; feed source lost");
                    Ok(())
                }
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let waited = self.config.shutdown_timeout;
                warn!(waited_ms = waited.as_millis() as u64, "ingest thread did not stop in time");
                Err(IngestError::ShutdownTimeout { waited })
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// The most recently published snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<TelemetrySnapshot>> {
        self.handle().latest()
    }

    /// Read handle for other threads.
    pub fn handle(&self) -> SnapshotReader {
        SnapshotReader {
            slot: Arc::clone(&self.slot),
        }
    }

    pub fn stats(&self) -> IngestStats {
        self.counters.load()
    }
}

impl Drop for TelemetryIngestor {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

struct LoopContext {
    slot: Slot,
    running: Arc<AtomicBool>,
    counters: Arc<Counters>,
    recv_timeout: Duration,
    error_backoff: Duration,
}

/// Swap in the new snapshot. A poisoned lock is recovered: the slot only
/// ever holds a whole `Arc`, so its contents are still valid.
fn publish(slot: &Mutex<Option<Arc<TelemetrySnapshot>>>, snapshot: Arc<TelemetrySnapshot>) {
    let mut lock = match slot.lock() {
        Ok(lock) => lock,
        Err(poisoned) => poisoned.into_inner(),
    };
    *lock = Some(snapshot);
}

fn run_ingest_loop(mut source: Box<dyn FeedSource>, ctx: &LoopContext) -> Box<dyn FeedSource> {
    let mut failing = false;

    while ctx.running.load(Ordering::Acquire) {
        match source.recv_timeout(ctx.recv_timeout) {
            Ok(None) => {}
            Ok(Some(raw)) => {
                failing = false;
                ctx.counters.received.fetch_add(1, Ordering::Relaxed);
                match parse_snapshot(&raw) {
                    Ok(snapshot) => {
                        publish(&ctx.slot, Arc::new(snapshot));
                        ctx.counters.published.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        ctx.counters.malformed.fetch_add(1, Ordering::Relaxed);
                        debug!(error = %e, "dropping malformed telemetry");
                    }
                }
            }
            Err(e) => {
                ctx.counters.transport_errors.fetch_add(1, Ordering::Relaxed);
                // Log the first failure of a run loudly, repeats quietly.
                if failing {
                    debug!(error = %e, "telemetry feed still failing");
                } else {
                    warn!(error = %e, "telemetry feed error; retrying");
                }
                failing = true;
                std::thread::sleep(ctx.error_backoff);
            }
        }
    }
    source
}
