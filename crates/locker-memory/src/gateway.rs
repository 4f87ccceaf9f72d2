//! Memory gateway and its sweep task.

use std::sync::Arc;
use std::time::Duration;

use locker_core::error::{LockError, LockResult};
use locker_core::gateway::{Acquisition, Gateway, ttl_millis};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, instrument, trace, warn};

use crate::storage::{EntrySnapshot, Storage};

/// Sweep interval used by [`MemoryGateway::default`].
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// Running sweep task.
struct SweepTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns the sweep task; the last gateway clone to drop aborts it.
struct Sweeper {
    interval: Duration,
    task: Mutex<Option<SweepTask>>,
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.handle.abort();
        }
    }
}

/// Lock store kept in process memory.
///
/// Every operation takes one mutex around the whole key table, so the
/// check-and-set in [`acquire`](Gateway::acquire) cannot interleave with
/// another caller. Expired entries are ignored on access; the optional sweep
/// task only reclaims their memory.
///
/// Clones share the same table and sweep task.
///
/// # Example
///
/// ```rust,ignore
/// let gateway = MemoryGateway::spawn(Duration::from_millis(100));
/// let locker = Locker::builder(gateway.clone()).ttl(Duration::from_secs(1)).build()?;
/// // ...
/// gateway.stop().await;
/// ```
#[derive(Clone)]
pub struct MemoryGateway {
    storage: Arc<Mutex<Storage>>,
    sweeper: Arc<Sweeper>,
}

impl MemoryGateway {
    /// Creates a gateway whose sweep runs every `sweep_interval` once started.
    ///
    /// A zero interval is raised to one millisecond.
    pub fn new(sweep_interval: Duration) -> Self {
        Self {
            storage: Arc::new(Mutex::new(Storage::default())),
            sweeper: Arc::new(Sweeper {
                interval: sweep_interval.max(Duration::from_millis(1)),
                task: Mutex::new(None),
            }),
        }
    }

    /// Creates a gateway and starts its sweep.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(sweep_interval: Duration) -> Self {
        let gateway = Self::new(sweep_interval);
        gateway.start();
        gateway
    }

    /// Interval between two sweeps.
    pub fn sweep_interval(&self) -> Duration {
        self.sweeper.interval
    }

    /// Starts the periodic sweep on the current tokio runtime.
    ///
    /// Does nothing if the sweep is already running.
    pub fn start(&self) {
        let mut task = self.sweeper.task.lock();
        if task.is_some() {
            return;
        }

        let (shutdown, mut shutdown_receiver) = watch::channel(false);
        let storage = self.storage.clone();
        let period = self.sweeper.interval;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let removed = storage.lock().remove_expired(Instant::now());
                        if removed > 0 {
                            trace!(removed, "swept expired entries");
                        }
                    }
                    changed = shutdown_receiver.changed() => {
                        if changed.is_err() || *shutdown_receiver.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        debug!(interval = ?period, "memory gateway sweep started");
        *task = Some(SweepTask { shutdown, handle });
    }

    /// Stops the periodic sweep and waits for the task to finish.
    ///
    /// Does nothing if the sweep is not running. Entries are kept.
    pub async fn stop(&self) {
        let task = self.sweeper.task.lock().take();
        if let Some(task) = task {
            let _ = task.shutdown.send(true);
            match task.handle.await {
                Err(e) if e.is_panic() => warn!(error = %e, "memory gateway sweep panicked"),
                _ => debug!("memory gateway sweep stopped"),
            }
        }
    }

    /// Whether the periodic sweep is running.
    pub fn is_running(&self) -> bool {
        self.sweeper
            .task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Removes expired entries now, returning how many were removed.
    pub fn sweep(&self) -> usize {
        self.storage.lock().remove_expired(Instant::now())
    }

    /// Live entry for `key`, if any.
    pub fn entry(&self, key: &str) -> Option<EntrySnapshot> {
        self.storage.lock().get(key, Instant::now())
    }

    /// Number of stored entries, expired ones not yet swept included.
    pub fn len(&self) -> usize {
        self.storage.lock().len()
    }

    /// Whether no entry is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new(DEFAULT_SWEEP_INTERVAL)
    }
}

impl std::fmt::Debug for MemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGateway")
            .field("entries", &self.len())
            .field("sweep_interval", &self.sweeper.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Gateway for MemoryGateway {
    #[instrument(level = "trace", skip(self, token), fields(backend = "memory"))]
    async fn acquire(&self, key: &str, token: &str, ttl: Duration) -> LockResult<Acquisition> {
        ttl_millis(ttl)?;
        let now = Instant::now();
        if now.checked_add(ttl).is_none() {
            return Err(LockError::InvalidConfig(format!(
                "ttl {ttl:?} overflows the clock"
            )));
        }
        Ok(self.storage.lock().acquire(key, token, ttl, now))
    }

    #[instrument(level = "trace", skip(self, token), fields(backend = "memory"))]
    async fn release(&self, key: &str, token: &str) -> LockResult<bool> {
        Ok(self.storage.lock().release(key, token, Instant::now()))
    }
}
