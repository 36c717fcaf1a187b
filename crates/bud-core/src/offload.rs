//! Bounded offload pool for backend calls.
//!
//! Each call runs on its own spawned tokio task so the awaiting request never
//! drives the backend I/O itself, and a panic inside the backend surfaces as
//! an [`OffloadError`] instead of unwinding through the caller. A fixed set of
//! permits bounds how many calls are in flight; extra callers wait in FIFO
//! order for a permit rather than spawning unbounded work.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::metrics::OFFLOAD_QUEUED;

/// Errors from running work on the pool.
#[derive(Debug, thiserror::Error)]
pub enum OffloadError {
    /// The pool was closed and no longer hands out permits.
    #[error("offload pool '{0}' is closed")]
    Closed(&'static str),

    /// The offloaded task panicked.
    #[error("offloaded task panicked: {0}")]
    Panicked(String),

    /// The offloaded task was cancelled before completing.
    #[error("offloaded task was cancelled")]
    Cancelled,
}

/// Fixed-size pool of permits guarding spawned backend calls.
///
/// Cheap to share: wrap in `Arc` or clone the handle (clones share permits).
#[derive(Clone, Debug)]
pub struct OffloadPool {
    name: &'static str,
    size: usize,
    permits: Arc<Semaphore>,
    queued: Arc<AtomicUsize>,
}

impl OffloadPool {
    /// Create a pool allowing at most `size` concurrent tasks (minimum 1).
    pub fn new(name: &'static str, size: usize) -> Self {
        let size = size.max(1);
        Self {
            name,
            size,
            permits: Arc::new(Semaphore::new(size)),
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Pool name (used as a metric label).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Maximum number of concurrent tasks.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `fut` on a spawned task once a permit is free.
    ///
    /// The permit is held by the spawned task and released when it finishes,
    /// even if the caller stops awaiting.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, OffloadError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let waiting = QueuedGuard::enter(self.name, &self.queued);
        let permit = Arc::clone(&self.permits).acquire_owned().await;
        drop(waiting);

        let permit = permit.map_err(|_| OffloadError::Closed(self.name))?;
        debug!(pool = self.name, available = self.available(), "offloading task");

        let handle = tokio::spawn(async move {
            let _permit = permit;
            fut.await
        });

        handle.await.map_err(|e| {
            if e.is_panic() {
                let message = panic_message(e.into_panic());
                warn!(pool = self.name, %message, "offloaded task panicked");
                OffloadError::Panicked(message)
            } else {
                OffloadError::Cancelled
            }
        })
    }

    /// Callers currently waiting for a permit.
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Stop handing out permits. Waiting and future callers get
    /// [`OffloadError::Closed`]; tasks already running finish normally.
    pub fn close(&self) {
        self.permits.close();
    }
}

/// Counts one waiting caller for as long as it lives, so a caller dropped
/// mid-wait still leaves the queue.
struct QueuedGuard<'a> {
    pool: &'static str,
    queued: &'a AtomicUsize,
}

impl<'a> QueuedGuard<'a> {
    fn enter(pool: &'static str, queued: &'a AtomicUsize) -> Self {
        let waiting = queued.fetch_add(1, Ordering::SeqCst) + 1;
        ::metrics::gauge!(OFFLOAD_QUEUED, "pool" => pool).set(waiting as f64);
        Self { pool, queued }
    }
}

impl Drop for QueuedGuard<'_> {
    fn drop(&mut self) {
        let waiting = self.queued.fetch_sub(1, Ordering::SeqCst) - 1;
        ::metrics::gauge!(OFFLOAD_QUEUED, "pool" => self.pool).set(waiting as f64);
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
