//! Atomic publication of index snapshots.
//!
//! Readers take an `Arc` to the current snapshot and keep using it for the
//! whole request, even if a rebuild publishes a newer one meanwhile. A rebuild
//! that fails leaves the previously published snapshot in place.

use std::ops::Deref;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::index::IndexSnapshot;
use crate::error::{KtError, Result};

/// A snapshot together with its publication metadata.
#[derive(Debug)]
pub struct PublishedSnapshot {
    version: u64,
    published_at: DateTime<Utc>,
    snapshot: IndexSnapshot,
}

impl PublishedSnapshot {
    /// Monotonic publication counter, starting at 1.
    pub const fn version(&self) -> u64 {
        self.version
    }

    pub const fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub const fn snapshot(&self) -> &IndexSnapshot {
        &self.snapshot
    }
}

impl Deref for PublishedSnapshot {
    type Target = IndexSnapshot;

    fn deref(&self) -> &Self::Target {
        &self.snapshot
    }
}

/// Holds the currently published snapshot.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<PublishedSnapshot>>,
}

impl SnapshotStore {
    pub fn new(snapshot: IndexSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(PublishedSnapshot {
                version: 1,
                published_at: Utc::now(),
                snapshot,
            })),
        }
    }

    /// The snapshot readers should use for one request.
    pub fn current(&self) -> Arc<PublishedSnapshot> {
        Arc::clone(&self.current.read())
    }

    pub fn version(&self) -> u64 {
        self.current.read().version
    }

    /// Replace the current snapshot, returning the new version.
    pub fn publish(&self, snapshot: IndexSnapshot) -> u64 {
        let mut guard = self.current.write();
        let version = guard.version + 1;
        *guard = Arc::new(PublishedSnapshot {
            version,
            published_at: Utc::now(),
            snapshot,
        });
        drop(guard);
        info!(target: "kt.snapshot", version, "published index snapshot");
        version
    }

    /// Build a snapshot with `build` and publish it on success.
    ///
    /// On failure the current snapshot stays published and the error is
    /// returned.
    pub fn rebuild_with<F>(&self, build: F) -> Result<u64>
    where
        F: FnOnce() -> Result<IndexSnapshot>,
    {
        match build() {
            Ok(snapshot) => Ok(self.publish(snapshot)),
            Err(err) => {
                warn!(
                    target: "kt.snapshot",
                    error = %err,
                    version = self.version(),
                    "rebuild failed, keeping current snapshot"
                );
                Err(err)
            }
        }
    }

    /// Run [`rebuild_with`](Self::rebuild_with) on a background thread.
    pub fn spawn_rebuild<F>(self: &Arc<Self>, build: F) -> Result<JoinHandle<Result<u64>>>
    where
        F: FnOnce() -> Result<IndexSnapshot> + Send + 'static,
    {
        let store = Arc::clone(self);
        let handle = thread::Builder::new()
            .name("kt-rebuild".to_string())
            .spawn(move || store.rebuild_with(build))?;
        debug!(target: "kt.snapshot", "spawned background rebuild");
        Ok(handle)
    }
}

/// Wait for a background rebuild.
pub fn join_rebuild(handle: JoinHandle<Result<u64>>) -> Result<u64> {
    handle
        .join()
        .map_err(|_| KtError::WorkerFailed("rebuild thread panicked".to_string()))?
}
