//! Time-bounded lookup caches.
//!
//! Two independent caches (geolocation, threat) keyed by source address.
//! Expiry is relative to insertion time with a fixed duration. Reads past
//! expiry treat the entry as stale without deleting it; a periodic sweep
//! evicts expired entries. Overwrites are idempotent, so readers tolerate
//! staleness without extra locking.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use netvakt_core::flow::{GeoInfo, ThreatVerdict};

/// A cached value stamped with its insertion time.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub inserted_at: Instant,
}

/// Map of address -> entry with lazy staleness checks.
///
/// The `*_at` variants take an explicit now so expiry behavior is
/// testable at exact boundaries; the plain variants use `Instant::now()`.
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    /// Return the cached value unless it has passed its expiry. Stale
    /// entries are ignored, not removed; the sweep handles removal.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<T> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.inserted_at) >= self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&self, key: &str, value: T) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&self, key: &str, value: T, now: Instant) {
        self.entries.write().insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Evict expired entries, returning how many were removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| now.saturating_duration_since(e.inserted_at) < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// The shared cache service handed to every enrichment worker.
#[derive(Debug)]
pub struct ReputationCache {
    pub geo: TtlCache<GeoInfo>,
    pub threat: TtlCache<ThreatVerdict>,
}

impl ReputationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            geo: TtlCache::new(ttl),
            threat: TtlCache::new(ttl),
        }
    }

    /// Evict expired entries from both caches.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        self.geo.sweep_at(now) + self.threat.sweep_at(now)
    }

    /// Spawn the periodic eviction sweep as an owned background task.
    /// The returned handle stops it; the sweeper never outlives the
    /// service lifecycle.
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration) -> SweeperHandle {
        let cache = Arc::clone(self);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = cache.sweep();
                        if evicted > 0 {
                            debug!(evicted, "Swept expired reputation cache entries");
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        SweeperHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Owned handle to the cache eviction task.
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweep task and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
