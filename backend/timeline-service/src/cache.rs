//! In-process snapshot cache for rendered timeline pages.
//!
//! A snapshot is served unconditionally within its TTL window, even when
//! the underlying posts have since been deleted; invalidation is time-based
//! expiry plus the explicit [`SnapshotCache::clear`] hook, never
//! write-through. Concurrent callers on a cold key share a single compute.
//!
//! Keys follow the pattern `timeline:{view}:page:{n}`.

use crate::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;

/// Default snapshot staleness window in seconds.
pub const DEFAULT_SNAPSHOT_TTL_SECS: u64 = 20;

/// Cache key builder.
pub struct CacheKey;

impl CacheKey {
    /// Global timeline page snapshot.
    /// Format: timeline:global:page:{n}
    pub fn global_page(number: usize) -> String {
        format!("timeline:global:page:{}", number)
    }
}

#[derive(Clone)]
struct Entry {
    body: String,
    stored_at: Instant,
}

pub struct SnapshotCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
    // Per-key compute guards; single-flight within one expiry window.
    keylocks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            keylocks: Mutex::new(HashMap::new()),
        }
    }

    /// Serve the live snapshot under `key`, or run `compute` and store its
    /// result. At most one caller computes per key per window; the rest
    /// wait and share the stored body.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        if let Some(body) = self.lookup(key).await {
            debug!(key = %key, "snapshot hit");
            return Ok(body);
        }

        let keylock = {
            let mut locks = self.keylocks.lock().await;
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = keylock.lock().await;

        // A concurrent caller may have stored the snapshot while we waited.
        if let Some(body) = self.lookup(key).await {
            debug!(key = %key, "snapshot hit after wait");
            return Ok(body);
        }

        debug!(key = %key, "snapshot miss, computing");
        let body = compute().await?;
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                body: body.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(body)
    }

    /// Drop every snapshot immediately. The only explicit invalidation hook;
    /// exposed to operational tooling and tests.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        self.keylocks.lock().await.clear();
        debug!("snapshot cache cleared");
    }

    async fn lookup(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.body.clone())
    }
}
