//! TTL cache in front of an inventory source.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use super::source::InventorySource;
use super::InventorySnapshot;
use crate::error::Result;

/// Serves the last snapshot until it is older than `ttl` or the underlying
/// source reports a different fingerprint. Failed loads are never cached.
pub struct CachedInventorySource<S> {
    inner: S,
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

#[derive(Clone)]
struct CacheEntry {
    snapshot: Arc<InventorySnapshot>,
    loaded_at: Instant,
    fingerprint: Option<SystemTime>,
}

impl<S: InventorySource> CachedInventorySource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Drop the cached snapshot.
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CacheEntry>> {
        self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl<S: InventorySource> InventorySource for CachedInventorySource<S> {
    fn describe(&self) -> String {
        format!("{} (cached {}s)", self.inner.describe(), self.ttl.as_secs())
    }

    async fn load(&self) -> Result<Arc<InventorySnapshot>> {
        let current = self.inner.fingerprint().await;
        let cached = self.lock().clone();
        if let Some(entry) = cached {
            if entry.loaded_at.elapsed() <= self.ttl && entry.fingerprint == current {
                debug!("inventory cache hit");
                return Ok(entry.snapshot);
            }
        }

        let snapshot = self.inner.load().await?;
        *self.lock() = Some(CacheEntry {
            snapshot: snapshot.clone(),
            loaded_at: Instant::now(),
            fingerprint: current,
        });
        Ok(snapshot)
    }

    async fn fingerprint(&self) -> Option<SystemTime> {
        self.inner.fingerprint().await
    }
}
