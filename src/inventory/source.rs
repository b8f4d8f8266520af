//! Where inventory snapshots come from.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use tracing::debug;

use super::InventorySnapshot;
use crate::error::{InventoryError, Result};

/// A readable inventory record set.
///
/// Loading is a pure read. Failures surface as
/// [`InventoryError::DataUnavailable`].
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Short human-readable identity of the source (path, name).
    fn describe(&self) -> String;

    /// Load the full record set.
    async fn load(&self) -> Result<Arc<InventorySnapshot>>;

    /// Change marker used by caches; `None` means "unknown".
    async fn fingerprint(&self) -> Option<SystemTime> {
        None
    }
}

/// Delimited file on disk with a header row.
#[derive(Debug, Clone)]
pub struct CsvInventorySource {
    path: PathBuf,
}

impl CsvInventorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl InventorySource for CsvInventorySource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Arc<InventorySnapshot>> {
        debug!(path = %self.path.display(), "reading inventory source");
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            InventoryError::DataUnavailable(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let snapshot = InventorySnapshot::from_reader(bytes.as_slice())?;
        Ok(Arc::new(snapshot))
    }

    async fn fingerprint(&self) -> Option<SystemTime> {
        tokio::fs::metadata(&self.path)
            .await
            .ok()
            .and_then(|m| m.modified().ok())
    }
}

/// Fixed in-memory snapshot, for embedding and tests.
#[derive(Debug, Clone)]
pub struct MemoryInventorySource {
    snapshot: Arc<InventorySnapshot>,
}

impl MemoryInventorySource {
    pub fn new(snapshot: InventorySnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

#[async_trait]
impl InventorySource for MemoryInventorySource {
    fn describe(&self) -> String {
        format!("memory ({} records)", self.snapshot.len())
    }

    async fn load(&self) -> Result<Arc<InventorySnapshot>> {
        Ok(self.snapshot.clone())
    }
}

#[async_trait]
impl<S: InventorySource + ?Sized> InventorySource for Arc<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn load(&self) -> Result<Arc<InventorySnapshot>> {
        (**self).load().await
    }

    async fn fingerprint(&self) -> Option<SystemTime> {
        (**self).fingerprint().await
    }
}
