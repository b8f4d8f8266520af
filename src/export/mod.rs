//! Whole-inventory CSV export, offered when a query asks for a download.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::DEFAULT_EXPORT_FILE;
use crate::error::{InventoryError, Result};
use crate::inventory::InventorySource;

const TRIGGER_WORDS: &[&str] = &["download", "excel"];

/// Text shown in place of the artifact when the export fails.
pub const EXPORT_FAILURE_PREFIX: &str = "Error preparing file download: ";

/// Whether `query` asks for the inventory as a file.
pub fn is_export_intent(query: &str) -> bool {
    let query = query.trim().to_lowercase();
    TRIGGER_WORDS.iter().any(|w| query.contains(w))
}

/// The serialized inventory, ready to hand to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub contents: String,
    pub record_count: usize,
}

impl ExportArtifact {
    /// Write into `dir` under the artifact's file name.
    ///
    /// Refuses a target that resolves to `source`, the file the inventory is
    /// read from.
    pub async fn write_to(&self, dir: &Path, source: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        if same_file(&path, source).await {
            return Err(InventoryError::Export(format!(
                "refusing to overwrite the inventory source {}",
                source.display()
            )));
        }
        tokio::fs::write(&path, self.contents.as_bytes()).await?;
        info!(path = %path.display(), records = self.record_count, "export written");
        Ok(path)
    }
}

/// Export result as shown alongside an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Ready(ExportArtifact),
    Failed(String),
}

impl ExportOutcome {
    pub fn artifact(&self) -> Option<&ExportArtifact> {
        match self {
            Self::Ready(artifact) => Some(artifact),
            Self::Failed(_) => None,
        }
    }
}

/// Re-reads the full inventory and serializes it with the source's columns.
pub struct InventoryExporter {
    source: Arc<dyn InventorySource>,
    file_name: String,
}

impl InventoryExporter {
    pub fn new(source: Arc<dyn InventorySource>) -> Self {
        Self {
            source,
            file_name: DEFAULT_EXPORT_FILE.to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub async fn export(&self) -> Result<ExportArtifact> {
        let snapshot = self
            .source
            .load()
            .await
            .map_err(|e| InventoryError::Export(reason(&e)))?;
        let contents = snapshot
            .to_csv()
            .map_err(|e| InventoryError::Export(reason(&e)))?;
        Ok(ExportArtifact {
            file_name: self.file_name.clone(),
            contents,
            record_count: snapshot.len(),
        })
    }

    /// Like [`export`](Self::export), with failure degraded to display text.
    pub async fn prepare(&self) -> ExportOutcome {
        match self.export().await {
            Ok(artifact) => ExportOutcome::Ready(artifact),
            Err(e) => {
                warn!(source = %self.source.describe(), error = %e, "export failed");
                ExportOutcome::Failed(format!("{EXPORT_FAILURE_PREFIX}{}", reason(&e)))
            }
        }
    }
}

/// Both paths exist and resolve to the same file.
async fn same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn reason(err: &InventoryError) -> String {
    match err {
        InventoryError::DataUnavailable(reason) | InventoryError::Export(reason) => reason.clone(),
        other => other.to_string(),
    }
}
