//! Corpus-level counters: document count, summed token length, derived
//! average length, and the last allocated shard.

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::storage::Storage;

/// Persisted file name for the corpus metadata.
pub const METADATA_FILE: &str = "metadata.json";

/// Global corpus counters.
///
/// `avg_length` is derived from the two counters and recomputed on
/// every ingest; it is 0.0 while the corpus is empty, and ranking is
/// never invoked in that state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusMetadata {
    pub doc_count: u64,
    pub total_length: u64,
    pub avg_length: f64,
    pub last_shard: u32,
}

impl CorpusMetadata {
    /// Create zeroed metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one ingested document of the given token length.
    pub fn record_document(&mut self, length: u32) {
        self.doc_count += 1;
        self.total_length += length as u64;
        self.avg_length = self.total_length as f64 / self.doc_count as f64;
    }

    /// Load metadata from storage.
    ///
    /// Missing file yields zeroed counters (first run); a malformed
    /// file is fatal.
    pub fn load(storage: &dyn Storage) -> Result<Self> {
        if !storage.file_exists(METADATA_FILE) {
            return Ok(Self::new());
        }
        let bytes = storage.read(METADATA_FILE)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| FolioError::index(format!("malformed corpus metadata: {e}")))
    }

    /// Persist metadata to storage.
    pub fn persist(&self, storage: &dyn Storage) -> Result<()> {
        let bytes = serde_json::to_vec(self)?;
        storage.write(METADATA_FILE, &bytes)
    }
}
