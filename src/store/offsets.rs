//! The document index: doc-id to byte offset in the document store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::storage::Storage;

/// Persisted file name for the document index.
pub const DOCUMENT_INDEX_FILE: &str = "document_index.json";

/// Map from document id to the byte offset of its stored record.
///
/// The offset is opaque to the core; each ingested document has exactly
/// one entry, written before the ingest is acknowledged.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DocumentIndex {
    offsets: BTreeMap<String, u64>,
}

impl DocumentIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Record the offset for a document.
    pub fn insert(&mut self, doc_id: impl Into<String>, offset: u64) {
        self.offsets.insert(doc_id.into(), offset);
    }

    /// Look up a document's offset.
    pub fn get(&self, doc_id: &str) -> Option<u64> {
        self.offsets.get(doc_id).copied()
    }

    /// Whether a document is indexed.
    pub fn contains(&self, doc_id: &str) -> bool {
        self.offsets.contains_key(doc_id)
    }

    /// Load the index from storage.
    ///
    /// A missing file yields an empty index; a malformed file is fatal.
    pub fn load(storage: &dyn Storage) -> Result<Self> {
        if !storage.file_exists(DOCUMENT_INDEX_FILE) {
            return Ok(Self::new());
        }
        let bytes = storage.read(DOCUMENT_INDEX_FILE)?;
        let offsets = serde_json::from_slice(&bytes)
            .map_err(|e| FolioError::index(format!("malformed document index: {e}")))?;
        Ok(Self { offsets })
    }

    /// Persist the index to storage.
    pub fn persist(&self, storage: &dyn Storage) -> Result<()> {
        let bytes = serde_json::to_vec(&self.offsets)?;
        storage.write(DOCUMENT_INDEX_FILE, &bytes)
    }
}
