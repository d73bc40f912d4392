//! The lexicon: a bidirectional term-string to term-id mapping with a
//! per-term document-frequency counter.
//!
//! Term-ids are dense, start at 1 and are never recycled; once a term
//! has an id, `resolve` returns the same id forever. The frequency
//! counter counts insertions: the ingest path calls [`Lexicon::resolve`]
//! exactly once per distinct term per document, so the counter equals
//! the number of documents containing the term.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::storage::Storage;

/// Persisted file name for the lexicon.
pub const LEXICON_FILE: &str = "lexicon.json";

/// A lexicon entry: stable term-id plus document frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub id: u64,
    pub frequency: u64,
}

/// Term-string to term-id map.
#[derive(Debug, Default)]
pub struct Lexicon {
    terms: BTreeMap<String, LexiconEntry>,
}

impl Lexicon {
    /// Create an empty lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the lexicon is empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Return the term's id, allocating a fresh one for unseen terms.
    ///
    /// Existing terms get their document frequency incremented; new
    /// terms start at frequency 1 with id `len + 1`. Callers must
    /// invoke this once per distinct term per document.
    pub fn resolve(&mut self, term: &str) -> u64 {
        if let Some(entry) = self.terms.get_mut(term) {
            entry.frequency += 1;
            return entry.id;
        }
        let id = self.terms.len() as u64 + 1;
        self.terms
            .insert(term.to_string(), LexiconEntry { id, frequency: 1 });
        id
    }

    /// Read-only lookup of a term's id. Does not touch the frequency.
    pub fn lookup(&self, term: &str) -> Option<u64> {
        self.terms.get(term).map(|e| e.id)
    }

    /// Read-only lookup of a term's document frequency.
    pub fn document_frequency(&self, term: &str) -> Option<u64> {
        self.terms.get(term).map(|e| e.frequency)
    }

    /// Load the lexicon from storage.
    ///
    /// A missing file yields an empty lexicon (first run); a file that
    /// cannot be parsed is fatal.
    pub fn load(storage: &dyn Storage) -> Result<Self> {
        if !storage.file_exists(LEXICON_FILE) {
            return Ok(Self::new());
        }
        let bytes = storage.read(LEXICON_FILE)?;
        let terms: BTreeMap<String, LexiconEntry> = serde_json::from_slice(&bytes)
            .map_err(|e| FolioError::index(format!("malformed lexicon: {e}")))?;
        Ok(Self { terms })
    }

    /// Persist the lexicon to storage.
    pub fn persist(&self, storage: &dyn Storage) -> Result<()> {
        let bytes = serde_json::to_vec(&self.terms)?;
        storage.write(LEXICON_FILE, &bytes)
    }
}
