//! The barrel directory: term-id to shard-id routing.
//!
//! New terms go into the most recently created shard until its
//! serialized size reaches the configured bound, at which point the
//! next placement allocates a fresh shard. Assignments are append-only:
//! a term never migrates, even when its shard later outgrows the bound.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{FolioError, Result};
use crate::index::barrel::BarrelStore;
use crate::storage::Storage;

/// Persisted file name for the directory assignments.
pub const DIRECTORY_FILE: &str = "barrel_metadata.json";

/// Routing table from term-id to owning shard.
#[derive(Debug, Default)]
pub struct BarrelDirectory {
    assignments: BTreeMap<u64, u32>,
    last_shard: u32,
}

impl BarrelDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest-numbered shard ever created.
    pub fn last_shard(&self) -> u32 {
        self.last_shard
    }

    /// Number of routed terms.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The shard a term is assigned to, if any.
    pub fn shard_of(&self, term_id: u64) -> Option<u32> {
        self.assignments.get(&term_id).copied()
    }

    /// Resolve the owning shard for a term, assigning one if needed.
    ///
    /// A new term lands in `last_shard` unless that shard's current
    /// on-disk size has reached `max_barrel_bytes`, in which case the
    /// next shard is opened and becomes `last_shard`.
    pub fn place(
        &mut self,
        term_id: u64,
        barrels: &BarrelStore,
        max_barrel_bytes: u64,
    ) -> Result<u32> {
        if let Some(shard_id) = self.shard_of(term_id) {
            return Ok(shard_id);
        }

        if barrels.shard_size(self.last_shard)? >= max_barrel_bytes {
            self.last_shard += 1;
            debug!("barrel overflow, opening shard {}", self.last_shard);
        }

        self.assignments.insert(term_id, self.last_shard);
        Ok(self.last_shard)
    }

    /// Load the directory from storage.
    ///
    /// `last_shard` is not part of this artifact; it lives in the
    /// corpus metadata and is passed in by the caller. A missing file
    /// yields an empty directory; a malformed file is fatal.
    pub fn load(storage: &dyn Storage, last_shard: u32) -> Result<Self> {
        let assignments = if storage.file_exists(DIRECTORY_FILE) {
            let bytes = storage.read(DIRECTORY_FILE)?;
            serde_json::from_slice(&bytes)
                .map_err(|e| FolioError::index(format!("malformed barrel directory: {e}")))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            assignments,
            last_shard,
        })
    }

    /// Persist the assignments to storage.
    pub fn persist(&self, storage: &dyn Storage) -> Result<()> {
        let bytes = serde_json::to_vec(&self.assignments)?;
        storage.write(DIRECTORY_FILE, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::posting::Posting;
    use crate::storage::memory::MemoryStorage;
    use std::sync::Arc;

    fn make_barrels() -> BarrelStore {
        BarrelStore::new(Arc::new(MemoryStorage::new()))
    }

    fn posting() -> Posting {
        Posting {
            doc_id: "doc_a".to_string(),
            frequency: [1, 0, 0],
            positions: vec![0],
            length: 1,
        }
    }

    #[test]
    fn test_place_is_stable() {
        let barrels = make_barrels();
        let mut directory = BarrelDirectory::new();

        let shard = directory.place(1, &barrels, 1024).unwrap();
        assert_eq!(shard, 0);
        assert_eq!(directory.place(1, &barrels, 1024).unwrap(), shard);
        assert_eq!(directory.shard_of(1), Some(shard));
    }

    #[test]
    fn test_overflow_opens_new_shard() {
        let barrels = make_barrels();
        let mut directory = BarrelDirectory::new();

        // First term lands in shard 0; grow it past a tiny bound.
        let shard = directory.place(1, &barrels, 1).unwrap();
        assert_eq!(shard, 0);
        barrels.append_posting(shard, 1, posting()).unwrap();

        // Next new term must open shard 1.
        let shard = directory.place(2, &barrels, 1).unwrap();
        assert_eq!(shard, 1);
        assert_eq!(directory.last_shard(), 1);

        // The old term stays put even though its shard is over-bound.
        assert_eq!(directory.place(1, &barrels, 1).unwrap(), 0);
    }

    #[test]
    fn test_persist_and_load() {
        let storage = MemoryStorage::new();
        let barrels = make_barrels();
        let mut directory = BarrelDirectory::new();

        directory.place(1, &barrels, 1024).unwrap();
        directory.place(2, &barrels, 1024).unwrap();
        directory.persist(&storage).unwrap();

        let reloaded = BarrelDirectory::load(&storage, directory.last_shard()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.shard_of(1), Some(0));
        assert_eq!(reloaded.shard_of(2), Some(0));
        assert_eq!(reloaded.last_shard(), 0);
    }

    #[test]
    fn test_load_malformed_is_fatal() {
        let storage = MemoryStorage::new();
        storage.write(DIRECTORY_FILE, b"[oops").unwrap();

        assert!(BarrelDirectory::load(&storage, 0).is_err());
    }
}
