//! The barrel store: sharded on-disk posting lists.
//!
//! Each shard ("barrel") is one JSON file mapping term-id to that
//! term's posting list. Shards are rewritten whole on every append;
//! the size bound enforced at placement time keeps rewrites cheap.
//!
//! Recovery policy: a missing shard file reads as an empty map; a
//! malformed shard file is logged and also reads as an empty map. The
//! second case is destructive and accepted as such.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::warn;

use crate::error::Result;
use crate::index::posting::Posting;
use crate::storage::Storage;

/// A loaded shard: term-id to posting list.
pub type Shard = BTreeMap<u64, Vec<Posting>>;

/// Sharded posting-list storage.
#[derive(Debug)]
pub struct BarrelStore {
    storage: Arc<dyn Storage>,
}

/// File name for a shard.
pub fn shard_file(shard_id: u32) -> String {
    format!("barrels/barrel_{shard_id}.json")
}

impl BarrelStore {
    /// Create a barrel store over the given storage.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Load a whole shard. Missing or malformed files read as empty.
    pub fn load_shard(&self, shard_id: u32) -> Result<Shard> {
        let file = shard_file(shard_id);
        if !self.storage.file_exists(&file) {
            return Ok(Shard::new());
        }
        let bytes = self.storage.read(&file)?;
        match serde_json::from_slice(&bytes) {
            Ok(shard) => Ok(shard),
            Err(e) => {
                warn!("discarding malformed shard {file}: {e}");
                Ok(Shard::new())
            }
        }
    }

    /// Append one posting to a term's list in the given shard.
    pub fn append_posting(&self, shard_id: u32, term_id: u64, posting: Posting) -> Result<()> {
        let mut shard = self.load_shard(shard_id)?;
        shard.entry(term_id).or_default().push(posting);

        let bytes = serde_json::to_vec(&shard)?;
        self.storage.write(&shard_file(shard_id), &bytes)
    }

    /// Load the posting list for one term. Empty when the shard or the
    /// term is absent.
    pub fn load_postings(&self, shard_id: u32, term_id: u64) -> Result<Vec<Posting>> {
        let mut shard = self.load_shard(shard_id)?;
        Ok(shard.remove(&term_id).unwrap_or_default())
    }

    /// Current serialized size of a shard in bytes (0 when absent).
    pub fn shard_size(&self, shard_id: u32) -> Result<u64> {
        self.storage.size(&shard_file(shard_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn make_store() -> BarrelStore {
        BarrelStore::new(Arc::new(MemoryStorage::new()))
    }

    fn posting(doc_id: &str) -> Posting {
        Posting {
            doc_id: doc_id.to_string(),
            frequency: [1, 0, 0],
            positions: vec![0],
            length: 1,
        }
    }

    #[test]
    fn test_missing_shard_reads_empty() {
        let store = make_store();

        assert!(store.load_shard(0).unwrap().is_empty());
        assert!(store.load_postings(0, 1).unwrap().is_empty());
        assert_eq!(store.shard_size(0).unwrap(), 0);
    }

    #[test]
    fn test_append_and_load() {
        let store = make_store();

        store.append_posting(0, 1, posting("doc_a")).unwrap();
        store.append_posting(0, 1, posting("doc_b")).unwrap();
        store.append_posting(0, 2, posting("doc_a")).unwrap();

        let postings = store.load_postings(0, 1).unwrap();
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].doc_id, "doc_a");
        assert_eq!(postings[1].doc_id, "doc_b");

        assert_eq!(store.load_postings(0, 2).unwrap().len(), 1);
        assert!(store.load_postings(0, 99).unwrap().is_empty());
    }

    #[test]
    fn test_shards_are_disjoint_files() {
        let store = make_store();

        store.append_posting(0, 1, posting("doc_a")).unwrap();
        store.append_posting(1, 2, posting("doc_b")).unwrap();

        assert!(store.load_postings(0, 2).unwrap().is_empty());
        assert_eq!(store.load_postings(1, 2).unwrap().len(), 1);
        assert!(store.shard_size(0).unwrap() > 0);
        assert!(store.shard_size(1).unwrap() > 0);
    }

    #[test]
    fn test_malformed_shard_recovers_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.write(&shard_file(0), b"{ truncated").unwrap();

        let store = BarrelStore::new(storage);
        assert!(store.load_shard(0).unwrap().is_empty());

        // Appending over a malformed shard replaces it.
        store.append_posting(0, 1, posting("doc_a")).unwrap();
        assert_eq!(store.load_postings(0, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_term_id_keys_serialize_as_decimal_strings() {
        let storage = Arc::new(MemoryStorage::new());
        let store = BarrelStore::new(storage.clone());

        store.append_posting(0, 42, posting("doc_a")).unwrap();

        let raw = storage.read(&shard_file(0)).unwrap();
        let text = String::from_utf8(raw).unwrap();
        assert!(text.contains("\"42\""));
    }
}
