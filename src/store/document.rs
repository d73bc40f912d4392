//! Append-only CSV document store.
//!
//! One record per ingested document, in the column order fixed by
//! [`StoredDocument`](crate::data::StoredDocument). The store is
//! random-access on read: fetching seeks to a recorded byte offset and
//! parses exactly one record.

use std::sync::Arc;

use crate::data::StoredDocument;
use crate::error::{FolioError, Result};
use crate::storage::Storage;
use crate::store::offsets::DocumentIndex;

/// File name of the document record file.
pub const DOCUMENTS_FILE: &str = "documents.csv";

/// The append-only document record store.
#[derive(Debug)]
pub struct DocumentStore {
    storage: Arc<dyn Storage>,
}

impl DocumentStore {
    /// Create a document store over the given storage.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Append one record, returning the byte offset it starts at.
    pub fn append(&self, doc: &StoredDocument) -> Result<u64> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(doc)?;
        writer.flush()?;
        let record = writer
            .into_inner()
            .map_err(|e| FolioError::internal(format!("csv buffer error: {e}")))?;

        self.storage.append(DOCUMENTS_FILE, &record)
    }

    /// Fetch documents by id, preserving caller order.
    ///
    /// Ids without an index entry (or whose offset points past the end
    /// of the record file) yield `None` holes at their position.
    pub fn fetch(&self, doc_ids: &[String], index: &DocumentIndex) -> Result<Vec<Option<StoredDocument>>> {
        let mut results = Vec::with_capacity(doc_ids.len());

        for doc_id in doc_ids {
            let Some(offset) = index.get(doc_id) else {
                results.push(None);
                continue;
            };
            results.push(self.read_record(offset)?);
        }

        Ok(results)
    }

    /// Read the single record starting at `offset`.
    fn read_record(&self, offset: u64) -> Result<Option<StoredDocument>> {
        let reader = match self.storage.open_at(DOCUMENTS_FILE, offset) {
            Ok(r) => r,
            Err(FolioError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(reader);

        match csv_reader.deserialize::<StoredDocument>().next() {
            Some(Ok(doc)) => Ok(Some(doc)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ClientDocument;
    use crate::storage::memory::MemoryStorage;

    fn make_store() -> DocumentStore {
        DocumentStore::new(Arc::new(MemoryStorage::new()))
    }

    fn stored(doc_id: &str, title: &str) -> StoredDocument {
        StoredDocument::from_client(doc_id, &ClientDocument::new(title, "an abstract", "kw"))
    }

    #[test]
    fn test_append_returns_start_offset() {
        let store = make_store();

        let off1 = store.append(&stored("doc_a", "first")).unwrap();
        let off2 = store.append(&stored("doc_b", "second")).unwrap();

        assert_eq!(off1, 0);
        assert!(off2 > off1);
    }

    #[test]
    fn test_fetch_roundtrip() {
        let store = make_store();
        let mut index = DocumentIndex::new();

        let a = stored("doc_a", "first paper");
        let b = stored("doc_b", "second paper");
        index.insert("doc_a", store.append(&a).unwrap());
        index.insert("doc_b", store.append(&b).unwrap());

        let ids = vec!["doc_b".to_string(), "doc_a".to_string()];
        let docs = store.fetch(&ids, &index).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].as_ref().unwrap(), &b);
        assert_eq!(docs[1].as_ref().unwrap(), &a);
    }

    #[test]
    fn test_fetch_preserves_holes() {
        let store = make_store();
        let mut index = DocumentIndex::new();

        let a = stored("doc_a", "only paper");
        index.insert("doc_a", store.append(&a).unwrap());

        let ids = vec![
            "doc_missing".to_string(),
            "doc_a".to_string(),
            "doc_gone".to_string(),
        ];
        let docs = store.fetch(&ids, &index).unwrap();

        assert!(docs[0].is_none());
        assert_eq!(docs[1].as_ref().unwrap().doc_id, "doc_a");
        assert!(docs[2].is_none());
    }

    #[test]
    fn test_fields_with_commas_survive() {
        let store = make_store();
        let mut index = DocumentIndex::new();

        let doc = StoredDocument::from_client(
            "doc_a",
            &ClientDocument::new("a title, with comma", "line\nbreak", "k1, k2")
                .authors("Last, First; Other, Author"),
        );
        index.insert("doc_a", store.append(&doc).unwrap());

        let fetched = store
            .fetch(&["doc_a".to_string()], &index)
            .unwrap()
            .remove(0)
            .unwrap();
        assert_eq!(fetched, doc);
    }
}
