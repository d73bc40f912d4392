//! The engine: owns the lexicon, barrel directory, corpus metadata and
//! document index, and funnels every mutation through the ingest
//! coordinator.
//!
//! Ingest follows a strict step order: preprocess, tokenize, extract
//! postings, mint a document id, persist the document record, update
//! the document index, append barrel postings, bump corpus counters,
//! persist all artifacts. A preprocessor failure aborts before any
//! state is touched. A crash between the document append and the final
//! persist can leave a stored record without an index entry; a recovery
//! pass rescanning the record file could rebuild the index, but the
//! core does not provide one.
//!
//! Mutations are single-writer behind a [`parking_lot::RwLock`];
//! queries take the read side and may run concurrently with each other.

use std::sync::Arc;

use log::info;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::analysis::{Preprocessor, StandardPreprocessor};
use crate::config::EngineConfig;
use crate::data::{ClientDocument, StoredDocument};
use crate::error::Result;
use crate::index::barrel::BarrelStore;
use crate::index::directory::BarrelDirectory;
use crate::index::lexicon::Lexicon;
use crate::index::metadata::CorpusMetadata;
use crate::index::posting::{Posting, extract_postings};
use crate::search::{ScoredDocument, rank, translate_query};
use crate::storage::Storage;
use crate::store::document::DocumentStore;
use crate::store::offsets::DocumentIndex;

/// One search result: ranked document id with its score and, when the
/// record could be fetched, the stored document for presentation.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
    pub document: Option<StoredDocument>,
}

/// Response of [`Engine::search`].
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub count: usize,
}

/// Mutable engine state, guarded by one lock.
#[derive(Debug)]
struct EngineState {
    lexicon: Lexicon,
    directory: BarrelDirectory,
    metadata: CorpusMetadata,
    doc_index: DocumentIndex,
}

impl EngineState {
    fn load(storage: &dyn Storage) -> Result<Self> {
        let metadata = CorpusMetadata::load(storage)?;
        let directory = BarrelDirectory::load(storage, metadata.last_shard)?;
        let lexicon = Lexicon::load(storage)?;
        let doc_index = DocumentIndex::load(storage)?;
        Ok(Self {
            lexicon,
            directory,
            metadata,
            doc_index,
        })
    }

    fn persist(&self, storage: &dyn Storage) -> Result<()> {
        self.lexicon.persist(storage)?;
        self.directory.persist(storage)?;
        self.metadata.persist(storage)?;
        self.doc_index.persist(storage)
    }
}

/// A document search engine over one data directory.
pub struct Engine {
    config: EngineConfig,
    storage: Arc<dyn Storage>,
    preprocessor: Arc<dyn Preprocessor>,
    barrels: BarrelStore,
    doc_store: DocumentStore,
    state: RwLock<EngineState>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("preprocessor", &self.preprocessor.name())
            .finish()
    }
}

impl Engine {
    /// Open an engine over the given storage, loading any persisted
    /// state.
    ///
    /// The preprocessor is taken from the configuration; without one,
    /// the inline [`StandardPreprocessor`] is used.
    pub fn new(storage: Arc<dyn Storage>, config: EngineConfig) -> Result<Self> {
        let preprocessor = match &config.preprocessor {
            Some(p) => p.clone(),
            None => Self::default_preprocessor(&config),
        };

        let state = EngineState::load(storage.as_ref())?;
        info!(
            "engine opened: {} terms, {} documents",
            state.lexicon.len(),
            state.metadata.doc_count
        );

        Ok(Self {
            config,
            barrels: BarrelStore::new(storage.clone()),
            doc_store: DocumentStore::new(storage.clone()),
            storage,
            preprocessor,
            state: RwLock::new(state),
        })
    }

    #[cfg(feature = "remote-preprocess")]
    fn default_preprocessor(config: &EngineConfig) -> Arc<dyn Preprocessor> {
        match &config.preprocessor_url {
            Some(url) => Arc::new(crate::analysis::HttpPreprocessor::new(url.clone())),
            None => Arc::new(StandardPreprocessor::new()),
        }
    }

    #[cfg(not(feature = "remote-preprocess"))]
    fn default_preprocessor(_config: &EngineConfig) -> Arc<dyn Preprocessor> {
        Arc::new(StandardPreprocessor::new())
    }

    /// Ingest one document. Returns the minted document id; `Ok` is
    /// the acknowledgement.
    pub fn add(&self, doc: ClientDocument) -> Result<String> {
        // Preprocess before taking the write lock: a failure here is a
        // client error and must leave no trace in the engine.
        let preprocessed = self.preprocessor.preprocess(&doc)?;

        let mut state = self.state.write();

        let extracted = extract_postings(&mut state.lexicon, &preprocessed);

        let doc_id = format!("doc_{}", Uuid::new_v4());

        let stored = StoredDocument::from_client(doc_id.as_str(), &doc);
        let offset = self.doc_store.append(&stored)?;
        state.doc_index.insert(doc_id.as_str(), offset);

        for (term_id, occurrences) in extracted.terms {
            let shard_id =
                state
                    .directory
                    .place(term_id, &self.barrels, self.config.max_barrel_bytes)?;
            let posting = Posting {
                doc_id: doc_id.clone(),
                frequency: occurrences.frequency,
                positions: occurrences.positions,
                length: extracted.length,
            };
            self.barrels.append_posting(shard_id, term_id, posting)?;
        }

        state.metadata.record_document(extracted.length);
        state.metadata.last_shard = state.directory.last_shard();

        state.persist(self.storage.as_ref())?;

        Ok(doc_id)
    }

    /// Run a ranked keyword query.
    ///
    /// Unknown terms are dropped; a query with no translated terms, or
    /// an empty corpus, returns an empty result rather than an error.
    /// Results are truncated to the configured `top_k` and each hit
    /// carries its stored document when the record can be fetched.
    pub fn search(&self, query: &str) -> Result<SearchResponse> {
        let state = self.state.read();

        let terms = translate_query(&state.lexicon, query);
        if terms.is_empty() || state.metadata.doc_count == 0 || state.metadata.avg_length == 0.0 {
            return Ok(SearchResponse {
                query: query.to_string(),
                results: Vec::new(),
                count: 0,
            });
        }

        let mut ranked = rank(&terms, &state.metadata, &state.directory, &self.barrels)?;
        ranked.truncate(self.config.top_k);

        let doc_ids: Vec<String> = ranked.iter().map(|d| d.doc_id.clone()).collect();
        let documents = self.doc_store.fetch(&doc_ids, &state.doc_index)?;

        let results: Vec<SearchHit> = ranked
            .into_iter()
            .zip(documents)
            .map(|(scored, document)| SearchHit {
                doc_id: scored.doc_id,
                score: scored.score,
                document,
            })
            .collect();

        let count = results.len();
        Ok(SearchResponse {
            query: query.to_string(),
            results,
            count,
        })
    }

    /// Rank without fetching documents; returns the full ranked list.
    pub fn rank_only(&self, query: &str) -> Result<Vec<ScoredDocument>> {
        let state = self.state.read();

        let terms = translate_query(&state.lexicon, query);
        if terms.is_empty() || state.metadata.doc_count == 0 || state.metadata.avg_length == 0.0 {
            return Ok(Vec::new());
        }

        rank(&terms, &state.metadata, &state.directory, &self.barrels)
    }

    /// Flush all in-memory artifacts to storage.
    pub fn persist(&self) -> Result<()> {
        let state = self.state.read();
        state.persist(self.storage.as_ref())?;
        info!("engine state persisted");
        Ok(())
    }

    /// Reinitialize all in-memory state from storage, discarding any
    /// unpersisted changes.
    pub fn reload(&self) -> Result<()> {
        let mut state = self.state.write();
        *state = EngineState::load(self.storage.as_ref())?;
        info!(
            "engine reloaded: {} terms, {} documents",
            state.lexicon.len(),
            state.metadata.doc_count
        );
        Ok(())
    }

    /// Snapshot of the corpus counters.
    pub fn stats(&self) -> CorpusMetadata {
        self.state.read().metadata.clone()
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FolioError;
    use crate::storage::memory::MemoryStorage;

    fn make_engine() -> Engine {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        Engine::new(storage, EngineConfig::default()).unwrap()
    }

    fn make_engine_with(config: EngineConfig) -> Engine {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        Engine::new(storage, config).unwrap()
    }

    #[test]
    fn test_add_returns_prefixed_id() {
        let engine = make_engine();
        let doc_id = engine
            .add(ClientDocument::new("hello world", "", ""))
            .unwrap();

        assert!(doc_id.starts_with("doc_"));
        assert_eq!(engine.stats().doc_count, 1);
        assert_eq!(engine.stats().total_length, 2);
    }

    #[test]
    fn test_search_empty_engine() {
        let engine = make_engine();
        let response = engine.search("anything").unwrap();

        assert_eq!(response.count, 0);
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_search_unknown_query_is_empty() {
        let engine = make_engine();
        engine
            .add(ClientDocument::new("alpha beta", "", ""))
            .unwrap();

        let response = engine.search("zzz").unwrap();
        assert_eq!(response.count, 0);
    }

    #[test]
    fn test_search_returns_document() {
        let engine = make_engine();
        let doc_id = engine
            .add(ClientDocument::new("rust search engine", "an abstract", "rust"))
            .unwrap();

        let response = engine.search("rust").unwrap();
        assert_eq!(response.count, 1);

        let hit = &response.results[0];
        assert_eq!(hit.doc_id, doc_id);
        assert!(hit.score > 0.0);

        let document = hit.document.as_ref().unwrap();
        assert_eq!(document.title, "rust search engine");
    }

    #[test]
    fn test_search_truncates_to_top_k() {
        let engine = make_engine_with(EngineConfig::builder().top_k(2).build());

        for i in 0..5 {
            engine
                .add(ClientDocument::new(format!("shared term {i}"), "", ""))
                .unwrap();
        }

        let response = engine.search("shared").unwrap();
        assert_eq!(response.count, 2);

        // The full ranked list is still available without truncation.
        assert_eq!(engine.rank_only("shared").unwrap().len(), 5);
    }

    #[test]
    fn test_unknown_terms_dropped_from_query() {
        let engine = make_engine();
        engine.add(ClientDocument::new("alpha", "", "")).unwrap();

        let with_noise = engine.search("alpha zzz").unwrap();
        let clean = engine.search("alpha").unwrap();

        assert_eq!(with_noise.count, clean.count);
        assert_eq!(
            with_noise.results[0].score,
            clean.results[0].score
        );
    }

    #[test]
    fn test_preprocessor_failure_mutates_nothing() {
        #[derive(Debug)]
        struct FailingPreprocessor;

        impl Preprocessor for FailingPreprocessor {
            fn name(&self) -> &str {
                "failing"
            }

            fn preprocess(
                &self,
                _doc: &ClientDocument,
            ) -> Result<crate::data::PreprocessedDocument> {
                Err(FolioError::preprocess("service rejected the document"))
            }
        }

        let config = EngineConfig::builder()
            .preprocessor(Arc::new(FailingPreprocessor))
            .build();
        let engine = make_engine_with(config);

        let result = engine.add(ClientDocument::new("hello", "", ""));
        assert!(matches!(result, Err(FolioError::Preprocess(_))));
        assert_eq!(engine.stats().doc_count, 0);
    }

    #[test]
    fn test_reload_discards_unpersisted_state() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let engine = Engine::new(storage.clone(), EngineConfig::default()).unwrap();

        engine.add(ClientDocument::new("hello", "", "")).unwrap();
        assert_eq!(engine.stats().doc_count, 1);

        // Ingest persists as its final step, so a reload sees the
        // same state.
        engine.reload().unwrap();
        assert_eq!(engine.stats().doc_count, 1);
        assert_eq!(engine.search("hello").unwrap().count, 1);
    }
}
