//! # Folio
//!
//! An incremental full-text search engine for scholarly documents.
//!
//! ## Features
//!
//! - Sharded on-disk inverted index ("barrels") with deterministic,
//!   size-bounded term placement
//! - BM25 ranking over section-weighted frequencies (title, abstract,
//!   keywords)
//! - Positional proximity boost with a title-window bonus
//! - Incremental ingest that keeps lexicon, barrels, counters and the
//!   document index mutually consistent
//! - Pluggable storage backends (memory, file)

// Core modules
pub mod analysis;
mod config;
mod data;
mod engine;
mod error;
pub mod index;
pub mod search;
pub mod storage;
pub mod store;

// Re-exports for the public API
pub use analysis::{Preprocessor, StandardPreprocessor};
#[cfg(feature = "remote-preprocess")]
pub use analysis::HttpPreprocessor;
pub use config::{DEFAULT_MAX_BARREL_BYTES, DEFAULT_TOP_K, EngineConfig, EngineConfigBuilder};
pub use data::{ClientDocument, PreprocessedDocument, StoredDocument};
pub use engine::{Engine, SearchHit, SearchResponse};
pub use error::{FolioError, Result};
pub use search::ScoredDocument;
pub use storage::{Storage, StorageConfig, StorageFactory};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
