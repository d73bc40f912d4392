//! The external document store and its offset index.
//!
//! Document bodies live in an append-only CSV record file; the core
//! only remembers each record's starting byte offset and never reads
//! the file during ranking.

pub mod document;
pub mod offsets;

pub use document::DocumentStore;
pub use offsets::DocumentIndex;
