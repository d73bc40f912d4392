//! Pluggable storage backends for index artifacts and the document store.
//!
//! All persistent state goes through the [`Storage`] trait:
//!
//! - whole-file reads and atomic replace-writes for the JSON artifacts
//!   (lexicon, barrel directory, metadata, barrels, document index),
//! - offset-returning appends and seekable reads for the append-only
//!   document record file.
//!
//! [`MemoryStorage`](memory::MemoryStorage) backs unit tests;
//! [`FileStorage`](file::FileStorage) backs a data directory on disk.

pub mod file;
pub mod memory;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;

/// Storage abstraction over a flat namespace of named files.
///
/// Names may contain `/` separators (e.g. `barrels/barrel_0.json`);
/// backends create intermediate directories as needed.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Read the entire contents of a file.
    ///
    /// Returns [`FolioError::NotFound`](crate::error::FolioError) if the
    /// file does not exist.
    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Replace the contents of a file atomically (write-temp-then-rename).
    fn write(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Append bytes to a file, creating it if missing.
    ///
    /// Returns the byte offset at which the appended data starts.
    fn append(&self, name: &str, data: &[u8]) -> Result<u64>;

    /// Open a file for reading starting at the given byte offset.
    fn open_at(&self, name: &str, offset: u64) -> Result<Box<dyn Read + Send>>;

    /// Current size of a file in bytes.
    ///
    /// Returns 0 for a file that does not exist.
    fn size(&self, name: &str) -> Result<u64>;

    /// Whether a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// List all file names in this storage.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Delete a file. Deleting a missing file is not an error.
    fn delete_file(&self, name: &str) -> Result<()>;
}

/// Configuration selecting a storage backend.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage, discarded on drop.
    Memory,
    /// File storage rooted at a data directory.
    File(PathBuf),
}

/// Factory for creating storage backends from a [`StorageConfig`].
pub struct StorageFactory;

impl StorageFactory {
    /// Create a storage backend.
    pub fn create(config: StorageConfig) -> Result<Arc<dyn Storage>> {
        match config {
            StorageConfig::Memory => Ok(Arc::new(memory::MemoryStorage::new())),
            StorageConfig::File(path) => Ok(Arc::new(file::FileStorage::new(path)?)),
        }
    }
}
