//! In-memory storage backend for tests and ephemeral indexes.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use parking_lot::RwLock;

use crate::error::{FolioError, Result};
use crate::storage::Storage;

/// Storage backend keeping all files in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.files
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| FolioError::not_found(format!("file '{name}' does not exist")))
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        self.files.write().insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn append(&self, name: &str, data: &[u8]) -> Result<u64> {
        let mut files = self.files.write();
        let buf = files.entry(name.to_string()).or_default();
        let offset = buf.len() as u64;
        buf.extend_from_slice(data);
        Ok(offset)
    }

    fn open_at(&self, name: &str, offset: u64) -> Result<Box<dyn Read + Send>> {
        let files = self.files.read();
        let buf = files
            .get(name)
            .ok_or_else(|| FolioError::not_found(format!("file '{name}' does not exist")))?;
        if offset > buf.len() as u64 {
            return Err(FolioError::invalid_argument(format!(
                "offset {offset} is past the end of '{name}'"
            )));
        }
        let tail = buf[offset as usize..].to_vec();
        Ok(Box::new(Cursor::new(tail)))
    }

    fn size(&self, name: &str) -> Result<u64> {
        Ok(self.files.read().get(name).map_or(0, |b| b.len() as u64))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.read().contains_key(name)
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.files.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.files.write().remove(name);
        Ok(())
    }
}
