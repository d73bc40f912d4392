//! File-system storage backend rooted at a data directory.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{FolioError, Result};
use crate::storage::Storage;

/// Storage backend persisting files under a root directory.
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `root`, creating the directory
    /// if it does not exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name);
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FolioError::not_found(
                format!("file '{name}' does not exist"),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(name);
        self.ensure_parent(&path)?;

        // Replace atomically so readers never observe a partial file.
        let tmp = self.path_for(&format!("{name}.tmp"));
        {
            let mut file = File::create(&tmp)?;
            file.write_all(data)?;
            file.flush()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn append(&self, name: &str, data: &[u8]) -> Result<u64> {
        let path = self.path_for(name);
        self.ensure_parent(&path)?;

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let offset = file.seek(SeekFrom::End(0))?;
        file.write_all(data)?;
        file.flush()?;
        Ok(offset)
    }

    fn open_at(&self, name: &str, offset: u64) -> Result<Box<dyn Read + Send>> {
        let path = self.path_for(name);
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FolioError::not_found(format!(
                    "file '{name}' does not exist"
                )));
            }
            Err(e) => return Err(e.into()),
        };
        file.seek(SeekFrom::Start(offset))?;
        Ok(Box::new(file))
    }

    fn size(&self, name: &str) -> Result<u64> {
        let path = self.path_for(name);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn file_exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    fn list_files(&self) -> Result<Vec<String>> {
        fn visit(dir: &Path, root: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
            for entry in fs::read_dir(dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_dir() {
                    visit(&path, root, out)?;
                } else if let Ok(rel) = path.strip_prefix(root) {
                    out.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
            Ok(())
        }

        let mut names = Vec::new();
        visit(&self.root, &self.root, &mut names)?;
        names.sort();
        Ok(names)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
