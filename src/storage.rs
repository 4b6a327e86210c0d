//! Object storage boundary.
//!
//! The gate itself never touches storage. Orchestration reads the schema and raw input and writes
//! partitions, quarantine and summary through an [`ObjectStore`], addressing objects by
//! `/`-separated logical names such as `clean/cdi/year=1995/cdi_clean_year_1995.csv`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use walkdir::WalkDir;

use crate::error::{GateError, GateResult};

/// Read/write access to named byte streams.
pub trait ObjectStore: Send + Sync {
    /// Read the full contents of `name`.
    fn read(&self, name: &str) -> GateResult<Vec<u8>>;

    /// Create or replace `name` with `bytes`.
    fn write(&self, name: &str, bytes: &[u8]) -> GateResult<()>;

    /// List object names that start with `prefix`, in ascending order.
    fn list(&self, prefix: &str) -> GateResult<Vec<String>>;
}

/// Stores objects as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`. The directory is created lazily on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> GateResult<PathBuf> {
        if name.split('/').any(|seg| seg == "..") || name.starts_with('/') {
            return Err(GateError::Config {
                message: format!("object name '{name}' escapes the store root"),
            });
        }
        Ok(self.root.join(name))
    }
}

impl ObjectStore for LocalStore {
    fn read(&self, name: &str) -> GateResult<Vec<u8>> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(GateError::ObjectNotFound {
                name: name.to_string(),
            });
        }
        Ok(fs::read(path)?)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> GateResult<()> {
        let path = self.path_for(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    fn list(&self, prefix: &str) -> GateResult<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|e| GateError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if name.starts_with(prefix) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Keeps objects in memory. Useful for tests and for embedding the gate in another service.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all stored objects, ascending.
    pub fn names(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn poisoned() -> GateError {
        GateError::Io(std::io::Error::other("memory store mutex poisoned"))
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("objects_len", &self.names().len())
            .finish()
    }
}

impl ObjectStore for MemoryStore {
    fn read(&self, name: &str) -> GateResult<Vec<u8>> {
        let objects = self.objects.lock().map_err(|_| Self::poisoned())?;
        objects
            .get(name)
            .cloned()
            .ok_or_else(|| GateError::ObjectNotFound {
                name: name.to_string(),
            })
    }

    fn write(&self, name: &str, bytes: &[u8]) -> GateResult<()> {
        let mut objects = self.objects.lock().map_err(|_| Self::poisoned())?;
        objects.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn list(&self, prefix: &str) -> GateResult<Vec<String>> {
        let objects = self.objects.lock().map_err(|_| Self::poisoned())?;
        Ok(objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
