use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use habitgem_domain::shared::DomainError;
use habitgem_domain::sync::LocalSnapshotStore;

use super::ResultExt;

/// One JSON file per key under a directory.
///
/// Writes go through a temporary file and a rename so a crash never leaves
/// a half-written snapshot behind.
pub struct JsonFileSnapshotStore {
    dir: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).to_cache_err("Create cache directory")?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DomainError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid || key.starts_with('.') {
            return Err(DomainError::InvalidInput(format!(
                "Invalid cache key: {:?}",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl LocalSnapshotStore for JsonFileSnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, DomainError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::LocalCache(format!(
                "Read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, value).to_cache_err("Write cache file")?;
        std::fs::rename(&tmp_path, &path).to_cache_err("Replace cache file")?;

        debug!("Saved local snapshot {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::LocalCache(format!(
                "Remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[derive(Default)]
pub struct InMemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalSnapshotStore for InMemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, DomainError> {
        let entries = self.entries.lock().to_cache_err("Lock snapshot map")?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let mut entries = self.entries.lock().to_cache_err("Lock snapshot map")?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        let mut entries = self.entries.lock().to_cache_err("Lock snapshot map")?;
        entries.remove(key);
        Ok(())
    }
}
