use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::{ports::outbound::LocalStore, LocalStoreError};

/// String key-value pairs persisted as one JSON object on disk.
///
/// A missing file reads as empty; the file and its parent directories are
/// created on first write. A file that no longer parses is replaced by the
/// next write.
pub struct FileLocalStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileLocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<data dir>/avatar-store/local_store.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("avatar-store").join("local_store.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, LocalStoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), LocalStoreError> {
        let content = serde_json::to_string_pretty(values)?;
        write_private_file(&self.path, &content)?;
        Ok(())
    }
}

/// Replaces `path` with `content` through a temp file in the same directory,
/// so readers see either the old or the new file. Owner-only on unix.
pub fn write_private_file(path: &Path, content: &str) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut file = tempfile::NamedTempFile::new_in(parent)?;
    file.write_all(content.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;

    Ok(())
}

impl LocalStore for FileLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        let _guard = self.lock.lock().map_err(|_| LocalStoreError::Poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let _guard = self.lock.lock().map_err(|_| LocalStoreError::Poisoned)?;
        let mut values = match self.load() {
            Ok(values) => values,
            Err(LocalStoreError::Corrupt(err)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "discarding unreadable local store"
                );
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }
}
