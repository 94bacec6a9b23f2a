use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

/// Storage key holding the bearer credential.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the role label.
pub const ROLE_KEY: &str = "rol";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session storage at {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable key-value storage that survives process restarts.
///
/// Only the session store reads or writes it. The multi-key helpers exist so a backend
/// can persist the credential and the role in one write.
pub trait DurableStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        for (k, v) in entries { self.set(k, v)?; }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        for k in keys { self.remove(k)?; }
        Ok(())
    }
}

/// JSON object on disk, rewritten atomically (temp file in the same directory, then rename).
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }

    fn unavailable(&self, source: std::io::Error) -> StorageError {
        StorageError::Unavailable { path: self.path.clone(), source }
    }

    fn read_map(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                if text.trim().is_empty() { return Ok(HashMap::new()); }
                serde_json::from_str(&text)
                    .map_err(|source| StorageError::Malformed { path: self.path.clone(), source })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(self.unavailable(e)),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StorageError> {
        if map.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(self.unavailable(e)),
            };
        }
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.unavailable(e))?;
        let body = serde_json::to_vec_pretty(map)
            .map_err(|source| StorageError::Malformed { path: self.path.clone(), source })?;
        // NamedTempFile is created with mode 0600 on unix
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.unavailable(e))?;
        tmp.write_all(&body).map_err(|e| self.unavailable(e))?;
        tmp.as_file().sync_all().map_err(|e| self.unavailable(e))?;
        tmp.persist(&self.path).map_err(|e| self.unavailable(e.error))?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut HashMap<String, String>)) -> Result<(), StorageError> {
        // a malformed file is replaced wholesale
        let mut map = match self.read_map() {
            Ok(m) => m,
            Err(StorageError::Malformed { .. }) => HashMap::new(),
            Err(e) => return Err(e),
        };
        apply(&mut map);
        self.write_map(&map)
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_many(&[key])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        self.update(|m| {
            for (k, v) in entries { m.insert((*k).to_string(), (*v).to_string()); }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        if !self.path.exists() { return Ok(()); }
        self.update(|m| {
            for k in keys { m.remove(*k); }
        })
    }
}

/// Process-local storage; nothing survives a restart. Used for `--ephemeral` and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { entries: Mutex::new(map) }
    }

    pub fn len(&self) -> usize { self.entries.lock().len() }

    pub fn is_empty(&self) -> bool { self.entries.lock().is_empty() }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
