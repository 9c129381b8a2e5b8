//! Key/value storage backing saved sessions.
//!
//! Keys are `/`-separated relative paths such as `sessions/<id>/agent_state`.
//! Values are opaque strings. Failures surface as `std::io::Error`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

pub trait SessionStore {
    fn write(&self, key: &str, value: &str) -> io::Result<()>;

    fn read(&self, key: &str) -> io::Result<String>;

    fn exists(&self, key: &str) -> io::Result<bool>;
}

/// Store that keeps each key as a file below `base_dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Map a key onto a path inside `base_dir`, refusing anything that could escape it.
    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let mut path = self.base_dir.clone();
        for component in key.split('/') {
            if component.is_empty() || component == "." || component == ".." {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid store key '{key}'"),
                ));
            }
            path.push(component);
        }
        Ok(path)
    }
}

impl SessionStore for FileStore {
    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        debug!(path = %path.display(), bytes = value.len(), "writing store key");
        write_atomic(&path, value)
    }

    fn read(&self, key: &str) -> io::Result<String> {
        let path = self.path_for(key)?;
        debug!(path = %path.display(), "reading store key");
        fs::read_to_string(&path)
    }

    fn exists(&self, key: &str) -> io::Result<bool> {
        Ok(self.path_for(key)?.is_file())
    }
}

/// Temp file + rename so readers never observe a partially written value.
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("store path missing parent {}", path.display()),
        )
    })?;
    fs::create_dir_all(parent)?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)
}

/// Process-local store, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> io::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| io::Error::other("memory store lock poisoned"))
    }
}

impl SessionStore for MemoryStore {
    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn read(&self, key: &str) -> io::Result<String> {
        self.entries()?.get(key).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no value for key '{key}'"))
        })
    }

    fn exists(&self, key: &str) -> io::Result<bool> {
        Ok(self.entries()?.contains_key(key))
    }
}
