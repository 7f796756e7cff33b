//! Persistence for the loader's cache blob.
//!
//! Storage is optional: when it is missing or failing, the loader keeps
//! working from memory and only logs.

use std::fmt::Debug;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key (or file stem) the cache blob is stored under.
pub const CACHE_STORAGE_KEY: &str = "translation-cache";

/// Where the serialized cache map lives between runs.
pub trait CacheStorage: Send + Sync + Debug {
    /// Whether the backend can be used at all. Callers skip storage otherwise.
    fn is_available(&self) -> bool {
        true
    }

    /// The stored blob, or `Ok(None)` if nothing was stored yet.
    fn load(&self) -> io::Result<Option<String>>;

    fn save(&self, blob: &str) -> io::Result<()>;

    fn remove(&self) -> io::Result<()>;
}

/// Blob in a JSON file on disk.
///
/// Reads and writes use blocking `std::fs`. The blob is small and the loader
/// persists it right after each cache write, before returning to the caller.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/translation-cache.json`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir.into().join(format!("{CACHE_STORAGE_KEY}.json")))
    }
}

impl CacheStorage for FileStorage {
    fn is_available(&self) -> bool {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.is_dir(),
            _ => true,
        }
    }

    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, blob: &str) -> io::Result<()> {
        std::fs::write(&self.path, blob)
    }

    fn remove(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Blob held in memory; survives loader instances that share it.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.blob.lock().map(|blob| blob.clone()).unwrap_or(None)
    }
}

impl CacheStorage for MemoryStorage {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn save(&self, blob: &str) -> io::Result<()> {
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory storage poisoned"))?;
        *guard = Some(blob.to_string());
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory storage poisoned"))?;
        *guard = None;
        Ok(())
    }
}

/// No persistence at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
    fn is_available(&self) -> bool {
        false
    }

    fn load(&self) -> io::Result<Option<String>> {
        Ok(None)
    }

    fn save(&self, _blob: &str) -> io::Result<()> {
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        Ok(())
    }
}
