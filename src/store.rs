//! Local key-value persistence of the workspace slices.
//!
//! Each slice is one JSON document. Loading never fails: a missing or unreadable
//! slice yields the caller's default. Saving never panics: failures are logged and
//! reported as `false`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

/// The only keys ever written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    ExchangeRate,
    LineItems,
    History,
    Settings,
    Theme,
}

impl StoreKey {
    #[cfg(test)]
    pub const ALL: [StoreKey; 5] = [
        StoreKey::ExchangeRate,
        StoreKey::LineItems,
        StoreKey::History,
        StoreKey::Settings,
        StoreKey::Theme,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            StoreKey::ExchangeRate => "exchange_rate",
            StoreKey::LineItems => "line_items",
            StoreKey::History => "history",
            StoreKey::Settings => "settings",
            StoreKey::Theme => "theme",
        }
    }
}

pub trait KeyValueStore {
    fn read(&self, key: StoreKey) -> io::Result<Option<String>>;
    fn write(&self, key: StoreKey, value: &str) -> io::Result<()>;
}

pub fn load<T, S>(store: &S, key: StoreKey, default: T) -> T
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default,
        Err(e) => {
            warn!("Failed to read '{}', using default: {}", key.name(), e);
            return default;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Stored '{}' is malformed, using default: {}", key.name(), e);
            default
        }
    }
}

pub fn save<T, S>(store: &S, key: StoreKey, value: &T) -> bool
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize '{}': {}", key.name(), e);
            return false;
        }
    };

    match store.write(key, &json) {
        Ok(()) => {
            debug!("Saved '{}' ({} bytes)", key.name(), json.len());
            true
        }
        Err(e) => {
            error!("Failed to save '{}': {}", key.name(), e);
            false
        }
    }
}

// ==========================================
// File backend
// ==========================================

/// One `<key>.json` file per slice inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.name()))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: StoreKey) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: StoreKey, value: &str) -> io::Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }
}

// ==========================================
// In-memory backend
// ==========================================

#[cfg(test)]
pub use memory::MemoryStore;
