//! Local mirror of the merchant collection
//!
//! The mirror is one JSON array stored under [`MIRROR_KEY`]. Storage is
//! pluggable through [`MirrorStorage`]; the file backend writes a sibling
//! temporary file and renames it over the target so a reader never sees a
//! partial array.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use super::fixtures::seed_merchants;
use super::models::Merchant;

/// Fixed storage key of the merchant mirror
pub const MIRROR_KEY: &str = "merchants_mirror";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Storage is read-only")]
    ReadOnly,

    #[error("Could not encode mirror: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key/value text storage for the mirror
#[async_trait]
pub trait MirrorStorage: Send + Sync {
    /// Read the value stored under `key`, `None` when nothing is stored
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`
    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: MirrorStorage + ?Sized> MirrorStorage for Arc<S> {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value).await
    }
}

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileMirrorStorage {
    dir: PathBuf,
}

impl FileMirrorStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn io_error(path: &Path, error: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Write and flush to disk, so a later rename never exposes an empty file
async fn write_synced(path: &Path, value: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(value.as_bytes()).await?;
    file.sync_all().await
}

#[async_trait]
impl MirrorStorage for FileMirrorStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        if let Err(e) = write_synced(&tmp, value).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&path, e));
        }
        Ok(())
    }
}

/// In-process storage; nothing survives a restart
#[derive(Debug)]
pub struct MemoryMirrorStorage {
    entries: Mutex<HashMap<String, String>>,
    writable: AtomicBool,
}

impl Default for MemoryMirrorStorage {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            writable: AtomicBool::new(true),
        }
    }
}

impl MemoryMirrorStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::default();
        if let Ok(mut entries) = storage.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        storage
    }

    /// Make subsequent writes fail with [`StorageError::ReadOnly`]
    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::SeqCst);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl MirrorStorage for MemoryMirrorStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.writable.load(Ordering::SeqCst) {
            return Err(StorageError::ReadOnly);
        }
        let mut entries = self.entries.lock().map_err(|_| StorageError::ReadOnly)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read/write access to the merchant mirror on top of a storage backend
pub struct LocalMirror {
    storage: Box<dyn MirrorStorage>,
}

impl LocalMirror {
    pub fn new(storage: Box<dyn MirrorStorage>) -> Self {
        Self { storage }
    }

    /// Load the stored collection. Absent, unreadable or empty mirrors are
    /// replaced by the seed fixture, which is persisted right away.
    pub async fn load_or_seed(&self) -> Vec<Merchant> {
        match self.storage.read(MIRROR_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Merchant>>(&raw) {
                Ok(records) if !records.is_empty() => {
                    log::info!("Loaded {} merchants from local mirror", records.len());
                    return records;
                }
                Ok(_) => log::info!("Local mirror is empty"),
                Err(e) => log::warn!("Local mirror is not a merchant list: {}", e),
            },
            Ok(None) => log::info!("No local mirror found"),
            Err(e) => log::warn!("Could not read local mirror: {}", e),
        }

        let seeded = seed_merchants();
        match self.persist(&seeded).await {
            Ok(()) => log::info!("Seeded local mirror with {} merchants", seeded.len()),
            Err(e) => log::warn!("Could not persist seeded mirror: {}", e),
        }
        seeded
    }

    /// Overwrite the stored collection
    pub async fn persist(&self, records: &[Merchant]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(records)?;
        self.storage.write(MIRROR_KEY, &raw).await
    }
}
