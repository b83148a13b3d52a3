//! Durable key-value store adapter.
//!
//! Implements both [`ProfileStore`] and [`StoragePort`].
//!
//! - Keys are namespaced as `"<namespace>::<key>"`.
//! - The whole map is encoded with `postcard` and rewritten on every
//!   mutation: write to `<path>.tmp`, then rename over `<path>`.  A crash
//!   mid-write leaves the previous file intact.
//! - A failed flush rolls the in-memory map back, so memory and disk never
//!   disagree.
//! - Profiles are validated before they are written.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::app::ports::{ProfileStore, StorageError, StoragePort};
use crate::profile::{STORE_NAMESPACE, UserProfile};

pub struct KvStore {
    entries: BTreeMap<String, Vec<u8>>,
    /// Backing file; `None` keeps the store in memory only.
    path: Option<PathBuf>,
}

impl KvStore {
    pub fn in_memory() -> Self {
        info!("KvStore: in-memory backend");
        Self {
            entries: BTreeMap::new(),
            path: None,
        }
    }

    /// Open (or lazily create) a file-backed store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => Self::decode(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("KvStore: cannot read {}: {e}", path.display());
                return Err(StorageError::IoError);
            }
        };
        info!(
            "KvStore: opened {} ({} entries)",
            path.display(),
            entries.len()
        );
        Ok(Self {
            entries,
            path: Some(path),
        })
    }

    /// Decode a serialized store image.
    pub fn decode(bytes: &[u8]) -> Result<BTreeMap<String, Vec<u8>>, StorageError> {
        postcard::from_bytes(bytes).map_err(|_| StorageError::Corrupted)
    }


    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = postcard::to_allocvec(&self.entries).map_err(|_| StorageError::IoError)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)
            .and_then(|()| fs::rename(&tmp, path))
            .map_err(|e| {
                warn!("KvStore: flush to {} failed: {e}", path.display());
                StorageError::IoError
            })?;
        debug!("KvStore: flushed {} bytes", bytes.len());
        Ok(())
    }

    /// Apply `previous` back under `key` after a failed flush.
    fn rollback(&mut self, key: String, previous: Option<Vec<u8>>) {
        match previous {
            Some(old) => {
                self.entries.insert(key, old);
            }
            None => {
                self.entries.remove(&key);
            }
        }
    }
}

impl StoragePort for KvStore {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.entries
            .get(&Self::composite_key(namespace, key))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let composite = Self::composite_key(namespace, key);
        let previous = self.entries.insert(composite.clone(), data.to_vec());
        if let Err(e) = self.flush() {
            self.rollback(composite, previous);
            return Err(e);
        }
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let composite = Self::composite_key(namespace, key);
        let Some(previous) = self.entries.remove(&composite) else {
            return Ok(());
        };
        if let Err(e) = self.flush() {
            self.rollback(composite, Some(previous));
            return Err(e);
        }
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.entries
            .contains_key(&Self::composite_key(namespace, key))
    }
}

impl ProfileStore for KvStore {
    fn get(&self, key: &str) -> Result<Option<UserProfile>, StorageError> {
        match self.read(STORE_NAMESPACE, key) {
            Ok(bytes) => postcard::from_bytes(&bytes)
                .map(Some)
                .map_err(|_| StorageError::Corrupted),
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, profile: &UserProfile) -> Result<(), StorageError> {
        profile.validate().map_err(StorageError::ValidationFailed)?;
        let bytes = postcard::to_allocvec(profile).map_err(|_| StorageError::IoError)?;
        self.write(STORE_NAMESPACE, key, &bytes)
    }
}
