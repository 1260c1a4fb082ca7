//! Transient resource locators
//!
//! Local media and generated thumbnails are addressed through `blob:<uuid>`
//! locators. Every locator stays registered until it is revoked, so callers
//! release them when a photo leaves the collection or the collection is
//! discarded.

use crate::Photo;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BLOB_SCHEME: &str = "blob:";

/// What a locator points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobData {
    /// A file on disk, read on demand
    File(PathBuf),
    /// Encoded bytes held in memory
    Bytes { mime: &'static str, data: Arc<Vec<u8>> },
}

/// Registry of live `blob:` locators
#[derive(Debug, Default)]
pub struct BlobRegistry {
    entries: DashMap<String, BlobData>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_blob(locator: &str) -> bool {
        locator.starts_with(BLOB_SCHEME)
    }

    /// Issue a locator for a file
    pub fn register_file(&self, path: &Path) -> String {
        self.insert(BlobData::File(path.to_path_buf()))
    }

    /// Issue a locator for in-memory bytes
    pub fn register_bytes(&self, mime: &'static str, data: Vec<u8>) -> String {
        self.insert(BlobData::Bytes { mime, data: Arc::new(data) })
    }

    fn insert(&self, data: BlobData) -> String {
        let locator = format!("{}{}", BLOB_SCHEME, uuid::Uuid::new_v4());
        self.entries.insert(locator.clone(), data);
        locator
    }

    pub fn resolve(&self, locator: &str) -> Option<BlobData> {
        self.entries.get(locator).map(|entry| entry.value().clone())
    }

    /// Point a file locator at a new location after the file was relocated
    pub fn repoint(&self, locator: &str, path: &Path) -> bool {
        match self.entries.get_mut(locator) {
            Some(mut entry) if matches!(entry.value(), BlobData::File(_)) => {
                *entry.value_mut() = BlobData::File(path.to_path_buf());
                true
            }
            _ => false,
        }
    }

    /// Revoke a locator. Anything that is not a `blob:` locator is ignored.
    pub fn revoke(&self, locator: &str) -> bool {
        Self::is_blob(locator) && self.entries.remove(locator).is_some()
    }

    /// Revoke the locators held by a photo
    pub fn release(&self, photo: &Photo) -> usize {
        let mut released = usize::from(self.revoke(&photo.url));
        if photo.thumbnail_url != photo.url {
            released += usize::from(self.revoke(&photo.thumbnail_url));
        }
        released
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Revoke everything; returns how many locators were live
    pub fn clear(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }
}
