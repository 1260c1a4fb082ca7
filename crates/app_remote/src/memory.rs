//! In-memory remote library
//!
//! Behaves like a connected account: paginated album listing, additive
//! album membership, album creation. Failures can be injected for the next
//! call to exercise error paths.

use crate::{AlbumPage, RemoteAlbum, RemoteError, RemoteLibrary, RemoteMediaItem, RemoteMediaMetadata, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

pub struct InMemoryLibrary {
    inner: Mutex<Inner>,
}

struct Inner {
    connected: bool,
    items: Vec<RemoteMediaItem>,
    albums: Vec<RemoteAlbum>,
    members: HashMap<String, Vec<String>>,
    page_size: usize,
    fail_next: Option<RemoteError>,
    created_albums: usize,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                connected: true,
                items: Vec::new(),
                albums: Vec::new(),
                members: HashMap::new(),
                page_size: 50,
                fail_next: None,
                created_albums: 0,
            }),
        }
    }

    /// Albums per listing page
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.inner.lock().page_size = page_size.max(1);
        self
    }

    /// Append a photo item (newest last in insertion order, listed newest first)
    pub fn add_photo(&self, id: &str, filename: &str, is_favorite: bool) {
        self.push_item(id, filename, Some(RemoteMediaMetadata { is_video: false, is_favorite }));
    }

    pub fn add_video(&self, id: &str, filename: &str) {
        self.push_item(id, filename, Some(RemoteMediaMetadata { is_video: true, is_favorite: false }));
    }

    /// An item whose metadata is not available yet
    pub fn add_pending(&self, id: &str, filename: &str) {
        self.push_item(id, filename, None);
    }

    fn push_item(&self, id: &str, filename: &str, metadata: Option<RemoteMediaMetadata>) {
        self.inner.lock().items.push(RemoteMediaItem {
            id: id.to_string(),
            base_url: format!("https://remote.invalid/{}", id),
            filename: filename.to_string(),
            metadata,
        });
    }

    pub fn add_album(&self, id: &str, title: &str, is_writeable: bool) {
        self.inner.lock().albums.push(RemoteAlbum {
            id: id.to_string(),
            title: title.to_string(),
            is_writeable,
        });
    }

    /// Item ids in an album, in insertion order
    pub fn album_items(&self, album_id: &str) -> Vec<String> {
        self.inner.lock().members.get(album_id).cloned().unwrap_or_default()
    }

    /// Album ids carrying `title`
    pub fn albums_titled(&self, title: &str) -> Vec<String> {
        self.inner
            .lock()
            .albums
            .iter()
            .filter(|a| a.title == title)
            .map(|a| a.id.clone())
            .collect()
    }

    /// Number of `create_album` calls that succeeded
    pub fn created_albums(&self) -> usize {
        self.inner.lock().created_albums
    }

    /// Make the next operation fail with `err`
    pub fn fail_next(&self, err: RemoteError) {
        self.inner.lock().fail_next = Some(err);
    }

    fn check(inner: &mut Inner) -> Result<()> {
        if let Some(err) = inner.fail_next.take() {
            return Err(err);
        }
        if !inner.connected {
            return Err(RemoteError::NotConnected);
        }
        Ok(())
    }
}

impl Default for InMemoryLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteLibrary for InMemoryLibrary {
    fn is_connected(&self) -> bool {
        self.inner.lock().connected
    }

    async fn list_recent_items(&self, count: usize) -> Result<Vec<RemoteMediaItem>> {
        let mut inner = self.inner.lock();
        Self::check(&mut inner)?;
        Ok(inner.items.iter().rev().take(count).cloned().collect())
    }

    async fn list_albums(&self, page_token: Option<&str>) -> Result<AlbumPage> {
        let mut inner = self.inner.lock();
        Self::check(&mut inner)?;

        let start = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| RemoteError::Api { code: 400, message: format!("bad page token {}", token) })?,
            None => 0,
        };
        let end = (start + inner.page_size).min(inner.albums.len());
        let albums = inner.albums.get(start..end).unwrap_or_default().to_vec();
        let next_page_token = (end < inner.albums.len()).then(|| end.to_string());

        Ok(AlbumPage { albums, next_page_token })
    }

    async fn add_item_to_album(&self, item_id: &str, album_id: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        Self::check(&mut inner)?;

        if !inner.albums.iter().any(|a| a.id == album_id) {
            return Err(RemoteError::AlbumUnavailable(album_id.to_string()));
        }

        let members = inner.members.entry(album_id.to_string()).or_default();
        if !members.iter().any(|m| m == item_id) {
            members.push(item_id.to_string());
        }
        Ok(())
    }

    async fn create_album(&self, title: &str) -> Result<RemoteAlbum> {
        let mut inner = self.inner.lock();
        Self::check(&mut inner)?;

        let album = RemoteAlbum {
            id: format!("album-{}", uuid::Uuid::new_v4()),
            title: title.to_string(),
            is_writeable: true,
        };
        inner.albums.push(album.clone());
        inner.created_albums += 1;
        Ok(album)
    }

    async fn sign_out(&self) {
        self.inner.lock().connected = false;
    }
}
