//! PhotoSwiper Remote Photo Library Layer
//!
//! The core only needs four operations against a remote account plus a
//! "connected" signal. They are expressed by [`RemoteLibrary`]; transport
//! and token acquisition stay behind that trait.

mod http;
mod memory;

pub use http::{GooglePhotosClient, classify_api_error, DEFAULT_API_URL};
pub use memory::InMemoryLibrary;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Remote library errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Not connected to a remote library")]
    NotConnected,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Photo library API is not enabled: {0}")]
    ApiNotEnabled(String),

    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Album unavailable: {0}")]
    AlbumUnavailable(String),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

/// Metadata the remote store attaches to a media item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMediaMetadata {
    pub is_video: bool,
    pub is_favorite: bool,
}

/// A media item as listed by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMediaItem {
    pub id: String,
    pub base_url: String,
    pub filename: String,
    /// Items without metadata are still being processed remotely
    pub metadata: Option<RemoteMediaMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAlbum {
    pub id: String,
    pub title: String,
    pub is_writeable: bool,
}

/// One page of an album listing
#[derive(Debug, Clone, Default)]
pub struct AlbumPage {
    pub albums: Vec<RemoteAlbum>,
    pub next_page_token: Option<String>,
}

/// Capability set of a connected remote photo library.
///
/// Album membership is non-exclusive: adding an item to an album never
/// removes it from other albums.
#[async_trait]
pub trait RemoteLibrary: Send + Sync {
    /// Whether an authorized session is currently available
    fn is_connected(&self) -> bool;

    /// Most recent items, newest first
    async fn list_recent_items(&self, count: usize) -> Result<Vec<RemoteMediaItem>>;

    /// One page of albums; `None` requests the first page
    async fn list_albums(&self, page_token: Option<&str>) -> Result<AlbumPage>;

    async fn add_item_to_album(&self, item_id: &str, album_id: &str) -> Result<()>;

    async fn create_album(&self, title: &str) -> Result<RemoteAlbum>;

    /// Drop the authorization; `is_connected` is false afterwards
    async fn sign_out(&self);
}
