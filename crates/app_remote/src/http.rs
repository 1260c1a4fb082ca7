//! HTTP client for the photo library REST API

use crate::{AlbumPage, RemoteAlbum, RemoteError, RemoteLibrary, RemoteMediaItem, RemoteMediaMetadata, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_API_URL: &str = "https://photoslibrary.googleapis.com/v1";

const REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

/// The API rejects larger pages
const MAX_PAGE_SIZE: usize = 100;

/// Remote library backed by the photo library REST API.
///
/// The access token comes from an external OAuth flow (read, append and
/// sharing scopes); this client only attaches it to requests.
pub struct GooglePhotosClient {
    client: reqwest::Client,
    api_url: String,
    album_page_size: usize,
    access_token: RwLock<Option<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaItemsResponse {
    #[serde(default)]
    media_items: Vec<WireMediaItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMediaItem {
    id: String,
    base_url: String,
    #[serde(default)]
    filename: String,
    media_metadata: Option<WireMediaMetadata>,
}

#[derive(Deserialize)]
struct WireMediaMetadata {
    video: Option<serde_json::Value>,
    #[serde(default)]
    favorite: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlbumsResponse {
    #[serde(default)]
    albums: Vec<WireAlbum>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAlbum {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    is_writeable: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

impl From<WireMediaItem> for RemoteMediaItem {
    fn from(item: WireMediaItem) -> Self {
        Self {
            id: item.id,
            base_url: item.base_url,
            filename: item.filename,
            metadata: item.media_metadata.map(|m| RemoteMediaMetadata {
                is_video: m.video.is_some(),
                is_favorite: m.favorite,
            }),
        }
    }
}

impl From<WireAlbum> for RemoteAlbum {
    fn from(album: WireAlbum) -> Self {
        Self {
            id: album.id,
            title: album.title,
            is_writeable: album.is_writeable,
        }
    }
}

/// Map an error response to a `RemoteError`.
///
/// A 403 is split into "API not enabled" and "access denied" based on the
/// message the API returns.
pub fn classify_api_error(status: u16, body: &str) -> RemoteError {
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.code.unwrap_or(status), envelope.error.message),
        Err(_) => (status, body.trim().to_string()),
    };

    if code == 403 {
        if message.contains("not been used") || message.contains("is not enabled") {
            RemoteError::ApiNotEnabled(message)
        } else {
            RemoteError::AccessDenied(message)
        }
    } else {
        RemoteError::Api { code, message }
    }
}

impl GooglePhotosClient {
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            album_page_size: 50,
            access_token: RwLock::new(Some(access_token.into())),
        }
    }

    pub fn with_album_page_size(mut self, size: usize) -> Self {
        self.album_page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    fn token(&self) -> Result<String> {
        self.access_token.read().clone().ok_or(RemoteError::NotConnected)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let token = self.token()?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_api_error(status.as_u16(), &body);
            tracing::warn!("Remote request failed: {}", err);
            return Err(err);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteLibrary for GooglePhotosClient {
    fn is_connected(&self) -> bool {
        self.access_token.read().is_some()
    }

    async fn list_recent_items(&self, count: usize) -> Result<Vec<RemoteMediaItem>> {
        let page_size = count.clamp(1, MAX_PAGE_SIZE).to_string();
        let request = self
            .client
            .get(format!("{}/mediaItems", self.api_url))
            .query(&[("pageSize", page_size.as_str())]);

        let response: MediaItemsResponse = self.send(request).await?;
        tracing::debug!("Listed {} recent remote items", response.media_items.len());
        Ok(response.media_items.into_iter().map(Into::into).collect())
    }

    async fn list_albums(&self, page_token: Option<&str>) -> Result<AlbumPage> {
        let page_size = self.album_page_size.to_string();
        let mut request = self
            .client
            .get(format!("{}/albums", self.api_url))
            .query(&[("pageSize", page_size.as_str())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response: AlbumsResponse = self.send(request).await?;
        Ok(AlbumPage {
            albums: response.albums.into_iter().map(Into::into).collect(),
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn add_item_to_album(&self, item_id: &str, album_id: &str) -> Result<()> {
        let request = self
            .client
            .post(format!("{}/albums/{}:batchAddMediaItems", self.api_url, album_id))
            .json(&json!({ "mediaItemIds": [item_id] }));

        let _: serde_json::Value = self.send(request).await?;
        tracing::info!("Added remote item {} to album {}", item_id, album_id);
        Ok(())
    }

    async fn create_album(&self, title: &str) -> Result<RemoteAlbum> {
        let request = self
            .client
            .post(format!("{}/albums", self.api_url))
            .json(&json!({ "album": { "title": title } }));

        let album: WireAlbum = self.send(request).await?;
        tracing::info!("Created remote album {} ({})", album.title, album.id);

        // Albums created by this app are always writable by it
        let mut album: RemoteAlbum = album.into();
        album.is_writeable = true;
        Ok(album)
    }

    async fn sign_out(&self) {
        let Some(token) = self.access_token.write().take() else {
            return;
        };

        let result = self
            .client
            .post(REVOKE_URL)
            .form(&[("token", token.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => tracing::info!("Remote token revoked"),
            Err(e) => tracing::warn!("Token revocation failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_api_not_enabled() {
        let body = r#"{"error":{"code":403,"message":"Photos Library API has not been used in project 42 before or it is disabled.","status":"PERMISSION_DENIED"}}"#;
        assert!(matches!(classify_api_error(403, body), RemoteError::ApiNotEnabled(_)));
    }

    #[test]
    fn test_classify_access_denied() {
        let body = r#"{"error":{"code":403,"message":"Request had insufficient authentication scopes."}}"#;
        assert_eq!(
            classify_api_error(403, body),
            RemoteError::AccessDenied("Request had insufficient authentication scopes.".into())
        );
    }

    #[test]
    fn test_classify_other_status() {
        assert_eq!(
            classify_api_error(500, "backend unavailable\n"),
            RemoteError::Api { code: 500, message: "backend unavailable".into() }
        );
    }

    #[test]
    fn test_decode_media_items() {
        let body = r#"{
            "mediaItems": [
                {"id": "v1", "baseUrl": "https://x/v1", "filename": "clip.mp4",
                 "mediaMetadata": {"video": {"fps": 30}}},
                {"id": "p1", "baseUrl": "https://x/p1", "filename": "a.jpg",
                 "mediaMetadata": {"photo": {}, "favorite": true}},
                {"id": "pending", "baseUrl": "https://x/pending", "filename": "b.jpg"}
            ],
            "nextPageToken": "abc"
        }"#;
        let response: MediaItemsResponse = serde_json::from_str(body).unwrap();
        let items: Vec<RemoteMediaItem> = response.media_items.into_iter().map(Into::into).collect();

        assert_eq!(items[0].metadata, Some(RemoteMediaMetadata { is_video: true, is_favorite: false }));
        assert_eq!(items[1].metadata, Some(RemoteMediaMetadata { is_video: false, is_favorite: true }));
        assert_eq!(items[2].metadata, None);
    }

    #[tokio::test]
    async fn test_signed_out_client_is_not_connected() {
        let client = GooglePhotosClient::new(DEFAULT_API_URL, "token");
        assert!(client.is_connected());

        *client.access_token.write() = None;
        assert!(!client.is_connected());
        assert_eq!(client.list_recent_items(5).await.unwrap_err(), RemoteError::NotConnected);
    }
}
