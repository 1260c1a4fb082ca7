//! Remote library source
//!
//! Deleting archives an item into a reserved album; moving adds it to
//! another album. Remote album membership is additive: an item is never
//! removed from the albums it is already in.

use crate::config::RemoteConfig;
use crate::{Album, AppError, Collection, Photo, PhotoSource};
use app_fs::MediaKind;
use app_remote::{RemoteLibrary, RemoteMediaItem};
use parking_lot::Mutex;
use std::sync::Arc;

pub const REMOTE_COLLECTION_ID: &str = "remote-recent";
pub const REMOTE_COLLECTION_NAME: &str = "Recent remote photos";

pub struct RemoteSource {
    library: Arc<dyn RemoteLibrary>,
    recent_count: usize,
    archive_title: String,
    thumbnail_size: u32,
    /// Archive album id, cached once found or created
    archive_album: Mutex<Option<String>>,
}

impl RemoteSource {
    pub fn new(library: Arc<dyn RemoteLibrary>, config: &RemoteConfig, thumbnail_size: u32) -> Self {
        Self {
            library,
            recent_count: config.recent_count,
            archive_title: config.archive_album_title.clone(),
            thumbnail_size,
            archive_album: Mutex::new(None),
        }
    }

    pub async fn open(&self) -> Result<Collection, AppError> {
        let items = self.library.list_recent_items(self.recent_count).await?;
        let photos: Vec<Photo> = items.iter().filter_map(|item| self.photo_from(item)).collect();

        let albums = self
            .writable_albums()
            .await?
            .into_iter()
            .map(|album| Album::new(album.id, album.title))
            .collect();

        tracing::info!("Loaded {} remote photos ({} listed)", photos.len(), items.len());
        Ok(Collection::new(
            REMOTE_COLLECTION_ID,
            REMOTE_COLLECTION_NAME,
            PhotoSource::Remote,
            photos,
            albums,
        ))
    }

    /// Items still being processed remotely have no metadata and are skipped
    fn photo_from(&self, item: &RemoteMediaItem) -> Option<Photo> {
        let metadata = item.metadata.as_ref()?;
        let kind = if metadata.is_video { MediaKind::Video } else { MediaKind::Image };
        let size = self.thumbnail_size;

        Some(
            Photo::remote(&item.id, &item.filename, kind, metadata.is_favorite).with_locators(
                format!("{}=d", item.base_url),
                format!("{}=w{}-h{}-c", item.base_url, size, size),
            ),
        )
    }

    /// Every writable album, following pagination to the end
    async fn writable_albums(&self) -> Result<Vec<app_remote::RemoteAlbum>, AppError> {
        let mut albums = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self.library.list_albums(token.as_deref()).await?;
            albums.extend(page.albums.into_iter().filter(|a| a.is_writeable));

            match page.next_page_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }

        Ok(albums)
    }

    async fn archive_album_id(&self) -> Result<String, AppError> {
        if let Some(id) = self.archive_album.lock().clone() {
            return Ok(id);
        }

        let existing = self
            .writable_albums()
            .await?
            .into_iter()
            .find(|a| a.title == self.archive_title);

        let id = match existing {
            Some(album) => album.id,
            None => {
                tracing::info!("Creating archive album \"{}\"", self.archive_title);
                self.library.create_album(&self.archive_title).await?.id
            }
        };

        *self.archive_album.lock() = Some(id.clone());
        Ok(id)
    }

    /// Archive the item; it stays in the account
    pub async fn delete(&self, photo: &Photo) -> Result<(), AppError> {
        let album_id = self.archive_album_id().await?;
        self.library.add_item_to_album(&photo.id, &album_id).await?;
        tracing::info!("Archived remote item {}", photo.id);
        Ok(())
    }

    /// Add the item to `album_id`; `path` shows the target album
    pub async fn move_to_album(&self, photo: &Photo, album_id: &str) -> Result<Photo, AppError> {
        self.library.add_item_to_album(&photo.id, album_id).await?;
        tracing::info!("Added remote item {} to album {}", photo.id, album_id);
        Ok(photo.relocated(photo.filename.clone(), album_id.to_string(), None))
    }

    pub async fn sign_out(&self) {
        self.library.sign_out().await;
        *self.archive_album.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_remote::InMemoryLibrary;

    fn library() -> Arc<InMemoryLibrary> {
        let library = InMemoryLibrary::new().with_page_size(1);
        library.add_photo("p1", "one.jpg", false);
        library.add_pending("p2", "processing.jpg");
        library.add_video("p3", "clip.mp4");
        library.add_album("a1", "Trip", true);
        library.add_album("a2", "Shared", false);
        library.add_album("a3", "Family", true);
        Arc::new(library)
    }

    fn source(library: &Arc<InMemoryLibrary>) -> RemoteSource {
        RemoteSource::new(library.clone(), &RemoteConfig::default(), 250)
    }

    #[tokio::test]
    async fn test_open_skips_pending_and_readonly() {
        let library = library();
        let collection = source(&library).open().await.unwrap();

        let ids: Vec<_> = collection.photos().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p1"]);
        assert_eq!(collection.photos()[0].kind, MediaKind::Video);
        assert_eq!(collection.photos()[1].url, "https://remote.invalid/p1=d");
        assert_eq!(collection.photos()[1].thumbnail_url, "https://remote.invalid/p1=w250-h250-c");

        let albums: Vec<_> = collection.albums().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(albums, vec!["a3", "a1"]);
        assert_eq!(collection.id, REMOTE_COLLECTION_ID);
    }

    #[tokio::test]
    async fn test_delete_creates_archive_once() {
        let library = library();
        let source = source(&library);
        let collection = source.open().await.unwrap();

        source.delete(&collection.photos()[0]).await.unwrap();
        source.delete(&collection.photos()[1]).await.unwrap();

        assert_eq!(library.created_albums(), 1);
        let archive = library.albums_titled("Swiper-Archiv");
        assert_eq!(archive.len(), 1);
        assert_eq!(library.album_items(&archive[0]), vec!["p3", "p1"]);
    }

    #[tokio::test]
    async fn test_delete_reuses_existing_archive() {
        let library = library();
        library.add_album("arch", "Swiper-Archiv", true);
        let source = source(&library);

        source.delete(&Photo::remote("p1", "one.jpg", MediaKind::Image, false)).await.unwrap();
        assert_eq!(library.created_albums(), 0);
        assert_eq!(library.album_items("arch"), vec!["p1"]);
    }

    #[tokio::test]
    async fn test_move_is_additive() {
        let library = library();
        let source = source(&library);
        let photo = Photo::remote("p1", "one.jpg", MediaKind::Image, false);

        let moved = source.move_to_album(&photo, "a1").await.unwrap();
        source.move_to_album(&moved, "a3").await.unwrap();

        assert_eq!(moved.path, "a1");
        assert_eq!(library.album_items("a1"), vec!["p1"]);
        assert_eq!(library.album_items("a3"), vec!["p1"]);
    }

    #[tokio::test]
    async fn test_failure_is_propagated() {
        let library = library();
        let source = source(&library);
        library.fail_next(app_remote::RemoteError::ApiNotEnabled("disabled".into()));

        let err = source.open().await.unwrap_err();
        assert!(matches!(err, AppError::Remote(app_remote::RemoteError::ApiNotEnabled(_))));
    }
}
