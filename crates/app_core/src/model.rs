//! Unified collection model
//!
//! Every source produces the same shapes: [`Photo`], [`Album`] and
//! [`Collection`]. Construction normalizes ordering and picks the cover;
//! there is no I/O here.

use crate::AppError;
use app_fs::MediaKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Backing store a photo or collection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhotoSource {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "demo")]
    Demo,
    #[serde(rename = "remote")]
    Remote,
}

impl PhotoSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PhotoSource::Local => "local",
            PhotoSource::Demo => "demo",
            PhotoSource::Remote => "remote",
        }
    }
}

/// Capability to the file behind a local photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHandle {
    path: PathBuf,
}

impl StoreHandle {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One reviewable media item.
///
/// `source` and `store_handle` are fixed by the constructor: a handle exists
/// exactly for local photos and no mutation changes the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: String,
    pub url: String,
    pub thumbnail_url: String,
    pub filename: String,
    /// Relative folder for local photos; for remote photos the album an
    /// item was last moved to (display only)
    pub path: String,
    pub kind: MediaKind,
    pub is_favorite: bool,
    source: PhotoSource,
    store_handle: Option<StoreHandle>,
}

impl Photo {
    pub fn local(
        id: impl Into<String>,
        filename: impl Into<String>,
        path: impl Into<String>,
        kind: MediaKind,
        handle: StoreHandle,
    ) -> Self {
        let filename = filename.into();
        Self {
            id: id.into(),
            url: String::new(),
            thumbnail_url: String::new(),
            is_favorite: app_fs::is_favorite_filename(&filename),
            filename,
            path: path.into(),
            kind,
            source: PhotoSource::Local,
            store_handle: Some(handle),
        }
    }

    pub fn demo(id: impl Into<String>, filename: impl Into<String>, url: impl Into<String>) -> Self {
        let filename = filename.into();
        let url = url.into();
        Self {
            id: id.into(),
            thumbnail_url: url.clone(),
            url,
            is_favorite: app_fs::is_favorite_filename(&filename),
            filename,
            path: String::new(),
            kind: MediaKind::Image,
            source: PhotoSource::Demo,
            store_handle: None,
        }
    }

    pub fn remote(
        id: impl Into<String>,
        filename: impl Into<String>,
        kind: MediaKind,
        is_favorite: bool,
    ) -> Self {
        Self {
            id: id.into(),
            url: String::new(),
            thumbnail_url: String::new(),
            filename: filename.into(),
            path: String::new(),
            kind,
            is_favorite,
            source: PhotoSource::Remote,
            store_handle: None,
        }
    }

    pub fn with_locators(mut self, url: impl Into<String>, thumbnail_url: impl Into<String>) -> Self {
        self.url = url.into();
        self.thumbnail_url = thumbnail_url.into();
        self
    }

    pub fn source(&self) -> PhotoSource {
        self.source
    }

    pub fn store_handle(&self) -> Option<&StoreHandle> {
        self.store_handle.as_ref()
    }

    /// Copy of this photo under a new name and folder. The favorite flag
    /// follows the filename; a local photo gets the new file's handle.
    pub(crate) fn relocated(&self, filename: String, path: String, target: Option<PathBuf>) -> Self {
        let mut photo = self.clone();
        photo.is_favorite = match self.source {
            PhotoSource::Remote => self.is_favorite,
            _ => app_fs::is_favorite_filename(&filename),
        };
        photo.filename = filename;
        photo.path = path;
        if let (PhotoSource::Local, Some(target)) = (self.source, target) {
            photo.store_handle = Some(StoreHandle::new(target));
        }
        photo
    }

    /// `path/filename`, or just the filename at top level
    pub fn display_path(&self) -> String {
        if self.path.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.path, self.filename)
        }
    }

    /// Store handle present iff the photo is local
    pub fn upholds_handle_invariant(&self) -> bool {
        self.store_handle.is_some() == (self.source == PhotoSource::Local)
    }

    fn sort_key(&self) -> String {
        format!("{}/{}", self.path, self.filename)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Folder path (local), store id (remote) or synthetic id (demo)
    pub id: String,
    pub title: String,
}

impl Album {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into() }
    }
}

/// Media and albums loaded from one source for one review session
#[derive(Debug, Clone)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub cover_image: String,
    photos: Vec<Photo>,
    albums: Vec<Album>,
    source: PhotoSource,
}

impl Collection {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source: PhotoSource,
        mut photos: Vec<Photo>,
        mut albums: Vec<Album>,
    ) -> Self {
        if source == PhotoSource::Local {
            photos.sort_by_cached_key(Photo::sort_key);
        }
        // Album lists are title-ordered for every source so inserts stay sorted
        albums.sort_by(|a, b| a.title.cmp(&b.title));

        let mut collection = Self {
            id: id.into(),
            name: name.into(),
            cover_image: String::new(),
            photos,
            albums,
            source,
        };
        collection.refresh_cover();
        collection
    }

    pub fn source(&self) -> PhotoSource {
        self.source
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Photo> {
        self.photos.get(index)
    }

    pub fn position(&self, photo_id: &str) -> Option<usize> {
        self.photos.iter().position(|p| p.id == photo_id)
    }

    pub fn album(&self, album_id: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.id == album_id)
    }

    /// Remove a photo, keeping the order of the rest
    pub(crate) fn remove_photo(&mut self, photo_id: &str) -> Option<Photo> {
        let index = self.position(photo_id)?;
        let removed = self.photos.remove(index);
        self.refresh_cover();
        Some(removed)
    }

    /// Replace the entry with the same id in place
    pub(crate) fn replace_photo(&mut self, photo: Photo) -> bool {
        match self.photos.iter_mut().find(|p| p.id == photo.id) {
            Some(slot) => {
                *slot = photo;
                self.refresh_cover();
                true
            }
            None => false,
        }
    }

    /// Insert a new album at its sorted-by-title position
    pub fn insert_album(&mut self, album: Album) -> Result<(), AppError> {
        if self.album(&album.id).is_some() {
            return Err(AppError::Collision(album.title));
        }
        let index = self.albums.partition_point(|a| a.title <= album.title);
        self.albums.insert(index, album);
        Ok(())
    }

    /// Every photo upholds the handle invariant and carries this source
    pub fn is_consistent(&self) -> bool {
        self.photos
            .iter()
            .all(|p| p.upholds_handle_invariant() && p.source == self.source)
    }

    /// First favorite, else first item, else empty
    fn refresh_cover(&mut self) {
        self.cover_image = self
            .photos
            .iter()
            .find(|p| p.is_favorite)
            .or_else(|| self.photos.first())
            .map(|p| p.thumbnail_url.clone())
            .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(path: &str, filename: &str) -> Photo {
        let rel = if path.is_empty() { filename.to_string() } else { format!("{}/{}", path, filename) };
        Photo::local(rel.clone(), filename, path, MediaKind::Image, StoreHandle::new(PathBuf::from(&rel)))
            .with_locators(format!("blob:{}", rel), format!("thumb:{}", rel))
    }

    #[test]
    fn test_local_order_is_path_then_filename() {
        let collection = Collection::new(
            "root",
            "root",
            PhotoSource::Local,
            vec![local("b", "a.jpg"), local("", "z.jpg"), local("a", "c.jpg")],
            vec![Album::new("b", "b"), Album::new("a", "a")],
        );

        let order: Vec<_> = collection.photos().iter().map(Photo::display_path).collect();
        assert_eq!(order, vec!["z.jpg", "a/c.jpg", "b/a.jpg"]);
        assert_eq!(collection.albums()[0].title, "a");
    }

    #[test]
    fn test_demo_order_is_kept() {
        let photos = vec![Photo::demo("2", "b.jpg", "u2"), Photo::demo("1", "a.jpg", "u1")];
        let collection = Collection::new("d", "d", PhotoSource::Demo, photos, Vec::new());
        assert_eq!(collection.get(0).map(|p| p.id.as_str()), Some("2"));
    }

    #[test]
    fn test_cover_prefers_favorite() {
        let collection = Collection::new(
            "root",
            "root",
            PhotoSource::Local,
            vec![local("", "a.jpg"), local("", "b_FAV.jpg")],
            Vec::new(),
        );
        assert_eq!(collection.cover_image, "thumb:b_FAV.jpg");

        let plain = Collection::new("r", "r", PhotoSource::Local, vec![local("", "a.jpg")], Vec::new());
        assert_eq!(plain.cover_image, "thumb:a.jpg");

        let empty = Collection::new("e", "e", PhotoSource::Demo, Vec::new(), Vec::new());
        assert_eq!(empty.cover_image, "");
    }

    #[test]
    fn test_handle_invariant() {
        assert!(local("", "a.jpg").upholds_handle_invariant());
        assert!(local("", "a.jpg").store_handle().is_some());
        assert!(Photo::demo("1", "a.jpg", "u").store_handle().is_none());
        assert!(Photo::remote("r", "a.jpg", MediaKind::Video, true).upholds_handle_invariant());
    }

    #[test]
    fn test_relocated_tracks_favorite_and_handle() {
        let photo = local("", "a.jpg");
        let moved = photo.relocated("a_FAV.jpg".into(), "Trip".into(), Some(PathBuf::from("/x/Trip/a_FAV.jpg")));
        assert!(moved.is_favorite);
        assert_eq!(moved.id, photo.id);
        assert_eq!(moved.source(), PhotoSource::Local);
        assert_eq!(moved.store_handle().map(|h| h.path().to_path_buf()), Some(PathBuf::from("/x/Trip/a_FAV.jpg")));

        let remote = Photo::remote("r", "a.jpg", MediaKind::Image, true);
        let moved = remote.relocated("a.jpg".into(), "album-1".into(), Some(PathBuf::from("/x")));
        assert!(moved.is_favorite);
        assert!(moved.store_handle().is_none());
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut collection = Collection::new(
            "root",
            "root",
            PhotoSource::Local,
            vec![local("", "a.jpg"), local("", "b.jpg"), local("", "c.jpg")],
            Vec::new(),
        );
        let removed = collection.remove_photo("b.jpg").unwrap();
        assert_eq!(removed.filename, "b.jpg");
        let names: Vec<_> = collection.photos().iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg"]);
        assert!(collection.remove_photo("b.jpg").is_none());
    }

    #[test]
    fn test_demo_albums_are_title_ordered() {
        let mut collection = Collection::new(
            "demo",
            "Demo",
            PhotoSource::Demo,
            Vec::new(),
            vec![Album::new("z", "Zoo"), Album::new("b", "Beach")],
        );
        collection.insert_album(Album::new("m", "Market")).unwrap();
        let titles: Vec<_> = collection.albums().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Beach", "Market", "Zoo"]);
    }

    #[test]
    fn test_insert_album_sorted_and_unique() {
        let mut collection = Collection::new(
            "root",
            "root",
            PhotoSource::Local,
            Vec::new(),
            vec![Album::new("a", "a"), Album::new("c", "c")],
        );
        collection.insert_album(Album::new("b", "b")).unwrap();
        let titles: Vec<_> = collection.albums().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);

        assert!(matches!(collection.insert_album(Album::new("b", "b")), Err(AppError::Collision(_))));
    }
}
