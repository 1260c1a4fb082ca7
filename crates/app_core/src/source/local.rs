//! Local folder source
//!
//! Wraps an [`app_fs::LocalStore`]. Filesystem work runs on the blocking
//! pool; every mutation completes on disk before an updated photo is
//! returned.

use crate::{Album, AppError, BlobRegistry, Collection, Photo, PhotoSource, StoreHandle, ThumbnailService};
use app_fs::{LocalStore, ScanOptions, ScannedFile};
use std::path::PathBuf;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64;

pub struct LocalSource {
    store: LocalStore,
    blobs: Arc<BlobRegistry>,
    thumbnails: ThumbnailService,
    scan: ScanOptions,
}

impl LocalSource {
    pub fn new(
        root: PathBuf,
        blobs: Arc<BlobRegistry>,
        thumbnails: ThumbnailService,
        include_trash: bool,
    ) -> Result<Self, AppError> {
        Ok(Self {
            store: LocalStore::new(root)?,
            blobs,
            thumbnails,
            scan: ScanOptions { include_trash },
        })
    }

    pub async fn open(&self) -> Result<Collection, AppError> {
        let root = self.store.root().to_path_buf();
        let options = self.scan.clone();
        let scan = blocking(move || app_fs::scan_media(&root, &options)).await?;

        let mut photos = Vec::with_capacity(scan.files.len());
        for file in scan.files {
            photos.push(self.photo_from(file).await);
        }

        let albums = scan
            .albums
            .into_iter()
            .map(|path| Album::new(path.clone(), path))
            .collect();

        let name = self.store.name();
        let collection = Collection::new(name.clone(), name, PhotoSource::Local, photos, albums);
        tracing::info!(
            "Opened {}: {} photos, {} albums",
            self.store.root().display(),
            collection.len(),
            collection.albums().len()
        );
        Ok(collection)
    }

    async fn photo_from(&self, file: ScannedFile) -> Photo {
        let rel_path = file.rel_path();
        let id = format!(
            "{:016x}",
            xxh3_64(format!("{}{}", rel_path, file.modified.unwrap_or_default()).as_bytes())
        );

        let url = self.blobs.register_file(&file.abs_path);
        let thumbnail_url = self.thumbnails.generate(&file.abs_path, file.kind, &url).await;

        Photo::local(id, file.name, file.rel_dir, file.kind, StoreHandle::new(file.abs_path))
            .with_locators(url, thumbnail_url)
    }

    /// Move the file into the trash folder
    pub async fn delete(&self, photo: &Photo) -> Result<(), AppError> {
        require_handle(photo)?;
        let store = self.store.clone();
        let (dir, name) = (photo.path.clone(), photo.filename.clone());
        blocking(move || store.move_to_trash(&dir, &name)).await?;
        Ok(())
    }

    /// Relocate the file into the album folder `album_id`
    pub async fn move_to_album(&self, photo: &Photo, album_id: &str) -> Result<Photo, AppError> {
        require_handle(photo)?;
        let album_path = app_fs::album_target(album_id)?;
        let store = self.store.clone();
        let (dir, name, target_dir) = (photo.path.clone(), photo.filename.clone(), album_path.clone());
        let target = blocking(move || store.relocate(&dir, &name, &target_dir)).await?;

        self.blobs.repoint(&photo.url, &target);
        Ok(photo.relocated(photo.filename.clone(), album_path, Some(target)))
    }

    pub async fn rename(&self, photo: &Photo, new_name: &str) -> Result<Photo, AppError> {
        let candidate = app_fs::renamed_filename(&photo.filename, new_name)?;
        if candidate == photo.filename {
            return Ok(photo.clone());
        }
        self.rename_to(photo, candidate).await
    }

    pub async fn toggle_favorite(&self, photo: &Photo) -> Result<Photo, AppError> {
        let candidate = app_fs::toggle_favorite_filename(&photo.filename);
        self.rename_to(photo, candidate).await
    }

    async fn rename_to(&self, photo: &Photo, candidate: String) -> Result<Photo, AppError> {
        require_handle(photo)?;
        let store = self.store.clone();
        let (dir, from, to) = (photo.path.clone(), photo.filename.clone(), candidate.clone());
        let target = blocking(move || store.rename_in_place(&dir, &from, &to)).await?;

        self.blobs.repoint(&photo.url, &target);
        Ok(photo.relocated(candidate, photo.path.clone(), Some(target)))
    }

    /// Create (nested) album folders for a `/`-separated title
    pub async fn create_album(&self, title: &str) -> Result<Album, AppError> {
        let path = app_fs::normalize_album_path(title)?;
        let store = self.store.clone();
        let album_path = path.clone();
        blocking(move || store.create_album_dir(&album_path)).await?;
        Ok(Album::new(path.clone(), path))
    }
}

fn require_handle(photo: &Photo) -> Result<(), AppError> {
    match photo.store_handle() {
        Some(_) => Ok(()),
        None => Err(AppError::Internal(format!("{} has no store handle", photo.filename))),
    }
}

async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> app_fs::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}
