//! Source adapters
//!
//! The set of stores is closed, so [`Source`] is an enum and every
//! operation is a match over it. Operations a store cannot perform fail
//! with [`AppError::Unsupported`] before anything is touched.

mod demo;
mod local;
mod remote;

pub use demo::{DemoCatalog, DemoSource, DemoSummary};
pub use local::LocalSource;
pub use remote::{RemoteSource, REMOTE_COLLECTION_ID, REMOTE_COLLECTION_NAME};

use crate::{Album, AppError, Photo, PhotoSource};

/// The store behind the active collection
pub enum Source {
    Local(LocalSource),
    Demo(DemoSource),
    Remote(RemoteSource),
}

impl Source {
    pub fn kind(&self) -> PhotoSource {
        match self {
            Source::Local(_) => PhotoSource::Local,
            Source::Demo(_) => PhotoSource::Demo,
            Source::Remote(_) => PhotoSource::Remote,
        }
    }

    pub async fn delete(&self, photo: &Photo) -> Result<(), AppError> {
        self.check(photo)?;
        match self {
            Source::Local(s) => s.delete(photo).await,
            Source::Demo(s) => s.delete(photo).await,
            Source::Remote(s) => s.delete(photo).await,
        }
    }

    /// Returns the photo as it is after the move
    pub async fn move_to_album(&self, photo: &Photo, album_id: &str) -> Result<Photo, AppError> {
        self.check(photo)?;
        match self {
            Source::Local(s) => s.move_to_album(photo, album_id).await,
            Source::Demo(s) => s.move_to_album(photo, album_id).await,
            Source::Remote(s) => s.move_to_album(photo, album_id).await,
        }
    }

    pub async fn rename(&self, photo: &Photo, new_name: &str) -> Result<Photo, AppError> {
        self.check(photo)?;
        match self {
            Source::Local(s) => s.rename(photo, new_name).await,
            Source::Demo(s) => s.rename(photo, new_name).await,
            Source::Remote(_) => Err(AppError::Unsupported("Renaming remote photos".to_string())),
        }
    }

    pub async fn toggle_favorite(&self, photo: &Photo) -> Result<Photo, AppError> {
        self.check(photo)?;
        match self {
            Source::Local(s) => s.toggle_favorite(photo).await,
            Source::Demo(s) => s.toggle_favorite(photo).await,
            Source::Remote(_) => Err(AppError::Unsupported("Changing remote favorites".to_string())),
        }
    }

    pub async fn create_album(&self, title: &str) -> Result<Album, AppError> {
        match self {
            Source::Local(s) => s.create_album(title).await,
            Source::Demo(s) => s.create_album(title).await,
            Source::Remote(_) => Err(AppError::Unsupported("Creating remote albums".to_string())),
        }
    }

    /// A photo is only ever handled by the store it came from
    fn check(&self, photo: &Photo) -> Result<(), AppError> {
        if photo.source() != self.kind() {
            return Err(AppError::Internal(format!(
                "{} photo routed to {} source",
                photo.source().as_str(),
                self.kind().as_str()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_fs::MediaKind;
    use app_remote::InMemoryLibrary;
    use std::sync::Arc;

    fn remote() -> Source {
        let library = Arc::new(InMemoryLibrary::new());
        Source::Remote(RemoteSource::new(library, &crate::config::RemoteConfig::default(), 250))
    }

    #[tokio::test]
    async fn test_remote_rename_always_unsupported() {
        let source = remote();
        let photo = Photo::remote("p1", "one.jpg", MediaKind::Image, false);

        for name in ["two", "", "one.jpg", "a/b"] {
            assert!(matches!(source.rename(&photo, name).await, Err(AppError::Unsupported(_))));
        }
        assert!(matches!(source.toggle_favorite(&photo).await, Err(AppError::Unsupported(_))));
        assert!(matches!(source.create_album("x").await, Err(AppError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_source_mismatch_is_rejected() {
        let source = Source::Demo(DemoSource::new(std::time::Duration::ZERO));
        let photo = Photo::remote("p1", "one.jpg", MediaKind::Image, false);
        assert!(matches!(source.delete(&photo).await, Err(AppError::Internal(_))));
    }
}
