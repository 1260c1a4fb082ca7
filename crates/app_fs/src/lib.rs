//! PhotoSwiper Local Store Layer
//!
//! Provides the directory-tree side of the application:
//! - Media scanning: recursive walk with image/video classification
//! - Naming: favorite marker and rename rules for media filenames
//! - LocalStore: relocation, rename and album folder primitives

mod media;
mod naming;
mod file_operations;

pub use media::{MediaKind, ScanOptions, ScanResult, ScannedFile, media_kind, scan_media, TRASH_DIR};
pub use naming::{
    FAVORITE_MARKER, split_extension, is_favorite_filename, toggle_favorite_filename,
    renamed_filename, is_valid_filename, normalize_album_path,
};
pub use file_operations::{album_target, LocalStore};

use std::path::PathBuf;
use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("File already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<std::io::Error> for FsError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => FsError::AccessDenied(e.to_string()),
            _ => FsError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_permission_denied_maps_to_access_denied() {
        let err = FsError::from(Error::new(ErrorKind::PermissionDenied, "read-only"));
        assert!(matches!(err, FsError::AccessDenied(_)));

        let err = FsError::from(Error::new(ErrorKind::Other, "disk"));
        assert!(matches!(err, FsError::Io(_)));
    }
}
