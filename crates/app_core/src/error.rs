//! Application error types

use crate::coordinator::MutationKind;
use app_remote::RemoteError;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Store failures (notify user, collection unchanged) =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Already exists: {0}")]
    Collision(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Not supported: {0}")]
    Unsupported(String),

    #[error("Remote library: {0}")]
    Remote(#[from] RemoteError),

    // ===== Rejected intents (nothing was attempted) =====
    #[error("No photo is active")]
    NoActivePhoto,

    #[error("No album selected")]
    NoAlbumSelected,

    #[error("Index {index} out of range for {len} photos")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Busy: {0} in progress")]
    Busy(MutationKind),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    // ===== Fatal Errors =====
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::Internal(_))
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Collision(name) => format!("\"{}\" already exists", name),
            AppError::Unsupported(what) => format!("{} is not supported for this source", what),
            AppError::Busy(_) => "Please wait, the previous action is still running".to_string(),
            AppError::NoAlbumSelected => "Choose an album first".to_string(),
            AppError::Remote(RemoteError::ApiNotEnabled(_)) => {
                "The photo library API is not enabled for this project. Enable it and connect again.".to_string()
            }
            AppError::Remote(RemoteError::AccessDenied(_)) => {
                "Access to the photo library was denied. Check the granted permissions and connect again.".to_string()
            }
            AppError::Remote(RemoteError::NotConnected) => {
                "Not connected to the photo library".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<app_fs::FsError> for AppError {
    fn from(e: app_fs::FsError) -> Self {
        match e {
            app_fs::FsError::Io(e) => AppError::Io(e),
            app_fs::FsError::NotFound(p) => AppError::FileNotFound(p),
            app_fs::FsError::AccessDenied(p) => AppError::AccessDenied(p),
            app_fs::FsError::AlreadyExists(p) => AppError::Collision(p.display().to_string()),
            app_fs::FsError::InvalidName(name) | app_fs::FsError::InvalidPath(name) => AppError::InvalidName(name),
            app_fs::FsError::InvalidOperation(msg) => AppError::Unsupported(msg),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        AppError::Internal(format!("image: {}", e))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_fs_error_mapping() {
        let collision: AppError = app_fs::FsError::AlreadyExists(PathBuf::from("/x/b.jpg")).into();
        assert!(matches!(collision, AppError::Collision(p) if p.ends_with("b.jpg")));

        let missing: AppError = app_fs::FsError::NotFound("a.jpg".into()).into();
        assert!(matches!(missing, AppError::FileNotFound(_)));
    }

    #[test]
    fn test_remote_messages_are_distinct() {
        let disabled = AppError::from(RemoteError::ApiNotEnabled("403".into())).user_message();
        let denied = AppError::from(RemoteError::AccessDenied("403".into())).user_message();
        assert_ne!(disabled, denied);
        assert!(disabled.contains("not enabled"));
        assert!(denied.contains("denied"));
    }

    #[test]
    fn test_recoverable() {
        assert!(AppError::Unsupported("rename".into()).is_recoverable());
        assert!(AppError::Busy(MutationKind::Rename).is_recoverable());
        assert!(!AppError::Internal("x".into()).is_recoverable());
    }
}
