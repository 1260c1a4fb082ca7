//! Process-scoped application state
//!
//! Built once at startup and handed to the navigator. Holds the settings,
//! the transient locator registry and the demo catalog.

use crate::source::DemoCatalog;
use crate::{AppConfig, AppError, BlobRegistry, SwipeDirection, ThumbnailService};
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration plus where changes are persisted
#[derive(Debug, Clone)]
pub struct Settings {
    config: AppConfig,
    path: Option<PathBuf>,
}

impl Settings {
    pub fn new(config: AppConfig, path: PathBuf) -> Self {
        Self { config, path: Some(path) }
    }

    /// Settings that are never written to disk
    pub fn in_memory(config: AppConfig) -> Self {
        Self { config, path: None }
    }

    /// Read the platform config file, falling back to defaults
    pub fn load() -> Self {
        let path = AppConfig::config_path();
        let config = AppConfig::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to read {:?}, using defaults: {}", path, e);
            AppConfig::default()
        });
        Self::new(config, path)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn delete_direction(&self) -> SwipeDirection {
        self.config.general.swipe_to_delete
    }

    /// Change the delete direction and persist it right away
    pub fn set_delete_direction(&mut self, direction: SwipeDirection) -> Result<(), AppError> {
        self.config.general.swipe_to_delete = direction;

        if let Some(path) = &self.path {
            self.config
                .save_to(path)
                .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))?;
        }
        Ok(())
    }
}

pub struct AppState {
    pub settings: Settings,
    pub blobs: Arc<BlobRegistry>,
    pub demo: DemoCatalog,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            blobs: Arc::new(BlobRegistry::new()),
            demo: DemoCatalog,
        }
    }

    pub fn init() -> Self {
        Self::new(Settings::load())
    }

    pub fn config(&self) -> &AppConfig {
        self.settings.config()
    }

    pub fn thumbnail_service(&self) -> ThumbnailService {
        let library = &self.config().library;
        ThumbnailService::new(library.thumbnail_size, library.thumbnail_timeout(), self.blobs.clone())
    }

    /// Release every transient locator still alive
    pub fn teardown(&self) -> usize {
        let released = self.blobs.clear();
        if released > 0 {
            tracing::debug!("Released {} transient locators", released);
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut settings = Settings::new(AppConfig::default(), path.clone());

        settings.set_delete_direction(SwipeDirection::Right).unwrap();
        let reloaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.general.swipe_to_delete, SwipeDirection::Right);
    }

    #[test]
    fn test_teardown_releases_all() {
        let state = AppState::new(Settings::in_memory(AppConfig::default()));
        state.blobs.register_bytes("image/jpeg", vec![0]);
        state.blobs.register_file(std::path::Path::new("/x.jpg"));
        assert_eq!(state.teardown(), 2);
        assert!(state.blobs.is_empty());
    }
}
