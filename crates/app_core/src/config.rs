//! Application configuration

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub library: LibraryConfig,
    pub remote: RemoteConfig,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Swipe direction that deletes; the opposite direction keeps
    pub swipe_to_delete: SwipeDirection,
    pub feedback_duration_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            swipe_to_delete: SwipeDirection::Left,
            feedback_duration_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub thumbnail_size: u32,
    pub thumbnail_timeout_ms: u64,
    /// Include media already in the trash folder when opening a folder
    pub scan_trash_folder: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            thumbnail_size: 250,
            thumbnail_timeout_ms: 5000,
            scan_trash_folder: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_url: String,
    /// Number of most recent items loaded per session
    pub recent_count: usize,
    pub album_page_size: usize,
    /// Album that receives "deleted" remote items
    pub archive_album_title: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: app_remote::DEFAULT_API_URL.to_string(),
            recent_count: 50,
            album_page_size: 50,
            archive_album_title: "Swiper-Archiv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Simulated store latency per operation
    pub latency_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { latency_ms: 200 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwipeDirection {
    #[default]
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "right")]
    Right,
}

impl SwipeDirection {
    pub fn opposite(self) -> Self {
        match self {
            SwipeDirection::Left => SwipeDirection::Right,
            SwipeDirection::Right => SwipeDirection::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }
}

impl std::str::FromStr for SwipeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(SwipeDirection::Left),
            "right" | "r" => Ok(SwipeDirection::Right),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

impl GeneralConfig {
    pub fn feedback_duration(&self) -> Duration {
        Duration::from_millis(self.feedback_duration_ms)
    }
}

impl LibraryConfig {
    pub fn thumbnail_timeout(&self) -> Duration {
        Duration::from_millis(self.thumbnail_timeout_ms)
    }
}

impl DemoConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl AppConfig {
    /// Load configuration from the platform config file
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Save configuration to the platform config file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Load configuration from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "PhotoSwiper", "PhotoSwiper")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}
