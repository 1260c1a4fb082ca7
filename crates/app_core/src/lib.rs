//! PhotoSwiper Core Domain Logic
//!
//! This crate contains:
//! - Unified collection model (photos, albums, collections)
//! - Source adapters for local folders, the demo catalog and remote libraries
//! - Mutation coordinator
//! - Navigation state machine
//! - Configuration and process-scoped state
//! - Transient locators and thumbnails

pub mod config;
pub mod coordinator;
pub mod error;
pub mod intent;
pub mod model;
pub mod navigation;
pub mod resource;
pub mod source;
pub mod state;
pub mod thumbnail;

pub use config::{AppConfig, DemoConfig, GeneralConfig, LibraryConfig, RemoteConfig, SwipeDirection};
pub use coordinator::{CoordinatorState, Mutation, MutationCoordinator, MutationKind, MutationOutcome};
pub use error::AppError;
pub use intent::Intent;
pub use model::{Album, Collection, Photo, PhotoSource, StoreHandle};
pub use navigation::{Navigator, OpenOutcome, View};
pub use resource::{BlobData, BlobRegistry};
pub use source::{DemoCatalog, DemoSummary, Source};
pub use state::{AppState, Settings};
pub use thumbnail::ThumbnailService;

pub use app_fs::MediaKind;
