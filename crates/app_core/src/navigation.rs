//! Navigation state machine
//!
//! ```text
//! Start --open local/demo--> Grid --select--> Swipe
//! Start --connect remote-----------------> Swipe
//! Swipe --back--> Grid   (local/demo, cursor remembered)
//! Swipe --back--> Start  (remote, signs out)
//! Grid  --back--> Start  (locators released)
//! ```
//!
//! The navigator owns the active collection exclusively; the coordinator
//! only borrows it for the duration of one mutation.

use crate::coordinator::{Mutation, MutationCoordinator, MutationOutcome};
use crate::source::{DemoSource, DemoSummary, LocalSource, RemoteSource, Source};
use crate::{Album, AppError, AppState, Collection, Intent, Photo, PhotoSource, SwipeDirection};
use app_remote::RemoteLibrary;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Start,
    Grid,
    Swipe,
}

/// Result of a user-initiated open; cancelling is not an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    Cancelled,
}

/// Short-lived message shown after a gesture
#[derive(Debug, Clone)]
struct Feedback {
    message: String,
    expires_at: Instant,
}

struct Session {
    collection: Collection,
    source: Source,
}

pub struct Navigator {
    state: AppState,
    view: View,
    session: Option<Session>,
    cursor: usize,
    last_viewed_index: Option<usize>,
    last_used_album: Option<String>,
    feedback: Option<Feedback>,
    coordinator: Arc<MutationCoordinator>,
}

impl Navigator {
    pub fn new(state: AppState) -> Self {
        let coordinator = Arc::new(MutationCoordinator::new(state.blobs.clone()));
        Self {
            state,
            view: View::Start,
            session: None,
            cursor: 0,
            last_viewed_index: None,
            last_used_album: None,
            feedback: None,
            coordinator,
        }
    }

    // ===== Queries =====

    pub fn view(&self) -> View {
        self.view
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn collection(&self) -> Option<&Collection> {
        self.session.as_ref().map(|s| &s.collection)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Photo under the cursor in a swipe session
    pub fn current_photo(&self) -> Option<&Photo> {
        match self.view {
            View::Swipe => self.collection()?.get(self.cursor),
            _ => None,
        }
    }

    /// Index the grid should scroll to after returning from a swipe session
    pub fn last_viewed_index(&self) -> Option<usize> {
        self.last_viewed_index
    }

    pub fn last_used_album(&self) -> Option<&str> {
        self.last_used_album.as_deref()
    }

    pub fn delete_direction(&self) -> SwipeDirection {
        self.state.settings.delete_direction()
    }

    pub fn demo_collections(&self) -> Vec<DemoSummary> {
        self.state.demo.summaries()
    }

    /// Feedback message still visible at `now`
    pub fn feedback_at(&self, now: Instant) -> Option<&str> {
        self.feedback
            .as_ref()
            .filter(|f| now < f.expires_at)
            .map(|f| f.message.as_str())
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback_at(Instant::now())
    }

    /// A mutation is in flight; controls should be disabled
    pub fn is_processing(&self) -> bool {
        self.coordinator.is_busy()
    }

    /// Shared handle for observing the processing state from elsewhere
    pub fn coordinator(&self) -> Arc<MutationCoordinator> {
        self.coordinator.clone()
    }

    // ===== Opening =====

    /// Open a local folder; `None` means the picker was dismissed
    pub async fn open_local(&mut self, root: Option<PathBuf>) -> Result<OpenOutcome, AppError> {
        self.require_view(View::Start, "open a folder")?;
        let Some(root) = root else {
            tracing::info!("Folder selection cancelled");
            return Ok(OpenOutcome::Cancelled);
        };

        let library = &self.state.config().library;
        let source = LocalSource::new(
            root,
            self.state.blobs.clone(),
            self.state.thumbnail_service(),
            library.scan_trash_folder,
        )?;
        let collection = source.open().await?;

        self.begin_session(collection, Source::Local(source), View::Grid);
        Ok(OpenOutcome::Opened)
    }

    pub async fn open_demo(&mut self, id: &str) -> Result<OpenOutcome, AppError> {
        self.require_view(View::Start, "open a demo")?;

        let source = DemoSource::new(self.state.config().demo.latency());
        let collection = source.open(&self.state.demo, id).await?;

        self.begin_session(collection, Source::Demo(source), View::Grid);
        Ok(OpenOutcome::Opened)
    }

    /// Start a remote session. A missing or unauthorized library means the
    /// user abandoned the connect flow.
    pub async fn connect_remote(
        &mut self,
        library: Option<Arc<dyn RemoteLibrary>>,
    ) -> Result<OpenOutcome, AppError> {
        self.require_view(View::Start, "connect")?;
        let Some(library) = library.filter(|l| l.is_connected()) else {
            tracing::info!("Remote connection cancelled");
            return Ok(OpenOutcome::Cancelled);
        };

        let config = self.state.config();
        let source = RemoteSource::new(library, &config.remote, config.library.thumbnail_size);
        let collection = match source.open().await {
            Ok(collection) => collection,
            Err(e) => {
                source.sign_out().await;
                return Err(e);
            }
        };

        self.begin_session(collection, Source::Remote(source), View::Swipe);
        Ok(OpenOutcome::Opened)
    }

    fn begin_session(&mut self, collection: Collection, source: Source, view: View) {
        tracing::info!(
            "Session started: {} ({} photos, {})",
            collection.name,
            collection.len(),
            collection.source().as_str()
        );
        self.session = Some(Session { collection, source });
        self.view = view;
        self.cursor = 0;
        self.last_viewed_index = None;
        self.last_used_album = None;
        self.feedback = None;
    }

    // ===== Navigation =====

    pub fn select_photo(&mut self, index: usize) -> Result<(), AppError> {
        self.require_view(View::Grid, "select a photo")?;
        let len = self.collection().map_or(0, Collection::len);
        if index >= len {
            return Err(AppError::IndexOutOfRange { index, len });
        }

        self.cursor = index;
        self.view = View::Swipe;
        Ok(())
    }

    pub async fn back(&mut self) -> Result<View, AppError> {
        let source = self.collection().map(Collection::source);

        match (self.view, source) {
            (View::Swipe, Some(PhotoSource::Remote)) => {
                if let Some(Session { source: Source::Remote(remote), .. }) = &self.session {
                    remote.sign_out().await;
                }
                self.end_session();
            }
            (View::Swipe, Some(_)) => {
                let len = self.collection().map_or(0, Collection::len);
                self.last_viewed_index = Some(self.cursor.min(len.saturating_sub(1)));
                self.feedback = None;
                self.view = View::Grid;
            }
            (View::Grid, _) => self.end_session(),
            (view, _) => {
                return Err(AppError::InvalidTransition(format!("no way back from {:?}", view)));
            }
        }

        Ok(self.view)
    }

    /// Discard the collection and give back its transient locators
    fn end_session(&mut self) {
        if let Some(session) = self.session.take() {
            let released: usize = session
                .collection
                .photos()
                .iter()
                .map(|p| self.state.blobs.release(p))
                .sum();
            tracing::info!("Session closed: {} ({} locators released)", session.collection.name, released);
        }
        self.view = View::Start;
        self.cursor = 0;
        self.last_viewed_index = None;
        self.last_used_album = None;
        self.feedback = None;
    }

    /// End any session and release everything
    pub async fn shutdown(&mut self) {
        if let Some(Session { source: Source::Remote(remote), .. }) = &self.session {
            remote.sign_out().await;
        }
        self.end_session();
        self.state.teardown();
    }

    // ===== Gestures =====

    /// Advance without touching the store
    pub fn keep(&mut self) -> Result<(), AppError> {
        self.require_view(View::Swipe, "keep")?;
        if self.current_photo().is_none() {
            return Err(AppError::NoActivePhoto);
        }
        self.cursor += 1;
        Ok(())
    }

    /// Delete the current photo. The next photo moves under the cursor.
    pub async fn delete(&mut self) -> Result<(), AppError> {
        self.mutate(Mutation::Delete).await?;
        Ok(())
    }

    pub async fn move_to_album(&mut self, album_id: &str) -> Result<(), AppError> {
        if album_id.is_empty() {
            return Err(AppError::NoAlbumSelected);
        }

        let moved = self
            .mutate(Mutation::Move { album_id: album_id.to_string() })
            .await
            .map(into_photo)?;

        // The source reports the album the photo actually landed in
        let album_id = moved.path;
        let title = self
            .collection()
            .and_then(|c| c.album(&album_id))
            .map_or_else(|| album_id.clone(), |a| a.title.clone());
        self.cursor += 1;
        self.last_used_album = Some(album_id);
        self.feedback = Some(Feedback {
            message: format!("Moved to: {}", title),
            expires_at: Instant::now() + self.state.config().general.feedback_duration(),
        });
        Ok(())
    }

    /// Move to the album used last
    pub async fn repeat_last_move(&mut self) -> Result<(), AppError> {
        let album_id = self.last_used_album.clone().ok_or(AppError::NoAlbumSelected)?;
        self.move_to_album(&album_id).await
    }

    pub async fn rename(&mut self, new_name: &str) -> Result<Photo, AppError> {
        self.mutate(Mutation::Rename { new_name: new_name.to_string() }).await.map(into_photo)
    }

    pub async fn toggle_favorite(&mut self) -> Result<Photo, AppError> {
        self.mutate(Mutation::ToggleFavorite).await.map(into_photo)
    }

    /// Swipe in a direction: the configured delete direction deletes, the
    /// other one keeps
    pub async fn swipe(&mut self, direction: SwipeDirection) -> Result<(), AppError> {
        if direction == self.delete_direction() {
            self.delete().await
        } else {
            self.keep()
        }
    }

    pub async fn create_album(&mut self, title: &str) -> Result<Album, AppError> {
        let session = self.session.as_mut().ok_or_else(|| {
            AppError::InvalidTransition("no collection to create an album in".to_string())
        })?;

        let album = session.source.create_album(title).await?;
        session.collection.insert_album(album.clone())?;
        tracing::info!("Album created: {}", album.title);
        Ok(album)
    }

    pub fn set_delete_direction(&mut self, direction: SwipeDirection) -> Result<(), AppError> {
        self.state.settings.set_delete_direction(direction)?;
        tracing::info!("Delete direction set to {}", direction.as_str());
        Ok(())
    }

    /// Route an intent to its operation
    pub async fn dispatch(&mut self, intent: Intent) -> Result<(), AppError> {
        tracing::debug!("Intent {}", intent.id());
        match intent {
            Intent::SelectPhoto(index) => self.select_photo(index),
            Intent::Keep => self.keep(),
            Intent::Delete => self.delete().await,
            Intent::Swipe(direction) => self.swipe(direction).await,
            Intent::MoveToAlbum(album_id) => self.move_to_album(&album_id).await,
            Intent::RepeatLastMove => self.repeat_last_move().await,
            Intent::Rename(name) => self.rename(&name).await.map(|_| ()),
            Intent::ToggleFavorite => self.toggle_favorite().await.map(|_| ()),
            Intent::CreateAlbum(title) => self.create_album(&title).await.map(|_| ()),
            Intent::SetDeleteDirection(direction) => self.set_delete_direction(direction),
            Intent::Back => self.back().await.map(|_| ()),
        }
    }

    async fn mutate(&mut self, mutation: Mutation) -> Result<MutationOutcome, AppError> {
        self.require_view(View::Swipe, "change a photo")?;
        let session = self.session.as_mut().ok_or(AppError::NoActivePhoto)?;
        if self.cursor >= session.collection.len() {
            return Err(AppError::NoActivePhoto);
        }

        self.coordinator
            .apply(&session.source, &mut session.collection, self.cursor, &mutation)
            .await
    }

    fn require_view(&self, view: View, action: &str) -> Result<(), AppError> {
        if self.view != view {
            return Err(AppError::InvalidTransition(format!(
                "cannot {} in {:?} view",
                action, self.view
            )));
        }
        Ok(())
    }
}

fn into_photo(outcome: MutationOutcome) -> Photo {
    match outcome {
        MutationOutcome::Removed(photo) | MutationOutcome::Replaced(photo) => photo,
    }
}
