//! Mutation coordinator
//!
//! Routes a mutation to the source of the active collection and applies the
//! in-memory equivalent only after the store reported success. At most one
//! mutation is in flight: the coordinator is `Idle` or `Busy(kind)` and a
//! second request while busy is rejected without touching anything.

use crate::source::Source;
use crate::{AppError, BlobRegistry, Collection, Photo};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Delete,
    Move,
    Rename,
    ToggleFavorite,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationKind::Delete => "delete",
            MutationKind::Move => "move",
            MutationKind::Rename => "rename",
            MutationKind::ToggleFavorite => "favorite toggle",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Busy(MutationKind),
}

/// A store mutation for one photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Delete,
    Move { album_id: String },
    Rename { new_name: String },
    ToggleFavorite,
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Delete => MutationKind::Delete,
            Mutation::Move { .. } => MutationKind::Move,
            Mutation::Rename { .. } => MutationKind::Rename,
            Mutation::ToggleFavorite => MutationKind::ToggleFavorite,
        }
    }
}

/// What a completed mutation means for the collection
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The photo leaves the sequence
    Removed(Photo),
    /// The photo's entry is replaced in place
    Replaced(Photo),
}

pub struct MutationCoordinator {
    state: Mutex<CoordinatorState>,
    blobs: Arc<BlobRegistry>,
}

/// Returns the coordinator to `Idle` however the mutation ends
struct BusyGuard<'a> {
    state: &'a Mutex<CoordinatorState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock() = CoordinatorState::Idle;
    }
}

impl MutationCoordinator {
    pub fn new(blobs: Arc<BlobRegistry>) -> Self {
        Self {
            state: Mutex::new(CoordinatorState::Idle),
            blobs,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        *self.state.lock()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state(), CoordinatorState::Busy(_))
    }

    fn begin(&self, kind: MutationKind) -> Result<BusyGuard<'_>, AppError> {
        let mut state = self.state.lock();
        if let CoordinatorState::Busy(current) = *state {
            tracing::debug!("Rejected {} while {} is in flight", kind, current);
            return Err(AppError::Busy(current));
        }
        *state = CoordinatorState::Busy(kind);
        Ok(BusyGuard { state: &self.state })
    }

    /// Perform the mutation against the store. Nothing in memory changes.
    pub async fn execute(
        &self,
        source: &Source,
        photo: &Photo,
        mutation: &Mutation,
    ) -> Result<MutationOutcome, AppError> {
        let _busy = self.begin(mutation.kind())?;

        let outcome = match mutation {
            Mutation::Delete => {
                source.delete(photo).await?;
                MutationOutcome::Removed(photo.clone())
            }
            Mutation::Move { album_id } => {
                MutationOutcome::Replaced(source.move_to_album(photo, album_id).await?)
            }
            Mutation::Rename { new_name } => {
                MutationOutcome::Replaced(source.rename(photo, new_name).await?)
            }
            Mutation::ToggleFavorite => MutationOutcome::Replaced(source.toggle_favorite(photo).await?),
        };

        tracing::debug!("{} of {} completed", mutation.kind(), photo.filename);
        Ok(outcome)
    }

    /// Apply a completed mutation to the collection. Removed photos give
    /// back their transient locators.
    pub fn reconcile(&self, outcome: &MutationOutcome, collection: &mut Collection) -> Result<(), AppError> {
        match outcome {
            MutationOutcome::Removed(photo) => {
                collection
                    .remove_photo(&photo.id)
                    .ok_or_else(|| AppError::Internal(format!("{} is not in the collection", photo.id)))?;
                self.blobs.release(photo);
            }
            MutationOutcome::Replaced(photo) => {
                if !collection.replace_photo(photo.clone()) {
                    return Err(AppError::Internal(format!("{} is not in the collection", photo.id)));
                }
            }
        }
        Ok(())
    }

    /// Mutate the photo at `index`: store first, then the collection.
    /// On failure the collection is untouched.
    pub async fn apply(
        &self,
        source: &Source,
        collection: &mut Collection,
        index: usize,
        mutation: &Mutation,
    ) -> Result<MutationOutcome, AppError> {
        let photo = collection.get(index).cloned().ok_or(AppError::NoActivePhoto)?;
        let outcome = self.execute(source, &photo, mutation).await?;
        self.reconcile(&outcome, collection)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DemoCatalog, DemoSource};
    use std::time::Duration;

    fn demo(latency_ms: u64) -> (Source, Collection) {
        let catalog = DemoCatalog;
        let collection = catalog.collection("demo-family").unwrap();
        (Source::Demo(DemoSource::new(Duration::from_millis(latency_ms))), collection)
    }

    #[tokio::test]
    async fn test_overlapping_mutation_is_rejected() {
        let coordinator = MutationCoordinator::new(Arc::new(BlobRegistry::new()));
        let (source, collection) = demo(50);
        let photo = collection.photos()[0].clone();

        let rename = Mutation::Rename { new_name: "other".into() };
        let (first, second) = tokio::join!(
            coordinator.execute(&source, &photo, &Mutation::ToggleFavorite),
            coordinator.execute(&source, &photo, &rename),
        );

        assert!(matches!(first, Ok(MutationOutcome::Replaced(_))));
        assert!(matches!(second, Err(AppError::Busy(MutationKind::ToggleFavorite))));
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
    }

    #[tokio::test]
    async fn test_failure_resets_busy_and_keeps_collection() {
        let coordinator = MutationCoordinator::new(Arc::new(BlobRegistry::new()));
        let (source, mut collection) = demo(0);
        let before: Vec<_> = collection.photos().to_vec();

        let err = coordinator
            .apply(&source, &mut collection, 0, &Mutation::Rename { new_name: "  ".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidName(_)));
        assert_eq!(collection.photos(), before.as_slice());
        assert!(!coordinator.is_busy());
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let coordinator = MutationCoordinator::new(Arc::new(BlobRegistry::new()));
        let (source, mut collection) = demo(0);
        let before: Vec<_> = collection.photos().iter().map(|p| p.id.clone()).collect();

        coordinator.apply(&source, &mut collection, 2, &Mutation::Delete).await.unwrap();

        let after: Vec<_> = collection.photos().iter().map(|p| p.id.clone()).collect();
        let mut expected = before.clone();
        expected.remove(2);
        assert_eq!(after, expected);
    }

    #[tokio::test]
    async fn test_move_replaces_in_place() {
        let coordinator = MutationCoordinator::new(Arc::new(BlobRegistry::new()));
        let (source, mut collection) = demo(0);

        let move_to = Mutation::Move { album_id: "family-album-2".into() };
        coordinator.apply(&source, &mut collection, 1, &move_to).await.unwrap();

        assert_eq!(collection.len(), 8);
        assert_eq!(collection.photos()[1].path, "family-album-2");
        assert_eq!(collection.photos()[1].id, "set3-photo-2");
    }

    #[tokio::test]
    async fn test_missing_photo() {
        let coordinator = MutationCoordinator::new(Arc::new(BlobRegistry::new()));
        let (source, mut collection) = demo(0);
        let result = coordinator.apply(&source, &mut collection, 99, &Mutation::Delete).await;
        assert!(matches!(result, Err(AppError::NoActivePhoto)));
    }
}
