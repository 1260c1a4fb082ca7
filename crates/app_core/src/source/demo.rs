//! Demo source: a fixed catalog with simulated store latency

use crate::{Album, AppError, Collection, Photo, PhotoSource};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

struct DemoSet {
    id: &'static str,
    name: &'static str,
    set: u32,
    count: u32,
    cover: &'static str,
    albums: &'static [(&'static str, &'static str)],
}

const DEMO_SETS: &[DemoSet] = &[
    DemoSet {
        id: "demo-alps",
        name: "Urlaub in den Alpen",
        set: 1,
        count: 12,
        cover: "https://picsum.photos/id/1015/600/800",
        albums: &[
            ("alps-album-1", "Wanderungen"),
            ("alps-album-2", "Hüttenabende"),
            ("alps-album-3", "Landschaften"),
        ],
    },
    DemoSet {
        id: "demo-paris",
        name: "Städtetrip nach Paris",
        set: 2,
        count: 15,
        cover: "https://picsum.photos/id/1011/600/800",
        albums: &[
            ("paris-album-1", "Sehenswürdigkeiten"),
            ("paris-album-2", "Essen & Trinken"),
            ("paris-album-3", "Nachtleben"),
            ("paris-album-4", "Louvre"),
        ],
    },
    DemoSet {
        id: "demo-family",
        name: "Familienfeier 2024",
        set: 3,
        count: 8,
        cover: "https://picsum.photos/id/103/600/800",
        albums: &[
            ("family-album-1", "Die Gäste"),
            ("family-album-2", "Geschenke"),
        ],
    },
];

/// Start screen entry for a demo collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoSummary {
    pub id: String,
    pub name: String,
    pub cover_image: String,
    pub photo_count: usize,
}

/// The static demo catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoCatalog;

impl DemoCatalog {
    pub fn summaries(&self) -> Vec<DemoSummary> {
        DEMO_SETS
            .iter()
            .map(|set| DemoSummary {
                id: set.id.to_string(),
                name: set.name.to_string(),
                cover_image: set.cover.to_string(),
                photo_count: set.count as usize,
            })
            .collect()
    }

    /// Build a fresh copy of a demo collection
    pub fn collection(&self, id: &str) -> Option<Collection> {
        let set = DEMO_SETS.iter().find(|set| set.id == id)?;

        let photos = (1..=set.count)
            .map(|i| {
                Photo::demo(
                    format!("set{}-photo-{}", set.set, i),
                    format!("image_s{}_{}.jpg", set.set, i),
                    format!("https://picsum.photos/id/{}/600/800", set.set * 100 + i - 1),
                )
            })
            .collect();
        let albums = set.albums.iter().map(|(id, title)| Album::new(*id, *title)).collect();

        Some(Collection::new(set.id, set.name, PhotoSource::Demo, photos, albums))
    }
}

/// Simulated store for a demo collection. Nothing is persisted.
pub struct DemoSource {
    latency: Duration,
    albums: Mutex<HashSet<String>>,
}

impl DemoSource {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            albums: Mutex::new(HashSet::new()),
        }
    }

    pub async fn open(&self, catalog: &DemoCatalog, id: &str) -> Result<Collection, AppError> {
        let collection = catalog
            .collection(id)
            .ok_or_else(|| AppError::FileNotFound(format!("demo collection {}", id)))?;

        self.simulate().await;
        *self.albums.lock() = collection
            .albums()
            .iter()
            .flat_map(|a| [a.id.clone(), a.title.clone()])
            .collect();

        tracing::debug!("Simulating: opened demo collection {}", id);
        Ok(collection)
    }

    pub async fn delete(&self, photo: &Photo) -> Result<(), AppError> {
        self.simulate().await;
        tracing::debug!("Simulating: deleting {}", photo.filename);
        Ok(())
    }

    pub async fn move_to_album(&self, photo: &Photo, album_id: &str) -> Result<Photo, AppError> {
        self.simulate().await;
        tracing::debug!("Simulating: moving {} to album {}", photo.filename, album_id);
        Ok(photo.relocated(photo.filename.clone(), album_id.to_string(), None))
    }

    pub async fn rename(&self, photo: &Photo, new_name: &str) -> Result<Photo, AppError> {
        let candidate = app_fs::renamed_filename(&photo.filename, new_name)?;
        if candidate == photo.filename {
            return Ok(photo.clone());
        }

        self.simulate().await;
        tracing::debug!("Simulating: renaming {} to {}", photo.filename, candidate);
        Ok(photo.relocated(candidate, photo.path.clone(), None))
    }

    pub async fn toggle_favorite(&self, photo: &Photo) -> Result<Photo, AppError> {
        let candidate = app_fs::toggle_favorite_filename(&photo.filename);
        self.simulate().await;
        Ok(photo.relocated(candidate, photo.path.clone(), None))
    }

    /// Register an album in memory; the id is the normalized title
    pub async fn create_album(&self, title: &str) -> Result<Album, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidName("album name must not be empty".to_string()));
        }

        self.simulate().await;
        let mut albums = self.albums.lock();
        if !albums.insert(title.to_string()) {
            return Err(AppError::Collision(title.to_string()));
        }
        tracing::debug!("Simulating: created album {}", title);
        Ok(Album::new(title, title))
    }

    async fn simulate(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shapes() {
        let catalog = DemoCatalog;
        let counts: Vec<_> = catalog.summaries().iter().map(|s| s.photo_count).collect();
        assert_eq!(counts, vec![12, 15, 8]);

        let paris = catalog.collection("demo-paris").unwrap();
        assert_eq!(paris.len(), 15);
        assert_eq!(paris.albums().len(), 4);
        let first = &paris.photos()[0];
        assert_eq!(first.id, "set2-photo-1");
        assert_eq!(first.filename, "image_s2_1.jpg");
        assert_eq!(first.url, "https://picsum.photos/id/200/600/800");
        assert!(paris.is_consistent());

        assert!(catalog.collection("demo-moon").is_none());
    }

    #[tokio::test]
    async fn test_rename_and_favorite_are_simulated() {
        let source = DemoSource::new(Duration::ZERO);
        let collection = source.open(&DemoCatalog, "demo-family").await.unwrap();
        let photo = &collection.photos()[0];

        let fav = source.toggle_favorite(photo).await.unwrap();
        assert_eq!(fav.filename, "image_s3_1_FAV.jpg");
        assert!(fav.is_favorite);

        let renamed = source.rename(&fav, "party").await.unwrap();
        assert_eq!(renamed.filename, "party_FAV.jpg");
        assert!(renamed.store_handle().is_none());
    }

    #[tokio::test]
    async fn test_create_album_rejects_existing() {
        let source = DemoSource::new(Duration::ZERO);
        source.open(&DemoCatalog, "demo-alps").await.unwrap();

        assert!(matches!(source.create_album("Wanderungen").await, Err(AppError::Collision(_))));
        let album = source.create_album("Gipfel").await.unwrap();
        assert_eq!(album.title, "Gipfel");
        assert!(matches!(source.create_album("Gipfel").await, Err(AppError::Collision(_))));
    }
}
