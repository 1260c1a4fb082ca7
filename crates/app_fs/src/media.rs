//! Media scanning - recursive directory walk and media classification

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Reserved subfolder that receives deleted media
pub const TRASH_DIR: &str = "swiptrash";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Kind of reviewable media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "video")]
    Video,
}

/// Classify a filename by extension (case-insensitive)
pub fn media_kind(name: &str) -> Option<MediaKind> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// A media file found during a scan
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Folder relative to the scan root, `/`-separated, empty at top level
    pub rel_dir: String,
    pub name: String,
    pub abs_path: PathBuf,
    pub kind: MediaKind,
    /// Modification time in milliseconds since the epoch
    pub modified: Option<i64>,
}

impl ScannedFile {
    /// Relative path including the filename
    pub fn rel_path(&self) -> String {
        join_rel(&self.rel_dir, &self.name)
    }
}

/// Scan output: files in traversal order and album folder paths
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub files: Vec<ScannedFile>,
    pub albums: Vec<String>,
}

/// Options for scanning a media tree
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Descend into the trash folder (it is never listed as an album)
    pub include_trash: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { include_trash: true }
    }
}

/// Recursively scan `root` for media files and album folders.
///
/// Traversal is depth-first; callers that need a stable order sort the result.
pub fn scan_media<P: AsRef<Path>>(root: P, options: &ScanOptions) -> Result<ScanResult> {
    let root = root.as_ref();

    if !root.exists() {
        return Err(crate::FsError::NotFound(root.display().to_string()));
    }

    if !root.is_dir() {
        return Err(crate::FsError::InvalidPath(format!("Not a directory: {}", root.display())));
    }

    let mut result = ScanResult::default();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| options.include_trash || !is_trash_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel = rel_string(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if !is_trash_dir(&entry) {
                result.albums.push(rel);
            }
        } else if file_type.is_file() {
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(kind) = media_kind(&name) else {
                continue;
            };

            let rel_dir = match rel.rsplit_once('/') {
                Some((dir, _)) => dir.to_string(),
                None => String::new(),
            };

            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as i64);

            result.files.push(ScannedFile {
                rel_dir,
                name,
                abs_path: entry.into_path(),
                kind,
                modified,
            });
        }
    }

    tracing::debug!(
        "Scanned {}: {} media files, {} albums",
        root.display(),
        result.files.len(),
        result.albums.len()
    );
    Ok(result)
}

/// The trash folder sits directly under the scan root
fn is_trash_dir(entry: &DirEntry) -> bool {
    entry.depth() == 1 && entry.file_type().is_dir() && entry.file_name() == TRASH_DIR
}

fn rel_string(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn join_rel(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_media_kind() {
        assert_eq!(media_kind("a.jpg"), Some(MediaKind::Image));
        assert_eq!(media_kind("a.JPEG"), Some(MediaKind::Image));
        assert_eq!(media_kind("clip.MoV"), Some(MediaKind::Video));
        assert_eq!(media_kind("clip.webm"), Some(MediaKind::Video));
        assert_eq!(media_kind("notes.txt"), None);
        assert_eq!(media_kind("jpg"), None);
    }

    #[test]
    fn test_scan_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Trip/Day1")).unwrap();
        fs::create_dir_all(root.join(TRASH_DIR)).unwrap();
        fs::write(root.join("a.jpg"), b"x").unwrap();
        fs::write(root.join("readme.md"), b"x").unwrap();
        fs::write(root.join("Trip/Day1/clip.mp4"), b"x").unwrap();
        fs::write(root.join(TRASH_DIR).join("old.png"), b"x").unwrap();

        let result = scan_media(root, &ScanOptions::default()).unwrap();

        let mut albums = result.albums.clone();
        albums.sort();
        assert_eq!(albums, vec!["Trip", "Trip/Day1"]);

        let mut paths: Vec<String> = result.files.iter().map(|f| f.rel_path()).collect();
        paths.sort();
        assert_eq!(paths, vec!["Trip/Day1/clip.mp4", "a.jpg", "swiptrash/old.png"]);

        let clip = result.files.iter().find(|f| f.name == "clip.mp4").unwrap();
        assert_eq!(clip.kind, MediaKind::Video);
        assert_eq!(clip.rel_dir, "Trip/Day1");
    }

    #[test]
    fn test_scan_without_trash() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(TRASH_DIR)).unwrap();
        fs::write(dir.path().join(TRASH_DIR).join("old.png"), b"x").unwrap();

        let options = ScanOptions { include_trash: false };
        let result = scan_media(dir.path(), &options).unwrap();
        assert!(result.files.is_empty());
        assert!(result.albums.is_empty());
    }

    #[test]
    fn test_nested_trash_name_is_an_album() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Trip").join(TRASH_DIR)).unwrap();
        fs::write(dir.path().join("Trip").join(TRASH_DIR).join("b.jpg"), b"x").unwrap();

        let options = ScanOptions { include_trash: false };
        let result = scan_media(dir.path(), &options).unwrap();

        let mut albums = result.albums.clone();
        albums.sort();
        assert_eq!(albums, vec!["Trip".to_string(), format!("Trip/{}", TRASH_DIR)]);
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].rel_dir, format!("Trip/{}", TRASH_DIR));
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_media(dir.path().join("missing"), &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, crate::FsError::NotFound(_)));
    }
}
