//! File operations on a media tree rooted at one directory
//!
//! All relative paths are `/`-separated and interpreted below the root.
//! Operations never overwrite an existing file and leave the source file
//! untouched when they fail.

use crate::{naming, FsError, Result, TRASH_DIR};
use std::path::{Path, PathBuf};

/// Handle to a media tree on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();

        if !root.exists() {
            return Err(FsError::NotFound(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(FsError::InvalidPath(format!("Not a directory: {}", root.display())));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Display name of the root folder
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Resolve a relative folder, optionally creating intermediate folders
    pub fn resolve_dir(&self, rel_dir: &str, create: bool) -> Result<PathBuf> {
        let mut dir = self.root.clone();
        for part in rel_dir.split('/').filter(|p| !p.is_empty()) {
            if part == "." || part == ".." {
                return Err(FsError::InvalidPath(rel_dir.to_string()));
            }
            dir.push(part);
        }

        if !dir.is_dir() {
            if !create {
                return Err(FsError::NotFound(dir.display().to_string()));
            }
            std::fs::create_dir_all(&dir)?;
        }

        Ok(dir)
    }

    /// Move `filename` from `rel_dir` into the album folder `album_path`,
    /// creating the target folders. Fails with `AlreadyExists` instead of
    /// overwriting. The trash is not a valid target.
    pub fn relocate(&self, rel_dir: &str, filename: &str, album_path: &str) -> Result<PathBuf> {
        let album_path = album_target(album_path)?;
        let source = self.existing_file(rel_dir, filename)?;
        let target_dir = self.resolve_dir(&album_path, true)?;
        let target = target_dir.join(filename);

        if target.exists() {
            return Err(FsError::AlreadyExists(target));
        }

        move_file(&source, &target)?;
        tracing::info!("Moved: {} -> {}", source.display(), target.display());
        Ok(target)
    }

    /// Move a file into the trash folder. A same-named file already in the
    /// trash is kept; the incoming file gets a ` (n)` suffix instead.
    pub fn move_to_trash(&self, rel_dir: &str, filename: &str) -> Result<PathBuf> {
        if rel_dir.split('/').next() == Some(TRASH_DIR) {
            return Err(FsError::InvalidOperation(format!("{} is already in the trash", filename)));
        }

        let source = self.existing_file(rel_dir, filename)?;
        let trash_dir = self.resolve_dir(TRASH_DIR, true)?;
        let target = unique_target(&trash_dir, filename);

        if target.file_name().map(|n| n != filename).unwrap_or(false) {
            tracing::warn!("{} already in trash, storing as {}", filename, target.display());
        }

        move_file(&source, &target)?;
        tracing::info!("Moved to trash: {} -> {}", source.display(), target.display());
        Ok(target)
    }

    /// Rename a file inside its folder. The collision check happens before
    /// anything is touched.
    pub fn rename_in_place(&self, rel_dir: &str, from: &str, to: &str) -> Result<PathBuf> {
        if !naming::is_valid_filename(to) {
            return Err(FsError::InvalidName(to.to_string()));
        }

        let source = self.existing_file(rel_dir, from)?;
        let target = source.with_file_name(to);

        if target.exists() {
            return Err(FsError::AlreadyExists(target));
        }

        move_file(&source, &target)?;
        tracing::info!("Renamed: {} -> {}", source.display(), target.display());
        Ok(target)
    }

    /// Create nested album folders for a normalized `/`-separated path
    pub fn create_album_dir(&self, album_path: &str) -> Result<PathBuf> {
        let album_path = album_target(album_path)?;
        let dir = album_path
            .split('/')
            .fold(self.root.clone(), |dir, part| dir.join(part));

        if dir.exists() {
            return Err(FsError::AlreadyExists(dir));
        }

        std::fs::create_dir_all(&dir)?;
        tracing::info!("Created album folder: {}", dir.display());
        Ok(dir)
    }

    fn existing_file(&self, rel_dir: &str, filename: &str) -> Result<PathBuf> {
        let path = self.resolve_dir(rel_dir, false)?.join(filename);
        if !path.is_file() {
            return Err(FsError::NotFound(path.display().to_string()));
        }
        Ok(path)
    }
}

/// Normalize an album path and refuse the reserved trash folder
pub fn album_target(album_path: &str) -> Result<String> {
    let album_path = naming::normalize_album_path(album_path)?;
    if album_path.split('/').next() == Some(TRASH_DIR) {
        return Err(FsError::InvalidName(format!("{} is reserved", TRASH_DIR)));
    }
    Ok(album_path)
}

/// Move a single file. Uses an atomic rename and falls back to
/// copy + delete across filesystems; the source is only removed after the
/// copy completed.
fn move_file(source: &Path, target: &Path) -> Result<()> {
    match std::fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) => {
            // Unix: EXDEV = 18, Windows: ERROR_NOT_SAME_DEVICE = 17
            let is_cross_device = match e.raw_os_error() {
                Some(18) => cfg!(unix),
                Some(17) => cfg!(windows),
                _ => false,
            };

            if !is_cross_device {
                return Err(e.into());
            }

            tracing::info!(
                "Cross-filesystem move, using copy+delete: {} -> {}",
                source.display(),
                target.display()
            );
            if let Err(e) = std::fs::copy(source, target) {
                let _ = std::fs::remove_file(target);
                return Err(e.into());
            }
            std::fs::remove_file(source)?;
            Ok(())
        }
    }
}

/// First free name in `dir`: `name`, then `base (1).ext`, `base (2).ext`, ...
fn unique_target(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let (base, ext) = naming::split_extension(filename);
    (1..)
        .map(|n| dir.join(format!("{} ({}){}", base, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
