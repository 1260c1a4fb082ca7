//! Filename rules for reviewable media
//!
//! The favorite flag of a local or demo item lives in its filename: the
//! marker is a true suffix of the base name, right before the extension
//! (`beach_FAV.jpg`). A marker elsewhere in the name does not count.

use crate::{FsError, Result};

/// Suffix appended to the base filename of favorites
pub const FAVORITE_MARKER: &str = "_FAV";

/// Characters that cannot appear in a single path component
const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Split a filename into base name and extension (the extension keeps its dot).
///
/// `"a.b.jpg"` -> `("a.b", ".jpg")`, `"noext"` -> `("noext", "")`
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Is this filename marked as favorite?
pub fn is_favorite_filename(name: &str) -> bool {
    split_extension(name).0.ends_with(FAVORITE_MARKER)
}

/// Add or remove the favorite marker
pub fn toggle_favorite_filename(name: &str) -> String {
    let (base, ext) = split_extension(name);

    match base.strip_suffix(FAVORITE_MARKER) {
        Some(plain) => format!("{}{}", plain, ext),
        None => format!("{}{}{}", base, FAVORITE_MARKER, ext),
    }
}

/// Build the filename a rename request resolves to.
///
/// A typed extension is ignored, surrounding whitespace is trimmed, and the
/// current extension plus favorite marker are re-applied. A typed marker is
/// dropped so a rename never changes the favorite flag.
pub fn renamed_filename(current: &str, requested: &str) -> Result<String> {
    let (_, ext) = split_extension(current);
    let favorite_part = if is_favorite_filename(current) { FAVORITE_MARKER } else { "" };

    let requested_base = match requested.rfind('.') {
        Some(idx) => &requested[..idx],
        None => requested,
    };
    let mut requested_base = requested_base.trim();
    while let Some(plain) = requested_base.strip_suffix(FAVORITE_MARKER) {
        requested_base = plain.trim_end();
    }

    if requested_base.is_empty() {
        return Err(FsError::InvalidName("filename must not be empty".to_string()));
    }

    let candidate = format!("{}{}{}", requested_base, favorite_part, ext);
    if !is_valid_filename(&candidate) {
        return Err(FsError::InvalidName(candidate));
    }

    Ok(candidate)
}

/// Check if a name is usable as a single path component
pub fn is_valid_filename(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }

    if name.chars().any(|c| FORBIDDEN_CHARS.contains(&c) || c.is_control()) {
        return false;
    }

    // Trailing dots and spaces are stripped by some filesystems
    !(name.ends_with('.') || name.ends_with(' '))
}

/// Normalize a `/`-separated album path: empty segments are dropped and each
/// segment must be a valid filename.
pub fn normalize_album_path(title: &str) -> Result<String> {
    let parts: Vec<&str> = title
        .split('/')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        return Err(FsError::InvalidName("album name must not be empty".to_string()));
    }

    if let Some(bad) = parts.iter().find(|p| !is_valid_filename(p)) {
        return Err(FsError::InvalidName(bad.to_string()));
    }

    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.b.jpg"), ("a.b", ".jpg"));
        assert_eq!(split_extension("noext"), ("noext", ""));
    }

    #[test]
    fn test_favorite_is_true_suffix() {
        assert!(is_favorite_filename("beach_FAV.jpg"));
        assert!(!is_favorite_filename("beach.jpg"));
        // Marker in the middle of the name is not a favorite
        assert!(!is_favorite_filename("my_FAVorite.jpg"));
        assert!(!is_favorite_filename("x_FAV.y.jpg"));
    }

    #[test]
    fn test_toggle_favorite_twice() {
        let once = toggle_favorite_filename("beach.jpg");
        assert_eq!(once, "beach_FAV.jpg");
        assert_eq!(toggle_favorite_filename(&once), "beach.jpg");

        // Only the suffix is stripped
        assert_eq!(toggle_favorite_filename("_FAV_x_FAV.png"), "_FAV_x.png");
    }

    #[test]
    fn test_rename_preserves_extension_and_marker() {
        assert_eq!(renamed_filename("a.jpg", "sunset").unwrap(), "sunset.jpg");
        assert_eq!(renamed_filename("a.jpg", "sunset.png").unwrap(), "sunset.jpg");
        assert_eq!(renamed_filename("a_FAV.jpg", "  sunset ").unwrap(), "sunset_FAV.jpg");
        assert_eq!(renamed_filename("sunset_FAV.jpg", "a").unwrap(), "a_FAV.jpg");
    }

    #[test]
    fn test_rename_keeps_favorite_flag() {
        let plain = renamed_filename("a.jpg", "b_FAV").unwrap();
        assert_eq!(plain, "b.jpg");
        assert!(!is_favorite_filename(&plain));

        let fav = renamed_filename("a_FAV.jpg", "c_FAV.png").unwrap();
        assert_eq!(fav, "c_FAV.jpg");
        assert_eq!(toggle_favorite_filename(&fav), "c.jpg");

        assert!(matches!(renamed_filename("a.jpg", "_FAV"), Err(FsError::InvalidName(_))));
    }

    #[test]
    fn test_rename_rejects_bad_names() {
        assert!(matches!(renamed_filename("a.jpg", "   "), Err(FsError::InvalidName(_))));
        assert!(matches!(renamed_filename("a.jpg", ".hidden"), Err(FsError::InvalidName(_))));
        assert!(matches!(renamed_filename("a.jpg", "x/y"), Err(FsError::InvalidName(_))));
    }

    #[test]
    fn test_normalize_album_path() {
        assert_eq!(normalize_album_path("Trip/Day1").unwrap(), "Trip/Day1");
        assert_eq!(normalize_album_path("/Trip//Day1/").unwrap(), "Trip/Day1");
        assert!(normalize_album_path("//").is_err());
        assert!(normalize_album_path("Trip/../etc").is_err());
    }
}
