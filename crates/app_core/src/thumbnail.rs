//! Thumbnail generation with a bounded wait
//!
//! Decoding runs on the blocking pool. Videos, decode failures and slow
//! decodes fall back to a caller-supplied locator so opening a folder never
//! hangs on one bad file.

use crate::{AppError, BlobRegistry};
use app_fs::MediaKind;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const JPEG_QUALITY: u8 = 70;

/// Produces preview locators for local media
#[derive(Clone)]
pub struct ThumbnailService {
    size: u32,
    timeout: Duration,
    blobs: Arc<BlobRegistry>,
}

impl ThumbnailService {
    pub fn new(size: u32, timeout: Duration, blobs: Arc<BlobRegistry>) -> Self {
        Self { size: size.max(1), timeout, blobs }
    }

    /// Locator of a preview for `path`, or `fallback` when none can be made
    /// within the timeout
    pub async fn generate(&self, path: &Path, kind: MediaKind, fallback: &str) -> String {
        if kind == MediaKind::Video {
            return fallback.to_string();
        }

        let size = self.size;
        let source: PathBuf = path.to_path_buf();
        let task = tokio::task::spawn_blocking(move || encode_thumbnail(&source, size));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(bytes))) => self.blobs.register_bytes("image/jpeg", bytes),
            Ok(Ok(Err(e))) => {
                tracing::warn!("Thumbnail failed for {}: {}", path.display(), e);
                fallback.to_string()
            }
            Ok(Err(e)) => {
                tracing::warn!("Thumbnail task failed for {}: {}", path.display(), e);
                fallback.to_string()
            }
            Err(_) => {
                tracing::warn!(
                    "Thumbnail timed out after {:?} for {}, using original",
                    self.timeout,
                    path.display()
                );
                fallback.to_string()
            }
        }
    }
}

/// Decode an image and encode a JPEG that fits a `size` square
pub fn encode_thumbnail(path: &Path, size: u32) -> Result<Vec<u8>, AppError> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let thumb = img.thumbnail(size, size).to_rgb8();

    let mut out = Vec::new();
    thumb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::BlobData;
    use image::GenericImageView;

    fn service(blobs: &Arc<BlobRegistry>) -> ThumbnailService {
        ThumbnailService::new(250, Duration::from_secs(10), blobs.clone())
    }

    #[tokio::test]
    async fn test_image_thumbnail_is_registered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbImage::from_pixel(800, 400, image::Rgb([200, 10, 10])).save(&path).unwrap();

        let blobs = Arc::new(BlobRegistry::new());
        let locator = service(&blobs).generate(&path, MediaKind::Image, "fallback").await;
        assert!(BlobRegistry::is_blob(&locator));

        let Some(BlobData::Bytes { mime, data }) = blobs.resolve(&locator) else {
            panic!("expected in-memory thumbnail");
        };
        assert_eq!(mime, "image/jpeg");
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!(decoded.dimensions(), (250, 125));
    }

    #[tokio::test]
    async fn test_video_uses_fallback() {
        let blobs = Arc::new(BlobRegistry::new());
        let locator = service(&blobs)
            .generate(Path::new("/nowhere/clip.mp4"), MediaKind::Video, "blob:original")
            .await;
        assert_eq!(locator, "blob:original");
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("large.png");
        image::RgbImage::from_pixel(2000, 2000, image::Rgb([10, 200, 10])).save(&path).unwrap();

        let blobs = Arc::new(BlobRegistry::new());
        let impatient = ThumbnailService::new(250, Duration::ZERO, blobs.clone());
        let locator = impatient.generate(&path, MediaKind::Image, "blob:original").await;

        assert_eq!(locator, "blob:original");
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let blobs = Arc::new(BlobRegistry::new());
        let locator = service(&blobs).generate(&path, MediaKind::Image, "blob:original").await;
        assert_eq!(locator, "blob:original");
    }
}
