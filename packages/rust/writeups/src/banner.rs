//! Banner image resizing.

use std::path::Path;

use image::imageops::FilterType;

use foliofetch_shared::{FolioFetchError, Result};

/// Minimum display width for banner images, in pixels.
pub const MIN_BANNER_WIDTH: u32 = 950;

/// Resize a banner in place so its width is at least [`MIN_BANNER_WIDTH`],
/// preserving aspect ratio with Lanczos3 resampling.
///
/// Returns `Ok(true)` when the image was resized and rewritten, `Ok(false)`
/// when it was already wide enough. Decode and encode failures are errors
/// for the caller to log; they never abort the pipeline.
pub fn ensure_min_width(path: &Path) -> Result<bool> {
    let img = image::open(path)
        .map_err(|e| FolioFetchError::Image(format!("{}: {e}", path.display())))?;

    if img.width() >= MIN_BANNER_WIDTH {
        return Ok(false);
    }

    let scale = f64::from(MIN_BANNER_WIDTH) / f64::from(img.width());
    let height = (f64::from(img.height()) * scale).round() as u32;

    let resized = img.resize_exact(MIN_BANNER_WIDTH, height, FilterType::Lanczos3);
    resized
        .save(path)
        .map_err(|e| FolioFetchError::Image(format!("{}: {e}", path.display())))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn save_test_png(path: &Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([40, 80, 120]))
            .save(path)
            .expect("save test png");
    }

    #[test]
    fn narrow_banner_is_upscaled_preserving_aspect() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("banner.png");
        save_test_png(&path, 100, 40);

        assert!(ensure_min_width(&path).unwrap());

        let resized = image::open(&path).unwrap();
        assert_eq!(resized.width(), 950);
        // round(40 * 950/100)
        assert_eq!(resized.height(), 380);
    }

    #[test]
    fn wide_banner_is_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("banner.png");
        save_test_png(&path, 1200, 300);

        assert!(!ensure_min_width(&path).unwrap());

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (1200, 300));
    }

    #[test]
    fn exact_threshold_width_is_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("banner.png");
        save_test_png(&path, 950, 100);

        assert!(!ensure_min_width(&path).unwrap());
    }

    #[test]
    fn undecodable_banner_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("banner.png");
        std::fs::write(&path, b"not a png").unwrap();

        let err = ensure_min_width(&path).unwrap_err();
        assert!(matches!(err, FolioFetchError::Image(_)));
    }
}
