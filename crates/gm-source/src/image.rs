use std::path::Path;

use gm_core::error::CoreError;
use gm_core::frame::FrameBuffer;
use image::DynamicImage;

/// Charge une image depuis le disque en buffer RGBA.
///
/// # Errors
/// Returns [`CoreError::ImageLoad`] if the file is missing or cannot be decoded.
///
/// # Example
/// ```no_run
/// use gm_source::image::load_image;
/// use std::path::Path;
/// let frame = load_image(Path::new("photo.jpg")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<FrameBuffer, CoreError> {
    let img = image::open(path).map_err(|e| CoreError::ImageLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    log::debug!(
        "Image chargée : {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(from_dynamic(&img))
}

/// Décode une image encodée (PNG, JPEG, BMP, GIF) déjà en mémoire.
///
/// # Errors
/// Returns [`CoreError::ImageLoad`] if the bytes cannot be decoded.
pub fn decode_image(bytes: &[u8]) -> Result<FrameBuffer, CoreError> {
    let img = image::load_from_memory(bytes).map_err(|e| CoreError::ImageLoad {
        path: "<mémoire>".into(),
        reason: e.to_string(),
    })?;
    Ok(from_dynamic(&img))
}

/// Convertit une image décodée par le crate `image` en `FrameBuffer`.
///
/// # Example
/// ```
/// use gm_source::image::from_dynamic;
/// let img = image::DynamicImage::new_rgb8(4, 3);
/// let frame = from_dynamic(&img);
/// assert_eq!((frame.width, frame.height), (4, 3));
/// ```
#[must_use]
pub fn from_dynamic(img: &DynamicImage) -> FrameBuffer {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameBuffer {
        data: rgba.into_raw(),
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_image_load_error() {
        let err = load_image(Path::new("/nonexistent/nope.png")).unwrap_err();
        assert!(err.is_image_load());
    }

    #[test]
    fn garbage_file_is_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(load_image(&path).unwrap_err().is_image_load());
    }

    #[test]
    fn png_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbImage::from_pixel(5, 2, image::Rgb([200, 10, 10]))
            .save(&path)
            .unwrap();
        let frame = load_image(&path).unwrap();
        assert_eq!((frame.width, frame.height), (5, 2));
        assert_eq!(frame.pixel(4, 1), (200, 10, 10, 255));
    }

    #[test]
    fn decode_image_rejects_garbage() {
        assert!(decode_image(&[0, 1, 2, 3]).is_err());
    }
}
