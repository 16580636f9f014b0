use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use gm_core::config::Resample;
use gm_core::frame::FrameBuffer;

/// Resizer réutilisable wrappant fast_image_resize.
///
/// Garde le resizer et le buffer source entre les frames.
///
/// # Example
/// ```
/// use gm_source::resize::Resizer;
/// use gm_core::config::Resample;
/// let r = Resizer::new(Resample::Box);
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch image for source (owned buffer to avoid the mut borrow issue).
    src_buf: Vec<u8>,
}

/// Traduit le filtre de config en algorithme fast_image_resize.
#[must_use]
pub fn resize_alg(resample: Resample) -> ResizeAlg {
    match resample {
        Resample::Box => ResizeAlg::Convolution(FilterType::Box),
        Resample::Nearest => ResizeAlg::Nearest,
        Resample::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
        Resample::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
    }
}

impl Resizer {
    /// Create a new resizer using `resample`.
    #[must_use]
    pub fn new(resample: Resample) -> Self {
        Self {
            inner: FirResizer::new(),
            // L'alpha est ignoré : seule la couleur visible compte.
            options: ResizeOptions::new()
                .resize_alg(resize_alg(resample))
                .use_alpha(false),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// # Errors
    /// Returns an error if the resize operation fails.
    ///
    /// # Example
    /// ```
    /// use gm_source::resize::Resizer;
    /// use gm_core::config::Resample;
    /// use gm_core::frame::FrameBuffer;
    /// let mut r = Resizer::new(Resample::Box);
    /// let src = FrameBuffer::new(100, 100);
    /// let mut dst = FrameBuffer::new(50, 50);
    /// r.resize_into(&src, &mut dst).unwrap();
    /// ```
    pub fn resize_into(&mut self, src: &FrameBuffer, dst: &mut FrameBuffer) -> Result<()> {
        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        // Copie forcée par l'API fast_image_resize (&mut sur la source)
        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image =
            Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8x4)
                .context("Invalid source dimensions")?;

        let mut dst_image =
            Image::from_slice_u8(dst.width, dst.height, &mut dst.data, PixelType::U8x4)
                .context("Invalid destination dimensions")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Resize failed")?;

        Ok(())
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(Resample::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_filter_averages_blocks() {
        // 2×1 : un pixel noir, un pixel blanc → 1×1 gris moyen.
        let mut src = FrameBuffer::new(2, 1);
        src.data[4..7].copy_from_slice(&[255, 255, 255]);
        let mut dst = FrameBuffer::new(1, 1);
        Resizer::new(Resample::Box).resize_into(&src, &mut dst).unwrap();
        let (r, _, _, _) = dst.pixel(0, 0);
        assert!((127..=128).contains(&r), "r={r}");
    }

    #[test]
    fn uniform_source_stays_uniform() {
        let src = FrameBuffer::filled(37, 23, (12, 200, 90));
        let mut dst = FrameBuffer::new(7, 3);
        Resizer::default().resize_into(&src, &mut dst).unwrap();
        for y in 0..3 {
            for x in 0..7 {
                assert_eq!(dst.pixel(x, y), (12, 200, 90, 255));
            }
        }
    }
}
