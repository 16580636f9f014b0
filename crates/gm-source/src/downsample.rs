use gm_core::color::luminance_601;
use gm_core::config::Resample;
use gm_core::error::CoreError;
use gm_core::frame::{Downsampled, FrameBuffer};

use crate::resize::Resizer;

/// Nombre de lignes de la grille pour une source `src_width × src_height`.
///
/// `floor(width × (src_height / src_width) × vertical_correction)`.
///
/// # Example
/// ```
/// use gm_source::downsample::grid_rows;
/// assert_eq!(grid_rows(640, 480, 120, 0.5), 45);
/// assert_eq!(grid_rows(10_000, 10, 120, 0.5), 0);
/// ```
#[must_use]
pub fn grid_rows(src_width: u32, src_height: u32, width: u32, vertical_correction: f64) -> u32 {
    if src_width == 0 {
        return 0;
    }
    let aspect = f64::from(src_height) / f64::from(src_width);
    (aspect * f64::from(width) * vertical_correction).floor() as u32
}

/// Réduit une frame à la grille de caractères, en luminance + couleur.
///
/// Garde le resizer entre deux appels (une instance par flux de frames).
pub struct Downsampler {
    resizer: Resizer,
}

impl Downsampler {
    /// Create a downsampler using `resample` (box/area by default).
    #[must_use]
    pub fn new(resample: Resample) -> Self {
        Self {
            resizer: Resizer::new(resample),
        }
    }

    /// Réduit `frame` à `width × grid_rows(..)` échantillons.
    ///
    /// La source est redimensionnée une seule fois ; la luminance est dérivée
    /// de chaque échantillon couleur, donc les deux buffers partagent les
    /// mêmes positions.
    ///
    /// # Errors
    /// - [`CoreError::Config`] if `width == 0`.
    /// - [`CoreError::InvalidDimensions`] for an empty source frame.
    /// - [`CoreError::DegenerateGeometry`] if the grid would have zero rows.
    ///
    /// # Example
    /// ```
    /// use gm_core::config::Resample;
    /// use gm_core::frame::FrameBuffer;
    /// use gm_source::downsample::Downsampler;
    /// let frame = FrameBuffer::filled(640, 480, (255, 255, 255));
    /// let out = Downsampler::new(Resample::Box).run(&frame, 120, 0.5).unwrap();
    /// assert_eq!((out.width, out.height), (120, 45));
    /// assert!(out.luminance.iter().all(|&l| l == 255));
    /// ```
    pub fn run(
        &mut self,
        frame: &FrameBuffer,
        width: u32,
        vertical_correction: f64,
    ) -> Result<Downsampled, CoreError> {
        if width == 0 {
            return Err(CoreError::Config("width doit être > 0".into()));
        }
        if frame.width == 0 || frame.height == 0 {
            return Err(CoreError::InvalidDimensions {
                width: frame.width,
                height: frame.height,
            });
        }

        let height = grid_rows(frame.width, frame.height, width, vertical_correction);
        if height == 0 {
            return Err(CoreError::DegenerateGeometry {
                width,
                src_width: frame.width,
                src_height: frame.height,
            });
        }

        let mut small = FrameBuffer::new(width, height);
        self.resizer.resize_into(frame, &mut small).map_err(|e| {
            log::error!("Downsample {}x{} → {width}x{height} : {e:#}", frame.width, frame.height);
            CoreError::InvalidDimensions { width, height }
        })?;

        let mut luminance = Vec::with_capacity(width as usize * height as usize);
        let mut colors = Vec::with_capacity(width as usize * height as usize);
        for px in small.data.chunks_exact(4) {
            luminance.push(luminance_601(px[0], px[1], px[2]));
            colors.push((px[0], px[1], px[2]));
        }

        Ok(Downsampled {
            width,
            height,
            luminance,
            colors,
        })
    }
}

impl Default for Downsampler {
    fn default() -> Self {
        Self::new(Resample::default())
    }
}

/// Convenience for one-shot usage (allocates a fresh resizer).
///
/// # Errors
/// Same conditions as [`Downsampler::run`].
pub fn downsample(
    frame: &FrameBuffer,
    width: u32,
    vertical_correction: f64,
    resample: Resample,
) -> Result<Downsampled, CoreError> {
    Downsampler::new(resample).run(frame, width, vertical_correction)
}
