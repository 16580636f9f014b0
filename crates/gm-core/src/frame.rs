use crate::color::Rgb;
use crate::error::CoreError;

/// Buffer de pixels source. Stocke les pixels en RGBA row-major, 4 bytes par pixel.
///
/// # Example
/// ```
/// use gm_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer noir opaque aux dimensions données.
    ///
    /// # Example
    /// ```
    /// use gm_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(100, 50);
    /// assert_eq!(fb.data.len(), 100 * 50 * 4);
    /// assert_eq!(fb.pixel(0, 0), (0, 0, 0, 255));
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut data = vec![0u8; width as usize * height as usize * 4];
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Buffer uni d'une couleur.
    ///
    /// # Example
    /// ```
    /// use gm_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::filled(4, 3, (10, 20, 30));
    /// assert_eq!(fb.pixel(3, 2), (10, 20, 30, 255));
    /// ```
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let mut fb = Self::new(width, height);
        for px in fb.data.chunks_exact_mut(4) {
            px[0] = color.0;
            px[1] = color.1;
            px[2] = color.2;
        }
        fb
    }

    /// Adopte un buffer RGBA déjà décodé.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if `data.len() != width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        check_len(width, height, 4, data.len())?;
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Importe une frame RGB 3 bytes/pixel.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if `data.len() != width * height * 3`.
    ///
    /// # Example
    /// ```
    /// use gm_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::from_rgb(1, 1, &[1, 2, 3]).unwrap();
    /// assert_eq!(fb.pixel(0, 0), (1, 2, 3, 255));
    /// ```
    pub fn from_rgb(width: u32, height: u32, data: &[u8]) -> Result<Self, CoreError> {
        Self::from_packed3(width, height, data, false)
    }

    /// Importe une frame BGR 3 bytes/pixel, l'ordre natif des captures caméra.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if `data.len() != width * height * 3`.
    ///
    /// # Example
    /// ```
    /// use gm_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::from_bgr(1, 1, &[1, 2, 3]).unwrap();
    /// assert_eq!(fb.pixel(0, 0), (3, 2, 1, 255));
    /// ```
    pub fn from_bgr(width: u32, height: u32, data: &[u8]) -> Result<Self, CoreError> {
        Self::from_packed3(width, height, data, true)
    }

    fn from_packed3(width: u32, height: u32, data: &[u8], bgr: bool) -> Result<Self, CoreError> {
        check_len(width, height, 3, data.len())?;
        let mut out = Vec::with_capacity(data.len() / 3 * 4);
        for px in data.chunks_exact(3) {
            if bgr {
                out.extend_from_slice(&[px[2], px[1], px[0], 255]);
            } else {
                out.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }
        Ok(Self {
            data: out,
            width,
            height,
        })
    }

    /// Accès au pixel (x, y) → (r, g, b, a).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        if idx + 3 >= self.data.len() {
            return (0, 0, 0, 0);
        }
        (
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }
}

fn check_len(width: u32, height: u32, bpp: usize, len: usize) -> Result<(), CoreError> {
    if width == 0 || height == 0 || width as usize * height as usize * bpp != len {
        return Err(CoreError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Sortie du downsampler : luminance et couleur aux mêmes positions.
///
/// Invariant : `luminance.len() == colors.len() == width * height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Downsampled {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Luminance 0–255, row-major.
    pub luminance: Vec<u8>,
    /// Source color per sample, row-major.
    pub colors: Vec<Rgb>,
}

impl Downsampled {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.luminance.len()
    }

    /// True when the grid holds no sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.luminance.is_empty()
    }
}

/// Single cell: glyph borrowed from the palette plus its fill color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphCell<'p> {
    /// Glyphe (un caractère ou une courte chaîne).
    pub glyph: &'p str,
    /// Couleur de remplissage, échantillonnée dans la source.
    pub color: Rgb,
}

/// Grille de glyphes row-major, `width` colonnes × `height` lignes.
///
/// # Example
/// ```
/// use gm_core::frame::{GlyphCell, GlyphGrid};
/// let cells = vec![GlyphCell { glyph: "@", color: (1, 2, 3) }; 6];
/// let grid = GlyphGrid::new(3, 2, cells).unwrap();
/// assert_eq!(grid.get(2, 1).glyph, "@");
/// assert_eq!(grid.rows().count(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid<'p> {
    /// Flat array of cells, row-major.
    pub cells: Vec<GlyphCell<'p>>,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl<'p> GlyphGrid<'p> {
    /// Wrap a flat row-major cell list.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if `cells.len() != width * height`.
    pub fn new(width: u32, height: u32, cells: Vec<GlyphCell<'p>>) -> Result<Self, CoreError> {
        if width as usize * height as usize != cells.len() {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    /// Cell at (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &GlyphCell<'p> {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Rows of `width` consecutive cells.
    pub fn rows(&self) -> impl Iterator<Item = &[GlyphCell<'p>]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Rendu texte brut, une ligne par rangée (sans couleur).
    ///
    /// # Example
    /// ```
    /// use gm_core::frame::{GlyphCell, GlyphGrid};
    /// let c = |g| GlyphCell { glyph: g, color: (0, 0, 0) };
    /// let grid = GlyphGrid::new(2, 2, vec![c("@"), c("."), c(" "), c("@")]).unwrap();
    /// assert_eq!(grid.to_text(), "@.\n @");
    /// ```
    #[must_use]
    pub fn to_text(&self) -> String {
        self.rows()
            .map(|row| row.iter().map(|c| c.glyph).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_imports_reject_bad_lengths() {
        assert!(FrameBuffer::from_rgb(2, 2, &[0; 11]).is_err());
        assert!(FrameBuffer::from_bgr(0, 2, &[]).is_err());
        assert!(FrameBuffer::from_rgba(1, 1, vec![0; 3]).is_err());
    }

    #[test]
    fn bgr_and_rgb_agree_after_swap() {
        let rgb = [10, 20, 30, 40, 50, 60];
        let bgr = [30, 20, 10, 60, 50, 40];
        assert_eq!(
            FrameBuffer::from_rgb(2, 1, &rgb).unwrap(),
            FrameBuffer::from_bgr(2, 1, &bgr).unwrap()
        );
    }

    #[test]
    fn grid_rejects_mismatched_cells() {
        let cells = vec![GlyphCell { glyph: "#", color: (0, 0, 0) }; 5];
        assert!(GlyphGrid::new(3, 2, cells).is_err());
    }

    #[test]
    fn grid_rows_are_width_long() {
        let cells = vec![GlyphCell { glyph: "#", color: (0, 0, 0) }; 12];
        let grid = GlyphGrid::new(4, 3, cells).unwrap();
        assert!(grid.rows().all(|r| r.len() == 4));
    }
}
