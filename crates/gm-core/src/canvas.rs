use crate::color::{Rgb, blend};

/// Canvas RGB row-major, 3 bytes par pixel, sur lequel les glyphes sont tamponnés.
///
/// # Example
/// ```
/// use gm_core::canvas::Canvas;
/// let mut canvas = Canvas::new(4, 2, (255, 255, 255));
/// canvas.blend(1, 1, (0, 0, 0), 1.0);
/// assert_eq!(canvas.pixel(1, 1), (0, 0, 0));
/// assert_eq!(canvas.pixel(0, 0), (255, 255, 255));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Crée un canvas rempli avec `background`.
    #[must_use]
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&[background.0, background.1, background.2]);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB bytes.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consume into raw RGB bytes.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Pixel (x, y). Hors limites → noir.
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        if x >= self.width || y >= self.height {
            return (0, 0, 0);
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Mélange `color` au pixel (x, y) avec une couverture `coverage` ∈ [0, 1].
    ///
    /// Les coordonnées hors du canvas sont ignorées (glyphes débordant du bord).
    #[inline(always)]
    pub fn blend(&mut self, x: i64, y: i64, color: Rgb, coverage: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        if coverage <= 0.0 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        let bg = (self.data[idx], self.data[idx + 1], self.data[idx + 2]);
        let (r, g, b) = blend(color, bg, coverage);
        self.data[idx] = r;
        self.data[idx + 1] = g;
        self.data[idx + 2] = b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_blend_is_ignored() {
        let mut canvas = Canvas::new(2, 2, (9, 9, 9));
        canvas.blend(-1, 0, (0, 0, 0), 1.0);
        canvas.blend(0, 2, (0, 0, 0), 1.0);
        assert!(canvas.as_raw().iter().all(|&b| b == 9));
    }

    #[test]
    fn zero_sized_canvas_is_empty() {
        assert!(Canvas::new(0, 5, (0, 0, 0)).as_raw().is_empty());
    }
}
