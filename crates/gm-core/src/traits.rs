use std::path::Path;

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::error::CoreError;

/// Métriques d'une police chargée, en pixels entiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Largeur d'avance d'une cellule.
    pub advance: u32,
    /// Hauteur de ligne.
    pub line_height: u32,
}

/// Police chargée à une taille fixe : fournit ses métriques et dessine un glyphe.
///
/// Implémenté par : `AbGlyphFace` (gm-export). N'importe quel backend texte
/// respectant ce contrat est substituable.
///
/// # Example
/// ```
/// use gm_core::canvas::Canvas;
/// use gm_core::color::Rgb;
/// use gm_core::traits::{GlyphFace, GlyphMetrics};
///
/// struct BlockFace;
/// impl GlyphFace for BlockFace {
///     fn metrics(&self) -> GlyphMetrics { GlyphMetrics { advance: 1, line_height: 1 } }
///     fn draw_glyph(&self, canvas: &mut Canvas, _glyph: &str, x: f64, y: f64, color: Rgb) {
///         canvas.blend(x as i64, y as i64, color, 1.0);
///     }
/// }
/// let mut canvas = Canvas::new(1, 1, (255, 255, 255));
/// BlockFace.draw_glyph(&mut canvas, "@", 0.0, 0.0, (1, 2, 3));
/// assert_eq!(canvas.pixel(0, 0), (1, 2, 3));
/// ```
pub trait GlyphFace: Send {
    /// Avance horizontale et hauteur de ligne.
    fn metrics(&self) -> GlyphMetrics;

    /// Dessine `glyph` avec son coin haut-gauche (ligne d'ascendante) en (x, y).
    fn draw_glyph(&self, canvas: &mut Canvas, glyph: &str, x: f64, y: f64, color: Rgb);
}

/// Ouvre une police depuis un chemin à une taille donnée.
pub trait FontLoader: Send {
    /// Charge la police.
    ///
    /// # Errors
    /// Returns [`CoreError::FontLoad`] if the file is missing or unparsable.
    fn load(&self, path: &Path, point_size: f32) -> Result<Box<dyn GlyphFace>, CoreError>;
}
