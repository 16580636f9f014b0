use gm_core::canvas::Canvas;
use gm_core::color::Rgb;
use gm_core::frame::GlyphGrid;
use gm_core::traits::{GlyphFace, GlyphMetrics};
use image::RgbImage;

/// Taille du canvas de sortie pour une grille.
///
/// Largeur `colonnes × advance`, hauteur `floor(lignes × char_aspect) × line_height`.
///
/// # Example
/// ```
/// use gm_core::frame::{GlyphCell, GlyphGrid};
/// use gm_core::traits::GlyphMetrics;
/// use gm_export::composer::canvas_size;
///
/// let cells = vec![GlyphCell { glyph: "@", color: (0, 0, 0) }; 120 * 45];
/// let grid = GlyphGrid::new(120, 45, cells).unwrap();
/// let metrics = GlyphMetrics { advance: 7, line_height: 13 };
/// assert_eq!(canvas_size(&grid, metrics, 1.3), (840, 58 * 13));
/// ```
#[must_use]
pub fn canvas_size(grid: &GlyphGrid<'_>, metrics: GlyphMetrics, char_aspect: f64) -> (u32, u32) {
    let rows = (f64::from(grid.height) * char_aspect).floor() as u32;
    (grid.width * metrics.advance, rows * metrics.line_height)
}

/// Dessine la grille sur un canvas rempli de `background`.
///
/// La cellule (x, y) est posée en `(x × advance, y × line_height × char_aspect)`
/// avec sa couleur source. Les glyphes qui débordent du canvas sont tronqués.
#[must_use]
pub fn compose_canvas(
    grid: &GlyphGrid<'_>,
    face: &dyn GlyphFace,
    char_aspect: f64,
    background: Rgb,
) -> Canvas {
    let metrics = face.metrics();
    let (width, height) = canvas_size(grid, metrics, char_aspect);
    log::debug!(
        "Composition {}x{} cellules → canvas {width}x{height} (cellule {}x{})",
        grid.width,
        grid.height,
        metrics.advance,
        metrics.line_height
    );

    let mut canvas = Canvas::new(width, height, background);
    let fw = f64::from(metrics.advance);
    let fh = f64::from(metrics.line_height) * char_aspect;

    for (y, row) in grid.rows().enumerate() {
        let py = y as f64 * fh;
        for (x, cell) in row.iter().enumerate() {
            if cell.glyph.trim().is_empty() {
                continue;
            }
            face.draw_glyph(&mut canvas, cell.glyph, x as f64 * fw, py, cell.color);
        }
    }
    canvas
}

/// Compose la mosaïque et la convertit en [`RgbImage`].
#[must_use]
pub fn compose(
    grid: &GlyphGrid<'_>,
    face: &dyn GlyphFace,
    char_aspect: f64,
    background: Rgb,
) -> RgbImage {
    into_rgb_image(compose_canvas(grid, face, char_aspect, background))
}

/// Canvas → [`RgbImage`], sans copie.
#[must_use]
pub fn into_rgb_image(canvas: Canvas) -> RgbImage {
    let (width, height) = (canvas.width(), canvas.height());
    // Un Canvas contient toujours exactement width × height × 3 octets.
    RgbImage::from_raw(width, height, canvas.into_raw())
        .unwrap_or_else(|| RgbImage::new(width, height))
}
