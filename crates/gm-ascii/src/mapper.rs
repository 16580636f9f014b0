use gm_core::charset::{Palette, quantize};
use gm_core::frame::{Downsampled, GlyphCell, GlyphGrid};
use rayon::prelude::*;

/// Index de glyphe pour une luminance, palette de `palette_len` glyphes.
///
/// Bande uniforme de largeur `256 / palette_len`, le dernier index absorbe
/// l'arrondi flottant.
///
/// # Example
/// ```
/// use gm_ascii::mapper::glyph_index;
/// assert_eq!(glyph_index(0, 10), 0);
/// assert_eq!(glyph_index(255, 10), 9);
/// assert_eq!(glyph_index(128, 2), 1);
/// ```
#[inline(always)]
#[must_use]
pub fn glyph_index(luminance: u8, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    quantize(luminance, 256.0 / palette_len as f64, palette_len)
}

/// Map a downsampled grid to glyph cells.
///
/// Each sample gets the palette glyph for its luminance and keeps its source
/// color. Rows are processed in parallel; output order is row-major like the
/// input.
///
/// # Example
/// ```
/// use gm_ascii::mapper::map_glyphs;
/// use gm_core::charset::Palette;
/// use gm_core::frame::Downsampled;
///
/// let palette = Palette::from_chars("@. ").unwrap();
/// let samples = Downsampled {
///     width: 3,
///     height: 1,
///     luminance: vec![0, 128, 255],
///     colors: vec![(1, 1, 1), (2, 2, 2), (3, 3, 3)],
/// };
/// let grid = map_glyphs(&samples, &palette);
/// assert_eq!(grid.to_text(), "@. ");
/// assert_eq!(grid.get(2, 0).color, (3, 3, 3));
/// ```
#[must_use]
pub fn map_glyphs<'p>(samples: &Downsampled, palette: &'p Palette) -> GlyphGrid<'p> {
    debug_assert_eq!(samples.luminance.len(), samples.colors.len());
    let row = (samples.width as usize).max(1);

    let cells: Vec<GlyphCell<'p>> = samples
        .luminance
        .par_chunks(row)
        .zip(samples.colors.par_chunks(row))
        .flat_map_iter(|(lums, colors)| {
            lums.iter().zip(colors).map(|(&lum, &color)| GlyphCell {
                glyph: palette.glyph_for(lum),
                color,
            })
        })
        .collect();

    GlyphGrid {
        height: (cells.len() / row) as u32,
        width: samples.width,
        cells,
    }
}
