use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use gm_core::canvas::Canvas;
use gm_core::color::Rgb;
use gm_core::error::CoreError;
use gm_core::traits::{FontLoader, GlyphFace, GlyphMetrics};

/// Police TrueType/OpenType chargée à une taille fixe, via ab_glyph.
///
/// `point_size` est la taille d'em en pixels. Les métriques de cellule sont
/// l'avance de `A` et la hauteur ascendante − descendante, arrondies au pixel
/// supérieur.
pub struct AbGlyphFace {
    font: FontVec,
    scale: PxScale,
    ascent: f32,
    metrics: GlyphMetrics,
}

impl AbGlyphFace {
    /// Parse une police depuis ses octets.
    ///
    /// # Errors
    /// Returns [`CoreError::FontLoad`] if the data is not a parsable face or
    /// if `point_size` is not a positive finite number.
    pub fn from_bytes(data: Vec<u8>, point_size: f32, label: &str) -> Result<Self, CoreError> {
        let font_err = |reason: String| CoreError::FontLoad {
            path: label.to_string(),
            reason,
        };
        if !point_size.is_finite() || point_size <= 0.0 {
            return Err(font_err(format!("taille invalide : {point_size}")));
        }

        let font = FontVec::try_from_vec(data).map_err(|e| font_err(e.to_string()))?;

        // PxScale est exprimé en hauteur de ligne non-scalée ; on ramène à l'em.
        let units_per_em = font.units_per_em().unwrap_or_else(|| font.height_unscaled());
        let scale = PxScale::from(point_size * font.height_unscaled() / units_per_em);

        let scaled = font.as_scaled(scale);
        let advance = scaled.h_advance(scaled.glyph_id('A')).ceil() as u32;
        let line_height = (scaled.ascent() - scaled.descent()).ceil() as u32;
        let metrics = GlyphMetrics {
            advance: advance.max(1),
            line_height: line_height.max(1),
        };
        let ascent = scaled.ascent();

        log::debug!(
            "Police {label} @ {point_size}px : cellule {}x{}",
            metrics.advance,
            metrics.line_height
        );

        Ok(Self {
            font,
            scale,
            ascent,
            metrics,
        })
    }

    /// Ouvre un fichier de police.
    ///
    /// # Errors
    /// Returns [`CoreError::FontLoad`] if the file is missing, unreadable or
    /// not a parsable face.
    pub fn open(path: &Path, point_size: f32) -> Result<Self, CoreError> {
        let label = path.display().to_string();
        let data = std::fs::read(path).map_err(|e| CoreError::FontLoad {
            path: label.clone(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(data, point_size, &label)
    }
}

impl GlyphFace for AbGlyphFace {
    fn metrics(&self) -> GlyphMetrics {
        self.metrics
    }

    fn draw_glyph(&self, canvas: &mut Canvas, glyph: &str, x: f64, y: f64, color: Rgb) {
        let scaled = self.font.as_scaled(self.scale);
        let baseline = y as f32 + self.ascent;
        let mut caret = x as f32;

        for ch in glyph.chars() {
            let id = scaled.glyph_id(ch);
            let positioned = id.with_scale_and_position(self.scale, point(caret, baseline));
            caret += scaled.h_advance(id);

            let Some(outline) = self.font.outline_glyph(positioned) else {
                continue;
            };
            let bounds = outline.px_bounds();
            let (ox, oy) = (bounds.min.x as i64, bounds.min.y as i64);
            outline.draw(|gx, gy, coverage| {
                canvas.blend(ox + i64::from(gx), oy + i64::from(gy), color, coverage);
            });
        }
    }
}

/// Charge des [`AbGlyphFace`] depuis le disque.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbGlyphLoader;

impl FontLoader for AbGlyphLoader {
    fn load(&self, path: &Path, point_size: f32) -> Result<Box<dyn GlyphFace>, CoreError> {
        Ok(Box::new(AbGlyphFace::open(path, point_size)?))
    }
}
