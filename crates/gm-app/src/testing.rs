//! Police synthétique pour les tests : pas de fichier TTF requis.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gm_core::canvas::Canvas;
use gm_core::color::Rgb;
use gm_core::error::CoreError;
use gm_core::traits::{FontLoader, GlyphFace, GlyphMetrics};

/// DejaVu Sans Mono si installée ; les tests qui en dépendent sont sautés sinon.
pub(crate) fn system_font() -> Option<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
        "/Library/Fonts/DejaVuSansMono.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.is_file())
}

pub(crate) const CELL: GlyphMetrics = GlyphMetrics {
    advance: 3,
    line_height: 5,
};

/// Chaque glyphe non vide remplit sa cellule de sa couleur.
pub(crate) struct BlockFace;

impl GlyphFace for BlockFace {
    fn metrics(&self) -> GlyphMetrics {
        CELL
    }

    fn draw_glyph(&self, canvas: &mut Canvas, _glyph: &str, x: f64, y: f64, color: Rgb) {
        let (x0, y0) = (x.floor() as i64, y.floor() as i64);
        for dy in 0..i64::from(CELL.line_height) {
            for dx in 0..i64::from(CELL.advance) {
                canvas.blend(x0 + dx, y0 + dy, color, 1.0);
            }
        }
    }
}

/// Ne « trouve » que les chemins enregistrés ; compte les chargements réussis.
#[derive(Clone, Default)]
pub(crate) struct FakeLoader {
    known: Arc<HashSet<PathBuf>>,
    pub(crate) loads: Arc<AtomicUsize>,
}

impl FakeLoader {
    pub(crate) fn knowing(paths: &[&str]) -> Self {
        Self {
            known: Arc::new(paths.iter().map(PathBuf::from).collect()),
            loads: Arc::default(),
        }
    }

    pub(crate) fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl FontLoader for FakeLoader {
    fn load(&self, path: &Path, _point_size: f32) -> Result<Box<dyn GlyphFace>, CoreError> {
        if self.known.contains(path) {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(BlockFace))
        } else {
            Err(CoreError::FontLoad {
                path: path.display().to_string(),
                reason: "not found".into(),
            })
        }
    }
}
