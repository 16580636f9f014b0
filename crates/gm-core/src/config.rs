use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::Palette;
use crate::color::{Rgb, WHITE, parse_color};
use crate::error::CoreError;

/// Police de repli, nom bien connu d'une police monospace système.
pub const DEFAULT_FONT: &str = "DejaVuSansMono.ttf";

/// Taille de police fixe utilisée pour toutes les métriques.
pub const DEFAULT_POINT_SIZE: f32 = 11.0;

/// Configuration de la conversion image → mosaïque de glyphes.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use gm_core::config::MosaicConfig;
/// let config = MosaicConfig::default();
/// assert_eq!(config.width, 120);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct MosaicConfig {
    // === Layout ===
    /// Nombre de colonnes de caractères.
    pub width: u32,
    /// Correction verticale appliquée au nombre de lignes (hauteur de ligne vs largeur de colonne).
    pub vertical_correction: f64,
    /// Facteur d'aspect de la cellule glyphe (cellule plus haute que large).
    pub char_aspect: f64,
    /// Filtre de réduction de la source.
    pub resample: Resample,

    // === Glyphes ===
    /// Palette, nom de preset ou liste explicite (dense→clair).
    pub charset: CharsetSpec,

    // === Police ===
    /// Police de repli quand la police demandée est introuvable.
    pub default_font: PathBuf,
    /// Taille en points pour les métriques et le rendu.
    pub point_size: f32,
    /// Couleur de fond du canvas.
    pub background: Rgb,
}

/// Resampling filter used by the downsampler.
///
/// # Example
/// ```
/// use gm_core::config::Resample;
/// assert_eq!(Resample::default(), Resample::Box);
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Resample {
    /// Moyenne par zone (box), défaut.
    #[default]
    Box,
    /// Plus proche voisin.
    Nearest,
    /// Bilinéaire.
    Bilinear,
    /// Lanczos3, le plus net.
    Lanczos3,
}

/// Palette source: a preset name / literal character string, or an explicit glyph list.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CharsetSpec {
    /// Preset name ("default", "detailed") or a string read one glyph per char.
    Named(String),
    /// Explicit glyphs, each possibly several characters long.
    Glyphs(Vec<String>),
}

impl Default for CharsetSpec {
    fn default() -> Self {
        Self::Named("default".into())
    }
}

impl CharsetSpec {
    /// Resolve into a palette.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if the resolved palette is degenerate.
    ///
    /// # Example
    /// ```
    /// use gm_core::config::CharsetSpec;
    /// assert_eq!(CharsetSpec::Named("detailed".into()).palette().unwrap().len(), 67);
    /// assert_eq!(CharsetSpec::Named("#+. ".into()).palette().unwrap().len(), 4);
    /// ```
    pub fn palette(&self) -> Result<Palette, CoreError> {
        match self {
            Self::Named(name) => match Palette::preset(name) {
                Some(p) => Ok(p),
                None => Palette::from_chars(name),
            },
            Self::Glyphs(glyphs) => Palette::new(glyphs.iter().cloned()),
        }
    }
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            width: 120,
            vertical_correction: 0.5,
            char_aspect: 1.3,
            resample: Resample::Box,
            charset: CharsetSpec::default(),
            default_font: PathBuf::from(DEFAULT_FONT),
            point_size: DEFAULT_POINT_SIZE,
            background: WHITE,
        }
    }
}

impl MosaicConfig {
    /// Reject values that would produce an invalid or degenerate mosaic.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.width == 0 {
            return Err(CoreError::Config("width doit être > 0".into()));
        }
        positive("vertical_correction", self.vertical_correction)?;
        positive("char_aspect", self.char_aspect)?;
        positive("point_size", f64::from(self.point_size))?;
        self.charset.palette()?;
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<(), CoreError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!(
            "{field} doit être un nombre fini > 0 (reçu {value})"
        )))
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    layout: Option<LayoutSection>,
    glyphs: Option<GlyphsSection>,
    font: Option<FontSection>,
}

#[derive(Deserialize)]
struct LayoutSection {
    width: Option<u32>,
    vertical_correction: Option<f64>,
    char_aspect: Option<f64>,
    resample: Option<Resample>,
}

#[derive(Deserialize)]
struct GlyphsSection {
    charset: Option<CharsetSpec>,
}

#[derive(Deserialize)]
struct FontSection {
    default_font: Option<PathBuf>,
    point_size: Option<f32>,
    background: Option<String>,
}

/// Parse un document TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the document is malformed or the merged config is invalid.
///
/// # Example
/// ```
/// use gm_core::config::parse_config;
/// let config = parse_config("[layout]\nwidth = 80\n").unwrap();
/// assert_eq!(config.width, 80);
/// assert!((config.char_aspect - 1.3).abs() < f64::EPSILON);
/// ```
pub fn parse_config(content: &str) -> Result<MosaicConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = MosaicConfig::default();

    if let Some(l) = file.layout {
        if let Some(v) = l.width {
            config.width = v;
        }
        if let Some(v) = l.vertical_correction {
            config.vertical_correction = v;
        }
        if let Some(v) = l.char_aspect {
            config.char_aspect = v;
        }
        if let Some(v) = l.resample {
            config.resample = v;
        }
    }
    if let Some(g) = file.glyphs
        && let Some(v) = g.charset
    {
        config.charset = v;
    }
    if let Some(f) = file.font {
        if let Some(v) = f.default_font {
            config.default_font = v;
        }
        if let Some(v) = f.point_size {
            config.point_size = v;
        }
        if let Some(v) = f.background {
            config.background = parse_color(&v)?;
        }
    }

    config.validate()?;
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or fails validation.
///
/// # Example
/// ```no_run
/// use gm_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<MosaicConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Config invalide dans {}", path.display()))?;
    log::debug!(
        "Config chargée : {} (width={}, charset={:?})",
        path.display(),
        config.width,
        config.charset
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), MosaicConfig::default());
    }

    #[test]
    fn sections_merge_over_defaults() {
        let config = parse_config(
            r###"
            [layout]
            char_aspect = 2.0
            resample = "Lanczos3"

            [glyphs]
            charset = ["##", "+", " "]

            [font]
            background = "#000000"
            "###,
        )
        .unwrap();
        assert_eq!(config.width, 120);
        assert!((config.char_aspect - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.resample, Resample::Lanczos3);
        assert_eq!(
            config.charset,
            CharsetSpec::Glyphs(vec!["##".into(), "+".into(), " ".into()])
        );
        assert_eq!(config.background, (0, 0, 0));
    }

    #[test]
    fn charset_accepts_preset_name() {
        let config = parse_config("[glyphs]\ncharset = \"detailed\"\n").unwrap();
        assert_eq!(config.charset.palette().unwrap().len(), 67);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse_config("[layout]\nwidth = 0\n").is_err());
        assert!(parse_config("[layout]\nvertical_correction = -0.5\n").is_err());
        assert!(parse_config("[glyphs]\ncharset = [\"@\"]\n").is_err());
        assert!(parse_config("[font]\npoint_size = 0.0\n").is_err());
        assert!(parse_config("[font]\nbackground = \"plaid\"\n").is_err());
        assert!(parse_config("[layout\n").is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[layout]\nwidth = 64").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.width, 64);
    }

    #[test]
    fn shipped_default_file_matches_builtin() {
        let shipped = parse_config(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(shipped, MosaicConfig::default());
    }

    #[test]
    fn load_config_missing_file_errors() {
        assert!(load_config(Path::new("/nonexistent/glyphmosaic.toml")).is_err());
    }
}
