use std::path::{Path, PathBuf};

use gm_ascii::mapper::map_glyphs;
use gm_core::charset::Palette;
use gm_core::config::MosaicConfig;
use gm_core::error::CoreError;
use gm_core::frame::FrameBuffer;
use gm_core::traits::{FontLoader, GlyphFace};
use gm_export::composer::{canvas_size, compose};
use gm_export::font::AbGlyphLoader;
use gm_source::downsample::Downsampler;
use gm_source::image::load_image;
use image::RgbImage;

/// Entrée d'une conversion : fichier image ou frame déjà en mémoire.
#[derive(Clone, Copy, Debug)]
pub enum ConvertInput<'a> {
    /// Image sur disque, décodée à chaque appel.
    Path(&'a Path),
    /// Frame déjà décodée (vidéo, caméra).
    Frame(&'a FrameBuffer),
}

/// Police chargée, indexée par le chemin demandé.
struct LoadedFace {
    /// Chemin demandé par l'appelant.
    requested: PathBuf,
    /// Chemin effectivement chargé (diffère après un repli).
    resolved: PathBuf,
    face: Box<dyn GlyphFace>,
}

/// Orchestrateur image → mosaïque de glyphes colorés.
///
/// Palette et échelle de quantification sont figées à la construction. La
/// police est chargée au premier besoin puis conservée tant que le même
/// chemin est demandé.
pub struct Converter<L: FontLoader = AbGlyphLoader> {
    config: MosaicConfig,
    palette: Palette,
    downsampler: Downsampler,
    loader: L,
    face: Option<LoadedFace>,
}

impl Converter<AbGlyphLoader> {
    /// Converter utilisant ab_glyph pour les polices.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if the configuration is invalid.
    ///
    /// # Example
    /// ```
    /// use gm_app::converter::Converter;
    /// use gm_core::config::MosaicConfig;
    /// let converter = Converter::new(MosaicConfig::default()).unwrap();
    /// assert_eq!(converter.palette().len(), 21);
    /// ```
    pub fn new(config: MosaicConfig) -> Result<Self, CoreError> {
        Self::with_loader(config, AbGlyphLoader)
    }
}

impl<L: FontLoader> Converter<L> {
    /// Converter avec un chargeur de polices arbitraire.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if the configuration is invalid.
    pub fn with_loader(config: MosaicConfig, loader: L) -> Result<Self, CoreError> {
        config.validate()?;
        let palette = config.charset.palette()?;
        log::info!(
            "Converter : {} colonnes, palette de {} glyphes (échelle {:.3})",
            config.width,
            palette.len(),
            palette.scale()
        );
        Ok(Self {
            downsampler: Downsampler::new(config.resample),
            config,
            palette,
            loader,
            face: None,
        })
    }

    /// Configuration figée à la construction.
    #[must_use]
    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Palette active.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Chemin de la police effectivement chargée, s'il y en a une.
    #[must_use]
    pub fn loaded_font(&self) -> Option<&Path> {
        self.face.as_ref().map(|f| f.resolved.as_path())
    }

    /// Remplace explicitement la police, avec repli sur la police par défaut.
    ///
    /// # Errors
    /// Returns [`CoreError::FontLoad`] if neither `path` nor the default font loads.
    pub fn set_font(&mut self, path: &Path) -> Result<(), CoreError> {
        resolve_face(&self.loader, &mut self.face, &self.config, Some(path)).map(|_| ())
    }

    /// Convertit une image ou une frame en mosaïque.
    ///
    /// `font` remplace la police par défaut pour cet appel ; la police n'est
    /// rechargée que si le chemin change.
    ///
    /// Retourne `Ok(None)` si l'image ne peut être chargée (avertissement
    /// journalisé).
    ///
    /// # Errors
    /// - [`CoreError::FontLoad`] if the default font itself fails to load.
    /// - [`CoreError::DegenerateGeometry`] if the source yields zero rows or an
    ///   empty canvas.
    /// - [`CoreError::InvalidDimensions`] for an empty in-memory frame.
    pub fn convert(
        &mut self,
        input: ConvertInput<'_>,
        font: Option<&Path>,
    ) -> Result<Option<RgbImage>, CoreError> {
        let decoded;
        let frame = match input {
            ConvertInput::Path(path) => match load_image(path) {
                Ok(fb) => {
                    decoded = fb;
                    &decoded
                }
                Err(e) => {
                    log::warn!("{e}");
                    return Ok(None);
                }
            },
            ConvertInput::Frame(fb) => fb,
        };

        let samples =
            self.downsampler
                .run(frame, self.config.width, self.config.vertical_correction)?;
        let face = resolve_face(&self.loader, &mut self.face, &self.config, font)?;
        let grid = map_glyphs(&samples, &self.palette);

        // Un char_aspect < 1 peut ramener la hauteur du canvas à zéro.
        let (canvas_w, canvas_h) = canvas_size(&grid, face.metrics(), self.config.char_aspect);
        if canvas_w == 0 || canvas_h == 0 {
            return Err(CoreError::DegenerateGeometry {
                width: self.config.width,
                src_width: frame.width,
                src_height: frame.height,
            });
        }

        Ok(Some(compose(
            &grid,
            face,
            self.config.char_aspect,
            self.config.background,
        )))
    }
}

/// Police pour `requested` (défaut si `None`), depuis le cache si possible.
///
/// Un échec sur une police demandée retombe une fois sur la police par défaut ;
/// l'échec de celle-ci est fatal.
fn resolve_face<'f, L: FontLoader>(
    loader: &L,
    cache: &'f mut Option<LoadedFace>,
    config: &MosaicConfig,
    requested: Option<&Path>,
) -> Result<&'f dyn GlyphFace, CoreError> {
    let requested = requested.unwrap_or(config.default_font.as_path());
    let hit = cache.as_ref().is_some_and(|f| f.requested == requested);

    if !hit {
        let (resolved, face) = match loader.load(requested, config.point_size) {
            Ok(face) => (requested.to_path_buf(), face),
            Err(e) if requested != config.default_font => {
                log::warn!(
                    "{e}. Repli sur la police par défaut {}",
                    config.default_font.display()
                );
                let face = loader.load(&config.default_font, config.point_size)?;
                (config.default_font.clone(), face)
            }
            Err(e) => return Err(e),
        };
        log::debug!("Police chargée : {}", resolved.display());
        *cache = Some(LoadedFace {
            requested: requested.to_path_buf(),
            resolved,
            face,
        });
    }

    match cache {
        Some(loaded) => Ok(loaded.face.as_ref()),
        None => Err(CoreError::FontLoad {
            path: requested.display().to_string(),
            reason: "aucune police chargée".into(),
        }),
    }
}
