use std::path::PathBuf;

use clap::Parser;
use gm_core::config::{CharsetSpec, MosaicConfig};

/// glyphmosaic — rendu d'images en mosaïques de glyphes colorés.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source : image unique (PNG, JPEG, BMP, GIF).
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Source : dossier d'images, converti récursivement.
    #[arg(long)]
    pub folder: Option<PathBuf>,

    /// Source : vidéo, convertie en MP4. Requiert --features video.
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Destination. Défaut : `<stem>_ascii.png` (image), `<dossier>/ascii` (lot),
    /// `<stem>_ascii.mp4` (vidéo).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Nombre de colonnes de glyphes.
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Palette : preset ("default", "detailed") ou glyphes dense→clair (ex: "@%#*+=-:. ").
    #[arg(long)]
    pub charset: Option<String>,

    /// Police monospace TTF/OTF (repli sur la police par défaut si illisible).
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate that exactly one source is provided.
    ///
    /// # Errors
    /// Returns an error if zero or more than one source is specified.
    pub fn validate_source(&self) -> anyhow::Result<()> {
        let count = usize::from(self.image.is_some())
            + usize::from(self.folder.is_some())
            + usize::from(self.video.is_some());

        if count == 0 {
            anyhow::bail!("Aucune source spécifiée. Utilisez --image, --folder ou --video.");
        }
        if count > 1 {
            anyhow::bail!("Une seule source à la fois : --image, --folder OU --video.");
        }
        Ok(())
    }

    /// Applique les surcharges CLI à une config chargée.
    ///
    /// # Example
    /// ```
    /// use clap::Parser;
    /// use gm_app::cli::Cli;
    /// use gm_core::config::MosaicConfig;
    ///
    /// let cli = Cli::parse_from(["glyphmosaic", "--image", "a.png", "--width", "80"]);
    /// let mut config = MosaicConfig::default();
    /// cli.apply_overrides(&mut config);
    /// assert_eq!(config.width, 80);
    /// ```
    pub fn apply_overrides(&self, config: &mut MosaicConfig) {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(ref charset) = self.charset {
            config.charset = CharsetSpec::Named(charset.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_source_is_required() {
        assert!(Cli::parse_from(["glyphmosaic"]).validate_source().is_err());
        assert!(
            Cli::parse_from(["glyphmosaic", "--image", "a.png", "--folder", "d"])
                .validate_source()
                .is_err()
        );
        assert!(
            Cli::parse_from(["glyphmosaic", "--folder", "d"])
                .validate_source()
                .is_ok()
        );
    }

    #[test]
    fn charset_override_accepts_literal_glyphs() {
        let cli = Cli::parse_from(["glyphmosaic", "--image", "a.png", "--charset", "#+. "]);
        let mut config = MosaicConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.charset.palette().unwrap().len(), 4);
        assert_eq!(config.width, 120);
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["glyphmosaic", "--image", "a.png"]);
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
        assert_eq!(cli.log_level, "warn");
        assert!(cli.output.is_none());
    }
}
