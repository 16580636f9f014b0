use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gm_core::error::CoreError;
use gm_core::traits::FontLoader;
use gm_source::folder::scan_images;

use crate::converter::{ConvertInput, Converter};

/// Nom du dossier de sortie par défaut d'un lot.
pub const DEFAULT_BATCH_DIR: &str = "ascii";

/// Sortie par défaut pour une image : `<stem>_ascii.png` à côté de la source.
///
/// # Example
/// ```
/// use gm_app::batch::default_output_path;
/// use std::path::Path;
/// assert_eq!(
///     default_output_path(Path::new("photos/cat.jpg")),
///     Path::new("photos/cat_ascii.png")
/// );
/// ```
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "image".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}_ascii.png"))
}

/// Issue de la conversion d'un fichier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Mosaïque écrite.
    Written,
    /// Source illisible ou géométrie dégénérée : rien d'écrit.
    Skipped,
}

/// Convertit `input` et enregistre la mosaïque dans `output` (format selon l'extension).
///
/// # Errors
/// Retourne une erreur si la police par défaut est introuvable ou si
/// l'écriture échoue.
pub fn convert_file<L: FontLoader>(
    converter: &mut Converter<L>,
    input: &Path,
    output: &Path,
    font: Option<&Path>,
) -> Result<Outcome> {
    let mosaic = match converter.convert(ConvertInput::Path(input), font) {
        Ok(Some(mosaic)) => mosaic,
        Ok(None) => return Ok(Outcome::Skipped),
        Err(e @ CoreError::DegenerateGeometry { .. }) => {
            log::warn!("{} ignorée : {e}", input.display());
            return Ok(Outcome::Skipped);
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Création de {}", parent.display()))?;
    }
    mosaic
        .save(output)
        .with_context(|| format!("Écriture de {}", output.display()))?;
    log::info!(
        "{} → {} ({}x{})",
        input.display(),
        output.display(),
        mosaic.width(),
        mosaic.height()
    );
    Ok(Outcome::Written)
}

/// Bilan d'un lot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Mosaïques écrites.
    pub written: usize,
    /// Images ignorées.
    pub skipped: usize,
}

/// Convertit toutes les images de `folder` (récursif) vers `output_dir`.
///
/// `output_dir` vaut `<folder>/ascii` par défaut et n'est pas re-parcouru.
/// L'arborescence relative est conservée, chaque fichier devient
/// `<stem>_ascii.png`. Les images illisibles sont ignorées.
///
/// # Errors
/// Retourne une erreur si le dossier est illisible, si la police par défaut
/// est introuvable ou si une écriture échoue.
pub fn run_folder<L: FontLoader>(
    converter: &mut Converter<L>,
    folder: &Path,
    output_dir: Option<&Path>,
    font: Option<&Path>,
) -> Result<BatchSummary> {
    let output_dir = output_dir.map_or_else(|| folder.join(DEFAULT_BATCH_DIR), Path::to_path_buf);
    let files = scan_images(folder, Some(&output_dir))?;
    let mut summary = BatchSummary::default();

    for (i, input) in files.iter().enumerate() {
        let relative = input.strip_prefix(folder).unwrap_or(input);
        let output = default_output_path(&output_dir.join(relative));
        log::debug!("[{}/{}] {}", i + 1, files.len(), input.display());

        match convert_file(converter, input, &output, font)? {
            Outcome::Written => summary.written += 1,
            Outcome::Skipped => summary.skipped += 1,
        }
    }

    log::info!(
        "Lot terminé : {} écrite(s), {} ignorée(s) → {}",
        summary.written,
        summary.skipped,
        output_dir.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CELL, FakeLoader};
    use gm_core::config::MosaicConfig;
    use image::{Rgb, RgbImage};

    fn converter() -> Converter<FakeLoader> {
        let config = MosaicConfig {
            width: 16,
            default_font: PathBuf::from("default.ttf"),
            ..MosaicConfig::default()
        };
        Converter::with_loader(config, FakeLoader::knowing(&["default.ttf"])).unwrap()
    }

    #[test]
    fn single_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        RgbImage::from_pixel(32, 32, Rgb([0, 0, 0])).save(&input).unwrap();
        let output = dir.path().join("nested/out.png");

        let outcome = convert_file(&mut converter(), &input, &output, None).unwrap();
        assert_eq!(outcome, Outcome::Written);
        let written = image::open(&output).unwrap();
        assert_eq!(written.width(), 16 * CELL.advance);
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.png");
        fs::write(&input, b"not a png").unwrap();
        let output = dir.path().join("out.png");

        let outcome = convert_file(&mut converter(), &input, &output, None).unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert!(!output.exists());
    }

    #[test]
    fn folder_batch_mirrors_tree_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        RgbImage::from_pixel(20, 20, Rgb([10, 10, 10])).save(root.join("a.png")).unwrap();
        RgbImage::from_pixel(20, 30, Rgb([200, 0, 0]))
            .save(root.join("sub/b.bmp"))
            .unwrap();
        fs::write(root.join("c.jpg"), b"garbage").unwrap();

        let summary = run_folder(&mut converter(), root, None, None).unwrap();
        assert_eq!(summary, BatchSummary { written: 2, skipped: 1 });
        assert!(root.join("ascii/a_ascii.png").is_file());
        assert!(root.join("ascii/sub/b_ascii.png").is_file());

        // Second passage : le dossier de sortie n'est pas re-converti.
        let again = run_folder(&mut converter(), root, None, None).unwrap();
        assert_eq!(again, summary);
    }

    #[test]
    fn empty_canvas_is_skipped_and_batch_continues() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        RgbImage::from_pixel(240, 4, Rgb([0, 0, 0]))
            .save(root.join("a_wide.png"))
            .unwrap();
        RgbImage::from_pixel(40, 40, Rgb([0, 0, 0]))
            .save(root.join("b_ok.png"))
            .unwrap();
        let mut conv = Converter::with_loader(
            MosaicConfig {
                char_aspect: 0.5,
                default_font: PathBuf::from("default.ttf"),
                ..MosaicConfig::default()
            },
            FakeLoader::knowing(&["default.ttf"]),
        )
        .unwrap();

        let summary = run_folder(&mut conv, root, None, None).unwrap();
        assert_eq!(summary, BatchSummary { written: 1, skipped: 1 });
        assert!(!root.join("ascii/a_wide_ascii.png").exists());
        assert!(root.join("ascii/b_ok_ascii.png").is_file());
    }

    #[test]
    fn missing_default_font_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]))
            .save(dir.path().join("a.png"))
            .unwrap();
        let mut conv = Converter::with_loader(
            MosaicConfig {
                default_font: PathBuf::from("default.ttf"),
                ..MosaicConfig::default()
            },
            FakeLoader::knowing(&[]),
        )
        .unwrap();
        assert!(run_folder(&mut conv, dir.path(), None, None).is_err());
    }
}
