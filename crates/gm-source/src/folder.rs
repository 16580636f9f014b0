use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Extensions image reconnues.
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// True si l'extension de `path` est une image reconnue (insensible à la casse).
///
/// # Example
/// ```
/// use gm_source::folder::is_image_path;
/// use std::path::Path;
/// assert!(is_image_path(Path::new("a/b.JPG")));
/// assert!(!is_image_path(Path::new("notes.txt")));
/// ```
#[must_use]
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTS.contains(&e.to_lowercase().as_str()))
}

/// Liste récursivement les images de `dir`, triées par chemin.
///
/// `exclude` (typiquement le dossier de sortie) n'est pas parcouru.
///
/// # Errors
/// Retourne une erreur si le dossier n'existe pas ou ne peut être lu.
pub fn scan_images(dir: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Dossier introuvable : {}", dir.display());
    }
    let mut files = Vec::new();
    scan_dir(dir, exclude, &mut files)?;
    files.sort();
    log::info!("{} image(s) trouvée(s) dans {}", files.len(), dir.display());
    Ok(files)
}

/// Extrait récursivement les médias reconnus.
fn scan_dir(dir: &Path, exclude: Option<&Path>, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("Lecture de {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            if exclude.is_some_and(|ex| ex == path) {
                continue;
            }
            scan_dir(&path, exclude, files)?;
        } else if is_image_path(&path) {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_is_recursive_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::create_dir(root.join("out")).unwrap();
        for name in ["b.png", "a.JPG", "sub/c.gif", "out/skip.png", "readme.md"] {
            fs::write(root.join(name), b"x").unwrap();
        }

        let out = root.join("out");
        let files = scan_images(root, Some(&out)).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "sub/c.gif"]);
    }

    #[test]
    fn missing_dir_errors() {
        assert!(scan_images(Path::new("/nonexistent/dir"), None).is_err());
    }
}
