use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use gm_core::config::{MosaicConfig, load_config};
use notify::{Event, EventKind, RecursiveMode, Watcher};

/// Surveille le fichier config et publie chaque version valide dans l'ArcSwap.
///
/// Une config invalide est journalisée et ignorée : l'ancienne reste active.
/// Retourne le Watcher (doit rester vivant tant que la conversion tourne).
///
/// # Errors
/// Returns an error if the watcher cannot be created or the path cannot be watched.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use arc_swap::ArcSwap;
/// use gm_core::config::MosaicConfig;
/// use gm_app::hotreload::spawn_config_watcher;
/// use std::path::Path;
///
/// let config = Arc::new(ArcSwap::from_pointee(MosaicConfig::default()));
/// let _watcher = spawn_config_watcher(Path::new("config/default.toml"), &config);
/// ```
pub fn spawn_config_watcher(
    config_path: &Path,
    config: &Arc<ArcSwap<MosaicConfig>>,
) -> Result<impl Watcher + use<>> {
    let config = Arc::clone(config);
    let path = config_path.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res
            && matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        {
            reload_into(&path, &config);
        }
    })?;

    watcher.watch(config_path, RecursiveMode::NonRecursive)?;
    log::info!("Hot reload actif sur {}", config_path.display());
    Ok(watcher)
}

/// Recharge `path` et remplace la config partagée si elle a changé.
///
/// Retourne `true` si une nouvelle config a été publiée.
pub fn reload_into(path: &Path, config: &ArcSwap<MosaicConfig>) -> bool {
    match load_config(path) {
        Ok(new_config) => {
            if **config.load() == new_config {
                return false;
            }
            config.store(Arc::new(new_config));
            log::info!("Config rechargée depuis {}", path.display());
            true
        }
        Err(e) => {
            log::warn!("Erreur de rechargement config : {e:#}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_change_is_published() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mosaic.toml");
        std::fs::write(&path, "[layout]\nwidth = 64\n").unwrap();
        let config = ArcSwap::from_pointee(MosaicConfig::default());

        assert!(reload_into(&path, &config));
        assert_eq!(config.load().width, 64);
        // Même contenu : rien à publier, le converter n'est pas reconstruit.
        assert!(!reload_into(&path, &config));
    }

    #[test]
    fn invalid_file_keeps_previous_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mosaic.toml");
        std::fs::write(&path, "[layout]\nwidth = 0\n").unwrap();
        let config = ArcSwap::from_pointee(MosaicConfig::default());

        assert!(!reload_into(&path, &config));
        assert_eq!(config.load().width, 120);
    }
}
