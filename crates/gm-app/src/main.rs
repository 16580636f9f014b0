use std::path::Path;

use anyhow::Result;
use clap::Parser;
use gm_app::batch::{self, Outcome};
use gm_app::cli::Cli;
use gm_app::converter::Converter;
use gm_core::config::{MosaicConfig, load_config};

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider la source
    cli.validate_source()?;

    // 4. Charger la config puis appliquer les overrides CLI
    let mut config = resolve_config(&cli.config)?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    if let Some(ref input) = cli.image {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| batch::default_output_path(input));
        let mut converter = Converter::new(config)?;
        return match batch::convert_file(&mut converter, input, &output, cli.font.as_deref())? {
            Outcome::Written => Ok(()),
            Outcome::Skipped => anyhow::bail!("Aucune mosaïque produite pour {}", input.display()),
        };
    }

    if let Some(ref folder) = cli.folder {
        log::info!("Conversion par lots de {}", folder.display());
        let mut converter = Converter::new(config)?;
        let summary = batch::run_folder(
            &mut converter,
            folder,
            cli.output.as_deref(),
            cli.font.as_deref(),
        )?;
        if summary.skipped > 0 {
            log::warn!("{} image(s) ignorée(s).", summary.skipped);
        }
        return Ok(());
    }

    if let Some(ref input) = cli.video {
        return run_video(&cli, input, config);
    }

    Ok(())
}

#[cfg(feature = "video")]
fn run_video(cli: &Cli, input: &Path, config: MosaicConfig) -> Result<()> {
    use std::sync::Arc;

    use arc_swap::ArcSwap;
    use gm_app::{hotreload, live};

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| live::default_video_output(input));
    let config = Arc::new(ArcSwap::from_pointee(config));

    // Hot reload seulement si le fichier existe (sinon : défauts figés).
    let _watcher = if cli.config.exists() {
        Some(hotreload::spawn_config_watcher(&cli.config, &config)?)
    } else {
        None
    };

    live::run_video(input, &output, &config, cli.font.clone())
}

#[cfg(not(feature = "video"))]
fn run_video(_cli: &Cli, input: &Path, _config: MosaicConfig) -> Result<()> {
    anyhow::bail!(
        "La conversion vidéo de {} requiert la feature 'video' (cargo build --features video).",
        input.display()
    )
}

/// Charge `path`, ou les défauts si le fichier n'existe pas.
fn resolve_config(path: &Path) -> Result<MosaicConfig> {
    if path.exists() {
        load_config(path)
    } else {
        log::warn!("Config introuvable : {}. Utilisation des défauts.", path.display());
        Ok(MosaicConfig::default())
    }
}
