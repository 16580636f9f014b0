use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use gm_core::config::MosaicConfig;
use gm_core::slot::latest_slot;
use gm_export::muxer::Mp4Muxer;
use gm_source::video::spawn_video_thread;

use crate::pipeline::spawn_conversion_worker;

/// Sortie par défaut d'une vidéo : `<stem>_ascii.mp4` à côté de la source.
#[must_use]
pub fn default_video_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "video".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}_ascii.mp4"))
}

/// Conversion vidéo temps réel → MP4.
///
/// Trois threads reliés par des slots latest-wins : décodage ffmpeg (rythmé
/// au fps du flux), conversion, encodage (thread appelant). Quand la
/// conversion est plus lente que le flux, des frames sont sautées. Ctrl-C
/// arrête le décodeur, qui pousse `Stop` dans la chaîne.
///
/// # Errors
/// Retourne une erreur si ffprobe/ffmpeg sont indisponibles, si la config est
/// invalide ou si l'encodage échoue.
pub fn run_video(
    input: &Path,
    output: &Path,
    config: &Arc<ArcSwap<MosaicConfig>>,
    font: Option<PathBuf>,
) -> Result<()> {
    let (frame_tx, frame_rx) = latest_slot();
    let (mosaic_tx, mosaic_rx) = latest_slot();
    let (quit_tx, quit_rx) = flume::bounded(1);

    ctrlc::set_handler(move || {
        let _ = quit_tx.try_send(());
    })
    .context("Impossible d'installer le handler Ctrl-C")?;

    let worker = spawn_conversion_worker(Arc::clone(config), font, frame_rx, mosaic_tx)?;
    let (decoder, info) = spawn_video_thread(input.to_path_buf(), frame_tx, quit_rx)?;
    let fps = info.fps.clamp(1.0, 60.0).round() as u32;

    let mut muxer: Option<Mp4Muxer> = None;
    let mut mismatched = 0u64;
    while let Some(mosaic) = mosaic_rx.recv() {
        // La taille n'est connue qu'à la première mosaïque.
        if muxer.is_none() {
            muxer = Some(Mp4Muxer::new(output, mosaic.width(), mosaic.height(), fps)?);
        }
        let Some(encoder) = muxer.as_mut() else {
            continue;
        };
        if mosaic.dimensions() != encoder.dimensions() {
            // Config rechargée en cours de route avec une autre largeur.
            mismatched += 1;
            continue;
        }
        encoder.write_frame(&mosaic)?;
    }

    if decoder.join().is_err() {
        log::error!("Thread vidéo paniqué.");
    }
    match worker.join() {
        Ok(stats) => log::info!(
            "Conversion : {} frame(s), {} ignorée(s), {} rechargement(s).",
            stats.converted,
            stats.skipped,
            stats.reloads
        ),
        Err(_) => log::error!("Thread de conversion paniqué."),
    }
    if mismatched > 0 {
        log::warn!("{mismatched} mosaïque(s) de taille différente non encodée(s).");
    }

    match muxer {
        Some(m) => {
            m.finish()?;
            log::info!("Vidéo écrite : {}", output.display());
            Ok(())
        }
        None => anyhow::bail!("Aucune frame convertie depuis {}", input.display()),
    }
}
