use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use gm_core::config::MosaicConfig;
use gm_core::frame::FrameBuffer;
use gm_core::slot::{SlotReceiver, SlotSender};
use gm_core::traits::FontLoader;
use gm_export::font::AbGlyphLoader;
use image::RgbImage;

use crate::converter::{ConvertInput, Converter};

/// Bilan du worker de conversion à sa sortie.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Frames converties et publiées.
    pub converted: u64,
    /// Frames ignorées (géométrie dégénérée, police…).
    pub skipped: u64,
    /// Reconstructions du converter après rechargement de config.
    pub reloads: u64,
}

/// Lance le thread de conversion avec les polices ab_glyph.
///
/// # Errors
/// Voir [`spawn_conversion_worker_with`].
pub fn spawn_conversion_worker(
    config: Arc<ArcSwap<MosaicConfig>>,
    font: Option<PathBuf>,
    inbound: SlotReceiver<FrameBuffer>,
    outbound: SlotSender<RgbImage>,
) -> Result<thread::JoinHandle<WorkerStats>> {
    spawn_conversion_worker_with(AbGlyphLoader, config, font, inbound, outbound)
}

/// Lance le thread de conversion : frame entrante → mosaïque sortante.
///
/// Les deux côtés sont des slots latest-wins : une frame arrivée pendant une
/// conversion remplace la précédente, une mosaïque non lue est écrasée. Le
/// thread s'arrête sur `Stop` ou déconnexion du producteur et propage `Stop`
/// en aval. Le converter est reconstruit quand la config partagée change.
///
/// # Errors
/// Retourne une erreur si la config initiale est invalide ou si le thread ne
/// peut être créé.
pub fn spawn_conversion_worker_with<L>(
    loader: L,
    config: Arc<ArcSwap<MosaicConfig>>,
    font: Option<PathBuf>,
    inbound: SlotReceiver<FrameBuffer>,
    outbound: SlotSender<RgbImage>,
) -> Result<thread::JoinHandle<WorkerStats>>
where
    L: FontLoader + Clone + 'static,
{
    let mut current = config.load_full();
    let mut converter = Converter::with_loader((*current).clone(), loader.clone())
        .context("Config initiale invalide pour le worker de conversion")?;

    thread::Builder::new()
        .name("gm-convert".to_string())
        .spawn(move || {
            let mut stats = WorkerStats::default();

            while let Some(frame) = inbound.recv() {
                let latest = config.load_full();
                if !Arc::ptr_eq(&latest, &current) {
                    match Converter::with_loader((*latest).clone(), loader.clone()) {
                        Ok(rebuilt) => {
                            converter = rebuilt;
                            stats.reloads += 1;
                            log::info!("Worker : converter reconstruit (nouvelle config).");
                        }
                        Err(e) => log::warn!("Worker : config rejetée, ancienne conservée : {e}"),
                    }
                    current = latest;
                }

                match converter.convert(ConvertInput::Frame(&frame), font.as_deref()) {
                    Ok(Some(mosaic)) => {
                        stats.converted += 1;
                        if outbound.publish(mosaic).is_err() {
                            log::debug!("Worker : consommateur parti.");
                            break;
                        }
                    }
                    Ok(None) => stats.skipped += 1,
                    Err(e) => {
                        log::warn!("Worker : frame ignorée : {e}");
                        stats.skipped += 1;
                    }
                }
            }

            let _ = outbound.stop();
            log::info!(
                "Worker terminé : {} converties, {} ignorées.",
                stats.converted,
                stats.skipped
            );
            stats
        })
        .context("Impossible de spawner le thread de conversion")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CELL, FakeLoader};
    use gm_core::slot::latest_slot;

    fn shared(config: MosaicConfig) -> Arc<ArcSwap<MosaicConfig>> {
        Arc::new(ArcSwap::from_pointee(config))
    }

    fn test_config(width: u32) -> MosaicConfig {
        MosaicConfig {
            width,
            default_font: PathBuf::from("default.ttf"),
            ..MosaicConfig::default()
        }
    }

    #[test]
    fn converts_frames_and_forwards_stop() {
        let (frame_tx, frame_rx) = latest_slot();
        let (mosaic_tx, mosaic_rx) = latest_slot();
        let loader = FakeLoader::knowing(&["default.ttf"]);
        let handle = spawn_conversion_worker_with(
            loader,
            shared(test_config(40)),
            None,
            frame_rx,
            mosaic_tx,
        )
        .unwrap();

        frame_tx.publish(FrameBuffer::filled(80, 60, (0, 0, 0))).unwrap();
        let mosaic = mosaic_rx.recv().unwrap();
        // 15 lignes, floor(15 × 1.3) = 19.
        assert_eq!(mosaic.dimensions(), (40 * CELL.advance, 19 * CELL.line_height));

        frame_tx.stop().unwrap();
        assert!(mosaic_rx.recv().is_none());
        let stats = handle.join().unwrap();
        assert_eq!(stats.converted, 1);
    }

    #[test]
    fn failing_frames_are_skipped() {
        let (frame_tx, frame_rx) = latest_slot();
        let (mosaic_tx, mosaic_rx) = latest_slot();
        let handle = spawn_conversion_worker_with(
            FakeLoader::knowing(&["default.ttf"]),
            shared(test_config(40)),
            None,
            frame_rx,
            mosaic_tx,
        )
        .unwrap();

        // Géométrie dégénérée : ignorée, le worker continue.
        frame_tx.publish(FrameBuffer::filled(4000, 2, (0, 0, 0))).unwrap();
        while !frame_tx.is_empty() {
            thread::yield_now();
        }
        frame_tx.publish(FrameBuffer::filled(40, 40, (0, 0, 0))).unwrap();
        assert!(mosaic_rx.recv().is_some());

        drop(frame_tx);
        let stats = handle.join().unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.converted, 1);
    }

    #[test]
    fn config_change_rebuilds_converter() {
        let (frame_tx, frame_rx) = latest_slot();
        let (mosaic_tx, mosaic_rx) = latest_slot();
        let config = shared(test_config(40));
        let handle = spawn_conversion_worker_with(
            FakeLoader::knowing(&["default.ttf"]),
            Arc::clone(&config),
            None,
            frame_rx,
            mosaic_tx,
        )
        .unwrap();

        frame_tx.publish(FrameBuffer::filled(80, 80, (0, 0, 0))).unwrap();
        assert_eq!(mosaic_rx.recv().unwrap().width(), 40 * CELL.advance);

        config.store(Arc::new(test_config(20)));
        frame_tx.publish(FrameBuffer::filled(80, 80, (0, 0, 0))).unwrap();
        assert_eq!(mosaic_rx.recv().unwrap().width(), 20 * CELL.advance);

        frame_tx.stop().unwrap();
        let stats = handle.join().unwrap();
        assert_eq!(stats.reloads, 1);
    }

    #[test]
    fn invalid_initial_config_fails_fast() {
        let (_frame_tx, frame_rx) = latest_slot::<FrameBuffer>();
        let (mosaic_tx, _mosaic_rx) = latest_slot();
        assert!(
            spawn_conversion_worker_with(
                FakeLoader::default(),
                shared(test_config(0)),
                None,
                frame_rx,
                mosaic_tx,
            )
            .is_err()
        );
    }
}
