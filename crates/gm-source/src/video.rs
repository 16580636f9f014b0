// Décodage vidéo via subprocess ffmpeg (std::process::Command), sans
// dépendance native. Prérequis : `ffmpeg` et `ffprobe` accessibles dans PATH.
//
// Architecture :
//   - `probe_video`       : interroge ffprobe pour obtenir width/height/fps
//   - `spawn_ffmpeg_pipe` : lance ffmpeg → flux raw RGBA sur stdout
//   - `spawn_video_thread`: thread dédié, rythmé au fps du flux comme une
//                           caméra, publie dans un slot latest-wins

use anyhow::{Context, Result};
use flume::Receiver;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use gm_core::frame::FrameBuffer;
use gm_core::slot::SlotSender;

/// Largeur maximale décodée. Le downsampler réduit de toute façon à la grille.
pub const MAX_DECODE_WIDTH: u32 = 640;

/// Métadonnées extraites via ffprobe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Images par seconde (ex: 23.976, 24.0, 30.0, 60.0).
    pub fps: f64,
}

/// Réduit (w, h) pour tenir dans `max_w` en gardant le ratio, dimensions paires.
///
/// # Example
/// ```
/// use gm_source::video::fit_width;
/// assert_eq!(fit_width(1920, 1080, 640), (640, 360));
/// assert_eq!(fit_width(320, 240, 640), (320, 240));
/// ```
#[must_use]
pub fn fit_width(w: u32, h: u32, max_w: u32) -> (u32, u32) {
    if w <= max_w || w == 0 {
        return (w, h);
    }
    let nh = (f64::from(h) * f64::from(max_w) / f64::from(w)).round() as u32;
    (max_w & !1, (nh & !1).max(2))
}

/// Interroge `ffprobe` pour obtenir les métadonnées du flux vidéo principal.
///
/// # Errors
/// Retourne une erreur si `ffprobe` est introuvable ou si le fichier
/// ne contient aucun flux vidéo décodable.
pub fn probe_video(path: &Path) -> Result<VideoInfo> {
    let path_str = path.to_str().context("Chemin vidéo invalide (non-UTF8)")?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
            "-of",
            "default=noprint_wrappers=1",
            "-i",
            path_str,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .context(
            "Impossible de lancer ffprobe. Vérifiez que ffprobe est installé et dans le PATH.",
        )?;

    let info = parse_probe(&String::from_utf8_lossy(&output.stdout));
    if info.width == 0 || info.height == 0 {
        anyhow::bail!(
            "ffprobe n'a trouvé aucun flux vidéo dans {}",
            path.display()
        );
    }

    log::info!(
        "probe_video: {}x{} @ {:.3}fps — {}",
        info.width,
        info.height,
        info.fps,
        path.display()
    );
    Ok(info)
}

/// Parse la sortie `key=value` de ffprobe. Champs absents → 0×0 @ 30fps.
fn parse_probe(text: &str) -> VideoInfo {
    let mut info = VideoInfo {
        width: 0,
        height: 0,
        fps: 30.0,
    };
    for line in text.lines() {
        if let Some(val) = line.strip_prefix("width=") {
            info.width = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("height=") {
            info.height = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("r_frame_rate=") {
            // Format: "24/1" ou "30000/1001"
            let mut parts = val.trim().splitn(2, '/');
            let num: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(30.0);
            let den: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            if den > 0.0 && num > 0.0 {
                info.fps = num / den;
            }
        }
    }
    info
}

/// Lance un processus `ffmpeg` qui écrit des frames RGBA brutes sur stdout.
///
/// Chaque frame = `w × h × 4` bytes (RGBA row-major, sans padding).
/// Retourne `None` si le spawn échoue (log::warn émis).
#[must_use]
pub fn spawn_ffmpeg_pipe(path: &Path, w: u32, h: u32, target_fps: u32) -> Option<Child> {
    let Some(path_str) = path.to_str() else {
        log::warn!("spawn_ffmpeg_pipe: chemin non-UTF8");
        return None;
    };

    let scale_filter = format!("scale={w}:{h}:flags=area");
    let fps_str = target_fps.to_string();

    match Command::new("ffmpeg")
        .args([
            "-i",
            path_str,
            "-vf",
            &scale_filter,
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-r",
            &fps_str,
            "-an",
            "-hide_banner",
            "-loglevel",
            "error",
            "pipe:1",
        ])
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => {
            log::debug!("ffmpeg spawné: {w}x{h} @ {target_fps}fps");
            Some(child)
        }
        Err(e) => {
            log::warn!("spawn_ffmpeg_pipe: impossible de lancer ffmpeg: {e}");
            None
        }
    }
}

/// Lit exactement `buf.len()` bytes depuis `reader`.
///
/// # Errors
/// Retourne `Ok(true)` si lu avec succès, `Ok(false)` sur EOF avant complétion,
/// `Err` sur erreur I/O fatale.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok(false),
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Spawne le thread de décodage vidéo.
///
/// Le thread publie chaque frame dans `frames` (latest-wins : une frame non
/// consommée est remplacée) au rythme natif du flux. En fin de flux ou sur
/// réception d'un message sur `quit_rx`, il pousse le sentinel `Stop`.
///
/// # Errors
/// Retourne une erreur si `ffprobe` est introuvable ou si le fichier est invalide.
pub fn spawn_video_thread(
    path: PathBuf,
    frames: SlotSender<FrameBuffer>,
    quit_rx: Receiver<()>,
) -> Result<(thread::JoinHandle<()>, VideoInfo)> {
    let info = probe_video(&path)?;

    let handle = thread::Builder::new()
        .name("gm-video".to_string())
        .spawn(move || {
            video_loop(&path, &frames, &quit_rx, info);
            let _ = frames.stop();
        })
        .context("Impossible de spawner le thread vidéo")?;

    Ok((handle, info))
}

/// Boucle principale du thread vidéo.
fn video_loop(
    path: &Path,
    frames: &SlotSender<FrameBuffer>,
    quit_rx: &Receiver<()>,
    info: VideoInfo,
) {
    let (w, h) = fit_width(info.width, info.height, MAX_DECODE_WIDTH);
    let target_fps = info.fps.clamp(1.0, 60.0).round() as u32;
    let frame_period = Duration::from_secs_f64(1.0 / f64::from(target_fps));
    let frame_bytes = w as usize * h as usize * 4;

    let Some(mut child) = spawn_ffmpeg_pipe(path, w, h, target_fps) else {
        return;
    };
    let mut last_frame = Instant::now();
    let mut sent = 0u64;
    let mut dropped = 0u64;

    loop {
        if quit_rx.try_recv().is_ok() {
            log::info!("Thread vidéo: arrêt demandé.");
            break;
        }

        // === Timing FPS ===
        if let Some(remaining) = frame_period.checked_sub(last_frame.elapsed()) {
            thread::sleep(remaining);
        }
        last_frame = Instant::now();

        let mut fb = FrameBuffer::new(w, h);
        let read_result = child
            .stdout
            .as_mut()
            .map_or(Ok(false), |stdout| read_exact_or_eof(stdout, &mut fb.data[..frame_bytes]));

        match read_result {
            Ok(true) => match frames.publish(fb) {
                Ok(gm_core::slot::Offer::Replaced) => {
                    sent += 1;
                    dropped += 1;
                }
                Ok(_) => sent += 1,
                Err(_) => {
                    log::debug!("Thread vidéo: consommateur parti.");
                    break;
                }
            },
            Ok(false) => {
                log::info!("Thread vidéo: EOF après {sent} frames.");
                break;
            }
            Err(e) => {
                log::warn!("Thread vidéo: erreur lecture pipe: {e}");
                break;
            }
        }
    }

    if dropped > 0 {
        log::info!("Thread vidéo: {dropped}/{sent} frames écrasées (consommateur lent).");
    }
    let _ = child.kill();
    let _ = child.wait();
    log::info!("Thread vidéo terminé proprement.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_exact_or_eof_reports_short_reads() {
        let mut full = Cursor::new(vec![1u8; 8]);
        let mut buf = [0u8; 8];
        assert!(read_exact_or_eof(&mut full, &mut buf).unwrap());

        let mut short = Cursor::new(vec![1u8; 3]);
        assert!(!read_exact_or_eof(&mut short, &mut buf).unwrap());
    }

    #[test]
    fn parse_probe_reads_rational_fps() {
        let info = parse_probe("width=1280\nheight=720\nr_frame_rate=30000/1001\n");
        assert_eq!((info.width, info.height), (1280, 720));
        assert!((info.fps - 29.97).abs() < 0.01);
    }

    #[test]
    fn parse_probe_missing_stream_is_zero_sized() {
        let info = parse_probe("");
        assert_eq!((info.width, info.height), (0, 0));
    }

    #[test]
    fn fit_width_keeps_even_dimensions() {
        let (w, h) = fit_width(1000, 333, 640);
        assert_eq!(w % 2, 0);
        assert_eq!(h % 2, 0);
        assert_eq!(w, 640);
    }
}
