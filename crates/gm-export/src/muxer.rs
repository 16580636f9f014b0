use anyhow::{Context, Result};
use image::RgbImage;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Encode des mosaïques RGB24 dans un fichier MP4 via un subprocess ffmpeg.
///
/// Toutes les frames doivent avoir la taille déclarée à la construction.
pub struct Mp4Muxer {
    ffmpeg_child: Child,
    width: u32,
    height: u32,
    frames: u64,
}

impl Mp4Muxer {
    /// Lance l'encodeur. x264 RGB en `-crf 0` : aucune perte sur les aplats
    /// de couleur des glyphes.
    ///
    /// # Errors
    /// Retourne une erreur si ffmpeg n'est pas installé ou impossible à démarrer.
    pub fn new(output_path: &Path, width: u32, height: u32, target_fps: u32) -> Result<Self> {
        let path_str = output_path.to_str().context("Chemin de sortie invalide (non-UTF8)")?;
        if width == 0 || height == 0 {
            anyhow::bail!("Taille vidéo invalide : {width}x{height}");
        }

        let child = Command::new("ffmpeg")
            .args([
                "-y",
                "-f",
                "rawvideo",
                "-vcodec",
                "rawvideo",
                "-s",
                &format!("{width}x{height}"),
                "-pix_fmt",
                "rgb24",
                "-r",
                &target_fps.max(1).to_string(),
                "-i",
                "-",
                "-c:v",
                "libx264rgb",
                "-crf",
                "0",
                "-preset",
                "veryfast",
                "-pix_fmt",
                "rgb24",
                "-color_range",
                "pc",
                "-hide_banner",
                "-loglevel",
                "error",
                path_str,
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Échec du lancement de l'encodeur ffmpeg. (Est-il dans PATH ?)")?;

        log::info!(
            "Encodeur MP4 : {width}x{height} @ {target_fps}fps → {}",
            output_path.display()
        );
        Ok(Self {
            ffmpeg_child: child,
            width,
            height,
            frames: 0,
        })
    }

    /// Taille attendue des frames.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Ajoute une frame au flux.
    ///
    /// # Errors
    /// Retourne une erreur si la taille diffère ou si l'écriture dans le pipe échoue.
    pub fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            anyhow::bail!(
                "Frame {}x{} incompatible avec le flux {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            );
        }
        let stdin = self
            .ffmpeg_child
            .stdin
            .as_mut()
            .context("Pipe ffmpeg déjà fermé")?;
        stdin
            .write_all(frame.as_raw())
            .context("Écriture dans le pipe ffmpeg")?;
        self.frames += 1;
        Ok(())
    }

    /// Ferme le flux et finalise le fichier.
    ///
    /// # Errors
    /// Retourne une erreur si ffmpeg signale une erreur de terminaison.
    pub fn finish(mut self) -> Result<u64> {
        drop(self.ffmpeg_child.stdin.take());

        let output = self.ffmpeg_child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Erreur de l'encodeur ffmpeg : {stderr}");
        }
        log::info!("Encodeur MP4 : {} frame(s) écrite(s).", self.frames);
        Ok(self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_size() {
        assert!(Mp4Muxer::new(Path::new("never.mp4"), 0, 10, 30).is_err());
    }

    #[test]
    fn mismatched_frame_is_rejected() {
        // Dépend de la présence de ffmpeg ; sans lui, rien à vérifier.
        let dir = tempfile::tempdir().unwrap();
        let Ok(mut muxer) = Mp4Muxer::new(&dir.path().join("out.mp4"), 64, 64, 30) else {
            return;
        };
        assert_eq!(muxer.dimensions(), (64, 64));
        assert!(muxer.write_frame(&RgbImage::new(32, 32)).is_err());
        assert!(muxer.write_frame(&RgbImage::new(64, 64)).is_ok());
        let _ = muxer.finish();
    }
}
