use thiserror::Error;

/// Errors originating from the conversion pipeline.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Source image missing, unreadable or undecodable.
    #[error("Impossible de charger l'image {path} : {reason}")]
    ImageLoad {
        /// Path (or frame label) that failed.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// Font file missing or not a parsable TrueType/OpenType face.
    #[error("Impossible de charger la police {path} : {reason}")]
    FontLoad {
        /// Font path that failed.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Pixel buffer does not match the declared dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// The source aspect ratio yields a grid with zero rows.
    #[error("Géométrie dégénérée : {width} colonnes pour une source {src_width}×{src_height} donnent 0 ligne")]
    DegenerateGeometry {
        /// Configured column count.
        width: u32,
        /// Source width in pixels.
        src_width: u32,
        /// Source height in pixels.
        src_height: u32,
    },
}

impl CoreError {
    /// True for per-frame source failures that a conversion loop may skip.
    #[must_use]
    pub fn is_image_load(&self) -> bool {
        matches!(self, Self::ImageLoad { .. })
    }
}
