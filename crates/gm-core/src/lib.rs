//! Configuration, types, and shared structures for glyphmosaic.
//!
//! This crate contains the palette, the layout configuration, the error
//! taxonomy, the pixel/glyph buffers and the traits shared across the
//! glyphmosaic workspace.

pub mod canvas;
pub mod charset;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod slot;
pub mod traits;

pub use canvas::Canvas;
pub use charset::Palette;
pub use color::Rgb;
pub use config::MosaicConfig;
pub use error::CoreError;
pub use frame::{Downsampled, FrameBuffer, GlyphCell, GlyphGrid};
pub use traits::{FontLoader, GlyphFace, GlyphMetrics};
