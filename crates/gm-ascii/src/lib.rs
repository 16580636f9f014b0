//! Glyph mapping for glyphmosaic.
//!
//! Quantizes downsampled luminance into palette glyphs paired with their
//! source colors.
pub mod mapper;

pub use mapper::{glyph_index, map_glyphs};
