//! Font faces, mosaic composition and video muxing for glyphmosaic.
//!
//! `font` wraps ab_glyph behind the `GlyphFace` contract, `composer` stamps a
//! glyph grid onto an RGB canvas, `muxer` streams composed frames to ffmpeg.

pub mod composer;
pub mod font;
pub mod muxer;

pub use composer::{canvas_size, compose};
pub use font::{AbGlyphFace, AbGlyphLoader};
pub use muxer::Mp4Muxer;
