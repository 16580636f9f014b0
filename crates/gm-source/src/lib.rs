//! Visual sources and downsampling for glyphmosaic (image files, in-memory
//! frames, folders, video).

pub mod downsample;
pub mod folder;
pub mod image;
pub mod resize;

#[cfg(feature = "video")]
pub mod video;

pub use downsample::{Downsampler, downsample, grid_rows};
pub use self::image::load_image;
