//! Conversion orchestration for glyphmosaic: the converter, the conversion
//! worker, batch drivers, config hot reload and the CLI definition.

pub mod batch;
pub mod cli;
pub mod converter;
pub mod hotreload;
#[cfg(feature = "video")]
pub mod live;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

pub use converter::{ConvertInput, Converter};
