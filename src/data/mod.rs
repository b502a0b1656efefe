//! Data structures and loaders for hyperspectral image data.
//!
//! This module provides:
//! - `HsImage`: an immutable `[row, column, band]` cube with its bit depth
//!   or normalisation, band labels and valid-sample mask
//! - `LoaderRegistry`: extension based dispatch to file loaders
//! - Built-in loaders for ENVI rasters, MATLAB files and NumPy (.npy) files
//!
//! ## Adding New Formats
//!
//! To add support for a new format:
//!
//! 1. Create a new loader in `loaders/` implementing `FileLoader`
//! 2. Register it in `loaders::builtin()`
//!
//! ```rust,ignore
//! use whaaale::data::{FileLoader, HsImage, Interactive, LoaderError};
//!
//! pub struct MyFormatLoader;
//!
//! impl FileLoader for MyFormatLoader {
//!     fn id(&self) -> &'static str { "myformat" }
//!     fn filter_name(&self) -> &'static str { "My Format" }
//!     fn extensions(&self) -> &'static [&'static str] { &["myf"] }
//!     fn load_file(&self, path: &Path, ui: &mut dyn Interactive)
//!         -> Result<Option<HsImage>, LoaderError> { /* ... */ }
//! }
//! ```

pub mod display;
pub mod error;
mod hyperspectral;
pub mod interactive;
pub mod labels;
mod loader;
pub mod loaders;
pub mod normalisation;
pub mod sample;
pub mod similarity;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;

pub use display::{Channel, Preview};
pub use error::{LoadFailure, LoaderError, ModelError, RegistryError};
pub use hyperspectral::{Coordinates, HsImage, HsImageBuilder};
pub use interactive::{AxisOrder, Interactive};
pub use labels::LabelType;
pub use loader::{FileLoader, LoaderRegistry};
pub use normalisation::{NormRange, NormScope, NormalisationMethod};
pub use sample::{RawArray, Sample, SampleType};
pub use stats::AreaStats;
