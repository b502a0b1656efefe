//! Loader for NumPy `.npy` files.
//!
//! The file carries the element type and shape but not which axis holds
//! the bands, so the user is asked for the axis order.

use std::io::Cursor;
use std::path::Path;

use ndarray::ArrayD;
use ndarray_npy::ReadNpyExt;

use crate::data::HsImage;
use crate::data::error::LoaderError;
use crate::data::interactive::{Interactive, ask_axis_order, finish_image};
use crate::data::loader::FileLoader;
use crate::data::sample::RawArray;

/// Loader for NumPy `.npy` files holding a 3-D array.
///
/// Supported data types: `u8`..`u64`, `i8`..`i64`, `f32`, `f64`.
pub struct NpyLoader;

impl NpyLoader {
    /// NumPy magic bytes: \x93NUMPY
    const MAGIC: &'static [u8] = &[0x93, b'N', b'U', b'M', b'P', b'Y'];

    /// Check the magic bytes at the start of the file.
    pub fn is_npy(data: &[u8]) -> bool {
        data.starts_with(Self::MAGIC)
    }

    /// Decode the array, trying each supported element type in turn.
    pub fn decode(data: &[u8]) -> Result<RawArray, LoaderError> {
        if !Self::is_npy(data) {
            return Err(LoaderError::parse("not a NumPy .npy file"));
        }

        macro_rules! try_types {
            ($($ty:ty),*) => {
                $(
                    if let Ok(array) = ArrayD::<$ty>::read_npy(Cursor::new(data)) {
                        log::debug!(
                            "NpyLoader: {} array of shape {:?}",
                            stringify!($ty),
                            array.shape()
                        );
                        return Ok(RawArray::new(array));
                    }
                )*
            };
        }

        // f32 is the most common for scientific data
        try_types!(f32, f64, u8, u16, i16, u32, i32, u64, i64, i8);

        Err(LoaderError::unsupported_element(
            "an unsupported dtype (or the array is malformed)",
        ))
    }
}

impl FileLoader for NpyLoader {
    fn id(&self) -> &'static str {
        "npy"
    }

    fn filter_name(&self) -> &'static str {
        "NumPy arrays"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["npy"]
    }

    fn load_file(
        &self,
        path: &Path,
        ui: &mut dyn Interactive,
    ) -> Result<Option<HsImage>, LoaderError> {
        let raw = Self::decode(&std::fs::read(path)?)?;
        if raw.ndim() != 3 {
            return Err(LoaderError::WrongRank { ndim: raw.ndim() });
        }

        let Some(raw) = ask_axis_order(ui, raw) else {
            return Ok(None);
        };
        finish_image(ui, raw, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_metadata() {
        let loader = NpyLoader;
        assert_eq!(loader.id(), "npy");
        assert!(loader.extensions().contains(&"npy"));
    }

    #[test]
    fn test_magic_detection() {
        // Valid NumPy magic
        let valid_magic = [0x93, b'N', b'U', b'M', b'P', b'Y', 0x01, 0x00];
        assert!(NpyLoader::is_npy(&valid_magic));

        // Invalid data
        let invalid = [0x89, 0x50, 0x4E, 0x47]; // PNG magic
        assert!(!NpyLoader::is_npy(&invalid));
        assert!(matches!(
            NpyLoader::decode(&invalid),
            Err(LoaderError::Parse { .. })
        ));
    }
}
