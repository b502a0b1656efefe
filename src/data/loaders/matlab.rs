//! Loader for MATLAB `.mat` files.
//!
//! The first 19 bytes select the container: `MATLAB 7.3 MAT-file` marks an
//! HDF5 file, anything else is read as a Level 5 MAT-file. Both paths list
//! the 3-D variables, let the user pick one, then ask for the axis order
//! and the bit depth or normalisation.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use matfile::{MatFile, NumericData};

use crate::constants::{MAT_HDF5_SIGNATURE, MAT_SIGNATURE_LEN};
use crate::data::HsImage;
use crate::data::error::LoaderError;
use crate::data::interactive::{
    Candidate, Interactive, ask_axis_order, finish_image, select_variable,
};
use crate::data::loader::FileLoader;
use crate::data::sample::RawArray;

/// Container variant of a `.mat` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatVersion {
    /// Level 5 MAT-file (MATLAB 5 up to 7.2)
    Level5,
    /// MATLAB 7.3 file stored as HDF5
    Hdf5,
}

impl MatVersion {
    /// Classify a file from its first bytes.
    pub fn detect(head: &[u8]) -> Self {
        if head.len() >= MAT_SIGNATURE_LEN && &head[..MAT_SIGNATURE_LEN] == MAT_HDF5_SIGNATURE {
            MatVersion::Hdf5
        } else {
            MatVersion::Level5
        }
    }
}

/// Loader for MATLAB `.mat` files.
pub struct MatlabLoader;

impl MatlabLoader {
    fn read_signature(path: &Path) -> Result<MatVersion, LoaderError> {
        let mut head = Vec::with_capacity(MAT_SIGNATURE_LEN);
        File::open(path)?
            .take(MAT_SIGNATURE_LEN as u64)
            .read_to_end(&mut head)?;
        Ok(MatVersion::detect(&head))
    }

    fn load_level5(
        path: &Path,
        ui: &mut dyn Interactive,
    ) -> Result<Option<HsImage>, LoaderError> {
        let reader = BufReader::new(File::open(path)?);
        let mat = MatFile::parse(reader)
            .map_err(|e| LoaderError::parse(format!("invalid MAT-file: {:?}", e)))?;

        let candidates = level5_candidates(&mat);
        log::debug!("MatlabLoader: {} 3D variables in {}", candidates.len(), path.display());

        let Some(name) = select_variable(ui, &candidates)? else {
            return Ok(None);
        };
        let array = mat
            .arrays()
            .iter()
            .find(|a| a.name() == name)
            .ok_or(LoaderError::NoCube)?;
        let raw = level5_raw(array.size(), array.data())?;

        let Some(raw) = ask_axis_order(ui, raw) else {
            return Ok(None);
        };
        finish_image(ui, raw, None)
    }

    #[cfg(feature = "hdf5")]
    fn load_hdf5(path: &Path, ui: &mut dyn Interactive) -> Result<Option<HsImage>, LoaderError> {
        let file = hdf5_reader::open(path)?;
        let candidates = hdf5_reader::candidates(&file)?;
        log::debug!("MatlabLoader: {} 3D datasets in {}", candidates.len(), path.display());

        let Some(name) = select_variable(ui, &candidates)? else {
            return Ok(None);
        };
        let raw = hdf5_reader::read(&file, &name)?;

        let Some(raw) = ask_axis_order(ui, raw) else {
            return Ok(None);
        };
        finish_image(ui, raw, None)
    }

    #[cfg(not(feature = "hdf5"))]
    fn load_hdf5(
        _path: &Path,
        _ui: &mut dyn Interactive,
    ) -> Result<Option<HsImage>, LoaderError> {
        Err(LoaderError::FeatureDisabled {
            format: "MATLAB 7.3 (HDF5)",
            feature: "hdf5",
        })
    }
}

impl FileLoader for MatlabLoader {
    fn id(&self) -> &'static str {
        "matlab"
    }

    fn filter_name(&self) -> &'static str {
        "Matlab files"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["mat"]
    }

    fn load_file(
        &self,
        path: &Path,
        ui: &mut dyn Interactive,
    ) -> Result<Option<HsImage>, LoaderError> {
        match Self::read_signature(path)? {
            MatVersion::Hdf5 => Self::load_hdf5(path, ui),
            MatVersion::Level5 => Self::load_level5(path, ui),
        }
    }
}

/// Non-reserved 3-D variables of a Level 5 file.
fn level5_candidates(mat: &MatFile) -> Vec<Candidate> {
    mat.arrays()
        .iter()
        .filter(|a| !a.name().starts_with("__") && a.size().len() == 3)
        .map(|a| Candidate::new(a.name(), a.size().to_vec()))
        .collect()
}

/// Convert a Level 5 numeric array (column-major) to a [`RawArray`].
fn level5_raw(shape: &[usize], data: &NumericData) -> Result<RawArray, LoaderError> {
    macro_rules! real_only {
        ($real:expr, $imag:expr, $kind:literal) => {{
            if $imag.is_some() {
                return Err(LoaderError::unsupported_element($kind));
            }
            RawArray::from_column_major(shape, $real.clone())
        }};
    }

    let raw = match data {
        NumericData::Int8 { real, imag } => real_only!(real, imag, "complex int8"),
        NumericData::UInt8 { real, imag } => real_only!(real, imag, "complex uint8"),
        NumericData::Int16 { real, imag } => real_only!(real, imag, "complex int16"),
        NumericData::UInt16 { real, imag } => real_only!(real, imag, "complex uint16"),
        NumericData::Int32 { real, imag } => real_only!(real, imag, "complex int32"),
        NumericData::UInt32 { real, imag } => real_only!(real, imag, "complex uint32"),
        NumericData::Int64 { real, imag } => real_only!(real, imag, "complex int64"),
        NumericData::UInt64 { real, imag } => real_only!(real, imag, "complex uint64"),
        NumericData::Single { real, imag } => real_only!(real, imag, "complex64"),
        NumericData::Double { real, imag } => real_only!(real, imag, "complex128"),
    };
    raw.ok_or_else(|| LoaderError::parse(format!("array data does not match size {:?}", shape)))
}

#[cfg(feature = "hdf5")]
mod hdf5_reader {
    //! MATLAB 7.3 files through the HDF5 library.

    use std::path::Path;

    use hdf5::File;
    use hdf5::types::{FloatSize, IntSize, TypeDescriptor};

    use crate::data::error::LoaderError;
    use crate::data::interactive::Candidate;
    use crate::data::sample::RawArray;

    fn h5_error(e: hdf5::Error) -> LoaderError {
        LoaderError::parse(format!("HDF5: {}", e))
    }

    pub fn open(path: &Path) -> Result<File, LoaderError> {
        File::open(path).map_err(h5_error)
    }

    /// Non-reserved 3-D datasets at the file root.
    pub fn candidates(file: &File) -> Result<Vec<Candidate>, LoaderError> {
        let names = file.member_names().map_err(h5_error)?;
        Ok(names
            .into_iter()
            .filter(|n| !n.starts_with('#'))
            .filter_map(|n| {
                let dataset = file.dataset(&n).ok()?;
                (dataset.ndim() == 3).then(|| Candidate::new(n, dataset.shape()))
            })
            .collect())
    }

    /// Read a dataset in HDF5 (row-major) order.
    pub fn read(file: &File, name: &str) -> Result<RawArray, LoaderError> {
        let dataset = file.dataset(name).map_err(h5_error)?;
        let shape = dataset.shape();
        let descriptor = dataset
            .dtype()
            .and_then(|t| t.to_descriptor())
            .map_err(h5_error)?;

        macro_rules! read_as {
            ($ty:ty) => {
                RawArray::from_row_major(&shape, dataset.read_raw::<$ty>().map_err(h5_error)?)
            };
        }

        let raw = match descriptor {
            TypeDescriptor::Integer(IntSize::U1) => read_as!(i8),
            TypeDescriptor::Integer(IntSize::U2) => read_as!(i16),
            TypeDescriptor::Integer(IntSize::U4) => read_as!(i32),
            TypeDescriptor::Integer(IntSize::U8) => read_as!(i64),
            TypeDescriptor::Unsigned(IntSize::U1) => read_as!(u8),
            TypeDescriptor::Unsigned(IntSize::U2) => read_as!(u16),
            TypeDescriptor::Unsigned(IntSize::U4) => read_as!(u32),
            TypeDescriptor::Unsigned(IntSize::U8) => read_as!(u64),
            TypeDescriptor::Float(FloatSize::U4) => read_as!(f32),
            TypeDescriptor::Float(FloatSize::U8) => read_as!(f64),
            other => return Err(LoaderError::unsupported_element(format!("{:?}", other))),
        };
        raw.ok_or_else(|| LoaderError::parse(format!("dataset '{}' has inconsistent size", name)))
    }
}
