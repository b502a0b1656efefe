//! Element kinds accepted by the image model.
//!
//! Cubes are held as `f64` internally; the file's element kind is kept as
//! a [`SampleType`] so loaders and the model know whether the data is
//! integer (needs a bit depth) or floating point (needs a normalisation).

use std::fmt;

use ndarray::{Array, ArrayD, Dimension, IxDyn};

/// Element kind of the array a cube was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl SampleType {
    /// Width of one element in bits.
    pub fn bits(self) -> u32 {
        match self {
            SampleType::U8 | SampleType::I8 => 8,
            SampleType::U16 | SampleType::I16 => 16,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 32,
            SampleType::U64 | SampleType::I64 | SampleType::F64 => 64,
        }
    }

    /// Whether the element kind is a floating-point type.
    pub fn is_float(self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    /// Whether the element kind is a fixed-width integer type.
    pub fn is_integer(self) -> bool {
        !self.is_float()
    }

    /// Short NumPy-style name (`uint16`, `float32`, ...).
    pub fn name(self) -> &'static str {
        match self {
            SampleType::U8 => "uint8",
            SampleType::U16 => "uint16",
            SampleType::U32 => "uint32",
            SampleType::U64 => "uint64",
            SampleType::I8 => "int8",
            SampleType::I16 => "int16",
            SampleType::I32 => "int32",
            SampleType::I64 => "int64",
            SampleType::F32 => "float32",
            SampleType::F64 => "float64",
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for numeric element types a cube can be built from.
pub trait Sample: Copy {
    /// Element kind reported for this type.
    const TYPE: SampleType;

    /// Widen to `f64`. 64-bit integers above 2^53 lose their lowest bits.
    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Sample for $ty {
                const TYPE: SampleType = SampleType::$kind;

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_sample!(
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
);

impl Sample for f64 {
    const TYPE: SampleType = SampleType::F64;

    fn to_f64(self) -> f64 {
        self
    }
}

/// A decoded array of any rank, widened to `f64`, with its element kind.
///
/// Loaders produce this before the user has answered the remaining
/// questions (axis order, bit depth, normalisation).
#[derive(Debug, Clone)]
pub struct RawArray {
    pub data: ArrayD<f64>,
    pub sample_type: SampleType,
}

impl RawArray {
    pub fn new<T: Sample, D: Dimension>(data: Array<T, D>) -> Self {
        Self {
            data: data.mapv(|v| v.to_f64()).into_dyn(),
            sample_type: T::TYPE,
        }
    }

    /// Build from a flat row-major (C order) buffer.
    pub fn from_row_major<T: Sample>(shape: &[usize], values: Vec<T>) -> Option<Self> {
        ArrayD::from_shape_vec(IxDyn(shape), values).ok().map(Self::new)
    }

    /// Build from a flat column-major (Fortran order) buffer.
    pub fn from_column_major<T: Sample>(shape: &[usize], values: Vec<T>) -> Option<Self> {
        use ndarray::ShapeBuilder;
        ArrayD::from_shape_vec(IxDyn(shape).f(), values)
            .ok()
            .map(Self::new)
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Largest finite sample, or `None` if there is none.
    pub fn max_value(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// Smallest bit depth able to hold the largest sample (at least 1).
    pub fn min_bpp(&self) -> u32 {
        let max = self.max_value().unwrap_or(0.0);
        if max < 1.0 {
            return 1;
        }
        let bits = 64 - (max as u64).leading_zeros();
        bits.clamp(1, self.sample_type.bits())
    }

    /// Reorder the axes into standard (row-major) layout.
    pub fn permuted(self, axes: [usize; 3]) -> Self {
        let data = self
            .data
            .permuted_axes(IxDyn(&axes))
            .as_standard_layout()
            .into_owned();
        Self {
            data,
            sample_type: self.sample_type,
        }
    }
}
