//! Conversion of model data into payloads for the presentation layer.

use ndarray::{Array, Array2, Dimension, Ix2, Ix3};

/// Reduce integer samples of bit depth `bpp` to 8 bits.
///
/// For `bpp >= 8` this rounds to nearest: `(v + 2^(bpp-9)) >> (bpp-8)`.
/// Lower depths are scaled up linearly. Results are clamped to `0..=255`.
pub fn as_8bpp<D: Dimension>(data: &Array<f64, D>, bpp: u32) -> Array<u8, D> {
    data.mapv(|v| sample_to_u8(v, bpp))
}

/// Reduce one integer sample to 8 bits, see [`as_8bpp`].
pub fn sample_to_u8(value: f64, bpp: u32) -> u8 {
    let v = value as i128;
    let reduced = if bpp >= 8 {
        let shift = bpp - 8;
        let bias = if shift == 0 { 0 } else { 1i128 << (shift - 1) };
        (v + bias) >> shift
    } else {
        let full = (1i128 << bpp) - 1;
        (v * 255 + full / 2) / full
    };
    reduced.clamp(0, 255) as u8
}

/// Scale 0-1 floats to 8 bits, the way the renderer does for floating data.
pub fn unit_to_u8<D: Dimension>(data: &Array<f64, D>) -> Array<u8, D> {
    data.mapv(|v| (v.clamp(0.0, 1.0) * 255.0) as u8)
}

/// One channel set of a preview, either 8-bit or normalised floats.
#[derive(Debug, Clone, PartialEq)]
pub enum Channel<D: Dimension> {
    /// 8-bit samples (integer source data)
    Bytes(Array<u8, D>),
    /// Samples in `[0, 1]` (floating source data)
    Unit(Array<f64, D>),
}

impl<D: Dimension> Channel<D> {
    /// Shape of the underlying array.
    pub fn shape(&self) -> &[usize] {
        match self {
            Channel::Bytes(a) => a.shape(),
            Channel::Unit(a) => a.shape(),
        }
    }

    /// Convert to 8 bits regardless of representation.
    pub fn to_bytes(&self) -> Array<u8, D> {
        match self {
            Channel::Bytes(a) => a.clone(),
            Channel::Unit(a) => unit_to_u8(a),
        }
    }
}

/// What the image preview should show.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// A single band as grayscale
    Mono(Channel<Ix2>),
    /// Three bands as red, green and blue
    Rgb(Channel<Ix3>),
    /// A single band with the similarity mask highlighted
    Similar {
        band: Channel<Ix2>,
        mask: Array2<bool>,
    },
}

impl Preview {
    /// `(height, width)` of the preview.
    pub fn dimensions(&self) -> (usize, usize) {
        let shape = match self {
            Preview::Mono(c) => c.shape(),
            Preview::Rgb(c) => c.shape(),
            Preview::Similar { band, .. } => band.shape(),
        };
        (shape[0], shape[1])
    }
}
