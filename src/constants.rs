//! Global constants for the viewer core

/// Target wavelengths (nm) for the red, green and blue channels
pub const RGB_WAVELENGTHS_NM: [f64; 3] = [630.0, 532.0, 465.0];

/// A band further than this from its RGB target (nm) is not a usable match
pub const RGB_MAX_DISTANCE_NM: f64 = 30.0;

/// Default similarity threshold, percent of the maximum MSE
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 1.0;

/// Length of the leading signature inspected in MATLAB files
pub const MAT_SIGNATURE_LEN: usize = 19;

/// Signature of MATLAB 7.3 (HDF5 based) files
pub const MAT_HDF5_SIGNATURE: &[u8; MAT_SIGNATURE_LEN] = b"MATLAB 7.3 MAT-file";
