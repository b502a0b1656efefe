//! Error types for the image model and the loader system.

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::data::normalisation::NormScope;

/// Validation errors raised while constructing an [`HsImage`](crate::data::HsImage).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The sample array does not have exactly three axes
    #[error("image data must have 3 dimensions, got {ndim}")]
    NotThreeDimensional {
        /// Number of axes found
        ndim: usize,
    },

    /// The band axis is empty
    #[error("image data must have at least one band")]
    NoBands,

    /// The row or column axis is empty
    #[error("image must be at least 1x1 pixels, got {height}x{width}")]
    NoPixels {
        /// Rows in the cube
        height: usize,
        /// Columns in the cube
        width: usize,
    },

    /// Number of labels differs from the number of bands
    #[error("number of labels ({labels}) must be equal to the number of bands ({bands})")]
    LabelCountMismatch {
        /// Labels supplied
        labels: usize,
        /// Bands in the cube
        bands: usize,
    },

    /// Integer data was given without a bit depth
    #[error("integer data requires a bit depth")]
    MissingBitDepth,

    /// Bit depth outside `1..=element width`
    #[error("bit depth {bpp} is outside 1..={max}")]
    BitDepthOutOfRange {
        /// Requested bit depth
        bpp: u32,
        /// Width of the element type
        max: u32,
    },

    /// Floating-point data was given without a normalisation method
    #[error("floating-point data requires a normalisation method")]
    MissingNormalisation,

    /// No non-negative finite value exists to derive a normalisation range from
    #[error("no valid (non-negative, finite) values to normalise {scope}")]
    NoValidRange {
        /// Whole cube or the offending band
        scope: NormScope,
    },
}

/// Errors produced by file loaders and the registry dispatch.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// I/O error while reading the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes could not be parsed as the expected format
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the problem
        message: String,
    },

    /// The array uses an element kind the model cannot hold
    #[error("Only integer and floating point types are supported, file uses {kind}")]
    UnsupportedElementType {
        /// Name of the element kind found
        kind: String,
    },

    /// No 3-D numeric array found in the container
    #[error("No 3D arrays found in the data file")]
    NoCube,

    /// The selected array does not have three axes
    #[error("Array has {ndim} dimensions, expected 3")]
    WrongRank {
        /// Number of axes found
        ndim: usize,
    },

    /// No loader claims the file extension
    #[error("No loader registered for extension '{extension}'")]
    UnsupportedExtension {
        /// Extension as given, without the leading dot
        extension: String,
    },

    /// The container variant needs a disabled cargo feature
    #[error("{format} files are not supported by this build (enable the `{feature}` feature)")]
    FeatureDisabled {
        /// Human-readable container name
        format: &'static str,
        /// Cargo feature to enable
        feature: &'static str,
    },

    /// The decoded data failed model validation
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl LoaderError {
    /// Create a parse error with a message.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an unsupported element type error.
    pub fn unsupported_element(kind: impl Into<String>) -> Self {
        Self::UnsupportedElementType { kind: kind.into() }
    }
}

/// Configuration errors found while building a loader registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two loaders claim the same extension
    #[error("Extension {extension} claimed by {claimant} has been already registered by {owner}")]
    DuplicateExtension {
        /// The contested extension
        extension: &'static str,
        /// Loader that tried to claim it
        claimant: &'static str,
        /// Loader that registered it first
        owner: &'static str,
    },
}

/// Single reportable "load failed" condition.
///
/// `message` is the short human-readable cause, `detail` the full
/// diagnostic text (path, loader and the whole error chain).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// File that failed to load
    pub path: PathBuf,
    /// Short message suitable for a dialog body
    pub message: String,
    /// Full diagnostic detail
    pub detail: String,
}

impl LoadFailure {
    /// Build a failure report from a loader error.
    pub fn from_error(path: &Path, loader_id: Option<&str>, error: &LoaderError) -> Self {
        let mut detail = format!("file: {}\n", path.display());
        if let Some(id) = loader_id {
            detail.push_str(&format!("loader: {}\n", id));
        }
        detail.push_str(&format!("error: {:?}", error));

        let mut source = error.source();
        while let Some(cause) = source {
            detail.push_str(&format!("\ncaused by: {}", cause));
            source = cause.source();
        }

        Self {
            path: path.to_path_buf(),
            message: format!("Loading file failed\n\n{}", error),
            detail,
        }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for LoadFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failure_contains_cause() {
        let err = LoaderError::Model(ModelError::MissingBitDepth);
        let failure = LoadFailure::from_error(Path::new("/tmp/cube.hdr"), Some("envi"), &err);

        assert!(failure.message.starts_with("Loading file failed"));
        assert!(failure.message.contains("bit depth"));
        assert!(failure.detail.contains("loader: envi"));
        assert!(failure.detail.contains("MissingBitDepth"));
        assert_eq!(failure.path, PathBuf::from("/tmp/cube.hdr"));
    }

    #[test]
    fn test_io_error_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.raw");
        let err = LoaderError::from(io);
        let failure = LoadFailure::from_error(Path::new("a.hdr"), None, &err);

        assert_eq!(failure.path, PathBuf::from("a.hdr"));
        assert!(failure.message.contains("missing.raw"));
        assert!(failure.detail.contains("caused by: missing.raw"));
    }

    #[test]
    fn test_registry_error_message() {
        let err = RegistryError::DuplicateExtension {
            extension: "dat",
            claimant: "second",
            owner: "first",
        };
        assert_eq!(
            err.to_string(),
            "Extension dat claimed by second has been already registered by first"
        );
    }
}
