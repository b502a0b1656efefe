//! Trait-based hyperspectral file loading.
//!
//! Each file format implements [`FileLoader`]. The [`LoaderRegistry`] maps
//! file extensions to loaders and refuses to build when two loaders claim
//! the same extension.
//!
//! ## Supported Formats
//!
//! - **ENVI**: `.hdr` header with a raw sample file next to it
//! - **MATLAB**: `.mat` Level 5 files, and 7.3 (HDF5) files with the `hdf5` feature
//! - **NumPy Arrays**: `.npy` files holding a 3-D array
//!
//! ## Usage
//!
//! ```rust,ignore
//! use whaaale::data::LoaderRegistry;
//!
//! let registry = LoaderRegistry::new();
//! match registry.open(Path::new("scene.hdr"), &mut terminal) {
//!     Ok(Some(image)) => { /* show it */ }
//!     Ok(None) => { /* user cancelled */ }
//!     Err(failure) => eprintln!("{}\n\n{}", failure.message, failure.detail),
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::data::error::{LoadFailure, LoaderError, RegistryError};
use crate::data::hyperspectral::HsImage;
use crate::data::interactive::Interactive;

/// Trait for hyperspectral file format loaders.
pub trait FileLoader: Send + Sync {
    /// Unique identifier for this loader (e.g., "envi", "matlab").
    fn id(&self) -> &'static str;

    /// User friendly filter name for the "open file" dialog.
    fn filter_name(&self) -> &'static str;

    /// File extensions this loader claims, without dots.
    ///
    /// Example: `&["mat"]`, `&["jpg", "jpeg"]`.
    fn extensions(&self) -> &'static [&'static str];

    /// Load a file.
    ///
    /// # Returns
    /// * `Ok(Some(image))` - Successfully loaded image
    /// * `Ok(None)` - The user cancelled one of the questions
    /// * `Err(LoaderError)` - The file could not be read or validated
    fn load_file(
        &self,
        path: &Path,
        ui: &mut dyn Interactive,
    ) -> Result<Option<HsImage>, LoaderError>;
}

/// Registry of available loaders, keyed by extension.
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn FileLoader>>,
    /// extension -> index into `loaders`
    extensions: HashMap<&'static str, usize>,
}

impl LoaderRegistry {
    /// Create a registry with all built-in loaders.
    pub fn new() -> Self {
        Self::with_loaders(super::loaders::builtin())
            .expect("built-in loaders must claim distinct extensions")
    }

    /// Create a registry from an explicit list of loaders.
    ///
    /// Fails if two loaders claim the same extension.
    pub fn with_loaders(loaders: Vec<Box<dyn FileLoader>>) -> Result<Self, RegistryError> {
        let mut extensions = HashMap::new();
        for (idx, loader) in loaders.iter().enumerate() {
            for &ext in loader.extensions() {
                if let Some(&owner) = extensions.get(ext) {
                    let owner: &Box<dyn FileLoader> = &loaders[owner];
                    return Err(RegistryError::DuplicateExtension {
                        extension: ext,
                        claimant: loader.id(),
                        owner: owner.id(),
                    });
                }
                extensions.insert(ext, idx);
            }
        }

        log::debug!(
            "LoaderRegistry: {} loaders, extensions {:?}",
            loaders.len(),
            extensions.keys().collect::<Vec<_>>()
        );

        Ok(Self {
            loaders,
            extensions,
        })
    }

    /// Get all registered loaders, in registration order.
    pub fn loaders(&self) -> &[Box<dyn FileLoader>] {
        &self.loaders
    }

    /// Get all supported file extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self.extensions.keys().copied().collect();
        extensions.sort_unstable();
        extensions
    }

    /// Filters for an "open file" dialog, e.g. `"Matlab files (*.mat)"`.
    pub fn filters(&self) -> Vec<String> {
        self.loaders
            .iter()
            .map(|l| {
                let patterns = l
                    .extensions()
                    .iter()
                    .map(|e| format!("*.{}", e))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("{} ({})", l.filter_name(), patterns)
            })
            .collect()
    }

    /// Find the loader for a path's extension (case as given).
    pub fn loader_for(&self, path: &Path) -> Result<&dyn FileLoader, LoaderError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.extensions
            .get(extension.as_str())
            .map(|&idx| self.loaders[idx].as_ref())
            .ok_or(LoaderError::UnsupportedExtension { extension })
    }

    /// Load a file with the loader registered for its extension.
    ///
    /// Errors of any kind are folded into a single [`LoadFailure`];
    /// cancellation is `Ok(None)`.
    pub fn open(
        &self,
        path: &Path,
        ui: &mut dyn Interactive,
    ) -> Result<Option<HsImage>, LoadFailure> {
        let loader = self
            .loader_for(path)
            .map_err(|e| LoadFailure::from_error(path, None, &e))?;

        log::debug!("Opening {} with {} loader", path.display(), loader.id());

        match loader.load_file(path, ui) {
            Ok(Some(image)) => {
                let (h, w, b) = image.shape();
                log::info!(
                    "Loaded {} ({}x{}, {} bands, {})",
                    path.display(),
                    h,
                    w,
                    b,
                    image.sample_type()
                );
                Ok(Some(image))
            }
            Ok(None) => {
                log::info!("Loading {} cancelled", path.display());
                Ok(None)
            }
            Err(e) => {
                log::warn!("Loader {} failed on {}: {}", loader.id(), path.display(), e);
                Err(LoadFailure::from_error(path, Some(loader.id()), &e))
            }
        }
    }

    /// Check if a path has a registered extension.
    pub fn is_supported_file(&self, path: &Path) -> bool {
        self.loader_for(path).is_ok()
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
