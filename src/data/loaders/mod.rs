//! Built-in hyperspectral file loaders.
//!
//! This module contains implementations of the `FileLoader` trait
//! for each supported file format.

mod envi;
mod matlab;
mod npy_loader;

#[cfg(test)]
mod tests;

pub use envi::{EnviHeader, EnviLoader, Interleave, find_data_file};
pub use matlab::{MatVersion, MatlabLoader};
pub use npy_loader::NpyLoader;

use crate::data::loader::FileLoader;

/// Every loader shipped with the crate, in dialog filter order.
pub fn builtin() -> Vec<Box<dyn FileLoader>> {
    vec![Box::new(EnviLoader), Box::new(MatlabLoader), Box::new(NpyLoader)]
}
