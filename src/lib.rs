//! Whaaale - hyperspectral image viewer core
//!
//! Loads hyperspectral cubes (ENVI, MATLAB, NumPy), holds them as an
//! immutable [`data::HsImage`] and answers pixel, area and similarity
//! queries through the [`state::Controller`] state machine.

pub mod config;
pub mod constants;
pub mod data;
pub mod report;
pub mod state;
pub mod terminal;

pub use data::{HsImage, LoaderRegistry};
pub use state::Controller;
