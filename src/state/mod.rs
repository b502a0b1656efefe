//! Interaction state management.
//!
//! The [`Controller`] owns the open image and sequences pixel, area and
//! similarity queries; results go out through a [`Presenter`].

mod controller;
mod interaction;
mod presenter;
pub mod threshold;

pub use controller::Controller;
pub use interaction::{BandSelection, DisplayMode, InteractionState};
pub use presenter::Presenter;
