//! Output side of the controller.
//!
//! A [`Presenter`] receives everything the controller wants shown: preview
//! images, spectra, area statistics, the rubber band and load failures. It
//! never calls back into the controller.

use ndarray::ArrayView1;

use crate::data::{AreaStats, Coordinates, LabelType, LoadFailure, Preview};

/// Consumer of controller results.
pub trait Presenter {
    /// Show a new preview image.
    fn render(&mut self, preview: Preview);

    /// Show the spectrum of a single pixel.
    fn show_pixel(&mut self, spectrum: ArrayView1<'_, f64>, labels: &[String], labels_type: LabelType);

    /// Show the per-band statistics of an area.
    fn show_area(&mut self, stats: &AreaStats, labels: &[String], labels_type: LabelType);

    /// An area selection was anchored at `anchor`.
    fn start_rubber_band(&mut self, _anchor: Coordinates) {}

    /// Any in-progress area selection is gone.
    fn clear_rubber_band(&mut self) {}

    /// Opening a file failed.
    fn report_error(&mut self, failure: &LoadFailure) {
        log::error!("{}\n{}", failure.message, failure.detail);
    }
}
