//! The interaction controller.
//!
//! Turns mode commands and pointer events into queries against the open
//! [`HsImage`] and forwards the results to a [`Presenter`]. Every
//! transition runs to completion on the calling thread.

use std::path::Path;

use ndarray::Array2;
use web_time::Instant;

use crate::constants::DEFAULT_SIMILARITY_THRESHOLD;
use crate::data::{AreaStats, Coordinates, HsImage, Interactive, LoadFailure, LoaderRegistry};
use crate::state::interaction::{BandSelection, DisplayMode, InteractionState};
use crate::state::presenter::Presenter;
use crate::state::threshold::{clamp_percent, percent_to_slider, slider_to_percent};

/// Query state machine owning the open image.
pub struct Controller<P: Presenter> {
    presenter: P,
    image: Option<HsImage>,
    state: InteractionState,
    display_mode: DisplayMode,
    mono_band: usize,
    rgb_bands: BandSelection,
    threshold_percent: f64,
    /// Mask of the last similarity search on the current image
    similar_mask: Option<Array2<bool>>,
}

impl<P: Presenter> Controller<P> {
    pub fn new(presenter: P) -> Self {
        Self::with_settings(presenter, DisplayMode::Mono, DEFAULT_SIMILARITY_THRESHOLD)
    }

    /// Create a controller with an initial display mode and threshold.
    pub fn with_settings(presenter: P, display_mode: DisplayMode, threshold_percent: f64) -> Self {
        Self {
            presenter,
            image: None,
            state: InteractionState::NoImage,
            display_mode,
            mono_band: 0,
            rgb_bands: BandSelection::default(),
            threshold_percent: clamp_percent(threshold_percent),
            similar_mask: None,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn image(&self) -> Option<&HsImage> {
        self.image.as_ref()
    }

    pub fn mono_band(&self) -> usize {
        self.mono_band
    }

    pub fn rgb_bands(&self) -> BandSelection {
        self.rgb_bands
    }

    pub fn threshold(&self) -> f64 {
        self.threshold_percent
    }

    /// Threshold as a slider position.
    pub fn threshold_slider(&self) -> i32 {
        percent_to_slider(self.threshold_percent)
    }

    pub fn similar_mask(&self) -> Option<&Array2<bool>> {
        self.similar_mask.as_ref()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Open a file through the registry.
    ///
    /// Returns `Ok(true)` when a new image replaced the old one and
    /// `Ok(false)` when the user cancelled. On cancel and on failure the
    /// previous image and state are kept; failures also go to the presenter.
    pub fn open_file(
        &mut self,
        registry: &LoaderRegistry,
        path: &Path,
        ui: &mut dyn Interactive,
    ) -> Result<bool, LoadFailure> {
        match registry.open(path, ui) {
            Ok(Some(image)) => {
                self.set_image(image);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(failure) => {
                self.presenter.report_error(&failure);
                Err(failure)
            }
        }
    }

    /// Replace the open image and reset the query state.
    pub fn set_image(&mut self, image: HsImage) {
        let bands = image.bands();
        self.rgb_bands = image
            .closest_rgb_idx()
            .map(BandSelection::from)
            .unwrap_or_default()
            .clamp(bands);
        self.mono_band = self.mono_band.min(bands - 1);
        self.similar_mask = None;
        if self.display_mode == DisplayMode::Similar {
            self.display_mode = DisplayMode::Mono;
        }
        if self.display_mode == DisplayMode::Rgb && bands < 3 {
            log::warn!("image has {} bands, showing mono instead of RGB", bands);
            self.display_mode = DisplayMode::Mono;
        }

        log::debug!(
            "Controller: new image, mono band {}, rgb {:?}",
            self.mono_band,
            self.rgb_bands.as_tuple()
        );

        self.presenter.clear_rubber_band();
        self.image = Some(image);
        self.state = InteractionState::ImageLoaded;
        self.refresh();
    }

    /// Wait for a pointer-up picking a pixel.
    pub fn select_pixel_mode(&mut self) {
        self.enter_mode(InteractionState::SelectPixel);
    }

    /// Wait for the two corners of an area.
    pub fn select_area_mode(&mut self) {
        self.enter_mode(InteractionState::SelectAreaFirst);
    }

    /// Wait for a pointer-up picking the base pixel of a similarity search.
    pub fn select_similar_mode(&mut self) {
        self.enter_mode(InteractionState::SelectSimilar);
    }

    fn enter_mode(&mut self, state: InteractionState) {
        if self.image.is_none() {
            log::debug!("Controller: ignoring '{}' without an image", state.name());
            return;
        }
        self.presenter.clear_rubber_band();
        self.state = state;
    }

    /// Pointer pressed at `(row, col)` in image coordinates.
    pub fn pointer_down(&mut self, row: i64, col: i64) {
        let Some(image) = &self.image else {
            return;
        };
        if self.state == InteractionState::SelectAreaFirst {
            let anchor = image.clamp(row, col);
            self.presenter.start_rubber_band(anchor);
            self.state = InteractionState::SelectAreaSecond { anchor };
        }
    }

    /// Pointer released at `(row, col)` in image coordinates.
    pub fn pointer_up(&mut self, row: i64, col: i64) {
        let Some(image) = &self.image else {
            return;
        };
        let current = image.clamp(row, col);

        match self.state {
            InteractionState::SelectPixel => {
                log::info!("pixel query at ({}, {})", current.row, current.col);
                self.presenter.show_pixel(
                    image.get_pixel(current.row, current.col),
                    image.labels(),
                    image.labels_type(),
                );
                self.state = InteractionState::ImageLoaded;
            }
            InteractionState::SelectAreaSecond { anchor } => {
                self.presenter.clear_rubber_band();
                let area = image.get_area(anchor, current);
                log::info!(
                    "area query ({}, {}) - ({}, {}), {} pixels",
                    anchor.row,
                    anchor.col,
                    current.row,
                    current.col,
                    area.len_of(ndarray::Axis(0)) * area.len_of(ndarray::Axis(1))
                );
                if let Some(stats) = AreaStats::from_area(area) {
                    self.presenter
                        .show_area(&stats, image.labels(), image.labels_type());
                }
                self.state = InteractionState::ImageLoaded;
            }
            InteractionState::SelectSimilar => {
                self.run_similarity(current);
                self.state = InteractionState::ImageLoaded;
            }
            InteractionState::NoImage
            | InteractionState::ImageLoaded
            | InteractionState::SelectAreaFirst => {}
        }
    }

    fn run_similarity(&mut self, base: Coordinates) {
        let Some(image) = &self.image else {
            return;
        };
        let start = Instant::now();
        let mask = image.get_similar(base, self.threshold_percent);
        log::info!(
            "similarity search at ({}, {}) with {}%: {} of {} pixels in {:?}",
            base.row,
            base.col,
            self.threshold_percent,
            mask.iter().filter(|&&m| m).count(),
            mask.len(),
            start.elapsed()
        );
        self.similar_mask = Some(mask);
        self.display_mode = DisplayMode::Similar;
        self.refresh();
    }

    /// Switch the preview mode.
    ///
    /// `Similar` without a computed mask and `Rgb` on images with fewer than
    /// three bands fall back to `Mono`.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        let bands = self.image.as_ref().map(HsImage::bands);
        self.display_mode = match mode {
            DisplayMode::Similar if self.similar_mask.is_none() => DisplayMode::Mono,
            DisplayMode::Rgb if bands.is_some_and(|b| b < 3) => DisplayMode::Mono,
            other => other,
        };
        self.refresh();
    }

    /// Select the band shown in mono and similar modes.
    pub fn set_mono_band(&mut self, band: usize) {
        self.mono_band = match &self.image {
            Some(image) => band.min(image.bands() - 1),
            None => band,
        };
        if self.display_mode != DisplayMode::Rgb {
            self.refresh();
        }
    }

    /// Select the bands of the RGB composite.
    pub fn set_rgb_bands(&mut self, red: usize, green: usize, blue: usize) {
        let selection = BandSelection::new(red, green, blue);
        self.rgb_bands = match &self.image {
            Some(image) => selection.clamp(image.bands()),
            None => selection,
        };
        if self.display_mode == DisplayMode::Rgb {
            self.refresh();
        }
    }

    /// Set the similarity threshold in percent; used by the next search.
    ///
    /// Clamped to `0..=100`. Zero selects only pixels identical to the base.
    pub fn set_threshold(&mut self, percent: f64) {
        self.threshold_percent = clamp_percent(percent);
    }

    /// Set the similarity threshold from a slider position.
    pub fn set_threshold_slider(&mut self, position: i32) {
        self.threshold_percent = slider_to_percent(position);
    }

    /// Render the preview for the current display mode.
    pub fn refresh(&mut self) {
        let Some(image) = &self.image else {
            return;
        };
        let preview = match (self.display_mode, &self.similar_mask) {
            (DisplayMode::Similar, Some(mask)) => image.similar_preview(self.mono_band, mask.clone()),
            (DisplayMode::Rgb, _) => {
                let (r, g, b) = self.rgb_bands.as_tuple();
                image.rgb_preview(r, g, b)
            }
            _ => image.mono_preview(self.mono_band),
        };
        self.presenter.render(preview);
    }
}
