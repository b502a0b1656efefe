//! Interaction state types.

use serde::{Deserialize, Serialize};

use crate::data::Coordinates;

/// Where the controller is in the query state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Nothing has been opened yet
    #[default]
    NoImage,
    /// An image is shown and no query is pending
    ImageLoaded,
    /// The next pointer-up picks a pixel
    SelectPixel,
    /// The next pointer-down anchors an area
    SelectAreaFirst,
    /// The next pointer-up closes the area started at `anchor`
    SelectAreaSecond { anchor: Coordinates },
    /// The next pointer-up runs a similarity search
    SelectSimilar,
}

impl InteractionState {
    /// Get the display name for this state.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::NoImage => "No image",
            InteractionState::ImageLoaded => "Image loaded",
            InteractionState::SelectPixel => "Select pixel",
            InteractionState::SelectAreaFirst => "Select area (first corner)",
            InteractionState::SelectAreaSecond { .. } => "Select area (second corner)",
            InteractionState::SelectSimilar => "Select similar",
        }
    }

    /// Whether a query is waiting for pointer input.
    pub fn is_selecting(&self) -> bool {
        !matches!(
            self,
            InteractionState::NoImage | InteractionState::ImageLoaded
        )
    }
}

/// What the preview shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// A single band in grayscale
    #[default]
    Mono,
    /// Three bands as a false-colour composite
    Rgb,
    /// The mono band with the last similarity mask highlighted
    Similar,
}

impl DisplayMode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            DisplayMode::Mono => "Mono",
            DisplayMode::Rgb => "RGB",
            DisplayMode::Similar => "Similar",
        }
    }

    /// Get all display modes.
    pub fn all() -> &'static [DisplayMode] {
        &[DisplayMode::Mono, DisplayMode::Rgb, DisplayMode::Similar]
    }
}

/// Band selection state for the RGB composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandSelection {
    /// Band index for red channel (0-based)
    pub red: usize,
    /// Band index for green channel (0-based)
    pub green: usize,
    /// Band index for blue channel (0-based)
    pub blue: usize,
}

impl BandSelection {
    /// Create a new band selection.
    pub fn new(red: usize, green: usize, blue: usize) -> Self {
        Self { red, green, blue }
    }

    /// Create a default RGB selection (bands 0, 1, 2).
    pub fn default_rgb() -> Self {
        Self::new(0, 1, 2)
    }

    /// Clamp band indices to valid range.
    pub fn clamp(&self, num_bands: usize) -> Self {
        let max_index = num_bands.saturating_sub(1);
        Self {
            red: self.red.min(max_index),
            green: self.green.min(max_index),
            blue: self.blue.min(max_index),
        }
    }

    /// `(red, green, blue)`
    pub fn as_tuple(&self) -> (usize, usize, usize) {
        (self.red, self.green, self.blue)
    }
}

impl Default for BandSelection {
    fn default() -> Self {
        Self::default_rgb()
    }
}

impl From<(usize, usize, usize)> for BandSelection {
    fn from((red, green, blue): (usize, usize, usize)) -> Self {
        Self::new(red, green, blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_selection_clamp() {
        let selection = BandSelection::new(10, 5, 20);
        let clamped = selection.clamp(8);
        assert_eq!(clamped.red, 7);
        assert_eq!(clamped.green, 5);
        assert_eq!(clamped.blue, 7);
    }

    #[test]
    fn test_selecting_states() {
        assert!(!InteractionState::NoImage.is_selecting());
        assert!(!InteractionState::ImageLoaded.is_selecting());
        assert!(InteractionState::SelectPixel.is_selecting());
        assert!(
            InteractionState::SelectAreaSecond {
                anchor: Coordinates::new(0, 0)
            }
            .is_selecting()
        );
    }

    #[test]
    fn test_display_mode_serde() {
        assert_eq!(serde_json::to_string(&DisplayMode::Rgb).unwrap(), "\"rgb\"");
        let mode: DisplayMode = serde_json::from_str("\"similar\"").unwrap();
        assert_eq!(mode, DisplayMode::Similar);
        assert_eq!(DisplayMode::default(), DisplayMode::Mono);
    }
}
