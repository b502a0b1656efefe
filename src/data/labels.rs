//! Band labels and their classification.

use serde::{Deserialize, Serialize};

/// Describes the origin of band labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    /// Integer sequence generated automatically (`"0"`, `"1"`, ...).
    Auto,
    /// Numeric wavelengths in nanometres.
    Wavelength,
    /// Opaque strings; numeric conversion should not be attempted.
    CustomStr,
}

impl LabelType {
    /// Whether labels of this type are expected to parse as numbers.
    pub fn is_numeric(self) -> bool {
        matches!(self, LabelType::Auto | LabelType::Wavelength)
    }
}

/// Generate `"0".."count-1"` labels.
pub fn auto_labels(count: usize) -> Vec<String> {
    (0..count).map(|i| i.to_string()).collect()
}

/// Parse a label as a number, tolerating surrounding whitespace.
pub fn parse_numeric(label: &str) -> Option<f64> {
    label.trim().parse::<f64>().ok()
}

/// Classify a list of wavelength entries read from file metadata.
///
/// Every entry parsing as a number makes them wavelengths, anything else
/// falls back to custom strings.
pub fn classify_wavelengths(labels: &[String]) -> LabelType {
    if labels.iter().all(|l| parse_numeric(l).is_some()) {
        LabelType::Wavelength
    } else {
        LabelType::CustomStr
    }
}
