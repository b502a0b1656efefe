//! Logarithmic slider mapping for the similarity threshold.
//!
//! Thresholds span eight decades (1e-6 % to 100 %), so the slider position
//! is `10 * (log10(percent) + 6)`.

/// Lowest slider position (1e-6 %).
pub const SLIDER_MIN: i32 = 0;

/// Highest slider position (100 %).
pub const SLIDER_MAX: i32 = 80;

/// Smallest positive threshold reachable with the slider, in percent.
pub const MIN_PERCENT: f64 = 1e-6;

/// Largest threshold, in percent.
pub const MAX_PERCENT: f64 = 100.0;

/// Slider position for a threshold percentage, rounded and clamped.
pub fn percent_to_slider(percent: f64) -> i32 {
    if percent.is_nan() || percent <= 0.0 {
        return SLIDER_MIN;
    }
    let position = 10.0 * (percent.log10() + 6.0);
    (position.round() as i32).clamp(SLIDER_MIN, SLIDER_MAX)
}

/// Threshold percentage for a slider position.
pub fn slider_to_percent(position: i32) -> f64 {
    let position = position.clamp(SLIDER_MIN, SLIDER_MAX);
    10f64.powf(f64::from(position) / 10.0 - 6.0)
}

/// Clamp a threshold into `0..=100` percent.
///
/// Zero is kept (exact-match search) even though the slider cannot show it;
/// NaN is treated as zero.
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, MAX_PERCENT)
}
