//! Per-band statistics over a selected area, used for the spectral plot.

use ndarray::{Array1, ArrayView3, Axis};

/// Five parallel per-band curves describing an area.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaStats {
    pub min: Array1<f64>,
    pub quartile_low: Array1<f64>,
    pub mean: Array1<f64>,
    pub quartile_high: Array1<f64>,
    pub max: Array1<f64>,
}

impl AreaStats {
    /// Compute the statistics over every pixel of `area` (`[h, w, bands]`).
    ///
    /// Returns `None` for an empty area.
    pub fn from_area(area: ArrayView3<'_, f64>) -> Option<Self> {
        let (h, w, bands) = area.dim();
        if h == 0 || w == 0 {
            return None;
        }

        let mut stats = Self {
            min: Array1::zeros(bands),
            quartile_low: Array1::zeros(bands),
            mean: Array1::zeros(bands),
            quartile_high: Array1::zeros(bands),
            max: Array1::zeros(bands),
        };

        for (b, band) in area.axis_iter(Axis(2)).enumerate() {
            let mut values: Vec<f64> = band.iter().copied().collect();
            values.sort_by(f64::total_cmp);

            stats.min[b] = values[0];
            stats.quartile_low[b] = quantile_sorted(&values, 0.25);
            stats.mean[b] = values.iter().sum::<f64>() / values.len() as f64;
            stats.quartile_high[b] = quantile_sorted(&values, 0.75);
            stats.max[b] = values[values.len() - 1];
        }

        Some(stats)
    }

    /// Number of bands covered.
    pub fn bands(&self) -> usize {
        self.mean.len()
    }
}

/// Quantile of sorted, non-empty data with linear interpolation.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, array};

    #[test]
    fn test_quantile_interpolation() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&v, 0.25), 2.0);
        assert_eq!(quantile_sorted(&v, 0.5), 3.0);
        let v = [0.0, 10.0];
        assert_eq!(quantile_sorted(&v, 0.25), 2.5);
    }

    #[test]
    fn test_area_stats() {
        // 2x2 area, 2 bands
        let area = array![[[1.0, 10.0], [2.0, 20.0]], [[3.0, 30.0], [4.0, 40.0]]];
        let stats = AreaStats::from_area(area.view()).unwrap();
        assert_eq!(stats.bands(), 2);
        assert_eq!(stats.min, array![1.0, 10.0]);
        assert_eq!(stats.max, array![4.0, 40.0]);
        assert_eq!(stats.mean, array![2.5, 25.0]);
        assert_eq!(stats.quartile_low, array![1.75, 17.5]);
        assert_eq!(stats.quartile_high, array![3.25, 32.5]);
    }

    #[test]
    fn test_single_pixel_area() {
        let area = array![[[7.0, 8.0, 9.0]]];
        let stats = AreaStats::from_area(area.view()).unwrap();
        assert_eq!(stats.min, stats.max);
        assert_eq!(stats.quartile_low, array![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_empty_area() {
        let area = Array3::<f64>::zeros((0, 3, 2));
        assert!(AreaStats::from_area(area.view()).is_none());
    }
}
