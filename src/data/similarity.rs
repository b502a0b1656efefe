//! "Magic wand" similarity search.
//!
//! Every pixel's band vector is compared against a base vector using the
//! mean squared error. This is the only query whose cost scales with the
//! whole image (pixels x bands).

use ndarray::{Array2, ArrayView1, ArrayView3, Axis, Zip};

/// MSE threshold for integer data: a percentage of the maximum squared
/// per-channel error `(2^bpp - 1)^2`.
pub fn integer_threshold(bpp: u32, threshold_percent: f64) -> f64 {
    let full_scale = 2f64.powi(bpp as i32) - 1.0;
    full_scale * full_scale * threshold_percent / 100.0
}

/// MSE threshold for normalised (0-1) floating data.
pub fn unit_threshold(threshold_percent: f64) -> f64 {
    threshold_percent / 100.0
}

/// Mean squared error between two band vectors of equal length.
pub fn mse(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    let n = a.len();
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    sum / n as f64
}

/// Mask of pixels whose MSE against `base` is at most `threshold`.
pub fn similarity_mask(
    data: ArrayView3<'_, f64>,
    base: ArrayView1<'_, f64>,
    threshold: f64,
) -> Array2<bool> {
    Zip::from(data.lanes(Axis(2))).map_collect(|pixel| mse(pixel, base) <= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, array};

    #[test]
    fn test_integer_threshold() {
        assert_eq!(integer_threshold(8, 100.0), 65025.0);
        assert_eq!(integer_threshold(8, 0.0), 0.0);
        assert_eq!(integer_threshold(1, 50.0), 0.5);
    }

    #[test]
    fn test_mse() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![1.0, 4.0, 0.0];
        assert!((mse(a.view(), b.view()) - 13.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_mask_shape_and_values() {
        let mut data = Array3::from_elem((2, 3, 2), 5.0);
        data[[1, 2, 0]] = 9.0;
        let base = array![5.0, 5.0];
        let mask = similarity_mask(data.view(), base.view(), 0.0);
        assert_eq!(mask.dim(), (2, 3));
        assert!(mask[[0, 0]]);
        assert!(!mask[[1, 2]]);
        assert_eq!(mask.iter().filter(|&&m| m).count(), 5);
    }
}
