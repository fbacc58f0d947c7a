//! NaN-aware Gaussian Smoothing

use crate::TransformError;
use ndarray::{Array2, ArrayView2};

/// Normalized 2D Gaussian kernel.
///
/// The side is `ceil(8σ)` rounded up to odd; weights are sampled at cell
/// centres and sum to one.
pub fn gaussian_kernel(stddev: f64) -> Result<Array2<f64>, TransformError> {
    if !(stddev.is_finite() && stddev > 0.0) {
        return Err(TransformError::InvalidStdDev(stddev));
    }

    let mut size = (8.0 * stddev).ceil() as usize;
    if size % 2 == 0 {
        size += 1;
    }
    let radius = (size / 2) as f64;
    let two_sigma_sq = 2.0 * stddev * stddev;

    let mut kernel = Array2::from_shape_fn((size, size), |(i, j)| {
        let dy = i as f64 - radius;
        let dx = j as f64 - radius;
        (-(dx * dx + dy * dy) / two_sigma_sq).exp()
    });
    let total = kernel.sum();
    kernel.mapv_inplace(|w| w / total);
    Ok(kernel)
}

/// Gaussian smoother with a precomputed kernel
#[derive(Debug, Clone)]
pub struct SpatialSmoother {
    kernel: Array2<f64>,
    stddev: f64,
}

impl SpatialSmoother {
    pub fn new(stddev: f64) -> Result<Self, TransformError> {
        Ok(Self {
            kernel: gaussian_kernel(stddev)?,
            stddev,
        })
    }

    pub fn stddev(&self) -> f64 {
        self.stddev
    }

    pub fn kernel(&self) -> &Array2<f64> {
        &self.kernel
    }

    /// Convolve a field with the kernel.
    ///
    /// Each valid cell becomes the weighted mean of its valid in-bounds
    /// neighbours, with weights renormalized over those neighbours. Missing
    /// cells stay missing and never feed into their neighbours.
    pub fn smooth(&self, field: ArrayView2<'_, f64>) -> Array2<f64> {
        let (ny, nx) = field.dim();
        let radius = (self.kernel.nrows() / 2) as isize;

        Array2::from_shape_fn((ny, nx), |(y, x)| {
            if field[[y, x]].is_nan() {
                return f64::NAN;
            }

            let mut weighted_sum = 0.0;
            let mut weight_total = 0.0;
            for ((ky, kx), &w) in self.kernel.indexed_iter() {
                let sy = y as isize + ky as isize - radius;
                let sx = x as isize + kx as isize - radius;
                if sy < 0 || sx < 0 || sy >= ny as isize || sx >= nx as isize {
                    continue;
                }
                let v = field[[sy as usize, sx as usize]];
                if v.is_nan() {
                    continue;
                }
                weighted_sum += w * v;
                weight_total += w;
            }

            weighted_sum / weight_total
        })
    }
}

/// Smooth a field with a Gaussian of the given standard deviation (cells)
pub fn smooth(field: ArrayView2<'_, f64>, gaussian_stddev: f64) -> Result<Array2<f64>, TransformError> {
    Ok(SpatialSmoother::new(gaussian_stddev)?.smooth(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_kernel_size_and_sum() {
        let kernel = gaussian_kernel(1.0).unwrap();
        assert_eq!(kernel.dim(), (9, 9));
        assert!((kernel.sum() - 1.0).abs() < 1e-12);
        assert!(kernel[[4, 4]] > kernel[[4, 5]]);
        assert_eq!(gaussian_kernel(0.5).unwrap().dim(), (5, 5));
    }

    #[test]
    fn test_invalid_stddev() {
        assert_eq!(gaussian_kernel(0.0), Err(TransformError::InvalidStdDev(0.0)));
        assert!(gaussian_kernel(f64::NAN).is_err());
        assert!(smooth(Array2::zeros((2, 2)).view(), -1.0).is_err());
    }

    #[test]
    fn test_constant_field_unchanged() {
        let field = Array2::from_elem((7, 5), 3.5);
        let out = smooth(field.view(), 1.0).unwrap();
        assert!(out.iter().all(|v| (v - 3.5).abs() < 1e-12));
    }

    #[test]
    fn test_nan_does_not_contaminate() {
        let field = array![
            [1.0, 1.0, 1.0, 1.0],
            [1.0, f64::NAN, 1.0, 1.0],
            [1.0, 1.0, 1.0, f64::NAN],
        ];
        let out = smooth(field.view(), 1.0).unwrap();
        assert!(out[[1, 1]].is_nan());
        assert!(out[[2, 3]].is_nan());
        assert!((out[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((out[[1, 2]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spike_spreads() {
        let mut field = Array2::zeros((9, 9));
        field[[4, 4]] = 1.0;
        let out = smooth(field.view(), 1.0).unwrap();
        assert!(out[[4, 4]] < 1.0);
        assert!(out[[4, 5]] > 0.0);
        assert!((out[[4, 3]] - out[[4, 5]]).abs() < 1e-12);
    }

    #[test]
    fn test_all_nan() {
        let field = Array2::from_elem((4, 4), f64::NAN);
        let out = smooth(field.view(), 2.0).unwrap();
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
