//! Spatial Transforms
//!
//! Power-spectrum-preserving phase scrambling and Gaussian smoothing of
//! gridded fields. Both transforms keep the missing-value mask intact.

mod scramble;
mod smooth;

pub use scramble::SpectralScrambler;
pub use smooth::{gaussian_kernel, smooth, SpatialSmoother};

use thiserror::Error;

/// Errors from spatial transforms
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("Phase shape {actual:?} does not match field shape {expected:?}")]
    PhaseShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("Gaussian standard deviation must be finite and positive, got {0}")]
    InvalidStdDev(f64),
}
