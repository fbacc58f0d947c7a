//! FFT-based Phase Scrambling

use crate::TransformError;
use grid_model::missing_mask;
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustfft::{num_complex::Complex, FftDirection, FftPlanner};
use std::f64::consts::TAU;
use tracing::trace;

/// Replaces the Fourier phase of gridded fields while keeping their
/// magnitude spectrum.
///
/// The random source is owned by the scrambler, so a seeded generator gives
/// reproducible surrogates.
pub struct SpectralScrambler<R = StdRng> {
    /// FFT planner for efficient computation
    planner: FftPlanner<f64>,
    /// Source of random phases
    rng: R,
}

impl SpectralScrambler<StdRng> {
    /// Scrambler with a deterministic seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Scrambler seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> SpectralScrambler<R> {
    pub fn new(rng: R) -> Self {
        Self {
            planner: FftPlanner::new(),
            rng,
        }
    }

    /// Uniform phases in [0, 2π), one per frequency cell
    pub fn random_phase(&mut self, shape: (usize, usize)) -> Array2<f64> {
        let rng = &mut self.rng;
        Array2::from_shape_fn(shape, |_| rng.gen::<f64>() * TAU)
    }

    /// Scramble a 2D field.
    ///
    /// `phase` is given in centred (fft-shifted) frequency coordinates and
    /// must match the field shape. Without it a fresh random phase is drawn.
    /// Missing cells are zero-filled for the transform and come back as NaN.
    pub fn scramble_2d(
        &mut self,
        field: ArrayView2<'_, f64>,
        phase: Option<ArrayView2<'_, f64>>,
    ) -> Result<Array2<f64>, TransformError> {
        let (ny, nx) = field.dim();
        if let Some(p) = &phase {
            if p.dim() != (ny, nx) {
                return Err(TransformError::PhaseShape {
                    expected: (ny, nx),
                    actual: p.dim(),
                });
            }
        }
        if ny == 0 || nx == 0 {
            return Ok(field.to_owned());
        }

        let drawn;
        let phase = match &phase {
            Some(p) => p.view(),
            None => {
                drawn = self.random_phase((ny, nx));
                drawn.view()
            }
        };

        let mask = missing_mask(field);
        let mut spectrum =
            field.mapv(|v| Complex::new(if v.is_nan() { 0.0 } else { v }, 0.0));
        self.transform_2d(&mut spectrum, FftDirection::Forward);

        // Unshifted frequency (u, v) sits at ((u + ny/2) % ny, (v + nx/2) % nx)
        // once the zero frequency is centred.
        let (hy, hx) = (ny / 2, nx / 2);
        for ((u, v), c) in spectrum.indexed_iter_mut() {
            let theta = phase[[(u + hy) % ny, (v + hx) % nx]];
            *c = Complex::from_polar(c.norm(), theta);
        }

        self.transform_2d(&mut spectrum, FftDirection::Inverse);

        let scale = 1.0 / (ny * nx) as f64;
        let mut scrambled = spectrum.mapv(|c| c.re * scale);
        Zip::from(&mut scrambled).and(&mask).for_each(|v, &missing| {
            if missing {
                *v = f64::NAN;
            }
        });

        trace!("Scrambled {}x{} field", ny, nx);
        Ok(scrambled)
    }

    /// Scramble every time slice of a (t, y, x) cube with its own phase
    pub fn scramble_3d(&mut self, cube: ArrayView3<'_, f64>) -> Result<Array3<f64>, TransformError> {
        let mut scrambled = cube.to_owned();
        for (mut out, slice) in scrambled.outer_iter_mut().zip(cube.outer_iter()) {
            out.assign(&self.scramble_2d(slice, None)?);
        }
        Ok(scrambled)
    }

    /// Separable 2D transform: rows, then columns. Unnormalized.
    fn transform_2d(&mut self, data: &mut Array2<Complex<f64>>, direction: FftDirection) {
        let (ny, nx) = data.dim();

        let row_fft = self.planner.plan_fft(nx, direction);
        let mut buffer = vec![Complex::default(); nx];
        for mut row in data.rows_mut() {
            buffer.iter_mut().zip(row.iter()).for_each(|(b, &v)| *b = v);
            row_fft.process(&mut buffer);
            row.iter_mut().zip(&buffer).for_each(|(v, &b)| *v = b);
        }

        let col_fft = self.planner.plan_fft(ny, direction);
        let mut buffer = vec![Complex::default(); ny];
        for mut col in data.columns_mut() {
            buffer.iter_mut().zip(col.iter()).for_each(|(b, &v)| *b = v);
            col_fft.process(&mut buffer);
            col.iter_mut().zip(&buffer).for_each(|(v, &b)| *v = b);
        }
    }

    /// Forward 2D spectrum of a zero-filled field
    pub fn spectrum(&mut self, field: ArrayView2<'_, f64>) -> Array2<Complex<f64>> {
        let mut spectrum =
            field.mapv(|v| Complex::new(if v.is_nan() { 0.0 } else { v }, 0.0));
        if !spectrum.is_empty() {
            self.transform_2d(&mut spectrum, FftDirection::Forward);
        }
        spectrum
    }
}
