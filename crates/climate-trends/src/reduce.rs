//! Calendar-Year and Rolling Reductions

use grid_model::{GridError, TimeAxis};
use ndarray::{s, Array3, ArrayView3, Axis, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reduction applied over time steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Hottest step (temperature)
    Max,
    /// Accumulated total (precipitation)
    Sum,
}

impl Reduction {
    /// Reduce, skipping NaN. With no valid value a sum is 0 and a max is NaN.
    pub fn reduce(self, values: impl IntoIterator<Item = f64>) -> f64 {
        let mut valid = values.into_iter().filter(|v| !v.is_nan()).peekable();
        match self {
            Reduction::Max if valid.peek().is_none() => f64::NAN,
            Reduction::Max => valid.fold(f64::NEG_INFINITY, f64::max),
            Reduction::Sum => valid.fold(0.0, |acc, v| acc + v),
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduction::Max => write!(f, "max"),
            Reduction::Sum => write!(f, "sum"),
        }
    }
}

/// One reduced grid per calendar year, in time order
pub fn yearly(
    cube: ArrayView3<'_, f64>,
    time: &TimeAxis,
    reduction: Reduction,
) -> Result<Array3<f64>, GridError> {
    let (t, ny, nx) = cube.dim();
    if t != time.len() {
        return Err(GridError::shape("time axis", &[time.len()], &[t]));
    }

    let groups = time.year_groups();
    let mut out = Array3::from_elem((groups.len(), ny, nx), f64::NAN);
    for (mut grid, group) in out.outer_iter_mut().zip(&groups) {
        let block = cube.slice(s![group.steps.clone(), .., ..]);
        Zip::from(&mut grid)
            .and(block.lanes(Axis(0)))
            .for_each(|cell, series| *cell = reduction.reduce(series.iter().copied()));
    }
    Ok(out)
}

/// Trailing (non-centred) rolling reduction per cell.
///
/// A step with fewer than `min_periods` valid values inside its window is
/// NaN.
pub fn rolling(
    cube: ArrayView3<'_, f64>,
    reduction: Reduction,
    window: usize,
    min_periods: usize,
) -> Array3<f64> {
    let mut out = Array3::from_elem(cube.dim(), f64::NAN);
    if window == 0 {
        return out;
    }

    Zip::from(out.lanes_mut(Axis(0)))
        .and(cube.lanes(Axis(0)))
        .for_each(|mut rolled, series| {
            for t in 0..series.len() {
                let start = (t + 1).saturating_sub(window);
                let span = series.slice(s![start..=t]);
                let valid = span.iter().filter(|v| !v.is_nan()).count();
                if valid >= min_periods && valid > 0 {
                    rolled[t] = reduction.reduce(span.iter().copied());
                }
            }
        });
    out
}
