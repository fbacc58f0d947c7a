//! Flattening, Tiling and Masked Reductions
//!
//! Every feature column is laid out in row-major (t, y, x) order. These
//! helpers are the only place that order is produced.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

/// Static (y, x) grid; NaN marks missing cells
pub type GriddedField = Array2<f64>;

/// (t, y, x) cube of grids sharing one shape
pub type SpaceTimeField = Array3<f64>;

/// Flatten a cube in (t, y, x) order
pub fn flatten_cube(cube: ArrayView3<'_, f64>) -> Vec<f64> {
    cube.iter().copied().collect()
}

/// Repeat a static grid over `steps` time steps
pub fn tile_over_time(field: ArrayView2<'_, f64>, steps: usize) -> Array3<f64> {
    let (ny, nx) = field.dim();
    Array3::from_shape_fn((steps, ny, nx), |(_, y, x)| field[[y, x]])
}

/// Broadcast one scalar per time step across a (ny, nx) grid
pub fn broadcast_steps(values: &[f64], grid: (usize, usize)) -> Array3<f64> {
    Array3::from_shape_fn((values.len(), grid.0, grid.1), |(t, _, _)| values[t])
}

/// Mean over non-missing cells, NaN when every cell is missing
pub fn nan_mean(field: ArrayView2<'_, f64>) -> f64 {
    let (sum, count) = field
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Positions of missing cells
pub fn missing_mask(field: ArrayView2<'_, f64>) -> Array2<bool> {
    field.mapv(f64::is_nan)
}
