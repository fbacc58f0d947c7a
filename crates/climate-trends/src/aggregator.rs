//! Global and Local Climate Trend Features
//!
//! Every column returned here has one value per (t, y, x) cell of the
//! requested steps, in (t, y, x) order.

use crate::reduce::{rolling, yearly, Reduction};
use crate::TrendError;
use grid_model::{nan_mean, ClimateDataset};
use ndarray::{s, Array1, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use spatial_transforms::SpatialSmoother;
use std::iter;
use std::ops::Range;
use tracing::{debug, warn};

/// Trailing window for rolling aggregates (one year of monthly steps)
pub const ROLLING_WINDOW: usize = 12;

/// Climate variable summarized into a trend feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendVariable {
    pub name: String,
    pub reduction: Reduction,
}

impl TrendVariable {
    pub fn new(name: impl Into<String>, reduction: Reduction) -> Self {
        Self {
            name: name.into(),
            reduction,
        }
    }

    /// Yearly maximum temperature and yearly total precipitation
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("tmean", Reduction::Max),
            Self::new("ppt", Reduction::Sum),
        ]
    }

    /// Column label, e.g. `tmean_max_global`
    pub fn column_name(&self, scope: &str) -> String {
        format!("{}_{}_{}", self.name, self.reduction, scope)
    }
}

/// Computes yearly or rolling climate summaries as feature columns
#[derive(Debug, Clone)]
pub struct TemporalAggregator {
    window: usize,
    min_periods: usize,
    smoother: Option<SpatialSmoother>,
}

impl Default for TemporalAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl TemporalAggregator {
    /// 12-step window, all 12 periods required
    pub fn new() -> Self {
        Self {
            window: ROLLING_WINDOW,
            min_periods: ROLLING_WINDOW,
            smoother: None,
        }
    }

    /// Smooth local trend grids before they are flattened
    pub fn with_smoother(mut self, smoother: SpatialSmoother) -> Self {
        self.smoother = Some(smoother);
        self
    }

    pub fn smoother(&self) -> Option<&SpatialSmoother> {
        self.smoother.as_ref()
    }

    /// Yearly aggregate, spatially averaged, repeated over each year's steps
    /// and every cell
    pub fn global_yearly(
        &self,
        climate: &ClimateDataset,
        variable: &TrendVariable,
    ) -> Result<Array1<f64>, TrendError> {
        let cube = climate.get(&variable.name)?;
        let (t, ny, nx) = cube.dim();
        let aggregates = yearly(cube.view(), climate.time(), variable.reduction)?;

        let mut column = Vec::with_capacity(t * ny * nx);
        for (group, grid) in climate.time().year_groups().iter().zip(aggregates.outer_iter()) {
            let mean = nan_mean(grid);
            debug!("{} {}: yearly {} = {}", variable.name, group.year, variable.reduction, mean);
            column.extend(iter::repeat(mean).take(group.len() * ny * nx));
        }
        Ok(Array1::from(column))
    }

    /// Rolling aggregate over the whole record, spatially averaged, for the
    /// given steps only
    pub fn global_rolling(
        &self,
        climate: &ClimateDataset,
        variable: &TrendVariable,
        steps: Range<usize>,
    ) -> Result<Array1<f64>, TrendError> {
        let cube = climate.get(&variable.name)?;
        let (t, ny, nx) = cube.dim();
        check_steps(&steps, t)?;

        let rolled = rolling(cube.view(), variable.reduction, self.window, self.min_periods);
        let window = rolled.slice(s![steps.clone(), .., ..]);
        self.warn_undefined(variable, undefined_steps(window));
        let means: Vec<f64> = window.outer_iter().map(nan_mean).collect();

        let mut column = Vec::with_capacity(steps.len() * ny * nx);
        for mean in means {
            column.extend(iter::repeat(mean).take(ny * nx));
        }
        Ok(Array1::from(column))
    }

    /// Yearly aggregate at full resolution, repeated over each year's steps
    pub fn local_yearly(
        &self,
        climate: &ClimateDataset,
        variable: &TrendVariable,
    ) -> Result<Array1<f64>, TrendError> {
        let cube = climate.get(&variable.name)?;
        let (t, ny, nx) = cube.dim();
        let aggregates = yearly(cube.view(), climate.time(), variable.reduction)?;

        let mut column = Vec::with_capacity(t * ny * nx);
        for (group, grid) in climate.time().year_groups().iter().zip(aggregates.outer_iter()) {
            let grid = match &self.smoother {
                Some(smoother) => smoother.smooth(grid),
                None => grid.to_owned(),
            };
            for _ in group.steps.clone() {
                column.extend(grid.iter().copied());
            }
        }
        Ok(Array1::from(column))
    }

    /// Rolling aggregate at full resolution for the given steps
    pub fn local_rolling(
        &self,
        climate: &ClimateDataset,
        variable: &TrendVariable,
        steps: Range<usize>,
    ) -> Result<Array1<f64>, TrendError> {
        let cube = climate.get(&variable.name)?;
        let (t, ny, nx) = cube.dim();
        check_steps(&steps, t)?;

        let rolled = rolling(cube.view(), variable.reduction, self.window, self.min_periods);
        self.warn_undefined(variable, undefined_steps(rolled.slice(s![steps.clone(), .., ..])));

        let mut column = Vec::with_capacity(steps.len() * ny * nx);
        for step in steps {
            let grid = rolled.index_axis(Axis(0), step);
            match &self.smoother {
                Some(smoother) => column.extend(smoother.smooth(grid).iter().copied()),
                None => column.extend(grid.iter().copied()),
            }
        }
        Ok(Array1::from(column))
    }

    fn warn_undefined(&self, variable: &TrendVariable, undefined: usize) {
        if undefined > 0 {
            warn!(
                "{} rolling {}: {} step(s) have fewer than {} valid periods",
                variable.name, variable.reduction, undefined, self.min_periods
            );
        }
    }
}

/// Steps whose rolled grid has no defined cell
fn undefined_steps(rolled: ArrayView3<'_, f64>) -> usize {
    rolled
        .outer_iter()
        .filter(|grid| grid.iter().all(|v| v.is_nan()))
        .count()
}

fn check_steps(steps: &Range<usize>, len: usize) -> Result<(), TrendError> {
    if steps.start >= steps.end || steps.end > len {
        return Err(TrendError::WindowOutOfRange {
            start: steps.start,
            end: steps.end,
            len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_model::TimeAxis;
    use ndarray::Array3;
    use proptest::prelude::*;

    fn climate(years: usize, ny: usize, nx: usize) -> ClimateDataset {
        let t = years * 12;
        let time = TimeAxis::monthly(2000, 1, t).unwrap();
        let tmean = Array3::from_shape_fn((t, ny, nx), |(t, y, x)| (t % 12) as f64 + (y + x) as f64);
        let ppt = Array3::from_shape_fn((t, ny, nx), |(t, _, _)| (t / 12 + 1) as f64);
        ClimateDataset::new(time, (ny, nx))
            .with_variable("tmean", tmean)
            .unwrap()
            .with_variable("ppt", ppt)
            .unwrap()
    }

    #[test]
    fn test_global_yearly_broadcast() {
        let ds = climate(2, 2, 2);
        let agg = TemporalAggregator::new();
        let ppt = agg.global_yearly(&ds, &TrendVariable::new("ppt", Reduction::Sum)).unwrap();
        assert_eq!(ppt.len(), 24 * 4);
        assert!(ppt.iter().take(48).all(|&v| v == 12.0));
        assert!(ppt.iter().skip(48).all(|&v| v == 24.0));

        // max over months is 11 + (y + x); mean over the 2x2 grid adds 1
        let tmean = agg.global_yearly(&ds, &TrendVariable::new("tmean", Reduction::Max)).unwrap();
        assert!(tmean.iter().all(|&v| v == 12.0));
    }

    #[test]
    fn test_local_yearly_keeps_resolution() {
        let ds = climate(1, 2, 2);
        let agg = TemporalAggregator::new();
        let tmean = agg.local_yearly(&ds, &TrendVariable::new("tmean", Reduction::Max)).unwrap();
        assert_eq!(tmean.len(), 48);
        assert_eq!(&tmean.as_slice().unwrap()[..4], &[11.0, 12.0, 12.0, 13.0]);
        assert_eq!(&tmean.as_slice().unwrap()[44..], &[11.0, 12.0, 12.0, 13.0]);
    }

    #[test]
    fn test_local_yearly_smoothed_constant() {
        let ds = climate(1, 3, 3);
        let agg = TemporalAggregator::new().with_smoother(SpatialSmoother::new(1.0).unwrap());
        let ppt = agg.local_yearly(&ds, &TrendVariable::new("ppt", Reduction::Sum)).unwrap();
        assert!(ppt.iter().all(|v| (v - 12.0).abs() < 1e-12));
    }

    #[test]
    fn test_global_rolling_window() {
        let ds = climate(3, 1, 2);
        let agg = TemporalAggregator::new();
        let var = TrendVariable::new("ppt", Reduction::Sum);
        let column = agg.global_rolling(&ds, &var, 12..24).unwrap();
        assert_eq!(column.len(), 12 * 2);
        // Step 12 sums steps 1..=12: eleven 1s and one 2
        assert_eq!(column[0], 13.0);
        assert_eq!(column[23], 24.0);
    }

    #[test]
    fn test_global_rolling_undefined_steps_are_nan() {
        let ds = climate(2, 1, 1);
        let agg = TemporalAggregator::new();
        let column = agg
            .global_rolling(&ds, &TrendVariable::new("tmean", Reduction::Max), 0..12)
            .unwrap();
        assert!(column.iter().take(11).all(|v| v.is_nan()));
        assert_eq!(column[11], 11.0);
    }

    #[test]
    fn test_local_rolling() {
        let ds = climate(2, 2, 1);
        let agg = TemporalAggregator::new();
        let column = agg
            .local_rolling(&ds, &TrendVariable::new("tmean", Reduction::Max), 12..14)
            .unwrap();
        assert_eq!(column.to_vec(), vec![11.0, 12.0, 11.0, 12.0]);
    }

    #[test]
    fn test_global_yearly_counts_missing_cell_as_zero_sum() {
        let time = TimeAxis::monthly(2000, 1, 12).unwrap();
        let mut ppt = Array3::from_elem((12, 1, 2), 1.0);
        ppt.slice_mut(s![.., 0, 1]).fill(f64::NAN);
        let ds = ClimateDataset::new(time, (1, 2)).with_variable("ppt", ppt).unwrap();

        let column = TemporalAggregator::new()
            .global_yearly(&ds, &TrendVariable::new("ppt", Reduction::Sum))
            .unwrap();
        assert_eq!(column.len(), 24);
        assert!(column.iter().all(|&v| v == 6.0));
    }

    fn mid_year() -> ClimateDataset {
        // July 2000 to December 2001: six steps, then twelve
        let time = TimeAxis::monthly(2000, 7, 18).unwrap();
        let tmean = Array3::from_shape_fn((18, 1, 2), |(t, _, x)| (t + x) as f64);
        ClimateDataset::new(time, (1, 2))
            .with_variable("tmean", tmean)
            .unwrap()
            .with_variable("ppt", Array3::from_elem((18, 1, 2), 1.0))
            .unwrap()
    }

    #[test]
    fn test_global_yearly_partial_first_year() {
        let agg = TemporalAggregator::new();
        let ppt = agg.global_yearly(&mid_year(), &TrendVariable::new("ppt", Reduction::Sum)).unwrap();
        assert_eq!(ppt.len(), 36);
        assert!(ppt.iter().take(12).all(|&v| v == 6.0));
        assert!(ppt.iter().skip(12).all(|&v| v == 12.0));
    }

    #[test]
    fn test_local_yearly_partial_first_year() {
        let agg = TemporalAggregator::new();
        let tmean = agg
            .local_yearly(&mid_year(), &TrendVariable::new("tmean", Reduction::Max))
            .unwrap();
        assert_eq!(tmean.len(), 36);
        // 2000 ends at step 5, 2001 at step 17
        for (i, pair) in tmean.as_slice().unwrap().chunks(2).enumerate() {
            let expected = if i < 6 { [5.0, 6.0] } else { [17.0, 18.0] };
            assert_eq!(pair, &expected[..], "step {}", i);
        }
    }

    #[test]
    fn test_undefined_steps() {
        let ds = climate(2, 1, 2);
        let cube = ds.get("tmean").unwrap();
        let rolled = rolling(cube.view(), Reduction::Max, ROLLING_WINDOW, ROLLING_WINDOW);
        assert_eq!(undefined_steps(rolled.view()), 11);
        assert_eq!(undefined_steps(rolled.slice(s![11.., .., ..])), 0);

        let mut partial = rolled.clone();
        partial[[11, 0, 0]] = f64::NAN;
        assert_eq!(undefined_steps(partial.slice(s![11.., .., ..])), 0);
    }

    #[test]
    fn test_local_rolling_undefined_steps_are_nan() {
        let ds = climate(1, 1, 2);
        let column = TemporalAggregator::new()
            .local_rolling(&ds, &TrendVariable::new("ppt", Reduction::Sum), 0..12)
            .unwrap();
        assert!(column.iter().take(22).all(|v| v.is_nan()));
        assert_eq!(&column.as_slice().unwrap()[22..], &[12.0, 12.0]);
    }

    #[test]
    fn test_rolling_steps_out_of_range() {
        let ds = climate(1, 1, 1);
        let agg = TemporalAggregator::new();
        let var = TrendVariable::new("ppt", Reduction::Sum);
        assert!(matches!(
            agg.global_rolling(&ds, &var, 6..20),
            Err(TrendError::WindowOutOfRange { .. })
        ));
    }

    #[test]
    fn test_unknown_variable() {
        let ds = climate(1, 1, 1);
        let agg = TemporalAggregator::new();
        let var = TrendVariable::new("vpd", Reduction::Max);
        assert!(matches!(agg.global_yearly(&ds, &var), Err(TrendError::Grid(_))));
    }

    #[test]
    fn test_column_name() {
        assert_eq!(TrendVariable::defaults()[0].column_name("global"), "tmean_max_global");
        assert_eq!(TrendVariable::defaults()[1].column_name("local"), "ppt_sum_local");
    }

    proptest! {
        #[test]
        fn prop_trend_columns_cover_every_cell(years in 1usize..3, ny in 1usize..4, nx in 1usize..4) {
            let ds = climate(years, ny, nx);
            let agg = TemporalAggregator::new();
            let rows = years * 12 * ny * nx;
            for var in TrendVariable::defaults() {
                prop_assert_eq!(agg.global_yearly(&ds, &var).unwrap().len(), rows);
                prop_assert_eq!(agg.local_yearly(&ds, &var).unwrap().len(), rows);
                prop_assert_eq!(agg.local_rolling(&ds, &var, 0..years * 12).unwrap().len(), rows);
            }
        }
    }
}
