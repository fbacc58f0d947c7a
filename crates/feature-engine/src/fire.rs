//! Fire Model Design Matrix
//!
//! Column order is fixed: climate variables, land types tiled over time,
//! global trends, then local trends. Which trend blocks are present follows
//! [`FireConfig::block_plan`].

use crate::block::FeatureBlock;
use crate::settings::{FireConfig, TrendWindow};
use crate::FeatureError;
use climate_trends::TemporalAggregator;
use grid_model::{flatten_cube, tile_over_time, ClimateDataset, GridError, LandTypeRaster};
use ndarray::{s, Array1, Array2, ArrayView3};
use rand::rngs::StdRng;
use rand::Rng;
use spatial_transforms::{SpatialSmoother, SpectralScrambler};
use std::ops::Range;
use tracing::{debug, info};

/// Output of the fire feature pipeline
#[derive(Debug, Clone)]
pub struct FireFeatures {
    /// Design matrix, one row per (t, y, x) cell
    pub x: Array2<f64>,
    /// Column labels of `x`
    pub columns: Vec<String>,
    /// Flattened target, absent in evaluation mode
    pub y: Option<Array1<f64>>,
    /// Local trend block, when computed in fit mode
    pub local_trends: Option<Array2<f64>>,
}

/// Builds fire-model features from climate, land-type and target grids
pub struct FeatureAssembler<R = StdRng> {
    config: FireConfig,
    scrambler: SpectralScrambler<R>,
    aggregator: TemporalAggregator,
}

impl FeatureAssembler<StdRng> {
    /// Assembler whose scrambler is seeded from `config.seed`
    pub fn new(config: FireConfig) -> Result<Self, FeatureError> {
        let scrambler = match config.seed {
            Some(seed) => SpectralScrambler::seeded(seed),
            None => SpectralScrambler::from_entropy(),
        };
        Self::with_scrambler(config, scrambler)
    }
}

impl<R: Rng> FeatureAssembler<R> {
    /// Assembler drawing scrambling phases from the given scrambler
    pub fn with_scrambler(
        config: FireConfig,
        scrambler: SpectralScrambler<R>,
    ) -> Result<Self, FeatureError> {
        let mut aggregator = TemporalAggregator::new();
        if let Some(stddev) = config.gaussian_stddev() {
            info!("Using gaussian kernel of width {} std dev", stddev);
            aggregator = aggregator.with_smoother(SpatialSmoother::new(stddev)?);
        }
        Ok(Self {
            config,
            scrambler,
            aggregator,
        })
    }

    pub fn config(&self) -> &FireConfig {
        &self.config
    }

    /// Build the design matrix and, outside evaluation mode, the target.
    ///
    /// `target` is the monthly burned-area cube; it may cover either the
    /// active window or the whole climate record.
    pub fn prepare(
        &mut self,
        climate: &ClimateDataset,
        land_types: &LandTypeRaster,
        target: Option<ArrayView3<'_, f64>>,
    ) -> Result<FireFeatures, FeatureError> {
        let steps = self.active_steps(climate)?;
        let active = climate.select_steps(steps.clone())?;
        let (t, ny, nx) = active.shape();
        if land_types.grid() != (ny, nx) {
            let (ly, lx) = land_types.grid();
            return Err(GridError::shape("land types", &[ny, nx], &[ly, lx]).into());
        }

        let y = if self.config.eval_only {
            None
        } else {
            let target = target.ok_or(FeatureError::MissingTarget)?;
            Some(target_vector(target, climate, steps.clone())?)
        };

        let rows = t * ny * nx;
        debug!("Active window: {} steps on a {}x{} grid, {} rows", t, ny, nx, rows);

        let mut x = self.climate_block(&active, rows)?;
        x.append(self.land_type_block(land_types, t, rows)?)?;

        let plan = self.config.block_plan();
        if plan.global {
            x.append(self.global_trend_block(climate, &active, steps.clone(), rows)?)?;
        }

        let local = match self.config.local_trends.is_computed() {
            true => Some(self.local_trend_block(climate, &active, steps, rows)?),
            false => None,
        };

        match (&local, plan.local) {
            (Some(block), true) => {
                info!("Tacking together climate, land types and local trends");
                x.append(block.clone())?;
            }
            _ if plan.global => info!("Tacking together climate, land types and global trends"),
            _ => info!("Tacking together climate and land types"),
        }

        let columns = x.columns().to_vec();
        debug!("Design matrix: {} rows x {} columns", rows, columns.len());

        // Evaluation mode returns the design matrix alone
        let local_trends = match self.config.eval_only {
            true => None,
            false => local.map(|block| block.to_matrix()),
        };

        Ok(FireFeatures {
            x: x.to_matrix(),
            columns,
            y,
            local_trends,
        })
    }

    fn active_steps(&self, climate: &ClimateDataset) -> Result<Range<usize>, FeatureError> {
        if climate.time().is_empty() {
            return Err(FeatureError::EmptyRecord);
        }
        match &self.config.window {
            TrendWindow::Yearly => Ok(0..climate.time().len()),
            TrendWindow::Rolling { start, end } => Ok(climate.time().window(*start, *end)?),
        }
    }

    fn climate_block(&mut self, active: &ClimateDataset, rows: usize) -> Result<FeatureBlock, FeatureError> {
        let mut block = FeatureBlock::new(rows);
        for variable in active.variables() {
            let values = if self.config.scramble {
                flatten_cube(self.scrambler.scramble_3d(variable.values.view())?.view())
            } else {
                flatten_cube(variable.values.view())
            };
            block.push(variable.name.clone(), Array1::from(values))?;
        }
        Ok(block)
    }

    fn land_type_block(
        &mut self,
        land_types: &LandTypeRaster,
        steps: usize,
        rows: usize,
    ) -> Result<FeatureBlock, FeatureError> {
        let mut block = FeatureBlock::new(rows);
        for layer in land_types.layers() {
            // One phase per layer: every time step repeats the same surrogate
            let base = if self.config.scramble {
                self.scrambler.scramble_2d(layer.values.view(), None)?
            } else {
                layer.values.clone()
            };
            let tiled = tile_over_time(base.view(), steps);
            block.push(layer.name.clone(), Array1::from(flatten_cube(tiled.view())))?;
        }
        Ok(block)
    }

    fn global_trend_block(
        &self,
        climate: &ClimateDataset,
        active: &ClimateDataset,
        steps: Range<usize>,
        rows: usize,
    ) -> Result<FeatureBlock, FeatureError> {
        match &self.config.window {
            TrendWindow::Yearly => info!("Doing the global averages on a groupby basis"),
            TrendWindow::Rolling { .. } => info!("Doing the global averages on a rolling basis"),
        }

        let mut block = FeatureBlock::new(rows);
        for variable in &self.config.trend_variables {
            let column = match &self.config.window {
                TrendWindow::Yearly => self.aggregator.global_yearly(active, variable)?,
                TrendWindow::Rolling { .. } => {
                    self.aggregator.global_rolling(climate, variable, steps.clone())?
                }
            };
            block.push(variable.column_name("global"), column)?;
        }
        Ok(block)
    }

    fn local_trend_block(
        &self,
        climate: &ClimateDataset,
        active: &ClimateDataset,
        steps: Range<usize>,
        rows: usize,
    ) -> Result<FeatureBlock, FeatureError> {
        match &self.config.window {
            TrendWindow::Yearly => info!("Doing the local averages on a groupby basis"),
            TrendWindow::Rolling { .. } => info!("Doing the local averages on a rolling basis"),
        }

        let mut block = FeatureBlock::new(rows);
        for variable in &self.config.trend_variables {
            let column = match &self.config.window {
                TrendWindow::Yearly => self.aggregator.local_yearly(active, variable)?,
                TrendWindow::Rolling { .. } => {
                    self.aggregator.local_rolling(climate, variable, steps.clone())?
                }
            };
            block.push(variable.column_name("local"), column)?;
        }
        Ok(block)
    }
}

/// Flatten the target over the active steps
fn target_vector(
    target: ArrayView3<'_, f64>,
    climate: &ClimateDataset,
    steps: Range<usize>,
) -> Result<Array1<f64>, FeatureError> {
    let (total, ny, nx) = climate.shape();
    let window = steps.len();
    let dim = target.dim();

    let selected = if dim == (window, ny, nx) {
        target
    } else if dim == (total, ny, nx) {
        target.slice_move(s![steps, .., ..])
    } else {
        return Err(GridError::shape("target", &[window, ny, nx], &[dim.0, dim.1, dim.2]).into());
    };
    Ok(Array1::from(flatten_cube(selected)))
}

/// One-shot fire feature preparation
pub fn fire(
    climate: &ClimateDataset,
    land_types: &LandTypeRaster,
    target: Option<ArrayView3<'_, f64>>,
    config: &FireConfig,
) -> Result<FireFeatures, FeatureError> {
    FeatureAssembler::new(config.clone())?.prepare(climate, land_types, target)
}
