//! Drought and Insect Feature Builders

use crate::record::{PlotMeta, PlotRecord};
use crate::PlotError;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum condition proportion for a plot to enter fitting
pub const MIN_CONDITION_PROPORTION: f64 = 0.3;

/// Remeasurement interval assumed when predicting
pub const DEFAULT_DURATION: f64 = 10.0;

/// Covariate columns in evaluation mode
pub const EVAL_COLUMNS: [&str; 5] = ["ppt_sum_min", "tavg_mean_max", "age", "age_squared", "duration"];

/// Covariate columns in fit mode
pub const FIT_COLUMNS: [&str; 5] = ["ppt_sum_min_1", "tavg_mean_max_1", "age", "age_squared", "duration"];

/// Mortality agent modelled by the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disturbance {
    Drought,
    Insects,
}

impl Disturbance {
    /// Target for a plot, `None` when an input is missing
    pub fn target(self, record: &PlotRecord) -> Option<f64> {
        let mortality = record.mortality_fraction()?;
        match self {
            Disturbance::Drought => Some(mortality),
            Disturbance::Insects => Some(record.fraction_insect_1? * mortality),
        }
    }
}

/// Whether to build fitting data or prediction inputs
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildMode {
    /// Prediction inputs with a fixed remeasurement interval
    Eval { duration: f64 },
    #[default]
    Fit,
}

/// Feature matrix, optional target and per-row metadata
#[derive(Debug, Clone)]
pub struct PlotFeatures {
    pub x: Array2<f64>,
    pub y: Option<Array1<f64>>,
    pub meta: Vec<PlotMeta>,
}

/// Builds mortality features for one disturbance agent
#[derive(Debug, Clone, Copy)]
pub struct PlotFeatureBuilder {
    disturbance: Disturbance,
}

impl PlotFeatureBuilder {
    pub fn new(disturbance: Disturbance) -> Self {
        Self { disturbance }
    }

    pub fn build(&self, records: &[PlotRecord], mode: BuildMode) -> Result<PlotFeatures, PlotError> {
        match mode {
            BuildMode::Eval { duration } => self.evaluate(records, duration),
            BuildMode::Fit => self.fit(records),
        }
    }

    /// Prediction covariates for every record; missing values become NaN
    pub fn evaluate(&self, records: &[PlotRecord], duration: f64) -> Result<PlotFeatures, PlotError> {
        let mut values = Vec::with_capacity(records.len() * EVAL_COLUMNS.len());
        for record in records {
            let age = record.age.unwrap_or(f64::NAN);
            values.extend([
                record.ppt_sum_min.unwrap_or(f64::NAN),
                record.tavg_mean_max.unwrap_or(f64::NAN),
                age,
                age * age,
                duration,
            ]);
        }

        Ok(PlotFeatures {
            x: Array2::from_shape_vec((records.len(), EVAL_COLUMNS.len()), values)?,
            y: None,
            meta: records.iter().map(PlotRecord::meta).collect(),
        })
    }

    /// Fitting covariates and target for the records passing [`Self::fit_rows`]
    pub fn fit(&self, records: &[PlotRecord]) -> Result<PlotFeatures, PlotError> {
        let mut values = Vec::with_capacity(records.len() * FIT_COLUMNS.len());
        let mut targets = Vec::with_capacity(records.len());
        let mut meta = Vec::with_capacity(records.len());

        for record in records {
            if let Some((row, y)) = self.fit_row(record) {
                values.extend(row);
                targets.push(y);
                meta.push(record.meta());
            }
        }

        debug!(
            "{:?}: kept {} of {} plot records",
            self.disturbance,
            targets.len(),
            records.len()
        );

        Ok(PlotFeatures {
            x: Array2::from_shape_vec((targets.len(), FIT_COLUMNS.len()), values)?,
            y: Some(Array1::from(targets)),
            meta,
        })
    }

    /// Records that survive the fit-mode filter
    pub fn fit_rows(&self, records: &[PlotRecord]) -> Vec<PlotRecord> {
        records
            .iter()
            .filter(|r| self.fit_row(r).is_some())
            .cloned()
            .collect()
    }

    /// Covariates and target of a usable, undisturbed record
    fn fit_row(&self, record: &PlotRecord) -> Option<([f64; 5], f64)> {
        let condprop = record.condprop?;
        if !(condprop > MIN_CONDITION_PROPORTION) || record.is_disturbed() {
            return None;
        }

        let age = record.age?;
        let row = [
            record.ppt_sum_min_1?,
            record.tavg_mean_max_1?,
            age,
            age * age,
            record.duration()?,
        ];
        if row.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let y = self.disturbance.target(record)?;
        if y.is_nan() || y >= 1.0 {
            return None;
        }
        Some((row, y))
    }
}

/// Drought mortality features
pub fn drought(records: &[PlotRecord], mode: BuildMode) -> Result<PlotFeatures, PlotError> {
    PlotFeatureBuilder::new(Disturbance::Drought).build(records, mode)
}

/// Insect mortality features
pub fn insects(records: &[PlotRecord], mode: BuildMode) -> Result<PlotFeatures, PlotError> {
    PlotFeatureBuilder::new(Disturbance::Insects).build(records, mode)
}
