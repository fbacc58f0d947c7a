//! Plot-Level Mortality Features
//!
//! Filters forest inventory plot records and derives covariates and
//! mortality targets for the drought and insect models.

mod builder;
mod record;

pub use builder::{
    drought, insects, BuildMode, Disturbance, PlotFeatureBuilder, PlotFeatures, DEFAULT_DURATION,
    EVAL_COLUMNS, FIT_COLUMNS, MIN_CONDITION_PROPORTION,
};
pub use record::{read_records_json, PlotMeta, PlotRecord};

use thiserror::Error;

/// Errors while building plot features
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Invalid plot records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Feature matrix shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
