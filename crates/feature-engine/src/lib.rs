//! Fire Feature Engine
//!
//! Turns climate cubes, land-type rasters and burned-area targets into an
//! aligned design matrix and target vector for fire-risk model fitting.

mod block;
mod fire;
mod settings;

pub use block::FeatureBlock;
pub use fire::{fire, FeatureAssembler, FireFeatures};
pub use settings::{BlockLayout, BlockPlan, FireConfig, LocalTrends, TrendWindow};

use climate_trends::TrendError;
use grid_model::GridError;
use spatial_transforms::TransformError;
use thiserror::Error;

/// Errors during fire feature preparation
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Trend(#[from] TrendError),

    /// A feature column would break (t, y, x) row alignment
    #[error("Column {name} has {actual} rows, expected {expected}")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Target field is required unless eval_only is set")]
    MissingTarget,

    #[error("Climate record has no time steps")]
    EmptyRecord,

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}
