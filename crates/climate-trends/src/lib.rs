//! Climate Trend Aggregation
//!
//! Yearly (calendar groupby) and rolling 12-step summaries of climate
//! variables, either collapsed to one value per step (global trends) or kept
//! at full spatial resolution (local trends).

mod aggregator;
mod reduce;

pub use aggregator::{TemporalAggregator, TrendVariable, ROLLING_WINDOW};
pub use reduce::{rolling, yearly, Reduction};

use grid_model::GridError;
use thiserror::Error;

/// Errors while computing trend features
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrendError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Steps {start}..{end} are outside a record of {len} steps")]
    WindowOutOfRange { start: usize, end: usize, len: usize },
}
