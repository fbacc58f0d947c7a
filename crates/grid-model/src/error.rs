//! Grid Error Types

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while building or slicing gridded data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Array extents disagree with the grid they are attached to
    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A variable or layer name was registered twice
    #[error("Duplicate variable: {0}")]
    DuplicateVariable(String),

    /// Lookup of a variable that is not in the dataset
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Time steps must be strictly increasing
    #[error("Time axis is not strictly increasing at step {0}")]
    UnorderedTime(usize),

    /// Calendar date could not be constructed
    #[error("Invalid date: {year}-{month:02}")]
    InvalidDate { year: i32, month: u32 },

    /// Date window does not overlap the time axis
    #[error("Time window {start} to {end} selects no steps")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },

    /// Step range reaches past the end of the time axis
    #[error("Step range {start}..{end} is outside a time axis of {len} steps")]
    StepsOutOfRange { start: usize, end: usize, len: usize },
}

impl GridError {
    /// Shorthand for a shape mismatch on a named array
    pub fn shape(what: impl Into<String>, expected: &[usize], actual: &[usize]) -> Self {
        GridError::ShapeMismatch {
            what: what.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}
