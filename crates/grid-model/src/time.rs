//! Time Axis and Calendar-Year Grouping

use crate::GridError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Contiguous run of time steps sharing a calendar year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGroup {
    pub year: i32,
    pub steps: Range<usize>,
}

impl YearGroup {
    /// Number of time steps in the year
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Ordered time coordinate shared by every variable of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAxis {
    dates: Vec<NaiveDate>,
}

impl TimeAxis {
    /// Create a time axis, rejecting unordered or repeated dates
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, GridError> {
        if let Some(i) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(GridError::UnorderedTime(i + 1));
        }
        Ok(Self { dates })
    }

    /// Monthly axis with one step on the first of each month
    pub fn monthly(start_year: i32, start_month: u32, steps: usize) -> Result<Self, GridError> {
        if !(1..=12).contains(&start_month) {
            return Err(GridError::InvalidDate {
                year: start_year,
                month: start_month,
            });
        }

        let mut dates = Vec::with_capacity(steps);
        for i in 0..steps {
            let months = (start_month - 1) as usize + i;
            let year = start_year + (months / 12) as i32;
            let month = (months % 12) as u32 + 1;
            let date = NaiveDate::from_ymd_opt(year, month, 1)
                .ok_or(GridError::InvalidDate { year, month })?;
            dates.push(date);
        }
        Ok(Self { dates })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Group steps by calendar year, in time order
    pub fn year_groups(&self) -> Vec<YearGroup> {
        let mut groups: Vec<YearGroup> = Vec::new();
        for (i, date) in self.dates.iter().enumerate() {
            match groups.last_mut() {
                Some(group) if group.year == date.year() => group.steps.end = i + 1,
                _ => groups.push(YearGroup {
                    year: date.year(),
                    steps: i..i + 1,
                }),
            }
        }
        groups
    }

    /// Steps whose date falls in `start..=end`
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Result<Range<usize>, GridError> {
        let first = self.dates.partition_point(|d| *d < start);
        let last = self.dates.partition_point(|d| *d <= end);
        if first >= last {
            return Err(GridError::EmptyWindow { start, end });
        }
        Ok(first..last)
    }

    /// Sub-axis covering a step range
    pub fn select(&self, steps: Range<usize>) -> Result<Self, GridError> {
        if steps.start > steps.end || steps.end > self.len() {
            return Err(GridError::StepsOutOfRange {
                start: steps.start,
                end: steps.end,
                len: self.len(),
            });
        }
        Ok(Self {
            dates: self.dates[steps].to_vec(),
        })
    }
}
