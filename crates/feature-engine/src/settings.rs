//! Fire Feature Configuration

use crate::FeatureError;
use chrono::NaiveDate;
use climate_trends::TrendVariable;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Time resolution of the trend features
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendWindow {
    /// Calendar-year groups over the whole record
    #[default]
    Yearly,
    /// Trailing 12-step aggregates, features restricted to `start..=end`
    Rolling { start: NaiveDate, end: NaiveDate },
}

/// Whether full-resolution trend features are computed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocalTrends {
    #[default]
    Off,
    Raw,
    /// Local trend grids smoothed with a Gaussian of this width (cells)
    Smoothed { gaussian_stddev: f64 },
    /// Gaussian kernel configured without local trends. Under
    /// [`BlockLayout::Legacy`] this leaves no trend block at all.
    KernelOnly { gaussian_stddev: f64 },
}

impl LocalTrends {
    /// Whether the local trend block is computed
    pub fn is_computed(&self) -> bool {
        matches!(self, LocalTrends::Raw | LocalTrends::Smoothed { .. })
    }
}

/// How feature blocks are combined into the design matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockLayout {
    /// Historical combination: a Gaussian kernel drops the global trend
    /// block (the smoothed local block takes its place when computed), and
    /// raw local trends are computed but not appended.
    #[default]
    Legacy,
    /// Global trends always; local trends whenever computed
    Complete,
}

/// Which trend blocks end up in the design matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    pub global: bool,
    pub local: bool,
}

/// Fire feature configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    /// Replace climate and land-type fields with phase-scrambled surrogates
    pub scramble: bool,

    pub window: TrendWindow,

    pub local_trends: LocalTrends,

    pub layout: BlockLayout,

    /// Build the design matrix only; no target is read
    pub eval_only: bool,

    /// Seed for the scrambling RNG (entropy when unset)
    pub seed: Option<u64>,

    /// Variables summarized into trend features, in column order
    pub trend_variables: Vec<TrendVariable>,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            scramble: false,
            window: TrendWindow::Yearly,
            local_trends: LocalTrends::Off,
            layout: BlockLayout::Legacy,
            eval_only: false,
            seed: None,
            trend_variables: TrendVariable::defaults(),
        }
    }
}

impl FireConfig {
    /// Design matrix only
    pub fn evaluation() -> Self {
        Self {
            eval_only: true,
            ..Default::default()
        }
    }

    /// Reproducible spatial null model
    pub fn null_model(seed: u64) -> Self {
        Self {
            scramble: true,
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Load from a file, overridden by `FOREST_FIRE__*` environment variables
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FeatureError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .add_source(::config::Environment::with_prefix("FOREST_FIRE").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Gaussian kernel width, when one is configured
    pub fn gaussian_stddev(&self) -> Option<f64> {
        match self.local_trends {
            LocalTrends::Smoothed { gaussian_stddev } | LocalTrends::KernelOnly { gaussian_stddev } => {
                Some(gaussian_stddev)
            }
            LocalTrends::Off | LocalTrends::Raw => None,
        }
    }

    pub fn block_plan(&self) -> BlockPlan {
        match (self.layout, &self.local_trends) {
            (BlockLayout::Legacy, LocalTrends::Smoothed { .. }) => BlockPlan {
                global: false,
                local: true,
            },
            (BlockLayout::Legacy, LocalTrends::KernelOnly { .. }) => BlockPlan {
                global: false,
                local: false,
            },
            (BlockLayout::Legacy, _)
            | (BlockLayout::Complete, LocalTrends::Off | LocalTrends::KernelOnly { .. }) => BlockPlan {
                global: true,
                local: false,
            },
            (BlockLayout::Complete, LocalTrends::Raw | LocalTrends::Smoothed { .. }) => BlockPlan {
                global: true,
                local: true,
            },
        }
    }
}
