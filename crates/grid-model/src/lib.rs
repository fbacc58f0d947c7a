//! Gridded Data Model
//!
//! Climate cubes, static land-type rasters and the (t, y, x) flattening
//! helpers shared by every feature block.

mod dataset;
mod error;
mod field;
mod time;

pub use dataset::{ClimateDataset, ClimateVariable, LandTypeLayer, LandTypeRaster};
pub use error::GridError;
pub use field::{
    broadcast_steps, flatten_cube, missing_mask, nan_mean, tile_over_time, GriddedField,
    SpaceTimeField,
};
pub use time::{TimeAxis, YearGroup};
