//! Climate Datasets and Land-Type Rasters

use crate::time::TimeAxis;
use crate::GridError;
use ndarray::{s, Array2, Array3};
use std::ops::Range;

/// Named (t, y, x) climate variable
#[derive(Debug, Clone)]
pub struct ClimateVariable {
    pub name: String,
    pub values: Array3<f64>,
}

/// Named climate variables on a shared time axis and grid.
///
/// Variables keep their insertion order, which is the column order of the
/// climate feature block.
#[derive(Debug, Clone)]
pub struct ClimateDataset {
    time: TimeAxis,
    grid: (usize, usize),
    variables: Vec<ClimateVariable>,
}

impl ClimateDataset {
    /// Create an empty dataset over a time axis and (ny, nx) grid
    pub fn new(time: TimeAxis, grid: (usize, usize)) -> Self {
        Self {
            time,
            grid,
            variables: Vec::new(),
        }
    }

    /// Builder-style [`ClimateDataset::insert`]
    pub fn with_variable(
        mut self,
        name: impl Into<String>,
        values: Array3<f64>,
    ) -> Result<Self, GridError> {
        self.insert(name, values)?;
        Ok(self)
    }

    /// Add a variable; its shape must be (T, ny, nx)
    pub fn insert(&mut self, name: impl Into<String>, values: Array3<f64>) -> Result<(), GridError> {
        let name = name.into();
        let (t, ny, nx) = self.shape();
        if values.dim() != (t, ny, nx) {
            let (vt, vy, vx) = values.dim();
            return Err(GridError::shape(name, &[t, ny, nx], &[vt, vy, vx]));
        }
        if self.variables.iter().any(|v| v.name == name) {
            return Err(GridError::DuplicateVariable(name));
        }
        self.variables.push(ClimateVariable { name, values });
        Ok(())
    }

    /// Values of a variable by name
    pub fn get(&self, name: &str) -> Result<&Array3<f64>, GridError> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| &v.values)
            .ok_or_else(|| GridError::UnknownVariable(name.to_string()))
    }

    /// Variables in insertion order
    pub fn variables(&self) -> &[ClimateVariable] {
        &self.variables
    }

    /// Shared time axis
    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    /// (ny, nx)
    pub fn grid(&self) -> (usize, usize) {
        self.grid
    }

    /// (T, ny, nx)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.time.len(), self.grid.0, self.grid.1)
    }

    /// Copy of the dataset restricted to a step range
    pub fn select_steps(&self, steps: Range<usize>) -> Result<Self, GridError> {
        let time = self.time.select(steps.clone())?;
        let variables = self
            .variables
            .iter()
            .map(|v| ClimateVariable {
                name: v.name.clone(),
                values: v.values.slice(s![steps.clone(), .., ..]).to_owned(),
            })
            .collect();
        Ok(Self {
            time,
            grid: self.grid,
            variables,
        })
    }
}

/// Named static land-type layer
#[derive(Debug, Clone)]
pub struct LandTypeLayer {
    pub name: String,
    pub values: Array2<f64>,
}

/// Time-invariant land-type fractions, one layer per category
#[derive(Debug, Clone)]
pub struct LandTypeRaster {
    grid: (usize, usize),
    layers: Vec<LandTypeLayer>,
}

impl LandTypeRaster {
    /// Create an empty raster over an (ny, nx) grid
    pub fn new(grid: (usize, usize)) -> Self {
        Self {
            grid,
            layers: Vec::new(),
        }
    }

    /// Builder-style [`LandTypeRaster::insert`]
    pub fn with_layer(mut self, name: impl Into<String>, values: Array2<f64>) -> Result<Self, GridError> {
        self.insert(name, values)?;
        Ok(self)
    }

    /// Add a layer; its shape must be (ny, nx)
    pub fn insert(&mut self, name: impl Into<String>, values: Array2<f64>) -> Result<(), GridError> {
        let name = name.into();
        if values.dim() != self.grid {
            let (vy, vx) = values.dim();
            return Err(GridError::shape(name, &[self.grid.0, self.grid.1], &[vy, vx]));
        }
        if self.layers.iter().any(|l| l.name == name) {
            return Err(GridError::DuplicateVariable(name));
        }
        self.layers.push(LandTypeLayer { name, values });
        Ok(())
    }

    /// Layers in insertion order
    pub fn layers(&self) -> &[LandTypeLayer] {
        &self.layers
    }

    /// (ny, nx)
    pub fn grid(&self) -> (usize, usize) {
        self.grid
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True when no layer has been added
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
