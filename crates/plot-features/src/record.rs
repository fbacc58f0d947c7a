//! Inventory Plot Records

use crate::PlotError;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// One plot condition over one remeasurement period.
///
/// Suffix `_0` is the first measurement, `_1` the second. Numeric fields
/// absent from the source are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotRecord {
    pub lat: f64,
    pub lon: f64,
    /// Forest type code
    pub type_code: i32,
    /// Stand age (years)
    #[serde(default)]
    pub age: Option<f64>,
    /// Condition proportion of the plot
    #[serde(default)]
    pub condprop: Option<f64>,

    // Climate covariates for prediction
    #[serde(default)]
    pub ppt_sum_min: Option<f64>,
    #[serde(default)]
    pub tavg_mean_max: Option<f64>,

    // Climate covariates over the remeasurement period
    #[serde(default)]
    pub ppt_sum_min_1: Option<f64>,
    #[serde(default)]
    pub tavg_mean_max_1: Option<f64>,

    #[serde(default)]
    pub year_0: Option<f64>,
    #[serde(default)]
    pub year_1: Option<f64>,

    /// Live biomass at the first measurement
    #[serde(default)]
    pub balive_0: Option<f64>,
    /// Mortality biomass at the second measurement
    #[serde(default)]
    pub mort_1: Option<f64>,
    /// Share of mortality attributed to insects
    #[serde(default)]
    pub fraction_insect_1: Option<f64>,

    #[serde(default)]
    pub disturb_human_1: Option<bool>,
    #[serde(default)]
    pub disturb_fire_1: Option<bool>,
    #[serde(default)]
    pub treatment_cutting_1: Option<bool>,
}

impl PlotRecord {
    /// Any human, fire or cutting disturbance recorded in the period
    pub fn is_disturbed(&self) -> bool {
        [self.disturb_human_1, self.disturb_fire_1, self.treatment_cutting_1]
            .iter()
            .any(|flag| *flag == Some(true))
    }

    /// Years between measurements
    pub fn duration(&self) -> Option<f64> {
        Some(self.year_1? - self.year_0?)
    }

    /// Mortality as a fraction of initial live biomass
    pub fn mortality_fraction(&self) -> Option<f64> {
        Some(self.mort_1? / self.balive_0?)
    }

    pub fn meta(&self) -> PlotMeta {
        PlotMeta {
            lat: self.lat,
            lon: self.lon,
            type_code: self.type_code,
        }
    }
}

/// Location and forest type of a feature row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotMeta {
    pub lat: f64,
    pub lon: f64,
    pub type_code: i32,
}

/// Read a JSON array of plot records
pub fn read_records_json<R: Read>(reader: R) -> Result<Vec<PlotRecord>, PlotError> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_with_missing_fields() {
        let json = r#"[
            {"lat": 45.0, "lon": -120.0, "type_code": 221, "age": 80.0, "condprop": 1.0,
             "year_0": 2005, "year_1": 2015, "mort_1": 0.5, "balive_0": 10.0,
             "disturb_fire_1": false},
            {"lat": 46.0, "lon": -121.0, "type_code": 281}
        ]"#;
        let records = read_records_json(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].duration(), Some(10.0));
        assert_eq!(records[0].mortality_fraction(), Some(0.05));
        assert!(!records[0].is_disturbed());
        assert_eq!(records[1].age, None);
        assert_eq!(records[1].duration(), None);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            read_records_json("{not json".as_bytes()),
            Err(PlotError::Json(_))
        ));
    }

    #[test]
    fn test_disturbance_flags() {
        let record = PlotRecord {
            treatment_cutting_1: Some(true),
            ..Default::default()
        };
        assert!(record.is_disturbed());
        assert!(!PlotRecord::default().is_disturbed());
    }
}
