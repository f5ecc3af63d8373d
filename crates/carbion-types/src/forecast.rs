// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of CarbION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use crate::wire::PredictResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point forecast plus optional confidence bounds from one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelForecast {
    pub values: Vec<f64>,
    pub lower: Option<Vec<f64>>,
    pub upper: Option<Vec<f64>>,
}

impl ModelForecast {
    /// Point-only forecast (baselines carry no bounds).
    pub fn point(values: Vec<f64>) -> Self {
        Self {
            values,
            lower: None,
            upper: None,
        }
    }

    pub fn with_bounds(values: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            values,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Clip all arrays to the physical non-negative floor.
    pub fn clip_non_negative(&mut self) {
        clip_floor(&mut self.values);
        if let Some(lower) = &mut self.lower {
            clip_floor(lower);
        }
        if let Some(upper) = &mut self.upper {
            clip_floor(upper);
        }
    }
}

/// Replace negative values with zero in place.
pub fn clip_floor(values: &mut [f64]) {
    for v in values.iter_mut() {
        if *v < 0.0 {
            *v = 0.0;
        }
    }
}

/// Unified multi-model forecast.
///
/// All model arrays share one `dates` calendar and are positionally
/// aligned with it (same horizon, same step for every model).
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Forecast wall times in the reference zone, formatted per the wire contract.
    pub dates: Vec<String>,
    pub models: BTreeMap<String, ModelForecast>,
}

impl ForecastResult {
    /// Flatten into the wire response shape (`<model>`, `<model>_lower`, `<model>_upper`).
    pub fn to_wire(&self) -> PredictResponse {
        let mut series = BTreeMap::new();
        for (name, forecast) in &self.models {
            series.insert(name.clone(), forecast.values.clone());
            if let Some(lower) = &forecast.lower {
                series.insert(format!("{name}_lower"), lower.clone());
            }
            if let Some(upper) = &forecast.upper {
                series.insert(format!("{name}_upper"), upper.clone());
            }
        }
        PredictResponse {
            dates: self.dates.clone(),
            series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_non_negative() {
        let mut forecast =
            ModelForecast::with_bounds(vec![1.0, -0.5], vec![-2.0, 0.0], vec![3.0, 1.0]);
        forecast.clip_non_negative();
        assert_eq!(forecast.values, vec![1.0, 0.0]);
        assert_eq!(forecast.lower, Some(vec![0.0, 0.0]));
        assert_eq!(forecast.upper, Some(vec![3.0, 1.0]));
    }

    #[test]
    fn test_to_wire_emits_bounds_only_where_present() {
        let mut models = BTreeMap::new();
        models.insert("mean".to_owned(), ModelForecast::point(vec![5.0]));
        models.insert(
            "seasonal".to_owned(),
            ModelForecast::with_bounds(vec![5.0], vec![4.0], vec![6.0]),
        );
        let result = ForecastResult {
            dates: vec!["2025-06-01 00:00:00".to_owned()],
            models,
        };

        let wire = result.to_wire();
        assert!(wire.series.contains_key("mean"));
        assert!(!wire.series.contains_key("mean_lower"));
        assert!(wire.series.contains_key("seasonal_lower"));
        assert!(wire.series.contains_key("seasonal_upper"));
    }
}
