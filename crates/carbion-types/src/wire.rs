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

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One historical row in a `/predict` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputRow {
    /// ISO-8601 timestamp string.
    pub ds: String,
    /// Observed value; clients send either a JSON number or a numeric string.
    pub y: YValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YValue {
    Number(f64),
    Text(String),
}

impl YValue {
    /// Coerce to f64; returns `None` for non-numeric text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            YValue::Number(n) => Some(*n),
            YValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Request body of `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub data: Vec<InputRow>,
    /// Forecast horizon (number of future steps).
    pub periods: usize,
    /// Step frequency code; hourly by default.
    #[serde(default = "default_freq")]
    pub freq: String,
}

fn default_freq() -> String {
    "h".to_owned()
}

/// Response body of `POST /predict`.
///
/// `series` flattens into top-level keys: one `<model>` array per model and
/// `<model>_lower` / `<model>_upper` arrays for models with confidence
/// bounds. All arrays are positionally aligned with `dates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub dates: Vec<String>,
    #[serde(flatten)]
    pub series: BTreeMap<String, Vec<f64>>,
}

/// Error body returned with a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
