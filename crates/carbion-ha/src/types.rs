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
use serde_json::Value;

/// State of one HA entity from `/api/states/{entity_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaEntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Value,
    #[serde(default)]
    pub last_changed: String,
    #[serde(default)]
    pub last_updated: String,
}

impl HaEntityState {
    /// `unknown`/`unavailable` are HA's placeholder states for sensors
    /// that currently carry no value.
    pub fn is_unavailable(&self) -> bool {
        matches!(self.state.as_str(), "unknown" | "unavailable")
    }

    pub fn numeric_state(&self) -> Option<f64> {
        if self.is_unavailable() {
            return None;
        }
        self.state.trim().parse().ok()
    }

    /// An attribute holding an array of numbers (e.g. `forecast`).
    pub fn f64_array_attribute(&self, key: &str) -> Option<Vec<f64>> {
        self.attributes
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_f64)
            .collect()
    }

    /// An attribute holding an array of strings (e.g. `forecast_timestamps`).
    pub fn string_array_attribute(&self, key: &str) -> Option<Vec<String>> {
        self.attributes
            .get(key)?
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(ToOwned::to_owned))
            .collect()
    }
}

/// One row of `/api/history/period` output (array-of-arrays, one inner
/// array per entity).
#[derive(Debug, Clone, Deserialize)]
pub struct HaHistoryState {
    pub state: String,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub last_changed: Option<String>,
}

impl HaHistoryState {
    /// Recorder output sometimes omits `last_updated`; fall back to
    /// `last_changed`.
    pub fn timestamp_str(&self) -> Option<&str> {
        self.last_updated
            .as_deref()
            .or(self.last_changed.as_deref())
    }
}
