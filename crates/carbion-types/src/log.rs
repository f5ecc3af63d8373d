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

use crate::series::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One forecast cycle appended to a model's log file.
///
/// `mape` is a write-once terminal field: absent until the entry is scored,
/// then either a number (scored) or an explicit null (unscorable). Scored
/// and unscorable entries are never revisited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastLogEntry {
    #[serde(rename = "timestamp")]
    pub logged_at: String,
    pub forecast: Vec<f64>,
    pub forecast_timestamps: Vec<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_tristate",
        skip_serializing_if = "Option::is_none"
    )]
    pub mape: Option<Option<f64>>,
}

/// Distinguishes a missing `mape` key (unscored) from an explicit null
/// (unscorable, terminal).
fn deserialize_tristate<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

/// Scoring lifecycle of a log entry at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreState {
    /// Horizon not yet elapsed (or entry unparseable) — skipped this run.
    Pending,
    /// Horizon elapsed, not yet scored.
    Eligible,
    /// Terminal: accuracy attached.
    Scored(f64),
    /// Terminal: no realized data matched within tolerance.
    Unscorable,
}

impl ForecastLogEntry {
    pub fn new(logged_at: DateTime<Utc>, forecast: Vec<f64>, timestamps: Vec<String>) -> Self {
        Self {
            logged_at: logged_at.to_rfc3339(),
            forecast,
            forecast_timestamps: timestamps,
            mape: None,
        }
    }

    /// First forecast timestamp, if parseable.
    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.forecast_timestamps.first().and_then(|s| parse_timestamp(s))
    }

    /// Last forecast timestamp, if parseable.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.forecast_timestamps.last().and_then(|s| parse_timestamp(s))
    }

    pub fn score_state(&self, now: DateTime<Utc>) -> ScoreState {
        match self.mape {
            Some(Some(mape)) => return ScoreState::Scored(mape),
            Some(None) => return ScoreState::Unscorable,
            None => {}
        }
        if self.forecast.is_empty() || self.forecast_timestamps.len() != self.forecast.len() {
            return ScoreState::Pending;
        }
        match self.last_timestamp() {
            Some(last) if last <= now => ScoreState::Eligible,
            _ => ScoreState::Pending,
        }
    }

    /// Attach the terminal score. `None` marks the entry unscorable.
    pub fn set_mape(&mut self, mape: Option<f64>) {
        self.mape = Some(mape);
    }
}
