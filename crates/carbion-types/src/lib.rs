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

pub mod config;
pub mod forecast;
pub mod log;
pub mod series;
pub mod wire;

// Re-export common types for convenience
pub use config::{AppConfig, ForecastConfig, ScoringConfig, SystemConfig};
pub use forecast::{ForecastResult, ModelForecast};
pub use log::{ForecastLogEntry, ScoreState};
pub use series::{TimeSeriesPoint, format_in_zone, parse_freq, parse_timestamp};
pub use wire::{ErrorResponse, InputRow, PredictRequest, PredictResponse};
