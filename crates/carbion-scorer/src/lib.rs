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

//! Retrospective forecast accuracy scoring.
//!
//! Forecast cycles are appended to per-model JSON log files; once a
//! forecast's horizon has fully elapsed the scorer fetches what actually
//! happened from Home Assistant and attaches a MAPE to the entry, exactly
//! once.

pub mod append;
pub mod entities;
pub mod logfile;
pub mod mape;
pub mod score;

pub use append::append_from_sensor;
pub use entities::log_filename;
pub use logfile::ForecastLog;
pub use score::{ScoreSummary, Scorer};

use carbion_ha::HaError;

#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed log file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No log file mapping for entity '{0}'")]
    UnknownEntity(String),

    #[error(transparent)]
    Ha(#[from] HaError),

    /// Sensor state exists but lacks usable forecast attributes.
    #[error("Entity '{0}' carries no forecast attributes")]
    MissingAttributes(String),
}
