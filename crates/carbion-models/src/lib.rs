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

//! Forecasting models for CO2 intensity series.
//!
//! Three families share the [`ForecastModel`] trait: naive baselines
//! (persistence, mean, median), a calendar-aware additive decomposition with
//! 80% intervals, and an MSTL decomposition with an ETS trend model and 95%
//! intervals.

pub mod baseline;
pub mod mstl;
pub mod seasonal;

pub use baseline::{BaselineKind, BaselineModel};
pub use mstl::MstlModel;
pub use seasonal::SeasonalAdditiveModel;

use carbion_types::{ModelForecast, TimeSeriesPoint};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Insufficient history: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Model fit failed: {0}")]
    FitFailed(String),

    #[error("Model has not been fitted")]
    NotFitted,

    #[error("Invalid forecast horizon: {0}")]
    InvalidHorizon(usize),
}

/// Common fit/predict seam for all forecasting models.
///
/// `fit` consumes a chronologically ordered history; `predict` may only be
/// called after a successful fit and returns exactly `horizon` values.
pub trait ForecastModel {
    /// Stable key used in response payloads and log file names.
    fn name(&self) -> &'static str;

    fn fit(&mut self, history: &[TimeSeriesPoint]) -> Result<(), ModelError>;

    fn predict(&self, horizon: usize) -> Result<ModelForecast, ModelError>;
}
