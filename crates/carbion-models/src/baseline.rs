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

//! Naive baseline forecasters.
//!
//! These exist as reference points for the statistical models: any model
//! that cannot beat persistence on MAPE is not earning its keep.

use crate::{ForecastModel, ModelError};
use carbion_types::{ModelForecast, TimeSeriesPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineKind {
    /// Replay the last `horizon` observations in chronological order.
    Persistence,
    /// Repeat the history mean.
    Mean,
    /// Repeat the history median.
    Median,
}

impl BaselineKind {
    fn key(self) -> &'static str {
        match self {
            BaselineKind::Persistence => "persistence",
            BaselineKind::Mean => "mean",
            BaselineKind::Median => "median",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BaselineModel {
    kind: BaselineKind,
    history: Option<Vec<f64>>,
}

impl BaselineModel {
    pub fn new(kind: BaselineKind) -> Self {
        Self {
            kind,
            history: None,
        }
    }
}

impl ForecastModel for BaselineModel {
    fn name(&self) -> &'static str {
        self.kind.key()
    }

    fn fit(&mut self, history: &[TimeSeriesPoint]) -> Result<(), ModelError> {
        if history.is_empty() {
            return Err(ModelError::InsufficientData { needed: 1, got: 0 });
        }
        self.history = Some(history.iter().map(|p| p.value).collect());
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<ModelForecast, ModelError> {
        if horizon == 0 {
            return Err(ModelError::InvalidHorizon(horizon));
        }
        let history = self.history.as_ref().ok_or(ModelError::NotFitted)?;

        let values = match self.kind {
            BaselineKind::Persistence => persistence_window(history, horizon),
            BaselineKind::Mean => {
                let mean = history.iter().sum::<f64>() / history.len() as f64;
                vec![mean; horizon]
            }
            BaselineKind::Median => vec![median(history); horizon],
        };

        Ok(ModelForecast::point(values))
    }
}

/// Last `horizon` observations in order; shorter histories are front-padded
/// with their earliest value so the output length is always `horizon`.
fn persistence_window(history: &[f64], horizon: usize) -> Vec<f64> {
    if history.len() >= horizon {
        history[history.len() - horizon..].to_vec()
    } else {
        let mut values = vec![history[0]; horizon - history.len()];
        values.extend_from_slice(history);
        values
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        f64::midpoint(sorted[mid - 1], sorted[mid])
    } else {
        sorted[mid]
    }
}
