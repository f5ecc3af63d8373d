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

use carbion_types::ForecastResult;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Published state of one model after a forecast cycle.
///
/// `state` mirrors what an HA sensor would show: the first forecast value
/// rounded to two decimals. The full arrays ride along as attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSnapshot {
    pub model: String,
    pub state: f64,
    pub forecast: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<Vec<f64>>,
    pub forecast_timestamps: Vec<String>,
    pub updated_at: String,
}

/// Shared, atomically-replaced view of the latest forecast cycle.
///
/// Readers (the web layer) never observe a half-updated cycle: the whole
/// map is swapped under one write lock.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<BTreeMap<String, ForecastSnapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every snapshot with the outcome of one successful cycle.
    pub fn publish(&self, result: &ForecastResult, updated_at: DateTime<Utc>) {
        let mut snapshots = BTreeMap::new();
        for (name, forecast) in &result.models {
            let state = forecast
                .values
                .first()
                .map_or(0.0, |v| (v * 100.0).round() / 100.0);
            snapshots.insert(
                name.clone(),
                ForecastSnapshot {
                    model: name.clone(),
                    state,
                    forecast: forecast.values.clone(),
                    lower: forecast.lower.clone(),
                    upper: forecast.upper.clone(),
                    forecast_timestamps: result.dates.clone(),
                    updated_at: updated_at.to_rfc3339(),
                },
            );
        }
        *self.inner.write() = snapshots;
    }

    pub fn get(&self, model: &str) -> Option<ForecastSnapshot> {
        self.inner.read().get(model).cloned()
    }

    pub fn all(&self) -> Vec<ForecastSnapshot> {
        self.inner.read().values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
