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

//! Background forecast cycle.
//!
//! Pulls a trailing history window for the input entity, runs the forecast
//! fan-out, and publishes one snapshot per model. A failed cycle leaves the
//! previously published snapshots untouched.

use crate::error::ServiceError;
use crate::service::ForecastService;
use crate::snapshot::SnapshotStore;
use async_trait::async_trait;
use carbion_types::TimeSeriesPoint;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Seam over the Home Assistant history API.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Numeric history for one entity over `[start, end]`, chronologically
    /// ordered, non-numeric states already dropped.
    async fn history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<TimeSeriesPoint>>;
}

pub struct ForecastCycle {
    source: Arc<dyn HistorySource>,
    service: ForecastService,
    store: SnapshotStore,
    input_entity: String,
    horizon: usize,
    step: Duration,
    history_days: i64,
}

impl std::fmt::Debug for ForecastCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastCycle")
            .field("input_entity", &self.input_entity)
            .field("horizon", &self.horizon)
            .field("history_days", &self.history_days)
            .finish_non_exhaustive()
    }
}

impl ForecastCycle {
    pub fn new(
        source: Arc<dyn HistorySource>,
        service: ForecastService,
        store: SnapshotStore,
        input_entity: String,
        horizon: usize,
        step: Duration,
        history_days: i64,
    ) -> Self {
        Self {
            source,
            service,
            store,
            input_entity,
            horizon,
            step,
            history_days,
        }
    }

    pub fn store(&self) -> SnapshotStore {
        self.store.clone()
    }

    /// Run one fetch-forecast-publish pass.
    pub async fn run_once(&self) -> Result<(), ServiceError> {
        let now = Utc::now();
        let start = now - Duration::days(self.history_days);

        let history = self
            .source
            .history(&self.input_entity, start, now)
            .await
            .map_err(|e| {
                warn!("History fetch for {} failed: {e}", self.input_entity);
                ServiceError::Upstream(e.to_string())
            })?;

        if history.is_empty() {
            return Err(ServiceError::Upstream(format!(
                "no usable history for {}",
                self.input_entity
            )));
        }

        let result = self.service.forecast(&history, self.horizon, self.step)?;
        self.store.publish(&result, now);
        info!(
            entity = %self.input_entity,
            points = history.len(),
            models = result.models.len(),
            "Forecast cycle complete"
        );
        Ok(())
    }
}
