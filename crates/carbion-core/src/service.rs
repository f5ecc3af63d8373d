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

//! Stateless forecast service.
//!
//! Runs the full model fan-out (three baselines plus the two statistical
//! adapters) over one validated history and assembles a single result with
//! a shared forecast calendar. All-or-nothing: any model failure fails the
//! whole request.

use crate::error::ServiceError;
use carbion_models::{
    BaselineKind, BaselineModel, ForecastModel, MstlModel, SeasonalAdditiveModel,
};
use carbion_types::{
    ForecastResult, InputRow, TimeSeriesPoint, format_in_zone, parse_freq, parse_timestamp,
};
use chrono::Duration;
use chrono_tz::Tz;
use std::collections::BTreeMap;
use tracing::{debug, error, info};

/// Stateless multi-model forecaster.
///
/// Carries only the calendar configuration; every call fits fresh models,
/// so concurrent requests do not share state.
#[derive(Debug, Clone)]
pub struct ForecastService {
    tz: Tz,
    holidays: Vec<(u32, u32)>,
}

impl ForecastService {
    pub fn new(tz: Tz, holidays: Vec<(u32, u32)>) -> Self {
        Self { tz, holidays }
    }

    /// Handle one wire-level prediction request.
    ///
    /// Validates and coerces the raw rows, then delegates to [`forecast`].
    /// Any malformed row rejects the whole request.
    ///
    /// [`forecast`]: ForecastService::forecast
    pub fn predict_rows(
        &self,
        rows: &[InputRow],
        periods: usize,
        freq: &str,
    ) -> Result<ForecastResult, ServiceError> {
        let step = parse_freq(freq)
            .ok_or_else(|| ServiceError::InvalidInput(format!("unsupported freq '{freq}'")))?;
        if rows.is_empty() {
            return Err(ServiceError::InvalidInput("data must not be empty".into()));
        }

        let mut history = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let timestamp = parse_timestamp(&row.ds).ok_or_else(|| {
                ServiceError::InvalidInput(format!("row {i}: unparseable timestamp '{}'", row.ds))
            })?;
            let value = row.y.as_f64().ok_or_else(|| {
                ServiceError::InvalidInput(format!("row {i}: non-numeric value"))
            })?;
            history.push(TimeSeriesPoint::new(timestamp, value));
        }

        for pair in history.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(ServiceError::InvalidInput(
                    "timestamps must be strictly increasing".into(),
                ));
            }
        }

        self.forecast(&history, periods, step)
    }

    /// Run every model over an already-validated history.
    pub fn forecast(
        &self,
        history: &[TimeSeriesPoint],
        horizon: usize,
        step: Duration,
    ) -> Result<ForecastResult, ServiceError> {
        if horizon == 0 {
            return Err(ServiceError::InvalidInput("periods must be positive".into()));
        }
        if history.is_empty() {
            return Err(ServiceError::InvalidInput("data must not be empty".into()));
        }

        debug!(
            points = history.len(),
            horizon,
            step_secs = step.num_seconds(),
            "Running forecast fan-out"
        );

        let mut models: BTreeMap<String, _> = BTreeMap::new();

        for kind in [BaselineKind::Persistence, BaselineKind::Mean, BaselineKind::Median] {
            let mut baseline = BaselineModel::new(kind);
            baseline.fit(history)?;
            let mut forecast = baseline.predict(horizon)?;
            forecast.clip_non_negative();
            models.insert(baseline.name().to_owned(), forecast);
        }

        // The seasonal adapter owns the forecast calendar shared by every
        // model in the response.
        let mut seasonal = SeasonalAdditiveModel::new(self.tz, self.holidays.clone(), step);
        seasonal.fit(history).inspect_err(|e| {
            error!("Seasonal-additive fit failed: {e}");
        })?;
        let dates: Vec<String> = seasonal
            .forecast_timestamps(horizon)?
            .into_iter()
            .map(|ts| format_in_zone(ts, self.tz))
            .collect();
        models.insert(seasonal.name().to_owned(), seasonal.predict(horizon)?);

        let mut mstl = MstlModel::new();
        mstl.fit(history)?;
        models.insert(
            mstl.name().to_owned(),
            mstl.predict(horizon).inspect_err(|e| {
                error!("MSTL prediction failed: {e}");
            })?,
        );

        info!(
            models = models.len(),
            horizon, "Forecast fan-out complete"
        );

        Ok(ForecastResult { dates, models })
    }
}
