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

//! MSTL decomposition model.
//!
//! Decomposes the series into trend plus daily (24) and weekly (168)
//! seasonal components, forecasting the trend with an automatically
//! selected ETS model. Intervals are symmetric 95% bands.

use crate::{ForecastModel, ModelError};
use augurs::ets::AutoETS;
use augurs::mstl::MSTLModel;
use augurs::prelude::*;
use carbion_types::{ModelForecast, TimeSeriesPoint};
use tracing::debug;

/// Daily and weekly cycles at hourly resolution.
const DEFAULT_PERIODS: [usize; 2] = [24, 168];

/// One daily cycle; below this neither seasonal period is identifiable
/// and even the trend fallback has nothing to work with.
const MIN_FIT_POINTS: usize = 24;

const CONFIDENCE_LEVEL: f64 = 0.95;

/// Seasonal-trend decomposition forecaster.
///
/// The decomposition itself runs lazily inside `predict`; `fit` validates
/// and captures the training values. Periods that do not fit the training
/// window (fewer than two full cycles) are dropped, and if none remain the
/// model degrades to a plain ETS trend forecast.
#[derive(Debug, Clone)]
pub struct MstlModel {
    periods: Vec<usize>,
    values: Option<Vec<f64>>,
}

impl MstlModel {
    pub fn new() -> Self {
        Self::with_periods(DEFAULT_PERIODS.to_vec())
    }

    pub fn with_periods(periods: Vec<usize>) -> Self {
        Self {
            periods,
            values: None,
        }
    }
}

impl ForecastModel for MstlModel {
    fn name(&self) -> &'static str {
        "mstl"
    }

    fn fit(&mut self, history: &[TimeSeriesPoint]) -> Result<(), ModelError> {
        if history.len() < MIN_FIT_POINTS {
            return Err(ModelError::InsufficientData {
                needed: MIN_FIT_POINTS,
                got: history.len(),
            });
        }
        self.values = Some(history.iter().map(|p| p.value).collect());
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<ModelForecast, ModelError> {
        if horizon == 0 {
            return Err(ModelError::InvalidHorizon(horizon));
        }
        let values = self.values.as_ref().ok_or(ModelError::NotFitted)?;

        let n = values.len();
        let valid_periods: Vec<usize> = self
            .periods
            .iter()
            .copied()
            .filter(|&p| p > 1 && p * 2 <= n)
            .collect();

        let forecast = if valid_periods.is_empty() {
            debug!(n, "No seasonal period fits the window, using plain ETS");
            let ets = AutoETS::non_seasonal();
            let fitted = ets
                .fit(values)
                .map_err(|e| ModelError::FitFailed(format!("ETS fit: {e}")))?;
            fitted
                .predict(horizon, CONFIDENCE_LEVEL)
                .map_err(|e| ModelError::FitFailed(format!("ETS predict: {e}")))?
        } else {
            debug!(n, periods = ?valid_periods, horizon, "Fitting MSTL decomposition");
            let trend = AutoETS::non_seasonal().into_trend_model();
            let mstl = MSTLModel::new(valid_periods, trend);
            let fitted = mstl
                .fit(values)
                .map_err(|e| ModelError::FitFailed(format!("MSTL fit: {e}")))?;
            fitted
                .predict(horizon, CONFIDENCE_LEVEL)
                .map_err(|e| ModelError::FitFailed(format!("MSTL predict: {e}")))?
        };

        let mut result = match forecast.intervals {
            Some(intervals) => {
                ModelForecast::with_bounds(forecast.point, intervals.lower, intervals.upper)
            }
            None => ModelForecast::point(forecast.point),
        };
        result.clip_non_negative();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn history(values: Vec<f64>) -> Vec<TimeSeriesPoint> {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(start + Duration::hours(i as i64), v))
            .collect()
    }

    fn daily_cycle(hours: usize) -> Vec<f64> {
        (0..hours)
            .map(|i| 400.0 + 60.0 * (std::f64::consts::TAU * i as f64 / 24.0).sin())
            .collect()
    }

    #[test]
    fn test_insufficient_data_rejected() {
        let mut model = MstlModel::new();
        let err = model.fit(&history(vec![1.0; 10])).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData { needed: 24, .. }));
    }

    #[test]
    fn test_seasonal_forecast_shape() {
        let mut model = MstlModel::new();
        model.fit(&history(daily_cycle(336))).unwrap();
        let forecast = model.predict(24).unwrap();

        assert_eq!(forecast.values.len(), 24);
        let lower = forecast.lower.as_ref().unwrap();
        let upper = forecast.upper.as_ref().unwrap();
        for ((l, v), u) in lower.iter().zip(&forecast.values).zip(upper) {
            assert!(l <= v && v <= u);
        }
    }

    #[test]
    fn test_short_window_falls_back_to_trend_only() {
        // 30 points: neither 24 nor 168 fits twice, plain ETS path
        let values: Vec<f64> = (0..30).map(|i| 100.0 + 2.0 * i as f64).collect();
        let mut model = MstlModel::new();
        model.fit(&history(values)).unwrap();
        let forecast = model.predict(5).unwrap();
        assert_eq!(forecast.values.len(), 5);
    }

    #[test]
    fn test_forecast_is_non_negative() {
        let values: Vec<f64> = (0..48).map(|i| (50.0 - 2.0 * i as f64).max(0.0)).collect();
        let mut model = MstlModel::new();
        model.fit(&history(values)).unwrap();
        let forecast = model.predict(24).unwrap();
        assert!(forecast.values.iter().all(|v| *v >= 0.0));
        if let Some(lower) = forecast.lower {
            assert!(lower.iter().all(|v| *v >= 0.0));
        }
    }

    #[test]
    fn test_predict_before_fit_rejected() {
        let model = MstlModel::new();
        assert!(matches!(model.predict(24), Err(ModelError::NotFitted)));
    }
}
