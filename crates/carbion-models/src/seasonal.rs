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

//! Calendar-aware additive decomposition model.
//!
//! Fits `y = trend + hour-of-day + day-of-week + holiday + noise` on the
//! training window, with all calendar components evaluated in the configured
//! reference timezone. Intervals are symmetric 80% bands from the residual
//! standard deviation. CO2 intensity follows the human day (generation mix
//! tracks demand), so these components carry most of the signal.

use crate::{ForecastModel, ModelError};
use carbion_types::{ModelForecast, TimeSeriesPoint};
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// One week of hourly observations; below this the day-of-week component
/// is unidentifiable.
const MIN_FIT_POINTS: usize = 168;

/// Standard normal quantile for a symmetric 80% interval.
const Z_80: f64 = 1.2815515655446004;

#[derive(Debug, Clone)]
pub struct SeasonalAdditiveModel {
    tz: Tz,
    holidays: Vec<(u32, u32)>,
    step: Duration,
    fitted: Option<FittedSeasonal>,
}

#[derive(Debug, Clone)]
struct FittedSeasonal {
    intercept: f64,
    slope: f64,
    train_len: usize,
    hour_effect: [f64; 24],
    weekday_effect: [f64; 7],
    holiday_effect: f64,
    sigma: f64,
    last_timestamp: DateTime<Utc>,
}

impl SeasonalAdditiveModel {
    /// `holidays` are recurring (month, day) pairs in the reference zone.
    pub fn new(tz: Tz, holidays: Vec<(u32, u32)>, step: Duration) -> Self {
        Self {
            tz,
            holidays,
            step,
            fitted: None,
        }
    }

    fn is_holiday(&self, local: &DateTime<Tz>) -> bool {
        self.holidays.contains(&(local.month(), local.day()))
    }

    /// Future timestamps for a forecast of `horizon` steps, continuing the
    /// training calendar from the last observation.
    pub fn forecast_timestamps(&self, horizon: usize) -> Result<Vec<DateTime<Utc>>, ModelError> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        Ok((1..=horizon as i64)
            .map(|k| fitted.last_timestamp + self.step * k as i32)
            .collect())
    }
}

type DateTimeTz = DateTime<Tz>;

impl ForecastModel for SeasonalAdditiveModel {
    fn name(&self) -> &'static str {
        "seasonal"
    }

    fn fit(&mut self, history: &[TimeSeriesPoint]) -> Result<(), ModelError> {
        if history.len() < MIN_FIT_POINTS {
            return Err(ModelError::InsufficientData {
                needed: MIN_FIT_POINTS,
                got: history.len(),
            });
        }

        let n = history.len();
        let values: Vec<f64> = history.iter().map(|p| p.value).collect();
        let locals: Vec<DateTimeTz> = history
            .iter()
            .map(|p| p.timestamp.with_timezone(&self.tz))
            .collect();

        let (intercept, slope) = linear_trend(&values);
        let mut residuals: Vec<f64> = values
            .iter()
            .enumerate()
            .map(|(i, y)| y - (intercept + slope * i as f64))
            .collect();

        let mut hour_effect = [0.0_f64; 24];
        let mut hour_count = [0_usize; 24];
        for (local, r) in locals.iter().zip(&residuals) {
            let h = local.hour() as usize;
            hour_effect[h] += r;
            hour_count[h] += 1;
        }
        for (effect, count) in hour_effect.iter_mut().zip(hour_count) {
            if count > 0 {
                *effect /= count as f64;
            }
        }
        for (local, r) in locals.iter().zip(residuals.iter_mut()) {
            *r -= hour_effect[local.hour() as usize];
        }

        let mut weekday_effect = [0.0_f64; 7];
        let mut weekday_count = [0_usize; 7];
        for (local, r) in locals.iter().zip(&residuals) {
            let d = local.weekday().num_days_from_monday() as usize;
            weekday_effect[d] += r;
            weekday_count[d] += 1;
        }
        for (effect, count) in weekday_effect.iter_mut().zip(weekday_count) {
            if count > 0 {
                *effect /= count as f64;
            }
        }
        for (local, r) in locals.iter().zip(residuals.iter_mut()) {
            *r -= weekday_effect[local.weekday().num_days_from_monday() as usize];
        }

        let holiday_residuals: Vec<f64> = locals
            .iter()
            .zip(&residuals)
            .filter(|(local, _)| self.is_holiday(local))
            .map(|(_, r)| *r)
            .collect();
        let holiday_effect = if holiday_residuals.is_empty() {
            0.0
        } else {
            holiday_residuals.iter().sum::<f64>() / holiday_residuals.len() as f64
        };
        for (local, r) in locals.iter().zip(residuals.iter_mut()) {
            if self.is_holiday(local) {
                *r -= holiday_effect;
            }
        }

        let variance = residuals.iter().map(|r| r * r).sum::<f64>() / (n - 1) as f64;
        let sigma = variance.sqrt();

        debug!(
            n,
            slope,
            sigma,
            holiday_effect,
            "Fitted seasonal-additive decomposition"
        );

        self.fitted = Some(FittedSeasonal {
            intercept,
            slope,
            train_len: n,
            hour_effect,
            weekday_effect,
            holiday_effect,
            sigma,
            last_timestamp: history[n - 1].timestamp,
        });
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<ModelForecast, ModelError> {
        if horizon == 0 {
            return Err(ModelError::InvalidHorizon(horizon));
        }
        let fitted = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;

        let mut values = Vec::with_capacity(horizon);
        for timestamp in self.forecast_timestamps(horizon)? {
            let local = timestamp.with_timezone(&self.tz);
            let index = (fitted.train_len - 1) as f64
                + (timestamp - fitted.last_timestamp).num_seconds() as f64
                    / self.step.num_seconds() as f64;
            let mut point = fitted.intercept
                + fitted.slope * index
                + fitted.hour_effect[local.hour() as usize]
                + fitted.weekday_effect[local.weekday().num_days_from_monday() as usize];
            if self.is_holiday(&local) {
                point += fitted.holiday_effect;
            }
            values.push(point);
        }

        let band = Z_80 * fitted.sigma;
        let lower = values.iter().map(|v| v - band).collect();
        let upper = values.iter().map(|v| v + band).collect();

        let mut forecast = ModelForecast::with_bounds(values, lower, upper);
        forecast.clip_non_negative();
        Ok(forecast)
    }
}

/// Ordinary least squares fit of `y ~ intercept + slope * index`.
fn linear_trend(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    if sxx == 0.0 {
        return (mean_y, 0.0);
    }
    let slope = sxy / sxx;
    (mean_y - slope * mean_x, slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Santiago;

    fn hourly_history(hours: usize) -> Vec<TimeSeriesPoint> {
        // Daily sine-like pattern on a flat base, peak around local noon
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 4, 0, 0).unwrap();
        (0..hours)
            .map(|i| {
                let ts = start + Duration::hours(i as i64);
                let local_hour = ts.with_timezone(&Santiago).hour() as f64;
                let daily = 50.0 * (std::f64::consts::TAU * (local_hour - 6.0) / 24.0).sin();
                TimeSeriesPoint::new(ts, 300.0 + daily)
            })
            .collect()
    }

    fn model() -> SeasonalAdditiveModel {
        SeasonalAdditiveModel::new(Santiago, vec![(9, 18), (12, 25)], Duration::hours(1))
    }

    #[test]
    fn test_requires_one_week_of_history() {
        let mut m = model();
        let err = m.fit(&hourly_history(100)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InsufficientData {
                needed: 168,
                got: 100
            }
        ));
    }

    #[test]
    fn test_predict_shape_and_bounds() {
        let mut m = model();
        m.fit(&hourly_history(336)).unwrap();
        let forecast = m.predict(24).unwrap();

        assert_eq!(forecast.values.len(), 24);
        let lower = forecast.lower.as_ref().unwrap();
        let upper = forecast.upper.as_ref().unwrap();
        assert_eq!(lower.len(), 24);
        assert_eq!(upper.len(), 24);
        for ((l, v), u) in lower.iter().zip(&forecast.values).zip(upper) {
            assert!(l <= v && v <= u);
            assert!(*l >= 0.0);
        }
    }

    #[test]
    fn test_recovers_daily_cycle() {
        let mut m = model();
        m.fit(&hourly_history(336)).unwrap();
        let forecast = m.predict(24).unwrap();
        let timestamps = m.forecast_timestamps(24).unwrap();

        let at_local_hour = |want: u32| {
            timestamps
                .iter()
                .position(|ts| ts.with_timezone(&Santiago).hour() == want)
                .map(|i| forecast.values[i])
                .unwrap()
        };
        // Training peak is local noon, trough around midnight
        assert!(at_local_hour(12) > at_local_hour(0) + 30.0);
    }

    #[test]
    fn test_forecast_timestamps_are_contiguous() {
        let mut m = model();
        let history = hourly_history(168);
        m.fit(&history).unwrap();
        let timestamps = m.forecast_timestamps(3).unwrap();

        let last = history.last().unwrap().timestamp;
        assert_eq!(timestamps[0], last + Duration::hours(1));
        assert_eq!(timestamps[1], last + Duration::hours(2));
        assert_eq!(timestamps[2], last + Duration::hours(3));
    }

    #[test]
    fn test_predict_before_fit_rejected() {
        let m = model();
        assert!(matches!(m.predict(24), Err(ModelError::NotFitted)));
        assert!(matches!(
            m.forecast_timestamps(24),
            Err(ModelError::NotFitted)
        ));
    }

    #[test]
    fn test_negative_trend_clipped_to_zero() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let history: Vec<TimeSeriesPoint> = (0..200)
            .map(|i| {
                let value = (100.0 - i as f64).max(0.0);
                TimeSeriesPoint::new(start + Duration::hours(i as i64), value)
            })
            .collect();
        let mut m = model();
        m.fit(&history).unwrap();
        let forecast = m.predict(48).unwrap();
        assert!(forecast.values.iter().all(|v| *v >= 0.0));
        assert!(forecast.lower.unwrap().iter().all(|v| *v >= 0.0));
    }
}
