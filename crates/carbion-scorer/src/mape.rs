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

//! Time-aligned MAPE.
//!
//! Forecast points are matched to realized observations by
//! nearest-neighbor in time under a tolerance; everything here is pure so
//! the alignment rules are testable without any I/O.

use carbion_types::TimeSeriesPoint;
use chrono::{DateTime, Duration, Utc};

/// A forecast point matched to what actually happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPair {
    pub realized: f64,
    pub forecast: f64,
}

/// Match each forecast point to the nearest realized observation in time.
///
/// Points with no realized observation within `tolerance` are dropped.
/// One realized observation may serve several forecast points; with a
/// 15-minute tolerance against hourly forecasts that cannot happen.
pub fn match_pairs(
    forecast: &[f64],
    forecast_times: &[DateTime<Utc>],
    realized: &[TimeSeriesPoint],
    tolerance: Duration,
) -> Vec<ScoredPair> {
    let mut pairs = Vec::new();
    for (value, time) in forecast.iter().zip(forecast_times) {
        let nearest = realized
            .iter()
            .map(|r| (r, (r.timestamp - *time).abs()))
            .min_by_key(|(_, distance)| *distance);
        if let Some((r, distance)) = nearest
            && distance <= tolerance
        {
            pairs.push(ScoredPair {
                realized: r.value,
                forecast: *value,
            });
        }
    }
    pairs
}

/// Mean absolute percentage error over the surviving pairs.
///
/// Pairs with a realized value of exactly zero are excluded (the relative
/// error is undefined there); `None` when no pair survives.
pub fn mape(pairs: &[ScoredPair]) -> Option<f64> {
    let surviving: Vec<f64> = pairs
        .iter()
        .filter(|p| p.realized != 0.0)
        .map(|p| (p.realized - p.forecast).abs() / p.realized.abs())
        .collect();
    if surviving.is_empty() {
        return None;
    }
    Some(100.0 * surviving.iter().sum::<f64>() / surviving.len() as f64)
}
