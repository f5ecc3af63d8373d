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

/// Forecast sensor entities and their log file names, one per model.
pub const FORECAST_ENTITIES: &[(&str, &str)] = &[
    (
        "sensor.co2_intensity_persistence_forecast",
        "persistence_forecast.json",
    ),
    ("sensor.co2_intensity_mean_forecast", "mean_forecast.json"),
    ("sensor.co2_intensity_median_forecast", "median_forecast.json"),
    (
        "sensor.co2_intensity_seasonal_forecast",
        "seasonal_forecast.json",
    ),
    ("sensor.co2_intensity_mstl_forecast", "mstl_forecast.json"),
];

/// Log file name for a forecast entity, if it is one we track.
pub fn log_filename(entity_id: &str) -> Option<&'static str> {
    FORECAST_ENTITIES
        .iter()
        .find(|(entity, _)| *entity == entity_id)
        .map(|(_, file)| *file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_entities() {
        assert_eq!(
            log_filename("sensor.co2_intensity_mstl_forecast"),
            Some("mstl_forecast.json")
        );
        assert_eq!(log_filename("sensor.kitchen_light"), None);
    }

    #[test]
    fn test_filenames_are_unique() {
        let mut files: Vec<_> = FORECAST_ENTITIES.iter().map(|(_, f)| f).collect();
        files.sort();
        files.dedup();
        assert_eq!(files.len(), FORECAST_ENTITIES.len());
    }
}
