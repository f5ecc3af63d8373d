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

//! Forecast log appender.
//!
//! Reads a forecast sensor's current state and appends one log entry with
//! its `forecast` / `forecast_timestamps` attributes. Meant to run right
//! after each forecast cycle.

use crate::ScorerError;
use crate::entities::log_filename;
use crate::logfile::ForecastLog;
use carbion_ha::HomeAssistantClient;
use carbion_types::ForecastLogEntry;
use chrono::Utc;
use std::path::Path;
use tracing::info;

pub async fn append_from_sensor(
    client: &HomeAssistantClient,
    log_dir: &Path,
    entity_id: &str,
) -> Result<(), ScorerError> {
    let filename =
        log_filename(entity_id).ok_or_else(|| ScorerError::UnknownEntity(entity_id.to_owned()))?;

    let state = client.get_state(entity_id).await?;
    let forecast = state
        .f64_array_attribute("forecast")
        .ok_or_else(|| ScorerError::MissingAttributes(entity_id.to_owned()))?;
    let timestamps = state
        .string_array_attribute("forecast_timestamps")
        .ok_or_else(|| ScorerError::MissingAttributes(entity_id.to_owned()))?;
    if forecast.is_empty() || forecast.len() != timestamps.len() {
        return Err(ScorerError::MissingAttributes(entity_id.to_owned()));
    }

    let mut log = ForecastLog::load(log_dir.join(filename))?;
    log.append(ForecastLogEntry::new(Utc::now(), forecast, timestamps));
    log.save()?;

    info!(
        entity = entity_id,
        entries = log.entries().len(),
        file = %log.path().display(),
        "Appended forecast entry"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::json;
    use tempfile::TempDir;

    const ENTITY: &str = "sensor.co2_intensity_mean_forecast";

    fn sensor_body(attributes: serde_json::Value) -> String {
        json!({
            "entity_id": ENTITY,
            "state": "310.0",
            "attributes": attributes,
            "last_changed": "2025-06-01T10:00:00Z",
            "last_updated": "2025-06-01T10:00:00Z"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_append_creates_and_extends_log() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", format!("/api/states/{ENTITY}").as_str())
            .with_status(200)
            .with_body(sensor_body(json!({
                "forecast": [310.0, 312.5],
                "forecast_timestamps": ["2025-06-01 11:00:00", "2025-06-01 12:00:00"]
            })))
            .expect(2)
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "test_token").unwrap();
        let dir = TempDir::new().unwrap();

        append_from_sensor(&client, dir.path(), ENTITY).await.unwrap();
        append_from_sensor(&client, dir.path(), ENTITY).await.unwrap();

        let log = ForecastLog::load(dir.path().join("mean_forecast.json")).unwrap();
        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.entries()[0].forecast, vec![310.0, 312.5]);
        assert_eq!(log.entries()[0].mape, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unknown_entity_rejected_without_network() {
        let client = HomeAssistantClient::new("http://localhost:1", "test_token").unwrap();
        let dir = TempDir::new().unwrap();
        let result = append_from_sensor(&client, dir.path(), "sensor.kitchen_light").await;
        assert!(matches!(result, Err(ScorerError::UnknownEntity(_))));
    }

    #[tokio::test]
    async fn test_missing_attributes_rejected() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", format!("/api/states/{ENTITY}").as_str())
            .with_status(200)
            .with_body(sensor_body(json!({"forecast": [310.0]})))
            .create_async()
            .await;

        let client = HomeAssistantClient::new(server.url(), "test_token").unwrap();
        let dir = TempDir::new().unwrap();
        let result = append_from_sensor(&client, dir.path(), ENTITY).await;
        assert!(matches!(result, Err(ScorerError::MissingAttributes(_))));
        assert!(!dir.path().join("mean_forecast.json").exists());
    }
}
