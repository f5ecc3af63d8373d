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

use crate::errors::{HaError, HaResult};
use crate::types::{HaEntityState, HaHistoryState};
use async_trait::async_trait;
use carbion_core::HistorySource;
use carbion_types::{TimeSeriesPoint, parse_timestamp};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Token strings that mean "the user never configured one".
const PLACEHOLDER_TOKENS: &[&str] = &["your_token_here", "changeme", "replace_me", "token"];

fn is_placeholder_token(token: &str) -> bool {
    let token = token.trim();
    token.is_empty()
        || token.contains("placeholder")
        || PLACEHOLDER_TOKENS
            .iter()
            .any(|p| token.eq_ignore_ascii_case(p))
}

/// Home Assistant REST API client
#[derive(Clone)]
pub struct HomeAssistantClient {
    base_url: String,
    token: String,
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl std::fmt::Debug for HomeAssistantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeAssistantClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HomeAssistantClient {
    /// Create a new HA client with custom configuration.
    ///
    /// Rejects unset or placeholder tokens before any network call.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> HaResult<Self> {
        let token = token.into();
        if is_placeholder_token(&token) {
            return Err(HaError::ConfigError(
                "HA token is unset or still a placeholder".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| HaError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            token,
            client,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        })
    }

    /// Create HA client using Supervisor API environment variables
    /// This is the standard method for HA addons
    pub fn from_supervisor() -> HaResult<Self> {
        let base_url = "http://supervisor/core";
        let token = std::env::var("SUPERVISOR_TOKEN").map_err(|_| {
            HaError::ConfigError(
                "SUPERVISOR_TOKEN environment variable not set. Are you running as an HA addon?"
                    .to_string(),
            )
        })?;

        info!("Initializing HA client using Supervisor API");
        Self::new(base_url, token)
    }

    /// Create HA client from configuration values
    /// Falls back to environment variables if config values are not set
    pub fn from_config(ha_base_url: Option<String>, ha_token: Option<String>) -> HaResult<Self> {
        let base_url = ha_base_url
            .or_else(|| std::env::var("HA_BASE_URL").ok())
            .unwrap_or_else(|| "http://localhost:8123".to_string());

        let token = ha_token
            .or_else(|| std::env::var("HA_TOKEN").ok())
            .ok_or_else(|| {
                HaError::ConfigError(
                    "HA token not found in config or HA_TOKEN environment variable".to_string(),
                )
            })?;

        info!("Initializing HA client from configuration: {}", base_url);
        Self::new(base_url, token)
    }

    /// Get the state of a specific entity
    pub async fn get_state(&self, entity_id: &str) -> HaResult<HaEntityState> {
        let url = format!("{}/api/states/{}", self.base_url, entity_id);
        debug!("🔍 [HA QUERY] Getting state for entity: {}", entity_id);
        debug!("   URL: {}", url);

        let response = self
            .retry_request(|| async { self.client.get(&url).bearer_auth(&self.token).send().await })
            .await?;

        match response.status() {
            StatusCode::OK => {
                let state = response.json::<HaEntityState>().await?;
                debug!("✅ [HA RESULT] Entity: {} = '{}'", entity_id, state.state);
                trace!("   Attributes: {:?}", state.attributes);
                Ok(state)
            }
            StatusCode::NOT_FOUND => {
                error!("❌ [HA ERROR] Entity not found: {}", entity_id);
                Err(HaError::EntityNotFound(entity_id.to_string()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!(
                    "❌ [HA ERROR] Authentication failed for entity: {}",
                    entity_id
                );
                Err(HaError::AuthenticationFailed)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("❌ [HA ERROR] Status {}: {}", status, error_text);
                Err(HaError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    /// Get numeric history for a sensor entity over `[start_time, end_time]`.
    ///
    /// Non-numeric states (`unknown`, `unavailable`, garbage) and rows with
    /// unparseable timestamps are dropped; only the drop count is reported.
    pub async fn get_history(
        &self,
        entity_id: &str,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
    ) -> HaResult<Vec<TimeSeriesPoint>> {
        let end = end_time.unwrap_or_else(Utc::now);

        // HA history API expects ISO 8601 timestamps
        // Format: /api/history/period/{start}?filter_entity_id={entity}&end_time={end}
        let start_str = start_time.to_rfc3339();
        let end_str = end.to_rfc3339();
        let end_encoded = urlencoding::encode(&end_str);

        let url = format!(
            "{}/api/history/period/{}?filter_entity_id={}&end_time={}",
            self.base_url, start_str, entity_id, end_encoded
        );

        debug!("📊 [HA HISTORY] Fetching history for: {}", entity_id);
        debug!("   Time range: {} to {}", start_str, end_str);

        let response = self
            .retry_request(|| async { self.client.get(&url).bearer_auth(&self.token).send().await })
            .await?;

        match response.status() {
            StatusCode::OK => {
                // HA returns an array of arrays, one inner array per entity
                let history: Vec<Vec<HaHistoryState>> = response.json().await?;

                let Some(entity_history) = history.first() else {
                    debug!("⚠️ [HA HISTORY] No history data returned for {}", entity_id);
                    return Ok(Vec::new());
                };

                let mut points = Vec::new();
                let mut skipped = 0_usize;
                for row in entity_history {
                    let value: Option<f64> = match row.state.as_str() {
                        "unknown" | "unavailable" => None,
                        raw => raw.trim().parse().ok(),
                    };
                    let timestamp = row.timestamp_str().and_then(parse_timestamp);
                    match (value, timestamp) {
                        (Some(value), Some(timestamp)) => {
                            points.push(TimeSeriesPoint::new(timestamp, value));
                        }
                        _ => skipped += 1,
                    }
                }
                if skipped > 0 {
                    warn!(
                        "⚠️ [HA HISTORY] Dropped {} non-numeric/unparseable states for {}",
                        skipped, entity_id
                    );
                }

                info!(
                    "✅ [HA HISTORY] Retrieved {} data points for {}",
                    points.len(),
                    entity_id
                );
                Ok(points)
            }
            StatusCode::NOT_FOUND => {
                error!("❌ [HA HISTORY] Entity not found: {}", entity_id);
                Err(HaError::EntityNotFound(entity_id.to_string()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("❌ [HA HISTORY] Authentication failed for: {}", entity_id);
                Err(HaError::AuthenticationFailed)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("❌ [HA HISTORY] Status {}: {}", status, error_text);
                Err(HaError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut>(&self, mut request_fn: F) -> HaResult<reqwest::Response>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            attempts += 1;
            match request_fn().await {
                Ok(response) => return Ok(response),
                Err(e) if attempts >= self.max_retries => {
                    error!("Request failed after {} attempts: {}", attempts, e);
                    return Err(HaError::HttpError(e));
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempts, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2; // Exponential backoff
                }
            }
        }
    }

    /// Set custom retry configuration
    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }
}

#[async_trait]
impl HistorySource for HomeAssistantClient {
    async fn history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<TimeSeriesPoint>> {
        Ok(self.get_history(entity_id, start, Some(end)).await?)
    }
}
