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

//! HTTP surface: the prediction endpoint plus health and snapshot routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use carbion_core::{ForecastService, ServiceError, SnapshotStore};
use carbion_types::{ErrorResponse, PredictRequest};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

/// Application state for web handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: ForecastService,
    pub snapshots: SnapshotStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/health", get(health_handler))
        .route("/snapshots", get(snapshots_handler))
        .layer(CorsLayer::permissive()) // Allow HA Ingress
        .with_state(state)
}

/// Start the web server
///
/// # Errors
/// Returns error if server fails to bind or serve
pub async fn start_web_server(
    state: AppState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    info!("🌐 Starting prediction server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `POST /predict` — run the full model fan-out over the posted history.
///
/// Model fitting is synchronous CPU work, so it runs on a blocking thread.
async fn predict_handler(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Response {
    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        service.predict_rows(&request.data, request.periods, &request.freq)
    })
    .await;

    match outcome {
        Ok(Ok(result)) => Json(result.to_wire()).into_response(),
        Ok(Err(e)) => {
            let status = match &e {
                ServiceError::InvalidInput(_) => {
                    warn!("Rejected prediction request: {e}");
                    StatusCode::BAD_REQUEST
                }
                ServiceError::Model(_) | ServiceError::Upstream(_) => {
                    error!("Prediction failed: {e}");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            error_response(status, e.to_string())
        }
        Err(e) => {
            error!("Prediction task panicked: {e}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal forecast failure".to_owned(),
            )
        }
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// Health check endpoint
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Latest per-model snapshots from the background forecast cycle.
async fn snapshots_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.snapshots.all())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use carbion_types::PredictResponse;
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::America::Santiago;
    use serde_json::json;
    use tower::util::ServiceExt;

    fn app() -> Router {
        router(AppState {
            service: ForecastService::new(Santiago, vec![(9, 18)]),
            snapshots: SnapshotStore::new(),
        })
    }

    fn predict_body(hours: usize, periods: usize) -> String {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let data: Vec<_> = (0..hours)
            .map(|i| {
                let ts = start + Duration::hours(i as i64);
                let value = 300.0 + 50.0 * (std::f64::consts::TAU * i as f64 / 24.0).sin();
                json!({"ds": ts.format("%Y-%m-%dT%H:%M:%S").to_string(), "y": value})
            })
            .collect();
        json!({"data": data, "periods": periods, "freq": "h"}).to_string()
    }

    async fn post_predict(body: String) -> (StatusCode, Vec<u8>) {
        let response = app()
            .oneshot(
                Request::post("/predict")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_predict_success() {
        let (status, body) = post_predict(predict_body(336, 24)).await;
        assert_eq!(status, StatusCode::OK);

        let response: PredictResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.dates.len(), 24);
        for key in [
            "persistence",
            "mean",
            "median",
            "seasonal",
            "seasonal_lower",
            "seasonal_upper",
            "mstl",
            "mstl_lower",
            "mstl_upper",
        ] {
            assert_eq!(response.series[key].len(), 24, "{key}");
        }
    }

    #[tokio::test]
    async fn test_predict_invalid_input_is_400_with_error_body() {
        let body = json!({
            "data": [{"ds": "not a date", "y": 1.0}],
            "periods": 24
        })
        .to_string();
        let (status, body) = post_predict(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(error.error.contains("unparseable timestamp"));
    }

    #[tokio::test]
    async fn test_predict_model_failure_is_500() {
        // Too little history for the seasonal adapter
        let (status, body) = post_predict(predict_body(24, 24)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(error.error.contains("Insufficient history"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_snapshots_empty() {
        let response = app()
            .oneshot(Request::get("/snapshots").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"[]");
    }
}
