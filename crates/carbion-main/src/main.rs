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

//! CarbION server binary: CO2 intensity forecasting for Home Assistant.

use anyhow::{Context, Result};
use carbion_core::{ForecastCycle, ForecastService, SnapshotStore};
use carbion_ha::HomeAssistantClient;
use carbion_types::{AppConfig, parse_freq};
use carbion_web::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with env filter support
    // Respects RUST_LOG environment variable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    info!("🌱 Starting CarbION v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    let tz = config.forecast.tz()?;
    let holidays = config.forecast.holiday_days()?;
    let step = parse_freq(&config.forecast.freq)
        .context("forecast.freq was validated but did not parse")?;

    let service = ForecastService::new(tz, holidays);
    let snapshots = SnapshotStore::new();

    if config.forecast.enable_cycle {
        let client = HomeAssistantClient::from_supervisor().or_else(|e| {
            warn!("Supervisor API unavailable ({e}), falling back to configuration");
            HomeAssistantClient::from_config(
                config.system.ha_base_url.clone(),
                config.system.ha_token.clone(),
            )
        })?;

        let cycle = ForecastCycle::new(
            Arc::new(client),
            service.clone(),
            snapshots.clone(),
            config.forecast.input_entity.clone(),
            config.forecast.horizon,
            step,
            config.forecast.history_days,
        );
        let interval = Duration::from_secs(config.system.update_interval_secs);
        info!(
            entity = %config.forecast.input_entity,
            interval_secs = config.system.update_interval_secs,
            "Forecast cycle enabled"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = cycle.run_once().await {
                    error!("Forecast cycle failed: {e}");
                }
            }
        });
    } else {
        info!("Forecast cycle disabled, serving /predict only");
    }

    let state = AppState { service, snapshots };
    carbion_web::start_web_server(state, config.system.port)
        .await
        .map_err(|e| anyhow::anyhow!("web server failed: {e}"))?;

    Ok(())
}
