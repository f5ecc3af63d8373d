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

//! Cron-style CLI for the forecast log: append current forecasts, score
//! elapsed ones.

use anyhow::{Context, Result};
use carbion_scorer::entities::FORECAST_ENTITIES;
use carbion_scorer::{ForecastLog, Scorer, append_from_sensor, log_filename};
use carbion_ha::HomeAssistantClient;
use carbion_types::AppConfig;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "carbion-scorer", about = "CarbION forecast log maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append the current forecast of one (or every) forecast sensor to its log
    Append {
        /// Forecast sensor entity; all tracked sensors when omitted
        entity_id: Option<String>,
    },
    /// Score every eligible log entry against realized history
    Score {
        /// Forecast sensor entity; all tracked sensors when omitted
        entity_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let client = HomeAssistantClient::from_supervisor().or_else(|_| {
        HomeAssistantClient::from_config(
            config.system.ha_base_url.clone(),
            config.system.ha_token.clone(),
        )
    })?;

    let entities = |requested: Option<String>| -> Vec<String> {
        match requested {
            Some(entity) => vec![entity],
            None => FORECAST_ENTITIES
                .iter()
                .map(|(entity, _)| (*entity).to_owned())
                .collect(),
        }
    };

    match cli.command {
        Command::Append { entity_id } => {
            for entity in entities(entity_id) {
                if let Err(e) = append_from_sensor(&client, &config.scoring.log_dir, &entity).await
                {
                    warn!("Append failed for {entity}: {e}");
                }
            }
        }
        Command::Score { entity_id } => {
            let scorer = Scorer::new(
                Arc::new(client),
                Duration::minutes(config.scoring.tolerance_minutes),
                Duration::minutes(config.scoring.window_slack_minutes),
            );
            let now = Utc::now();
            for entity in entities(entity_id) {
                let Some(filename) = log_filename(&entity) else {
                    warn!("No log file mapping for {entity}, skipping");
                    continue;
                };
                let path = config.scoring.log_dir.join(filename);
                if !path.exists() {
                    info!("No log yet for {entity}, skipping");
                    continue;
                }
                let mut log = ForecastLog::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?;
                let summary = scorer
                    .score_log(&mut log, &config.scoring.realized_entity, now)
                    .await?;
                let written = log.save()?;
                info!(
                    entity = %entity,
                    scored = summary.scored,
                    unscorable = summary.unscorable,
                    pending = summary.pending,
                    written,
                    "Scoring pass complete"
                );
            }
        }
    }

    Ok(())
}
