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

//! Single-pass scoring over one forecast log.

use crate::ScorerError;
use crate::logfile::ForecastLog;
use crate::mape::{mape, match_pairs};
use carbion_core::HistorySource;
use carbion_types::{ScoreState, parse_timestamp};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    pub scored: usize,
    pub unscorable: usize,
    pub pending: usize,
}

/// Attaches MAPE scores to eligible log entries.
pub struct Scorer {
    source: Arc<dyn HistorySource>,
    tolerance: Duration,
    window_slack: Duration,
}

impl std::fmt::Debug for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorer")
            .field("tolerance", &self.tolerance)
            .field("window_slack", &self.window_slack)
            .finish_non_exhaustive()
    }
}

impl Scorer {
    pub fn new(source: Arc<dyn HistorySource>, tolerance: Duration, window_slack: Duration) -> Self {
        Self {
            source,
            tolerance,
            window_slack,
        }
    }

    /// Score every eligible entry in the log against realized history for
    /// `realized_entity`.
    ///
    /// Terminal entries (scored or unscorable) are never touched again, so
    /// re-runs are idempotent. A failed realized-history fetch leaves the
    /// entry pending for the next run; a successful fetch that yields no
    /// matching pair marks it unscorable for good.
    pub async fn score_log(
        &self,
        log: &mut ForecastLog,
        realized_entity: &str,
        now: DateTime<Utc>,
    ) -> Result<ScoreSummary, ScorerError> {
        let mut summary = ScoreSummary::default();
        let mut changed = false;

        let eligible: Vec<usize> = log
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.score_state(now) == ScoreState::Eligible)
            .map(|(i, _)| i)
            .collect();
        summary.pending = log
            .entries()
            .iter()
            .filter(|e| e.score_state(now) == ScoreState::Pending)
            .count();

        for i in eligible {
            let entry = &log.entries()[i];
            // Eligibility implies both bounds parse
            let (Some(first), Some(last)) = (entry.first_timestamp(), entry.last_timestamp())
            else {
                summary.pending += 1;
                continue;
            };

            let realized = match self
                .source
                .history(realized_entity, first, last + self.window_slack)
                .await
            {
                Ok(realized) => realized,
                Err(e) => {
                    warn!("Realized history fetch failed, entry stays pending: {e}");
                    summary.pending += 1;
                    continue;
                }
            };

            let forecast_times: Vec<DateTime<Utc>> = entry
                .forecast_timestamps
                .iter()
                .filter_map(|s| parse_timestamp(s))
                .collect();
            let pairs = match_pairs(&entry.forecast, &forecast_times, &realized, self.tolerance);
            let score = mape(&pairs);

            match score {
                Some(value) => {
                    info!(
                        logged_at = %entry.logged_at,
                        pairs = pairs.len(),
                        mape = value,
                        "Scored forecast entry"
                    );
                    summary.scored += 1;
                }
                None => {
                    info!(
                        logged_at = %entry.logged_at,
                        "No scorable realized data, marking entry unscorable"
                    );
                    summary.unscorable += 1;
                }
            }
            log.entries_mut()[i].set_mape(score);
            changed = true;
        }

        if changed {
            log.mark_dirty();
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use carbion_types::{ForecastLogEntry, TimeSeriesPoint};
    use chrono::TimeZone;
    use tempfile::TempDir;

    struct FakeSource {
        realized: Result<Vec<TimeSeriesPoint>, String>,
    }

    #[async_trait]
    impl HistorySource for FakeSource {
        async fn history(
            &self,
            _entity_id: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> anyhow::Result<Vec<TimeSeriesPoint>> {
            self.realized
                .clone()
                .map_err(|e| anyhow::anyhow!("{e}"))
        }
    }

    fn scorer(realized: Result<Vec<TimeSeriesPoint>, String>) -> Scorer {
        Scorer::new(
            Arc::new(FakeSource { realized }),
            Duration::minutes(15),
            Duration::minutes(30),
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    fn elapsed_entry() -> ForecastLogEntry {
        ForecastLogEntry::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            vec![90.0, 60.0],
            vec![
                "2025-06-01 01:00:00".to_owned(),
                "2025-06-01 02:00:00".to_owned(),
            ],
        )
    }

    fn log_with(dir: &TempDir, entries: Vec<ForecastLogEntry>) -> ForecastLog {
        let mut log = ForecastLog::load(dir.path().join("mean_forecast.json")).unwrap();
        for e in entries {
            log.append(e);
        }
        log.save().unwrap();
        log
    }

    #[tokio::test]
    async fn test_scores_eligible_entry() {
        let dir = TempDir::new().unwrap();
        let mut log = log_with(&dir, vec![elapsed_entry()]);

        // Realized 100 at 01:00 and 50 at 02:05 → pairs (100,90),(50,60) → 15.0
        let realized = vec![
            TimeSeriesPoint::new(Utc.with_ymd_and_hms(2025, 6, 1, 1, 0, 0).unwrap(), 100.0),
            TimeSeriesPoint::new(Utc.with_ymd_and_hms(2025, 6, 1, 2, 5, 0).unwrap(), 50.0),
        ];
        let summary = scorer(Ok(realized))
            .score_log(&mut log, "sensor.co2", now())
            .await
            .unwrap();

        assert_eq!(summary.scored, 1);
        assert!(log.save().unwrap());
        let mape = log.entries()[0].mape.unwrap().unwrap();
        assert!((mape - 15.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut log = log_with(&dir, vec![elapsed_entry()]);
        let realized = vec![TimeSeriesPoint::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 1, 0, 0).unwrap(),
            100.0,
        )];

        let s = scorer(Ok(realized.clone()));
        s.score_log(&mut log, "sensor.co2", now()).await.unwrap();
        assert!(log.save().unwrap());

        let summary = s.score_log(&mut log, "sensor.co2", now()).await.unwrap();
        assert_eq!(summary.scored, 0);
        assert!(!log.save().unwrap());
    }

    #[tokio::test]
    async fn test_future_entry_stays_pending() {
        let dir = TempDir::new().unwrap();
        let future = ForecastLogEntry::new(
            now(),
            vec![90.0],
            vec!["2025-06-03 01:00:00".to_owned()],
        );
        let mut log = log_with(&dir, vec![future]);

        let summary = scorer(Ok(vec![]))
            .score_log(&mut log, "sensor.co2", now())
            .await
            .unwrap();
        assert_eq!(summary.pending, 1);
        assert_eq!(log.entries()[0].mape, None);
        assert!(!log.save().unwrap());
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_entry_pending() {
        let dir = TempDir::new().unwrap();
        let mut log = log_with(&dir, vec![elapsed_entry()]);

        let summary = scorer(Err("connection refused".to_owned()))
            .score_log(&mut log, "sensor.co2", now())
            .await
            .unwrap();
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.scored + summary.unscorable, 0);
        assert_eq!(log.entries()[0].mape, None);
    }

    #[tokio::test]
    async fn test_empty_realized_marks_unscorable() {
        let dir = TempDir::new().unwrap();
        let mut log = log_with(&dir, vec![elapsed_entry()]);

        let summary = scorer(Ok(vec![]))
            .score_log(&mut log, "sensor.co2", now())
            .await
            .unwrap();
        assert_eq!(summary.unscorable, 1);
        assert_eq!(log.entries()[0].mape, Some(None));
    }

    #[tokio::test]
    async fn test_all_zero_realized_marks_unscorable() {
        let dir = TempDir::new().unwrap();
        let mut log = log_with(&dir, vec![elapsed_entry()]);

        let realized = vec![
            TimeSeriesPoint::new(Utc.with_ymd_and_hms(2025, 6, 1, 1, 0, 0).unwrap(), 0.0),
            TimeSeriesPoint::new(Utc.with_ymd_and_hms(2025, 6, 1, 2, 0, 0).unwrap(), 0.0),
        ];
        let summary = scorer(Ok(realized))
            .score_log(&mut log, "sensor.co2", now())
            .await
            .unwrap();
        assert_eq!(summary.unscorable, 1);
        assert_eq!(log.entries()[0].mape, Some(None));
    }
}
