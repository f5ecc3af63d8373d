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

//! Core forecast orchestration: request validation, model fan-out, response
//! assembly, and the background forecast cycle that keeps per-model
//! snapshots fresh.

pub mod cycle;
pub mod error;
pub mod service;
pub mod snapshot;

pub use cycle::{ForecastCycle, HistorySource};
pub use error::ServiceError;
pub use service::ForecastService;
pub use snapshot::{ForecastSnapshot, SnapshotStore};
