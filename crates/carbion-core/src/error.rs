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

use carbion_models::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed request; rejected before any model runs.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A model failed to fit or predict; the whole request fails.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Home Assistant unreachable or returned a non-success status.
    #[error("Upstream unavailable: {0}")]
    Upstream(String),
}
