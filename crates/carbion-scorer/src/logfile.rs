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

use crate::ScorerError;
use carbion_types::ForecastLogEntry;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One model's forecast log: a pretty-printed JSON array, append-only in
/// semantics but rewritten whole on save.
///
/// Single-writer: the appender and the scorer are expected to run from the
/// same cron-style scheduler, never concurrently.
#[derive(Debug)]
pub struct ForecastLog {
    path: PathBuf,
    entries: Vec<ForecastLogEntry>,
    dirty: bool,
}

impl ForecastLog {
    /// Load a log file; a missing file is an empty log.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ScorerError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Log file {} does not exist yet", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ForecastLogEntry] {
        &self.entries
    }

    /// Mutable access for the scoring pass; the caller must call
    /// [`mark_dirty`] for changes to reach disk.
    ///
    /// [`mark_dirty`]: ForecastLog::mark_dirty
    pub fn entries_mut(&mut self) -> &mut [ForecastLogEntry] {
        &mut self.entries
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn append(&mut self, entry: ForecastLogEntry) {
        self.entries.push(entry);
        self.dirty = true;
    }

    /// Write the whole file back, pretty-printed, only if something changed.
    /// Returns whether a write happened.
    pub fn save(&mut self) -> Result<bool, ScorerError> {
        if !self.dirty {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, raw)?;
        self.dirty = false;
        Ok(true)
    }
}
