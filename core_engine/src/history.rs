use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Clock, DAY_MS};
use crate::storage::KeyValueStore;

pub const DEFAULT_HISTORY_KEY: &str = "roulette_wins_v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinEntry {
    pub name: String,
    /// UTC milliseconds.
    pub ts: u64,
}

pub type WinHistory = Vec<WinEntry>;

pub type WinCountMap = HashMap<String, u32>;

/// Aggregation key for a name: trimmed and lower-cased.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Append-only log of winners kept under a single storage key.
///
/// Storage failures never leave this type: reads degrade to an empty
/// history and failed writes are logged.
pub struct HistoryStore {
    backend: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            key: DEFAULT_HISTORY_KEY.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn get_history(&self) -> WinHistory {
        match self.load() {
            Ok(history) => history,
            Err(error) => {
                warn!(key = %self.key, "treating unreadable win history as empty: {error:#}");
                WinHistory::new()
            }
        }
    }

    pub fn add_win(&self, name: &str) {
        // Serializes read-modify-write within this process only.
        let _guard = self.lock_writes();

        let mut history = self.get_history();
        history.push(WinEntry {
            name: name.to_string(),
            ts: self.clock.now_millis(),
        });
        match self.save(&history) {
            Ok(()) => debug!(key = %self.key, winner = name, total = history.len(), "saved winner"),
            Err(error) => warn!(key = %self.key, "failed to persist win history: {error:#}"),
        }
    }

    pub fn reset_history(&self) {
        let _guard = self.lock_writes();
        if let Err(error) = self.backend.remove(&self.key) {
            warn!(key = %self.key, "failed to remove win history: {error:#}");
        }
    }

    /// Wins per normalized name. `window_days <= 0` counts the whole history.
    pub fn build_win_count_map(&self, window_days: i64) -> WinCountMap {
        let cutoff = if window_days > 0 {
            let span = (window_days as u64).saturating_mul(DAY_MS);
            Some(self.clock.now_millis().saturating_sub(span))
        } else {
            None
        };

        let mut counts = WinCountMap::new();
        for entry in self.get_history() {
            if cutoff.is_some_and(|cutoff| entry.ts < cutoff) {
                continue;
            }
            *counts.entry(normalize(&entry.name)).or_insert(0) += 1;
        }
        counts
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self) -> Result<WinHistory> {
        let Some(raw) = self.backend.get(&self.key)? else {
            return Ok(WinHistory::new());
        };
        if raw.trim().is_empty() {
            return Ok(WinHistory::new());
        }
        serde_json::from_str(&raw).context("stored win history is not a valid entry list")
    }

    fn save(&self, history: &WinHistory) -> Result<()> {
        let payload = serde_json::to_string(history)?;
        self.backend.set(&self.key, &payload)
    }
}
