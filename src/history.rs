//! Bounded per-mode match history.
//!
//! Entries are kept newest first and capped at [`MAX_HISTORY`]. The stored
//! JSON layout is `{date, winner, playerHits, pcHits, duration}` with the
//! winner written as `"Jugador"` or `"PC"`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::common::Side;
use crate::config::MAX_HISTORY;

/// Summary of one finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: String,
    pub winner: Side,
    pub player_hits: u32,
    #[serde(rename = "pcHits")]
    pub opponent_hits: u32,
    #[serde(rename = "duration")]
    pub duration_secs: u64,
}

/// Persistence for match histories, keyed by mode.
pub trait HistoryStore {
    /// Entries stored under `key`, newest first. Missing keys are empty.
    fn load(&self, key: &str) -> anyhow::Result<Vec<HistoryEntry>>;

    /// Replace the entries stored under `key`.
    fn save(&mut self, key: &str, entries: &[HistoryEntry]) -> anyhow::Result<()>;
}

impl<S: HistoryStore + ?Sized> HistoryStore for Box<S> {
    fn load(&self, key: &str) -> anyhow::Result<Vec<HistoryEntry>> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, entries: &[HistoryEntry]) -> anyhow::Result<()> {
        (**self).save(key, entries)
    }
}

/// Prepend `entry` to the history under `key`, keep the newest
/// [`MAX_HISTORY`] entries and save. Returns the stored list.
pub fn record_match<S: HistoryStore + ?Sized>(
    store: &mut S,
    key: &str,
    entry: HistoryEntry,
) -> anyhow::Result<Vec<HistoryEntry>> {
    let mut entries = store.load(key)?;
    entries.insert(0, entry);
    entries.truncate(MAX_HISTORY);
    store.save(key, &entries)?;
    Ok(entries)
}

/// In-process store, used by tests and automatic matches.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    entries: HashMap<String, Vec<HistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self, key: &str) -> anyhow::Result<Vec<HistoryEntry>> {
        Ok(self.entries.get(key).cloned().unwrap_or_default())
    }

    fn save(&mut self, key: &str, entries: &[HistoryEntry]) -> anyhow::Result<()> {
        self.entries.insert(key.to_owned(), entries.to_vec());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileHistoryStore {
    dir: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn load(&self, key: &str) -> anyhow::Result<Vec<HistoryEntry>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("failed to read history file {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("failed to parse history file {}", path.display()))
    }

    fn save(&mut self, key: &str, entries: &[HistoryEntry]) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.path(key);
        let json = serde_json::to_string_pretty(entries).context("failed to serialize history")?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write history file {}", path.display()))
    }
}

/// Days since 1970-01-01 to a proleptic Gregorian `(year, month, day)`.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Format seconds since the Unix epoch (UTC) as `d/m/yyyy, H:MM:SS`.
pub fn format_timestamp(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{}/{}/{}, {}:{:02}:{:02}",
        day,
        month,
        year,
        rem / 3_600,
        (rem % 3_600) / 60,
        rem % 60
    )
}

/// Current wall-clock time formatted with [`format_timestamp`].
pub fn now_string() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format_timestamp(secs)
}
