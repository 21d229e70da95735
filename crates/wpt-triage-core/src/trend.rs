//! `data.csv`: one row of aggregate counts per day.
//!
//! Rows are keyed by their first field. Upserting replaces a day's row in
//! place; every other row, the header included, is kept verbatim and in
//! order.

use std::path::Path;

use tracing::debug;

use crate::domain::Result;
use crate::report::ReportCounts;

pub const HEADER: &str = "date,in4,in3,in2,flakyOnly,slowOnly,timeoutOnly,disabledOnly";

/// One day's counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendEntry {
    pub date: String,
    pub counts: [usize; 7],
}

impl TrendEntry {
    pub fn new(date: impl Into<String>, counts: &ReportCounts) -> Self {
        Self {
            date: date.into(),
            counts: counts.as_row(),
        }
    }

    fn values(&self) -> String {
        self.counts
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Ordered day-keyed rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendLog {
    /// `(key, everything after the first comma)`.
    rows: Vec<(String, String)>,
}

impl Default for TrendLog {
    fn default() -> Self {
        Self::parse(HEADER)
    }
}

impl TrendLog {
    /// Parse file contents. Blank lines are dropped.
    pub fn parse(text: &str) -> Self {
        let rows = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| match line.split_once(',') {
                Some((key, values)) => (key.to_string(), values.to_string()),
                None => (line.to_string(), String::new()),
            })
            .collect();
        Self { rows }
    }

    /// Load from disk; a missing file starts a new log with the header row.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no trend log yet, starting fresh");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values recorded for `key`, without the key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or overwrite the row for `entry.date`.
    pub fn upsert(&mut self, entry: &TrendEntry) {
        let values = entry.values();
        match self.rows.iter_mut().find(|(k, _)| *k == entry.date) {
            Some((_, existing)) => *existing = values,
            None => self.rows.push((entry.date.clone(), values)),
        }
    }

    /// Serialise as one line per row, newline-terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, values) in &self.rows {
            out.push_str(key);
            if !values.is_empty() {
                out.push(',');
                out.push_str(values);
            }
            out.push('\n');
        }
        out
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render())?;
        Ok(())
    }
}

/// Load, upsert `entry`, and write back.
pub fn update_trend(path: &Path, entry: &TrendEntry) -> Result<TrendLog> {
    let mut log = TrendLog::load(path)?;
    log.upsert(entry);
    log.save(path)?;
    Ok(log)
}
