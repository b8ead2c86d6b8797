use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{HistoryBackend, HistoryError};

/// Maximum number of retained entries.
pub const HISTORY_CAPACITY: usize = 10;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A completed calculation. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 1-based sequence number, never reused within a session.
    pub index: u64,
    /// Creation time as `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    /// The expression exactly as it was typed.
    pub expression: String,
    /// The formatted result.
    pub result: String,
}

/// Insertion-ordered history with fixed capacity.
///
/// Every mutation is written through to the backend. Write failures are
/// logged and otherwise ignored.
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    next_index: u64,
    backend: Box<dyn HistoryBackend>,
}

impl HistoryStore {
    /// Restore the history from the backend.
    ///
    /// Absent or malformed data yields an empty history.
    pub fn load(backend: impl HistoryBackend + 'static) -> Self {
        let mut entries = match backend.read_history_blob() {
            Some(blob) => decode(&blob).unwrap_or_else(|err| {
                warn!("discarding stored history: {}", err);
                Vec::new()
            }),
            None => Vec::new(),
        };

        if entries.len() > HISTORY_CAPACITY {
            entries.drain(..entries.len() - HISTORY_CAPACITY);
        }

        let highest = entries.iter().map(|e| e.index).max().unwrap_or(0);
        let next_index = match highest.checked_add(1) {
            Some(next) => next,
            None => {
                warn!("discarding stored history: entry index out of range");
                entries.clear();
                1
            }
        };
        debug!(count = entries.len(), next_index, "loaded history");

        Self {
            entries,
            next_index,
            backend: Box::new(backend),
        }
    }

    /// Record a calculation stamped with the current local time.
    pub fn append(&mut self, expression: &str, result: &str) -> HistoryEntry {
        self.append_at(expression, result, Local::now().naive_local())
    }

    /// Record a calculation stamped with `at`, evicting the oldest entry when full.
    pub fn append_at(
        &mut self,
        expression: &str,
        result: &str,
        at: NaiveDateTime,
    ) -> HistoryEntry {
        if self.entries.len() >= HISTORY_CAPACITY {
            let evicted = self.entries.remove(0);
            debug!(index = evicted.index, "evicted oldest history entry");
        }

        let entry = HistoryEntry {
            index: self.next_index,
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            expression: expression.to_string(),
            result: result.to_string(),
        };
        self.next_index = self.next_index.saturating_add(1);
        self.entries.push(entry.clone());
        debug!(index = entry.index, expression, result, "appended history entry");

        self.persist();
        entry
    }

    /// Remove the entry at `position` in insertion order.
    ///
    /// Out-of-range positions are ignored. Remaining entries keep their indices.
    pub fn delete(&mut self, position: usize) -> Option<HistoryEntry> {
        if position >= self.entries.len() {
            debug!(position, len = self.entries.len(), "ignoring out-of-range delete");
            return None;
        }

        let removed = self.entries.remove(position);
        debug!(index = removed.index, position, "deleted history entry");
        self.persist();
        Some(removed)
    }

    /// Entries in insertion order, oldest first.
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&HistoryEntry> {
        self.entries.get(position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&mut self) {
        let result = encode(&self.entries)
            .and_then(|blob| self.backend.write_history_blob(&blob));
        if let Err(err) = result {
            warn!("failed to save history: {}", err);
        }
    }
}

/// Serialize entries to the stored JSON form.
pub fn encode(entries: &[HistoryEntry]) -> Result<String, HistoryError> {
    Ok(serde_json::to_string(entries)?)
}

/// Parse the stored JSON form, rejecting entries with malformed timestamps.
pub fn decode(blob: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
    let entries: Vec<HistoryEntry> = serde_json::from_str(blob)?;
    for entry in &entries {
        if NaiveDateTime::parse_from_str(&entry.timestamp, TIMESTAMP_FORMAT).is_err() {
            return Err(HistoryError::InvalidTimestamp(entry.timestamp.clone()));
        }
    }
    Ok(entries)
}
