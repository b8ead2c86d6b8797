//! Bounded, persisted log of completed calculations.

mod persistence;
mod store;

pub use persistence::{FileBackend, HistoryBackend, MemoryBackend};
pub use store::{HISTORY_CAPACITY, HistoryEntry, HistoryStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history storage failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid timestamp '{0}' in stored history")]
    InvalidTimestamp(String),
}
