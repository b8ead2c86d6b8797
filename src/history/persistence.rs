//! Where the serialized history lives between sessions.

use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::warn;

use super::HistoryError;

/// Storage for the serialized history blob.
pub trait HistoryBackend {
    /// The stored blob, or `None` if nothing has been stored or it cannot be read.
    fn read_history_blob(&self) -> Option<String>;

    fn write_history_blob(&mut self, blob: &str) -> Result<(), HistoryError>;
}

/// Keeps the history in a JSON file.
#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/calcbox/history.json`, if the platform has a data directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("calcbox").join("history.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryBackend for FileBackend {
    fn read_history_blob(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Some(blob),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %self.path.display(), "failed to read history: {}", err);
                None
            }
        }
    }

    fn write_history_blob(&mut self, blob: &str) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, blob)?;
        Ok(())
    }
}

/// Keeps the blob in memory for the lifetime of the process.
///
/// Clones share the same blob.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    blob: Rc<RefCell<Option<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already stored blob.
    #[cfg(test)]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Rc::new(RefCell::new(Some(blob.into()))),
        }
    }
}

impl HistoryBackend for MemoryBackend {
    fn read_history_blob(&self) -> Option<String> {
        self.blob.borrow().clone()
    }

    fn write_history_blob(&mut self, blob: &str) -> Result<(), HistoryError> {
        *self.blob.borrow_mut() = Some(blob.to_string());
        Ok(())
    }
}
