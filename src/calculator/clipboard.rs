//! Clipboard functionality for copying calculator results.

use arboard::Clipboard;
use tracing::{debug, warn};

/// Destination for copied history results.
///
/// Copying is fire-and-forget: implementations report their own failures.
pub trait ClipboardSink {
    fn set_clipboard(&mut self, text: &str);
}

/// Copy text to the system clipboard.
///
/// Returns `Ok(())` on success, or an error message on failure.
pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let mut clipboard =
        Clipboard::new().map_err(|e| format!("Failed to access clipboard: {}", e))?;

    clipboard
        .set_text(text.to_string())
        .map_err(|e| format!("Failed to copy to clipboard: {}", e))
}

/// The desktop clipboard.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_clipboard(&mut self, text: &str) {
        match copy_to_clipboard(text) {
            Ok(()) => debug!(text, "copied to clipboard"),
            Err(err) => warn!("{}", err),
        }
    }
}

/// Used when clipboard access is disabled in the configuration.
#[derive(Debug, Default)]
pub struct DisabledClipboard;

impl ClipboardSink for DisabledClipboard {
    fn set_clipboard(&mut self, text: &str) {
        debug!(text, "clipboard disabled, dropping copy request");
    }
}
