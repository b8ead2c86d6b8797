//! Turns user intents into buffer, evaluator and history operations and
//! produces the state the presentation renders.

use tracing::{debug, info};

use crate::buffer::{ExpressionBuffer, Shortcut, Token};
use crate::calculator::{ClipboardSink, EvaluationOutcome, Evaluator};
use crate::history::{HistoryEntry, HistoryStore};

/// Result text shown when nothing has been entered.
pub const DEFAULT_RESULT: &str = "0";

/// A discrete user action forwarded by the presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Append(Token),
    Shortcut(Shortcut),
    Backspace,
    ClearEntry,
    ClearAll,
    Evaluate,
    ToggleHistory,
    /// Delete by display position (0 = most recent).
    DeleteHistory(usize),
    /// Copy a result by display position (0 = most recent).
    CopyHistory(usize),
}

/// Everything the presentation needs to draw the calculator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub expression: String,
    pub result: String,
    /// The result line holds an error message.
    pub is_error: bool,
    /// Most recent first.
    pub history: Vec<HistoryEntry>,
    pub history_visible: bool,
    /// One-shot message for the last intent, such as a copy confirmation.
    pub notice: Option<String>,
}

/// Owns the session state and processes one intent at a time.
pub struct Controller {
    buffer: ExpressionBuffer,
    evaluator: Evaluator,
    history: HistoryStore,
    clipboard: Box<dyn ClipboardSink>,
    result: String,
    is_error: bool,
    history_visible: bool,
    notice: Option<String>,
}

impl Controller {
    /// Start a session with an empty expression and an already loaded history.
    pub fn new(history: HistoryStore, clipboard: impl ClipboardSink + 'static) -> Self {
        Self {
            buffer: ExpressionBuffer::new(),
            evaluator: Evaluator::new(),
            history,
            clipboard: Box::new(clipboard),
            result: DEFAULT_RESULT.to_string(),
            is_error: false,
            history_visible: false,
            notice: None,
        }
    }

    /// Set whether the history panel is shown at session start.
    pub fn with_history_visible(mut self, visible: bool) -> Self {
        self.history_visible = visible;
        self
    }

    #[cfg(test)]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Process one intent to completion and return the resulting state.
    pub fn handle(&mut self, intent: Intent) -> Snapshot {
        debug!(?intent, "handling intent");
        self.notice = None;

        match intent {
            Intent::Append(token) => {
                if self.buffer.append(token) {
                    self.refresh_preview();
                }
            }
            Intent::Shortcut(shortcut) => {
                if self.buffer.apply(shortcut) {
                    self.refresh_preview();
                }
            }
            Intent::Backspace => {
                if self.buffer.backspace() {
                    self.refresh_preview();
                }
            }
            Intent::ClearEntry => {
                self.buffer.clear_entry();
                self.refresh_preview();
            }
            Intent::ClearAll => {
                self.buffer.clear_all();
                self.reset_result();
            }
            Intent::Evaluate => self.evaluate(),
            Intent::ToggleHistory => self.history_visible = !self.history_visible,
            Intent::DeleteHistory(position) => {
                if let Some(stored) = self.stored_position(position) {
                    self.history.delete(stored);
                }
            }
            Intent::CopyHistory(position) => self.copy(position),
        }

        self.snapshot()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            expression: self.buffer.text().to_string(),
            result: self.result.clone(),
            is_error: self.is_error,
            history: self.history.list().iter().rev().cloned().collect(),
            history_visible: self.history_visible,
            notice: self.notice.clone(),
        }
    }

    fn evaluate(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let expression = self.buffer.take();
        match self.evaluator.evaluate(&expression) {
            EvaluationOutcome::Invalid(reason) => {
                self.result = format!("Error: {}", reason);
                self.is_error = true;
            }
            outcome => {
                let formatted = outcome.formatted().unwrap_or_default();
                if formatted != DEFAULT_RESULT {
                    self.history.append(&expression, &formatted);
                }
                info!(expression = %expression, result = %formatted, "calculated");
                self.result = formatted;
                self.is_error = false;
            }
        }
    }

    /// Show the live preview of the pending expression, or echo the raw text
    /// when it does not evaluate yet.
    fn refresh_preview(&mut self) {
        if self.buffer.is_empty() {
            self.reset_result();
            return;
        }

        self.result = self
            .evaluator
            .preview(self.buffer.text())
            .formatted()
            .unwrap_or_else(|| self.buffer.text().to_string());
        self.is_error = false;
    }

    fn reset_result(&mut self) {
        self.result = DEFAULT_RESULT.to_string();
        self.is_error = false;
    }

    fn copy(&mut self, position: usize) {
        let Some(entry) = self
            .stored_position(position)
            .and_then(|stored| self.history.get(stored))
        else {
            return;
        };

        let text = entry.result.clone();
        self.clipboard.set_clipboard(&text);
        self.notice = Some(format!("Copied {} to clipboard!", text));
    }

    /// Map a display position (most recent first) to a stored position.
    fn stored_position(&self, position: usize) -> Option<usize> {
        let len = self.history.len();
        (position < len).then(|| len - 1 - position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryBackend;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingClipboard {
        copied: Rc<RefCell<Vec<String>>>,
    }

    impl ClipboardSink for RecordingClipboard {
        fn set_clipboard(&mut self, text: &str) {
            self.copied.borrow_mut().push(text.to_string());
        }
    }

    fn controller(backend: &MemoryBackend) -> Controller {
        Controller::new(
            HistoryStore::load(backend.clone()),
            RecordingClipboard::default(),
        )
    }

    fn press(controller: &mut Controller, keys: &[&str]) -> Snapshot {
        let mut snapshot = controller.snapshot();
        for key in keys {
            snapshot = controller.handle(Intent::Append(Token::parse(key).unwrap()));
        }
        snapshot
    }

    #[test]
    fn test_fresh_session() {
        let snapshot = controller(&MemoryBackend::new()).snapshot();
        assert_eq!(snapshot.expression, "");
        assert_eq!(snapshot.result, "0");
        assert!(!snapshot.is_error);
        assert!(snapshot.history.is_empty());
        assert!(!snapshot.history_visible);
    }

    #[test]
    fn test_evaluate_records_history() {
        let mut calc = controller(&MemoryBackend::new());
        press(&mut calc, &["1", "2", "+", "8"]);
        let snapshot = calc.handle(Intent::Evaluate);

        assert_eq!(snapshot.result, "20");
        assert_eq!(snapshot.expression, "");
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].expression, "12+8");
        assert_eq!(snapshot.history[0].result, "20");
        assert_eq!(snapshot.history[0].index, 1);
    }

    #[test]
    fn test_live_preview() {
        let mut calc = controller(&MemoryBackend::new());
        let snapshot = press(&mut calc, &["1", "2", "+"]);
        assert_eq!(snapshot.result, "12+");
        assert!(!snapshot.is_error);

        let snapshot = press(&mut calc, &["8"]);
        assert_eq!(snapshot.result, "20");
        assert_eq!(snapshot.expression, "12+8");
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_sqrt_shortcut() {
        let mut calc = controller(&MemoryBackend::new());
        press(&mut calc, &["2", "5"]);
        let snapshot = calc.handle(Intent::Shortcut(Shortcut::Sqrt));
        assert_eq!(snapshot.expression, "sqrt(25)");
        assert_eq!(snapshot.result, "5");

        let snapshot = calc.handle(Intent::Evaluate);
        assert_eq!(snapshot.result, "5");
        assert_eq!(snapshot.history[0].expression, "sqrt(25)");
    }

    #[test]
    fn test_division_by_zero_clears_without_history() {
        let mut calc = controller(&MemoryBackend::new());
        press(&mut calc, &["1", "/", "0"]);
        let snapshot = calc.handle(Intent::Evaluate);

        assert_eq!(snapshot.result, "Error: division by zero");
        assert!(snapshot.is_error);
        assert_eq!(snapshot.expression, "");
        assert!(snapshot.history.is_empty());
    }

    #[test]
    fn test_log_shortcut_domain_error() {
        let mut calc = controller(&MemoryBackend::new());
        press(&mut calc, &["-", "1"]);
        calc.handle(Intent::Shortcut(Shortcut::Log));
        let snapshot = calc.handle(Intent::Evaluate);
        assert_eq!(snapshot.result, "Error: logarithm domain error");
        assert!(snapshot.history.is_empty());
    }

    #[test]
    fn test_reciprocal_of_zero() {
        let mut calc = controller(&MemoryBackend::new());
        press(&mut calc, &["0"]);
        let snapshot = calc.handle(Intent::Shortcut(Shortcut::Reciprocal));
        assert_eq!(snapshot.result, "1/(0)");
        let snapshot = calc.handle(Intent::Evaluate);
        assert_eq!(snapshot.result, "Error: division by zero");
    }

    #[test]
    fn test_eleven_evaluations_evict_first() {
        let mut calc = controller(&MemoryBackend::new());
        for i in 1..=11 {
            for key in i.to_string().chars() {
                calc.handle(Intent::Append(Token::Digit(key)));
            }
            press(&mut calc, &["+", "1"]);
            calc.handle(Intent::Evaluate);
        }

        let snapshot = calc.snapshot();
        assert_eq!(snapshot.history.len(), 10);
        assert_eq!(snapshot.history[0].expression, "11+1");
        assert_eq!(snapshot.history[9].expression, "2+1");
        assert!(snapshot.history.iter().all(|e| e.expression != "1+1"));
    }

    #[test]
    fn test_clear_entry_keeps_left_operand() {
        let mut calc = controller(&MemoryBackend::new());
        press(&mut calc, &["1", "2", "+", "3"]);
        let snapshot = calc.handle(Intent::ClearEntry);
        assert_eq!(snapshot.expression, "12+");
        assert_eq!(snapshot.result, "12+");
    }

    #[test]
    fn test_clear_entry_to_empty_resets_result() {
        let mut calc = controller(&MemoryBackend::new());
        press(&mut calc, &["4", "2"]);
        let snapshot = calc.handle(Intent::ClearEntry);
        assert_eq!(snapshot.expression, "");
        assert_eq!(snapshot.result, "0");
    }

    #[test]
    fn test_clear_all_and_backspace() {
        let mut calc = controller(&MemoryBackend::new());
        press(&mut calc, &["7", "*", "6"]);
        let snapshot = calc.handle(Intent::Backspace);
        assert_eq!(snapshot.expression, "7*");

        let snapshot = calc.handle(Intent::ClearAll);
        assert_eq!(snapshot.expression, "");
        assert_eq!(snapshot.result, "0");
    }

    #[test]
    fn test_rejected_operator_leaves_state() {
        let mut calc = controller(&MemoryBackend::new());
        let snapshot = calc.handle(Intent::Append(Token::Operator('*')));
        assert_eq!(snapshot.expression, "");
        assert_eq!(snapshot.result, "0");
    }

    #[test]
    fn test_evaluate_empty_is_noop() {
        let mut calc = controller(&MemoryBackend::new());
        let before = calc.snapshot();
        assert_eq!(calc.handle(Intent::Evaluate), before);
    }

    #[test]
    fn test_zero_result_not_recorded() {
        let mut calc = controller(&MemoryBackend::new());
        press(&mut calc, &["5", "-", "5"]);
        let snapshot = calc.handle(Intent::Evaluate);
        assert_eq!(snapshot.result, "0");
        assert!(snapshot.history.is_empty());
    }

    #[test]
    fn test_toggle_history() {
        let mut calc = controller(&MemoryBackend::new());
        assert!(calc.handle(Intent::ToggleHistory).history_visible);
        assert!(!calc.handle(Intent::ToggleHistory).history_visible);

        let calc = controller(&MemoryBackend::new()).with_history_visible(true);
        assert!(calc.snapshot().history_visible);
    }

    #[test]
    fn test_delete_uses_display_position() {
        let mut calc = controller(&MemoryBackend::new());
        for key in ["2", "3", "4"] {
            press(&mut calc, &[key, "*", "2"]);
            calc.handle(Intent::Evaluate);
        }

        let snapshot = calc.handle(Intent::DeleteHistory(0));
        let expressions: Vec<&str> = snapshot
            .history
            .iter()
            .map(|e| e.expression.as_str())
            .collect();
        assert_eq!(expressions, ["3*2", "2*2"]);
        assert_eq!(snapshot.history[0].index, 2);

        let snapshot = calc.handle(Intent::DeleteHistory(5));
        assert_eq!(snapshot.history.len(), 2);
    }

    #[test]
    fn test_copy_history_result() {
        let backend = MemoryBackend::new();
        let clipboard = RecordingClipboard::default();
        let mut calc = Controller::new(HistoryStore::load(backend), clipboard.clone());
        press(&mut calc, &["1", "0", "0", "0", "*", "3"]);
        calc.handle(Intent::Evaluate);

        let snapshot = calc.handle(Intent::CopyHistory(0));
        assert_eq!(clipboard.copied.borrow().as_slice(), ["3 000"]);
        assert_eq!(snapshot.notice.as_deref(), Some("Copied 3 000 to clipboard!"));

        // The notice only lasts for one intent; out-of-range copies do nothing.
        let snapshot = calc.handle(Intent::CopyHistory(1));
        assert_eq!(snapshot.notice, None);
        assert_eq!(clipboard.copied.borrow().len(), 1);
    }

    #[test]
    fn test_new_session_restores_history_only() {
        let backend = MemoryBackend::new();
        let mut calc = controller(&backend);
        press(&mut calc, &["6", "*", "7"]);
        calc.handle(Intent::Evaluate);
        press(&mut calc, &["9"]);
        drop(calc);

        let snapshot = controller(&backend).snapshot();
        assert_eq!(snapshot.expression, "");
        assert_eq!(snapshot.result, "0");
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].result, "42");
    }
}
