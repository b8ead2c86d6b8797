//! Text rendering of calculator snapshots.
//!
//! Mirrors the launcher item layout: the expression as a muted line, the
//! result with a "= " prefix below it, then the history panel if shown.

use std::fmt::Write;

use crate::controller::Snapshot;
use crate::history::HistoryEntry;

use super::keypad::{ButtonRole, KEYPAD};

const MUTED: &str = "90";
const ERROR: &str = "38;5;203";
const BOLD: &str = "1";

pub const HELP: &str = "\
Keys: digits . , ( ) + - * / ^ and sqrt sin cos (opens a call), or whole runs like 12+8 or log(5)
  =        evaluate              AC   clear everything
  CE       clear current entry   <    backspace
  √ 1/x x² log                   apply to the whole expression
  history  show or hide history  del N / copy N  delete or copy history row N
  help     show this text        quit            leave";

/// Render a snapshot for the terminal.
pub fn render(snapshot: &Snapshot, color: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "  {}", paint(&snapshot.expression, MUTED, color));

    let result_style = if snapshot.is_error { ERROR } else { BOLD };
    let _ = writeln!(out, "= {}", paint(&snapshot.result, result_style, color));

    if let Some(notice) = &snapshot.notice {
        let _ = writeln!(out, "{}", paint(notice, MUTED, color));
    }

    if snapshot.history_visible {
        out.push_str(&render_history(&snapshot.history));
    }

    out
}

/// Render history rows, most recent first, numbered from 1.
pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "History is empty\n".to_string();
    }

    let mut out = String::from("History:\n");
    for (row, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. #{:<3} {}  {} = {}",
            row + 1,
            entry.index,
            entry.timestamp,
            entry.expression,
            entry.result
        );
    }
    out
}

/// Render the keypad legend with role colors.
pub fn render_keypad(color: bool) -> String {
    let mut out = String::new();
    for row in KEYPAD {
        let keys: Vec<String> = row
            .iter()
            .map(|(label, role)| button(label, *role, color))
            .collect();
        let _ = writeln!(out, "{}", keys.join(" "));
    }
    out
}

fn button(label: &str, role: ButtonRole, color: bool) -> String {
    let text = format!(" {:^7} ", label);
    if !color {
        return format!("[{}]", text.trim_end());
    }
    let style = role.style();
    format!("\x1b[{};{}m{}\x1b[0m", style.foreground, style.background, text)
}

fn paint(text: &str, sgr: &str, color: bool) -> String {
    if color {
        format!("\x1b[{}m{}\x1b[0m", sgr, text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            expression: "12+8".to_string(),
            result: "20".to_string(),
            is_error: false,
            history: vec![HistoryEntry {
                index: 4,
                timestamp: "2024-03-09 14:05:07".to_string(),
                expression: "6*7".to_string(),
                result: "42".to_string(),
            }],
            history_visible: false,
            notice: None,
        }
    }

    #[test]
    fn test_render_plain() {
        assert_eq!(render(&snapshot(), false), "  12+8\n= 20\n");
    }

    #[test]
    fn test_render_history_panel() {
        let mut snapshot = snapshot();
        snapshot.history_visible = true;
        snapshot.notice = Some("Copied 42 to clipboard!".to_string());
        let out = render(&snapshot, false);
        assert!(out.contains("Copied 42 to clipboard!\n"));
        assert!(out.contains("  1. #4   2024-03-09 14:05:07  6*7 = 42\n"));
    }

    #[test]
    fn test_render_empty_history() {
        assert_eq!(render_history(&[]), "History is empty\n");
    }

    #[test]
    fn test_error_is_colored() {
        let mut snapshot = snapshot();
        snapshot.result = "Error: division by zero".to_string();
        snapshot.is_error = true;
        let out = render(&snapshot, true);
        assert!(out.contains("\x1b[38;5;203mError: division by zero\x1b[0m"));
    }

    #[test]
    fn test_keypad_has_one_line_per_row() {
        let keypad = render_keypad(false);
        assert_eq!(keypad.lines().count(), KEYPAD.len());
        assert!(keypad.contains("1/x"));
    }
}
