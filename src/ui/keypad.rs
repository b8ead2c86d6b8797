//! Keypad layout and key parsing.
//!
//! Each line typed by the user is a list of keys separated by whitespace.
//! Words that are not keypad labels are split into individual keys, so
//! `12+8` and `sqrt(25)` can be typed in one go.

use crate::buffer::{Shortcut, Token};
use crate::calculator::Function;
use crate::controller::Intent;

/// What a key looks like on the keypad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonRole {
    Digit,
    Action,
    ExtraAction,
}

/// ANSI SGR parameters for a button role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonStyle {
    pub foreground: &'static str,
    pub background: &'static str,
}

const STYLES: [(ButtonRole, ButtonStyle); 3] = [
    (
        ButtonRole::Digit,
        ButtonStyle {
            foreground: "97",
            background: "100",
        },
    ),
    (
        ButtonRole::Action,
        ButtonStyle {
            foreground: "97",
            background: "48;5;208",
        },
    ),
    (
        ButtonRole::ExtraAction,
        ButtonStyle {
            foreground: "30",
            background: "47",
        },
    ),
];

impl ButtonRole {
    pub fn style(self) -> ButtonStyle {
        STYLES
            .iter()
            .find(|(role, _)| *role == self)
            .map(|(_, style)| *style)
            .unwrap_or(STYLES[0].1)
    }
}

/// The keypad, row by row.
pub const KEYPAD: &[&[(&str, ButtonRole)]] = &[
    &[
        ("AC", ButtonRole::ExtraAction),
        ("CE", ButtonRole::ExtraAction),
        ("<", ButtonRole::ExtraAction),
        (")", ButtonRole::Action),
    ],
    &[
        ("√", ButtonRole::Action),
        ("1/x", ButtonRole::Action),
        ("x²", ButtonRole::Action),
        ("log", ButtonRole::Action),
    ],
    &[
        ("(", ButtonRole::ExtraAction),
        ("7", ButtonRole::Digit),
        ("8", ButtonRole::Digit),
        ("9", ButtonRole::Digit),
        ("/", ButtonRole::Action),
    ],
    &[
        ("4", ButtonRole::Digit),
        ("5", ButtonRole::Digit),
        ("6", ButtonRole::Digit),
        ("*", ButtonRole::Action),
    ],
    &[
        ("1", ButtonRole::Digit),
        ("2", ButtonRole::Digit),
        ("3", ButtonRole::Digit),
        ("-", ButtonRole::Action),
    ],
    &[
        ("0", ButtonRole::Digit),
        (".", ButtonRole::Digit),
        ("+", ButtonRole::Action),
        ("^", ButtonRole::Action),
    ],
    &[
        ("=", ButtonRole::Action),
        ("history", ButtonRole::ExtraAction),
    ],
];

/// One parsed keypress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Help,
    Quit,
}

/// Parse a line of keys.
///
/// `del N` and `copy N` address the N-th row of the displayed history
/// (1 = most recent). The whole line is rejected if any key is unknown.
pub fn parse_line(line: &str) -> Result<Vec<Command>, String> {
    let mut commands = Vec::new();
    let mut words = line.split_whitespace();

    while let Some(word) = words.next() {
        match word {
            "del" | "copy" => {
                let row = words
                    .next()
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| format!("'{word}' needs a history row number"))?;
                let position = row - 1;
                commands.push(Command::Intent(if word == "del" {
                    Intent::DeleteHistory(position)
                } else {
                    Intent::CopyHistory(position)
                }));
            }
            _ => match parse_key(word) {
                Some(command) => commands.push(command),
                None => commands.extend(split_keys(word)?),
            },
        }
    }

    Ok(commands)
}

fn parse_key(key: &str) -> Option<Command> {
    let intent = match key {
        "quit" | "exit" | "q" => return Some(Command::Quit),
        "help" | "?" => return Some(Command::Help),
        "AC" | "ac" => Intent::ClearAll,
        "CE" | "ce" => Intent::ClearEntry,
        "<" | "⬅" | "⬅️" | "back" => Intent::Backspace,
        "=" => Intent::Evaluate,
        "history" | "h" => Intent::ToggleHistory,
        "√" => Intent::Shortcut(Shortcut::Sqrt),
        "1/x" => Intent::Shortcut(Shortcut::Reciprocal),
        "x²" | "x2" | "x^2" => Intent::Shortcut(Shortcut::Square),
        "log" => Intent::Shortcut(Shortcut::Log),
        _ => Intent::Append(Token::parse(key)?),
    };
    Some(Command::Intent(intent))
}

/// Split a run of characters like `sqrt(25)*3` into individual keys.
///
/// A function name must be followed by `(`, which is consumed with it.
fn split_keys(word: &str) -> Result<Vec<Command>, String> {
    let chars: Vec<char> = word.chars().collect();
    let mut commands = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            let name: String = chars[start..i].iter().collect();
            let function = Function::from_name(&name.to_ascii_lowercase())
                .filter(|_| chars.get(i) == Some(&'('))
                .ok_or_else(|| format!("unknown key '{name}'"))?;
            i += 1;
            commands.push(Command::Intent(Intent::Append(Token::Function(function))));
            continue;
        }

        let key = chars[i].to_string();
        let token = Token::parse(&key).ok_or_else(|| format!("unknown key '{key}'"))?;
        commands.push(Command::Intent(Intent::Append(token)));
        i += 1;
    }

    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append(token: Token) -> Command {
        Command::Intent(Intent::Append(token))
    }

    #[test]
    fn test_every_keypad_label_parses() {
        for row in KEYPAD {
            for (label, _) in *row {
                assert!(parse_key(label).is_some(), "label {label}");
            }
        }
    }

    #[test]
    fn test_style_table_covers_roles() {
        assert_eq!(ButtonRole::Action.style().background, "48;5;208");
        assert_eq!(ButtonRole::ExtraAction.style().foreground, "30");
        assert_eq!(ButtonRole::Digit.style().background, "100");
    }

    #[test]
    fn test_single_keys() {
        assert_eq!(
            parse_line("1 2 + 8 =").unwrap(),
            vec![
                append(Token::Digit('1')),
                append(Token::Digit('2')),
                append(Token::Operator('+')),
                append(Token::Digit('8')),
                Command::Intent(Intent::Evaluate),
            ]
        );
    }

    #[test]
    fn test_split_words() {
        assert_eq!(
            parse_line("sqrt(25)").unwrap(),
            vec![
                append(Token::Function(Function::Sqrt)),
                append(Token::Digit('2')),
                append(Token::Digit('5')),
                append(Token::CloseParen),
            ]
        );
        assert_eq!(parse_line("12+8").unwrap().len(), 4);
    }

    #[test]
    fn test_shortcuts_and_actions() {
        assert_eq!(
            parse_line("√ 1/x x² log CE AC < history").unwrap(),
            vec![
                Command::Intent(Intent::Shortcut(Shortcut::Sqrt)),
                Command::Intent(Intent::Shortcut(Shortcut::Reciprocal)),
                Command::Intent(Intent::Shortcut(Shortcut::Square)),
                Command::Intent(Intent::Shortcut(Shortcut::Log)),
                Command::Intent(Intent::ClearEntry),
                Command::Intent(Intent::ClearAll),
                Command::Intent(Intent::Backspace),
                Command::Intent(Intent::ToggleHistory),
            ]
        );
        assert_eq!(
            parse_line("log(").unwrap(),
            vec![append(Token::Function(Function::Log))]
        );
    }

    #[test]
    fn test_history_rows() {
        assert_eq!(
            parse_line("del 1 copy 3").unwrap(),
            vec![
                Command::Intent(Intent::DeleteHistory(0)),
                Command::Intent(Intent::CopyHistory(2)),
            ]
        );
        assert!(parse_line("del").is_err());
        assert!(parse_line("copy 0").is_err());
        assert!(parse_line("del x").is_err());
    }

    #[test]
    fn test_unknown_keys_reject_line() {
        assert!(parse_line("1 + foo").is_err());
        assert!(parse_line("tan(1)").is_err());
        assert!(parse_line("sqrt2").is_err());
        assert!(parse_line("2%3").is_err());
        assert_eq!(parse_line("quit").unwrap(), vec![Command::Quit]);
        assert!(parse_line("  ").unwrap().is_empty());
    }
}
