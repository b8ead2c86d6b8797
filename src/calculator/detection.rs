//! Character and token classification for calculator input.
//!
//! Shared by the expression buffer (adjacency rules, operand boundaries)
//! and the evaluator (input screening before parsing).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Matches strings containing only characters the calculator understands.
    /// Allows: digits, whitespace, operators, parentheses, letters (for functions), dots, commas.
    static ref CALC_SAFE_CHARS: Regex = Regex::new(
        r"^[\d\s\.,\+\-\*/\^()a-z]*$"
    ).unwrap();

    /// Matches a function name immediately followed by its opening parenthesis.
    static ref TRAILING_FUNCTION_CALL: Regex = Regex::new(
        r"(sqrt|sin|cos|log)\($"
    ).unwrap();
}

/// Unary functions available on the keypad and in typed expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Sin,
    Cos,
    /// Natural logarithm.
    Log,
}

impl Function {
    pub const ALL: [Function; 4] = [Self::Sqrt, Self::Sin, Self::Cos, Self::Log];

    /// The name as typed in an expression.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Log => "log",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// Binary operator characters accepted by the keypad.
pub fn is_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '^')
}

/// Decimal separators; `,` is a synonym for `.`.
pub fn is_decimal_point(c: char) -> bool {
    c == '.' || c == ','
}

/// Check if the input only uses characters the calculator can parse.
pub fn has_only_calc_chars(input: &str) -> bool {
    CALC_SAFE_CHARS.is_match(input)
}

/// Check if the text ends with an operator or an opening parenthesis,
/// i.e. a position where a binary operator would have no left operand.
pub fn ends_at_operand_gap(text: &str) -> bool {
    match text.chars().last() {
        None => true,
        Some(c) => is_operator(c) || c == '(',
    }
}

/// Check if the text ends with a function call opening such as `sqrt(`.
pub fn ends_with_function_call(text: &str) -> bool {
    TRAILING_FUNCTION_CALL.is_match(text)
}

/// Find the byte offset where the rightmost operand of `text` begins.
///
/// The operand starts just after the last operator or unmatched `(`.
/// A trailing parenthesized group, together with a function name in
/// front of it, counts as part of the operand.
pub fn operand_boundary(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = bytes.len();

    while i > 0 {
        let c = bytes[i - 1] as char;
        match c {
            ')' => depth += 1,
            '(' if depth > 0 => depth -= 1,
            '(' => return i,
            c if is_operator(c) && depth == 0 => return i,
            _ => {}
        }
        i -= 1;
    }

    0
}
