//! The pending expression and its token adjacency rules.

use crate::calculator::{
    Function, ends_at_operand_gap, ends_with_function_call, is_decimal_point, is_operator,
    operand_boundary,
};

/// An atomic unit appended to the expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Digit(char),
    /// `.` or its synonym `,`, kept as typed.
    DecimalPoint(char),
    OpenParen,
    CloseParen,
    Operator(char),
    /// Appends the function name and its opening parenthesis.
    Function(Function),
}

impl Token {
    /// Parse a keypad label such as `7`, `+` or `sqrt`.
    pub fn parse(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return match c {
                '0'..='9' => Some(Self::Digit(c)),
                '(' => Some(Self::OpenParen),
                ')' => Some(Self::CloseParen),
                c if is_decimal_point(c) => Some(Self::DecimalPoint(c)),
                c if is_operator(c) => Some(Self::Operator(c)),
                _ => None,
            };
        }
        Function::from_name(key).map(Self::Function)
    }
}

/// Keys that rewrite the whole pending expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    /// `sqrt(expr)`
    Sqrt,
    /// `1/(expr)`
    Reciprocal,
    /// `(expr)^2`
    Square,
    /// `log(expr)`
    Log,
}

impl Shortcut {
    fn wrap(self, text: &str) -> String {
        match self {
            Self::Sqrt => format!("sqrt({text})"),
            Self::Reciprocal => format!("1/({text})"),
            Self::Square => format!("({text})^2"),
            Self::Log => format!("log({text})"),
        }
    }
}

/// The in-progress expression text.
///
/// `operand_start` marks where the rightmost operand begins so that
/// clear-entry only erases that operand. It is recomputed after every
/// committed mutation and always satisfies `operand_start <= text.len()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpressionBuffer {
    text: String,
    operand_start: usize,
}

impl ExpressionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    #[cfg(test)]
    pub fn operand_start(&self) -> usize {
        self.operand_start
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append a token. Returns `false` if the adjacency rules reject it.
    ///
    /// A binary operator needs a left operand: it is rejected on an empty
    /// buffer or right after another operator or an opening parenthesis,
    /// except for `-`, which is then read as unary minus.
    pub fn append(&mut self, token: Token) -> bool {
        match token {
            Token::Operator(op) => {
                if op != '-' && ends_at_operand_gap(&self.text) {
                    return false;
                }
                self.text.push(op);
            }
            Token::Function(function) => {
                self.text.push_str(function.name());
                self.text.push('(');
            }
            Token::Digit(c) | Token::DecimalPoint(c) => self.text.push(c),
            Token::OpenParen => self.text.push('('),
            Token::CloseParen => self.text.push(')'),
        }
        self.commit();
        true
    }

    /// Rewrite the whole expression with a shortcut. No-op on an empty buffer.
    pub fn apply(&mut self, shortcut: Shortcut) -> bool {
        if self.text.is_empty() {
            return false;
        }
        self.text = shortcut.wrap(&self.text);
        self.commit();
        true
    }

    /// Remove the last character, or a whole trailing function opening like `sin(`.
    pub fn backspace(&mut self) -> bool {
        if ends_with_function_call(&self.text) {
            self.text.pop();
            while self.text.ends_with(|c: char| c.is_ascii_alphabetic()) {
                self.text.pop();
            }
        } else if self.text.pop().is_none() {
            return false;
        }
        self.commit();
        true
    }

    /// Erase the rightmost operand. Returns `true` if anything was removed.
    pub fn clear_entry(&mut self) -> bool {
        let changed = self.operand_start < self.text.len();
        self.text.truncate(self.operand_start);
        self.commit();
        changed
    }

    pub fn clear_all(&mut self) {
        self.text.clear();
        self.commit();
    }

    /// Hand the expression over for evaluation, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.operand_start = 0;
        std::mem::take(&mut self.text)
    }

    fn commit(&mut self) {
        self.operand_start = operand_boundary(&self.text);
    }
}
