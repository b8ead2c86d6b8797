//! Tokenizer and recursive-descent parser for calculator expressions.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary (('^' | '**') unary)?
//! primary := number | '(' expr ')' | function '(' expr ')'
//! ```
//!
//! Exponentiation is right-associative and binds tighter than unary minus,
//! so `-2^2` is `-(2^2)`.
//!
//! Input length and nesting are capped so that both the tree and the
//! backend's own recursion stay shallow.

use super::detection::Function;
use super::error::EvalError;

/// Maximum number of tokens in one expression.
const MAX_TOKENS: usize = 256;

/// Maximum nesting of parentheses, calls, signs and exponents.
const MAX_DEPTH: usize = 64;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
        }
    }
}

/// Parsed expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Decimal literal, normalized to use `.` with digits on both sides of it.
    Number(String),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

impl Expr {
    /// Whether this node is a literal zero, looking through unary signs.
    pub fn is_literal_zero(&self) -> bool {
        match self {
            Self::Number(text) => text.chars().all(|c| c == '0' || c == '.'),
            Self::Neg(inner) => inner.is_literal_zero(),
            _ => false,
        }
    }

    /// Visit this node and every descendant, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Self::Number(_) => {}
            Self::Neg(inner) | Self::Call(_, inner) => inner.walk(visit),
            Self::Binary(_, lhs, rhs) => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
        }
    }

    /// Render in the backend's syntax, fully parenthesized.
    ///
    /// `log` is rendered as `ln` since the backend reads `log` differently.
    pub fn to_backend_syntax(&self) -> String {
        match self {
            Self::Number(text) => text.clone(),
            Self::Neg(inner) => format!("(-{})", inner.to_backend_syntax()),
            Self::Binary(op, lhs, rhs) => format!(
                "({} {} {})",
                lhs.to_backend_syntax(),
                op.symbol(),
                rhs.to_backend_syntax()
            ),
            Self::Call(function, arg) => {
                let name = match function {
                    Function::Log => "ln",
                    other => other.name(),
                };
                format!("{}({})", name, arg.to_backend_syntax())
            }
        }
    }
}

/// Parse an expression string into a tree.
pub fn parse(input: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(EvalError::Parse("empty expression".to_string()));
    }

    if tokens.len() > MAX_TOKENS {
        return Err(EvalError::Parse("expression too long".to_string()));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(Token::RParen) => Err(EvalError::Parse("unmatched ')'".to_string())),
        Some(token) => Err(EvalError::Parse(format!("unexpected {}", describe(token)))),
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' | ',' => {
                let start = i;
                while i < chars.len() && is_number_char(chars[i]) {
                    i += 1;
                }
                let raw: String = chars[start..i].iter().collect();
                tokens.push(Token::Number(normalize_number(&raw)?));
            }
            'a'..='z' | 'A'..='Z' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Caret);
                i += 2;
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '^' => Token::Caret,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    other => {
                        return Err(EvalError::Parse(format!("unexpected character '{other}'")));
                    }
                };
                tokens.push(token);
                i += 1;
            }
        }
    }

    Ok(tokens)
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | ',')
}

// "1,5" -> "1.5", ".5" -> "0.5", "5." -> "5"
fn normalize_number(raw: &str) -> Result<String, EvalError> {
    let text = raw.replace(',', ".");
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => {
            if frac_part.contains('.') {
                return Err(EvalError::Parse(format!("malformed number '{raw}'")));
            }
            (int_part, frac_part)
        }
        None => (text.as_str(), ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(EvalError::Parse(format!("malformed number '{raw}'")));
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    if frac_part.is_empty() {
        Ok(int_part.to_string())
    } else {
        Ok(format!("{int_part}.{frac_part}"))
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(n) => format!("number '{n}'"),
        Token::Ident(name) => format!("'{name}'"),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Caret => "'^'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::Parse("expression nested too deeply".to_string()));
        }
        let expr = self.signed();
        self.depth -= 1;
        expr
    }

    fn signed(&mut self) -> Result<Expr, EvalError> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, EvalError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.close_paren()?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                let function = Function::from_name(&name.to_ascii_lowercase())
                    .ok_or_else(|| EvalError::Parse(format!("unknown function '{name}'")))?;
                if !self.eat(&Token::LParen) {
                    return Err(EvalError::Parse(format!("expected '(' after '{name}'")));
                }
                let arg = self.expr()?;
                self.close_paren()?;
                Ok(Expr::Call(function, Box::new(arg)))
            }
            Some(token) => Err(EvalError::Parse(format!("unexpected {}", describe(&token)))),
            None => Err(EvalError::Parse("unexpected end of expression".to_string())),
        }
    }

    fn close_paren(&mut self) -> Result<(), EvalError> {
        if self.eat(&Token::RParen) {
            Ok(())
        } else {
            Err(EvalError::Parse("missing ')'".to_string()))
        }
    }
}
