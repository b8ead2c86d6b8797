//! Expression evaluation using fend.
//!
//! Expressions are parsed locally first so the domain guards can run on the
//! tree, then rendered into fend's syntax. fend does exact rational
//! arithmetic and marks approximated results with an `approx.` prefix, which
//! is how exact integers are told apart from real results.
//!
//! Every call runs against a deadline so that huge exact results such as
//! `9^9^9` give up instead of stalling the session.

use std::time::{Duration, Instant};

use fend_core::{Context, Interrupt};
use tracing::{debug, trace};

use super::detection::{Function, has_only_calc_chars};
use super::error::EvalError;
use super::format::{format_integer, format_result};
use super::parser::{BinOp, Expr, parse};

const APPROX_PREFIX: &str = "approx. ";

/// Time allowed for a live preview while typing.
const PREVIEW_BUDGET: Duration = Duration::from_millis(50);

/// Time allowed for an explicit evaluation.
const EVALUATE_BUDGET: Duration = Duration::from_secs(2);

/// Interrupts the backend once a point in time has passed.
struct Deadline(Instant);

impl Deadline {
    fn after(budget: Duration) -> Self {
        Self(Instant::now() + budget)
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.0
    }
}

impl Interrupt for Deadline {
    fn should_interrupt(&self) -> bool {
        self.expired()
    }
}

/// Result of evaluating a calculator expression.
#[derive(Clone, Debug, PartialEq)]
pub enum EvaluationOutcome {
    /// The expression produced a finite real number.
    Numeric {
        value: f64,
        /// Whether the backend computed the value exactly and it is an integer.
        exact_integer: bool,
        /// The backend's exact digits when `exact_integer` is set.
        digits: Option<String>,
    },
    /// The expression could not be evaluated; carries a human-readable reason.
    Invalid(String),
}

impl EvaluationOutcome {
    /// Check if this is a successful result.
    #[cfg(test)]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric { .. })
    }

    /// The display string for a numeric outcome.
    pub fn formatted(&self) -> Option<String> {
        match self {
            Self::Numeric {
                digits: Some(digits),
                ..
            } => Some(format_integer(digits)),
            Self::Numeric {
                value,
                exact_integer,
                ..
            } => Some(format_result(*value, *exact_integer)),
            Self::Invalid(_) => None,
        }
    }
}

/// Evaluates expressions against a long-lived fend context.
pub struct Evaluator {
    context: Context,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            context: Context::new(),
        }
    }

    /// Evaluate a complete expression.
    pub fn evaluate(&mut self, input: &str) -> EvaluationOutcome {
        match self.try_evaluate(input, &Deadline::after(EVALUATE_BUDGET)) {
            Ok(outcome) => {
                debug!(expression = input, ?outcome, "evaluated expression");
                outcome
            }
            Err(err) => {
                debug!(expression = input, error = %err, "expression rejected");
                EvaluationOutcome::Invalid(err.to_string())
            }
        }
    }

    /// Evaluate a possibly incomplete expression for the live preview.
    ///
    /// Same as [`evaluate`](Self::evaluate), but failures are expected while
    /// the user is still typing and are only traced. The time budget is
    /// much shorter.
    pub fn preview(&mut self, input: &str) -> EvaluationOutcome {
        match self.try_evaluate(input, &Deadline::after(PREVIEW_BUDGET)) {
            Ok(outcome) => outcome,
            Err(err) => {
                trace!(expression = input, error = %err, "no preview");
                EvaluationOutcome::Invalid(err.to_string())
            }
        }
    }

    fn try_evaluate(
        &mut self,
        input: &str,
        deadline: &Deadline,
    ) -> Result<EvaluationOutcome, EvalError> {
        let lowered = input.to_ascii_lowercase();
        if !has_only_calc_chars(&lowered) {
            return Err(EvalError::Parse("unsupported characters".to_string()));
        }

        let expr = parse(&lowered)?;
        self.check_domain(&expr, deadline)?;
        self.run_backend(&expr, deadline)
    }

    /// Reject divisions by a literal zero and logarithms of non-positive values
    /// before the whole expression reaches the backend.
    fn check_domain(&mut self, expr: &Expr, deadline: &Deadline) -> Result<(), EvalError> {
        let mut divides_by_zero = false;
        let mut log_args = Vec::new();

        expr.walk(&mut |node| match node {
            Expr::Binary(BinOp::Div, _, rhs) if rhs.is_literal_zero() => divides_by_zero = true,
            Expr::Call(Function::Log, arg) => log_args.push(&**arg),
            _ => {}
        });

        if divides_by_zero {
            return Err(EvalError::DivisionByZero);
        }

        // Innermost arguments first, so a nested bad logarithm is reported as such.
        for arg in log_args.into_iter().rev() {
            if let EvaluationOutcome::Numeric { value, .. } = self.run_backend(arg, deadline)?
                && value <= 0.0
            {
                return Err(EvalError::LogDomain);
            }
        }

        Ok(())
    }

    fn run_backend(
        &mut self,
        expr: &Expr,
        deadline: &Deadline,
    ) -> Result<EvaluationOutcome, EvalError> {
        let syntax = expr.to_backend_syntax();
        let result = fend_core::evaluate_with_interrupt(&syntax, &mut self.context, deadline)
            .map_err(|err| {
                if deadline.expired() {
                    EvalError::TimedOut
                } else {
                    EvalError::Backend(err)
                }
            })?;
        parse_backend_number(result.get_main_result())
    }
}

/// Turn fend's main result text into a numeric outcome.
fn parse_backend_number(text: &str) -> Result<EvaluationOutcome, EvalError> {
    let trimmed = text.trim();
    let (approximate, number) = match trimmed.strip_prefix(APPROX_PREFIX) {
        Some(rest) => (true, rest.trim()),
        None => (false, trimmed),
    };

    let cleaned: String = number.chars().filter(|c| *c != ',').collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| EvalError::NotANumber(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(EvalError::NotANumber(trimmed.to_string()));
    }

    let exact_integer = !approximate && !cleaned.contains(['.', 'e', 'E']);
    Ok(EvaluationOutcome::Numeric {
        value,
        exact_integer,
        digits: exact_integer.then_some(cleaned),
    })
}
