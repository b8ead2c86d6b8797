use thiserror::Error;

/// Reasons an expression cannot produce a numeric result.
///
/// These never leave the evaluator as faults; they are turned into
/// [`EvaluationOutcome::Invalid`](super::EvaluationOutcome::Invalid) with
/// the `Display` text as the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("invalid expression: {0}")]
    Parse(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("logarithm domain error")]
    LogDomain,

    #[error("{0}")]
    Backend(String),

    #[error("calculation took too long")]
    TimedOut,

    #[error("result is not a real number: {0}")]
    NotANumber(String),
}
