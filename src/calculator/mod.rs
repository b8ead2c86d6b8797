//! Calculator module for evaluating keypad expressions.
//!
//! This module provides functionality to:
//! - Classify input characters and find operand boundaries
//! - Parse and evaluate expressions using fend
//! - Format results for display
//! - Copy results to the clipboard

mod clipboard;
mod detection;
mod error;
mod evaluation;
mod format;
mod parser;

pub use clipboard::{ClipboardSink, DisabledClipboard, SystemClipboard};
pub use detection::{
    Function, ends_at_operand_gap, ends_with_function_call, is_decimal_point, is_operator,
    operand_boundary,
};
pub use evaluation::{EvaluationOutcome, Evaluator};
