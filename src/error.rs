use thiserror::Error;

use crate::operators::OperatorError;
use crate::parse::ParseError;
use crate::types::{CompileError, RuleError};

/// Unified error type covering parsing, per-directive rejection,
/// compilation passes, and operator construction.
///
/// Each layer keeps its own error; this enum exists for callers that drive
/// several layers and want a single `?` target.
#[derive(Debug, Error)]
pub enum SeclangError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Operator(#[from] OperatorError),
}
