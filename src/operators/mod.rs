//! Operator strategies that decide whether a rule predicate holds for a
//! subject string.
//!
//! Each operator is constructed once at compile time and evaluated many
//! times, so anything expensive (regex compilation, automaton building,
//! numeric parsing) happens in the constructor and evaluation stays cheap.

use std::fmt;

use thiserror::Error;
use tracing::trace;

use crate::types::Transaction;

mod numeric;
mod pm;
mod rx;
mod strings;

pub use numeric::{NumCmp, NumMatch};
pub use pm::Pm;
pub use rx::Rx;
pub use strings::{StrCmp, StrMatch};

// -- Results ----------------------------------------------------------------

/// The outcome of evaluating one operator against one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// Whether the predicate held, after negation is applied.
    pub matched: bool,
    /// Explicit capture groups recorded by the underlying match, if any.
    ///
    /// Captures always describe the raw match and are left untouched by
    /// negation.
    pub captures: Vec<Capture>,
}

/// One capture group recorded by a matching operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// 1-based group number within the pattern.
    pub group: usize,
    /// The captured text.
    pub text: String,
    /// Byte offset of the capture start within the subject.
    pub start: usize,
    /// Byte offset one past the capture end.
    pub end: usize,
}

// -- Errors -----------------------------------------------------------------

/// Errors raised while building an operator from its directive form.
#[derive(Debug, Error)]
pub enum OperatorError {
    /// The pattern could not be compiled.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The operator name is not one this engine implements.
    #[error("unknown operator `{name}`")]
    UnknownOperator { name: String },

    /// The operator rejected its parameter at construction time.
    #[error("invalid parameter for @{operator}: `{parameter}`")]
    InvalidParameter {
        operator: &'static str,
        parameter: String,
    },
}

/// A fault raised while an operator was inspecting a subject.
///
/// Construction-time problems are [`OperatorError`]; this type covers the
/// rare evaluation-time failures, such as a numeric operator being fed a
/// subject that is not a number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("@{operator} failed: {reason}")]
pub struct EvaluationError {
    pub(crate) operator: &'static str,
    pub(crate) reason: String,
}

impl EvaluationError {
    /// Name of the operator that faulted.
    #[must_use]
    pub fn operator(&self) -> &'static str {
        self.operator
    }
}

// -- Operator ---------------------------------------------------------------

/// A compiled rule predicate.
///
/// Operators are built from the `[!]@name parameter` form found in a rule
/// directive. The bang negates the outcome without touching captures.
#[derive(Debug, Clone)]
pub struct Operator {
    kind: OperatorKind,
    negated: bool,
}

/// The concrete matching strategy behind an [`Operator`].
#[derive(Debug, Clone)]
pub enum OperatorKind {
    /// Regular expression match.
    Rx(Rx),
    /// Case-insensitive multi-phrase set match.
    Pm(Pm),
    /// Literal string comparison.
    Str(StrMatch),
    /// Numeric comparison against the subject parsed as an integer.
    Num(NumMatch),
    /// Always matches. Backs action-only directives.
    UnconditionalMatch,
}

impl Operator {
    /// Builds the operator named in a directive.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::UnknownOperator`] for names this engine does
    /// not implement, and construction errors from the named strategy when
    /// the parameter is unusable.
    pub fn new(name: &str, parameter: &str, negated: bool) -> Result<Self, OperatorError> {
        let kind = match name {
            "rx" => OperatorKind::Rx(Rx::new(parameter)?),
            "pm" => OperatorKind::Pm(Pm::new(parameter)?),
            "streq" => OperatorKind::Str(StrMatch::new(StrCmp::Eq, parameter)),
            "contains" => OperatorKind::Str(StrMatch::new(StrCmp::Contains, parameter)),
            "beginsWith" => OperatorKind::Str(StrMatch::new(StrCmp::BeginsWith, parameter)),
            "endsWith" => OperatorKind::Str(StrMatch::new(StrCmp::EndsWith, parameter)),
            "eq" => OperatorKind::Num(NumMatch::new(NumCmp::Eq, parameter)?),
            "ge" => OperatorKind::Num(NumMatch::new(NumCmp::Ge, parameter)?),
            "gt" => OperatorKind::Num(NumMatch::new(NumCmp::Gt, parameter)?),
            "le" => OperatorKind::Num(NumMatch::new(NumCmp::Le, parameter)?),
            "lt" => OperatorKind::Num(NumMatch::new(NumCmp::Lt, parameter)?),
            "unconditionalMatch" => OperatorKind::UnconditionalMatch,
            other => {
                return Err(OperatorError::UnknownOperator {
                    name: other.to_string(),
                })
            }
        };
        Ok(Self { kind, negated })
    }

    /// The always-true operator used for action-only directives.
    #[must_use]
    pub fn unconditional() -> Self {
        Self {
            kind: OperatorKind::UnconditionalMatch,
            negated: false,
        }
    }

    /// Evaluates the predicate against `subject` on behalf of `tx`.
    ///
    /// # Errors
    ///
    /// Propagates an [`EvaluationError`] when the underlying strategy cannot
    /// produce a verdict for this subject.
    pub fn evaluate(
        &self,
        tx: &Transaction,
        subject: &str,
    ) -> Result<MatchResult, EvaluationError> {
        trace!(
            tx = tx.id(),
            operator = self.name(),
            negated = self.negated,
            "evaluating operator"
        );
        let mut result = match &self.kind {
            OperatorKind::Rx(op) => op.evaluate(subject),
            OperatorKind::Pm(op) => op.evaluate(subject),
            OperatorKind::Str(op) => op.evaluate(subject),
            OperatorKind::Num(op) => op.evaluate(subject)?,
            OperatorKind::UnconditionalMatch => MatchResult {
                matched: true,
                captures: Vec::new(),
            },
        };
        if self.negated {
            result.matched = !result.matched;
        }
        Ok(result)
    }

    /// The directive-level name of this operator.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match &self.kind {
            OperatorKind::Rx(_) => "rx",
            OperatorKind::Pm(_) => "pm",
            OperatorKind::Str(op) => op.name(),
            OperatorKind::Num(op) => op.name(),
            OperatorKind::UnconditionalMatch => "unconditionalMatch",
        }
    }

    /// Whether the outcome is inverted.
    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// The concrete strategy backing this operator.
    #[must_use]
    pub fn kind(&self) -> &OperatorKind {
        &self.kind
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        write!(f, "@{}", self.name())?;
        match &self.kind {
            OperatorKind::Rx(op) => write!(f, " {}", op.pattern()),
            OperatorKind::Pm(op) => write!(f, " {}", op.params()),
            OperatorKind::Str(op) => write!(f, " {}", op.value()),
            OperatorKind::Num(op) => write!(f, " {}", op.operand()),
            OperatorKind::UnconditionalMatch => Ok(()),
        }
    }
}
