use super::{EvaluationError, MatchResult, OperatorError};

/// Which ordering a [`NumMatch`] asserts between subject and operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumCmp {
    Eq,
    Ge,
    Gt,
    Le,
    Lt,
}

impl NumCmp {
    fn name(self) -> &'static str {
        match self {
            NumCmp::Eq => "eq",
            NumCmp::Ge => "ge",
            NumCmp::Gt => "gt",
            NumCmp::Le => "le",
            NumCmp::Lt => "lt",
        }
    }
}

/// Integer comparison against the subject parsed as a number.
///
/// The operand is parsed once at construction. The subject is parsed at
/// evaluation time, and a subject that is not an integer is a fault rather
/// than a silent non-match.
#[derive(Debug, Clone)]
pub struct NumMatch {
    cmp: NumCmp,
    operand: i64,
}

impl NumMatch {
    /// Parses the directive operand.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::InvalidParameter`] when the operand is not
    /// an integer.
    pub fn new(cmp: NumCmp, parameter: &str) -> Result<Self, OperatorError> {
        let operand = parameter
            .trim()
            .parse()
            .map_err(|_| OperatorError::InvalidParameter {
                operator: cmp.name(),
                parameter: parameter.to_string(),
            })?;
        Ok(Self { cmp, operand })
    }

    /// The directive-level name for this comparison.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.cmp.name()
    }

    /// The integer operand.
    #[must_use]
    pub fn operand(&self) -> i64 {
        self.operand
    }

    pub(crate) fn evaluate(&self, subject: &str) -> Result<MatchResult, EvaluationError> {
        let value: i64 = subject.trim().parse().map_err(|_| EvaluationError {
            operator: self.name(),
            reason: format!("subject `{subject}` is not an integer"),
        })?;
        let matched = match self.cmp {
            NumCmp::Eq => value == self.operand,
            NumCmp::Ge => value >= self.operand,
            NumCmp::Gt => value > self.operand,
            NumCmp::Le => value <= self.operand,
            NumCmp::Lt => value < self.operand,
        };
        Ok(MatchResult {
            matched,
            captures: Vec::new(),
        })
    }
}
