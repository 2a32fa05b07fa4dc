use thiserror::Error;

use crate::operators::OperatorError;

/// Rejection of a single directive during table insertion.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("unknown phase: {phase}")]
    InvalidPhase { phase: u64 },

    #[error("rules must have an id. File: {file} at line: {line}")]
    MissingId { file: String, line: usize },

    #[error("rule id: {id} is duplicated")]
    DuplicateId { id: u64 },

    #[error(transparent)]
    Operator(#[from] OperatorError),
}

/// Failure of a whole compilation pass.
#[derive(Debug, Error)]
pub enum CompileError {
    /// One or more directives were rejected; `report` is the drained
    /// diagnostics buffer for the pass.
    #[error("{report}")]
    Directives { report: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("problems while initializing the audit logs: {source}")]
    AuditInit {
        #[source]
        source: std::io::Error,
    },
}
