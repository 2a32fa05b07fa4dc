mod audit;
mod compile;
mod error;
mod evaluate;
mod operators;
pub mod parse;
mod types;

pub use audit::AuditLog;
pub use compile::Compiler;
pub use error::SeclangError;
pub use evaluate::RuleMatch;
pub use operators::{
    Capture, EvaluationError, MatchResult, NumCmp, NumMatch, Operator, OperatorError, OperatorKind,
    Pm, Rx, StrCmp, StrMatch,
};
pub use parse::ParseError;
pub use types::{CompileError, NUMBER_OF_PHASES, Phase, Rule, RuleError, RuleSet, Transaction};
