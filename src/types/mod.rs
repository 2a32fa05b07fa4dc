mod diagnostics;
mod error;
mod phase;
mod rule;
mod ruleset;
mod transaction;

pub(crate) use diagnostics::Diagnostics;
pub use error::{CompileError, RuleError};
pub use phase::{NUMBER_OF_PHASES, Phase};
pub use rule::Rule;
pub use ruleset::RuleSet;
pub use transaction::Transaction;
