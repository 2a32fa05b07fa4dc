use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use super::{MatchResult, OperatorError};

/// Case-insensitive set match over a whitespace-separated phrase list.
///
/// All phrases are folded into one automaton at construction time so a
/// single pass over the subject answers for the whole list.
#[derive(Debug, Clone)]
pub struct Pm {
    params: String,
    ac: AhoCorasick,
}

impl Pm {
    /// Builds the phrase automaton.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::InvalidParameter`] when the list holds no
    /// phrases, and [`OperatorError::InvalidPattern`] when the automaton
    /// cannot be built from them.
    pub fn new(params: &str) -> Result<Self, OperatorError> {
        let phrases: Vec<&str> = params.split_ascii_whitespace().collect();
        if phrases.is_empty() {
            return Err(OperatorError::InvalidParameter {
                operator: "pm",
                parameter: params.to_string(),
            });
        }
        let ac = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostFirst)
            .ascii_case_insensitive(true)
            .build(&phrases)
            .map_err(|source| OperatorError::InvalidPattern {
                pattern: params.to_string(),
                reason: source.to_string(),
            })?;
        Ok(Self {
            params: params.to_string(),
            ac,
        })
    }

    /// The phrase list as written in the directive.
    #[must_use]
    pub fn params(&self) -> &str {
        &self.params
    }

    pub(crate) fn evaluate(&self, subject: &str) -> MatchResult {
        MatchResult {
            matched: self.ac.is_match(subject),
            captures: Vec::new(),
        }
    }
}
