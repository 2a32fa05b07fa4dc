use regex::{Regex, RegexBuilder};

use super::{Capture, MatchResult, OperatorError};

// Upper bound on the compiled size of a single rule pattern.
const REGEX_SIZE_LIMIT: usize = 1 << 22;

/// Regular expression predicate, the default operator for rule directives
/// that name no other.
#[derive(Debug, Clone)]
pub struct Rx {
    pattern: String,
    re: Regex,
}

impl Rx {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::InvalidPattern`] when the pattern does not
    /// compile or its automaton exceeds the size limit.
    pub fn new(pattern: &str) -> Result<Self, OperatorError> {
        let re = RegexBuilder::new(pattern)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
            .map_err(|source| OperatorError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: source.to_string(),
            })?;
        Ok(Self {
            pattern: pattern.to_string(),
            re,
        })
    }

    /// The source pattern as written in the directive.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn evaluate(&self, subject: &str) -> MatchResult {
        let caps = match self.re.captures(subject) {
            Some(caps) => caps,
            None => return MatchResult::default(),
        };
        let mut captures = Vec::new();
        for group in 1..caps.len() {
            if let Some(found) = caps.get(group) {
                captures.push(Capture {
                    group,
                    text: found.as_str().to_string(),
                    start: found.start(),
                    end: found.end(),
                });
            }
        }
        MatchResult {
            matched: true,
            captures,
        }
    }
}
