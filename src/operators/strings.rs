use super::MatchResult;

/// Which literal comparison a [`StrMatch`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrCmp {
    Eq,
    Contains,
    BeginsWith,
    EndsWith,
}

/// Literal string comparison against the whole subject.
#[derive(Debug, Clone)]
pub struct StrMatch {
    cmp: StrCmp,
    value: String,
}

impl StrMatch {
    #[must_use]
    pub fn new(cmp: StrCmp, value: &str) -> Self {
        Self {
            cmp,
            value: value.to_string(),
        }
    }

    /// The directive-level name for this comparison.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.cmp {
            StrCmp::Eq => "streq",
            StrCmp::Contains => "contains",
            StrCmp::BeginsWith => "beginsWith",
            StrCmp::EndsWith => "endsWith",
        }
    }

    /// The literal operand.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn evaluate(&self, subject: &str) -> MatchResult {
        let matched = match self.cmp {
            StrCmp::Eq => subject == self.value,
            StrCmp::Contains => subject.contains(&self.value),
            StrCmp::BeginsWith => subject.starts_with(&self.value),
            StrCmp::EndsWith => subject.ends_with(&self.value),
        };
        MatchResult {
            matched,
            captures: Vec::new(),
        }
    }
}
