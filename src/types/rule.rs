use crate::operators::Operator;

use super::phase::Phase;

/// A single entry in the rule table: a `SecRule`, a `SecAction`, a chain
/// continuation, or a `SecMarker`.
///
/// Rules are immutable once the table is frozen. Chain continuations hang
/// off their head through `chain_next` arena indices and never appear in the
/// per-phase sequences themselves.
#[derive(Debug)]
pub struct Rule {
    pub(crate) id: u64,
    pub(crate) phase: Phase,
    pub(crate) operator: Option<Operator>,
    pub(crate) targets: Vec<String>,
    pub(crate) msg: Option<String>,
    pub(crate) actions: Vec<String>,
    pub(crate) chained: bool,
    pub(crate) chain_next: Option<usize>,
    pub(crate) marker: Option<String>,
    pub(crate) file: String,
    pub(crate) line: usize,
}

impl Rule {
    /// Rule id; 0 means unassigned, which the compiler only permits for
    /// markers, actions, and chain continuations.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The matching predicate. `None` only for markers.
    #[must_use]
    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    /// Raw variable specification, split on `|` and otherwise unresolved.
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    #[must_use]
    pub fn msg(&self) -> Option<&str> {
        self.msg.as_deref()
    }

    /// Action tokens the compiler does not interpret, preserved verbatim.
    #[must_use]
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// True while another link is expected after this one.
    #[must_use]
    pub fn is_chained(&self) -> bool {
        self.chained
    }

    #[must_use]
    pub fn is_marker(&self) -> bool {
        self.marker.is_some()
    }

    #[must_use]
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    /// Source reference the rule was loaded from.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}
