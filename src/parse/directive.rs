/// One parsed configuration directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `SecRule <targets> "<operator>" ["<actions>"]`.
    Rule(RuleDirective),
    /// `SecAction "<actions>"`.
    Action(ActionDirective),
    /// `SecMarker <name>`.
    Marker(String),
    /// `Include <path>`.
    Include(String),
}

/// The parsed form of a rule directive, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDirective {
    /// Variable spec tokens, split on `|` and kept unresolved.
    pub targets: Vec<String>,
    /// The operator text, already split into name and parameter.
    pub operator: OperatorSpec,
    /// The actions block, defaulted when the directive carries none.
    pub actions: Actions,
    /// 1-based line in the source the directive came from. The grammar
    /// leaves this at zero; the compiler stamps it while scanning.
    pub line: usize,
}

/// The parsed form of an action-only directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDirective {
    pub actions: Actions,
    /// 1-based source line, stamped the same way as for rules.
    pub line: usize,
}

/// An operator reference as written in a directive: `[!]@name parameter`.
///
/// Text without an `@name` prefix is a regular expression pattern for the
/// default operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSpec {
    pub negated: bool,
    pub name: String,
    pub parameter: String,
}

/// The recognized pieces of an actions block.
///
/// Only the keys the compiler interprets are lifted out; every other token
/// is retained verbatim in `rest` for downstream collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actions {
    pub id: Option<u64>,
    /// Declared phase, still in its 1-based directive form.
    pub phase: Option<u64>,
    pub chain: bool,
    pub msg: Option<String>,
    pub rest: Vec<String>,
}
