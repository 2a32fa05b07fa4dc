use std::fmt;

use crate::evaluate::RuleMatch;

use super::phase::{Phase, NUMBER_OF_PHASES};
use super::rule::Rule;
use super::transaction::Transaction;

/// A frozen, phase-ordered rule table. Thread-safe and designed to live
/// behind `Arc`; hot reload is a whole-table swap, never an in-place edit.
///
/// The arena holds every rule including chain continuations; the per-phase
/// sequences hold only top-level entries (rule heads, actions, markers) in
/// declaration order.
#[derive(Debug)]
pub struct RuleSet {
    pub(crate) rules: Vec<Rule>,
    pub(crate) phases: [Vec<usize>; NUMBER_OF_PHASES],
}

impl RuleSet {
    /// Total number of rules in the arena, chain continuations included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Top-level entries of a phase in declaration order.
    pub fn entries(&self, phase: Phase) -> impl Iterator<Item = &Rule> + '_ {
        self.phases[phase.index()].iter().map(|&idx| &self.rules[idx])
    }

    /// Find a top-level rule by its id. Chain continuations are not
    /// addressable this way; ids only bind to heads.
    #[must_use]
    pub fn rule_by_id(&self, id: u64) -> Option<&Rule> {
        if id == 0 {
            return None;
        }
        self.phases
            .iter()
            .flatten()
            .map(|&idx| &self.rules[idx])
            .find(|rule| rule.id == id)
    }

    /// Walk a chain from its head through every link.
    pub fn chain<'a>(&'a self, head: &'a Rule) -> impl Iterator<Item = &'a Rule> {
        std::iter::successors(Some(head), move |rule| {
            rule.chain_next.map(|idx| &self.rules[idx])
        })
    }

    /// Evaluate every rule of one phase against a resolved subject string.
    ///
    /// Entries run in declaration order; markers are skipped; a chain
    /// matches only when every link matches. Operator faults are logged and
    /// degrade the affected rule to no-match.
    #[must_use]
    pub fn eval_phase(&self, phase: Phase, tx: &Transaction, subject: &str) -> Vec<RuleMatch> {
        crate::evaluate::eval_phase(self, phase, tx, subject)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: usize = self.phases.iter().map(Vec::len).sum();
        write!(
            f,
            "RuleSet({} rules, {} top-level entries)",
            self.rules.len(),
            entries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::Compiler;

    fn compile(input: &str) -> RuleSet {
        let mut compiler = Compiler::new();
        compiler.parse_str(input, "inline").unwrap();
        compiler.finish()
    }

    #[test]
    fn entries_follow_declaration_order() {
        let rules = compile(
            "SecRule ARGS \"@rx a\" \"id:1,phase:1\"\n\
             SecRule ARGS \"@rx b\" \"id:2,phase:1\"\n\
             SecRule ARGS \"@rx c\" \"id:3,phase:2\"\n",
        );
        let ids: Vec<u64> = rules.entries(Phase::RequestHeaders).map(Rule::id).collect();
        assert_eq!(ids, vec![1, 2]);
        let ids: Vec<u64> = rules.entries(Phase::RequestBody).map(Rule::id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn rule_by_id_finds_heads_only() {
        let rules = compile(
            "SecRule ARGS \"@rx a\" \"id:10,phase:1,chain\"\n\
             SecRule ARGS \"@rx b\" \"id:11\"\n",
        );
        assert!(rules.rule_by_id(10).is_some());
        // the continuation declared id 11 but never became addressable
        assert!(rules.rule_by_id(11).is_none());
        assert!(rules.rule_by_id(0).is_none());
    }

    #[test]
    fn chain_walk_yields_every_link() {
        let rules = compile(
            "SecRule ARGS \"@rx a\" \"id:10,phase:1,chain\"\n\
             SecRule ARGS \"@rx b\" \"chain\"\n\
             SecRule ARGS \"@rx c\" \"\"\n",
        );
        let head = rules.rule_by_id(10).unwrap();
        let links: Vec<&Rule> = rules.chain(head).collect();
        assert_eq!(links.len(), 3);
        assert!(links[0].is_chained());
        assert!(links[1].is_chained());
        assert!(!links[2].is_chained());
    }

    #[test]
    fn display_counts() {
        let rules = compile("SecRule ARGS \"@rx a\" \"id:1,phase:1,chain\"\nSecRule ARGS \"@rx b\" \"\"\n");
        assert_eq!(rules.to_string(), "RuleSet(2 rules, 1 top-level entries)");
    }
}
