use tracing::warn;

use crate::operators::Capture;
use crate::types::{Phase, Rule, RuleSet, Transaction};

/// A rule (or whole chain) that matched during phase evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Id of the matching top-level rule.
    pub rule_id: u64,
    /// The head's log message, when it carries one.
    pub msg: Option<String>,
    /// Captures recorded by the last evaluated link.
    pub captures: Vec<Capture>,
}

/// Walks one phase of the table in declaration order. Markers are skipped;
/// a chain matches only when every link matches; an operator fault degrades
/// its rule to no-match so request processing never aborts.
pub(crate) fn eval_phase(
    set: &RuleSet,
    phase: Phase,
    tx: &Transaction,
    subject: &str,
) -> Vec<RuleMatch> {
    let mut matches = Vec::new();
    for head in set.entries(phase) {
        if head.is_marker() {
            continue;
        }
        if let Some(hit) = eval_chain(set, head, tx, subject) {
            matches.push(hit);
        }
    }
    matches
}

fn eval_chain(set: &RuleSet, head: &Rule, tx: &Transaction, subject: &str) -> Option<RuleMatch> {
    let mut captures = Vec::new();
    for link in set.chain(head) {
        let operator = link.operator()?;
        match operator.evaluate(tx, subject) {
            Ok(result) => {
                if !result.matched {
                    return None;
                }
                captures = result.captures;
            }
            Err(err) => {
                warn!(tx = tx.id(), rule = head.id(), "operator fault: {err}");
                return None;
            }
        }
    }
    Some(RuleMatch {
        rule_id: head.id(),
        msg: head.msg().map(str::to_string),
        captures,
    })
}
