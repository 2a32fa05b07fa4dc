use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::audit::AuditLog;
use crate::operators::Operator;
use crate::parse::{self, ActionDirective, Directive, RuleDirective};
use crate::types::{CompileError, Diagnostics, Phase, Rule, RuleError, RuleSet, NUMBER_OF_PHASES};

/// Sentinel recorded when a parse pass is handed no source reference.
const MISSING_REFERENCE: &str = "<<reference missing or not informed>>";

/// Compiles textual directives into a phase-ordered [`RuleSet`].
///
/// A compiler accumulates rules across any number of passes; rejected
/// directives accumulate into a diagnostic report while the scan keeps
/// going, so one pass reports every defect it can find.
///
/// # Example
///
/// ```
/// use seclang::{Compiler, Phase, Transaction};
///
/// let mut compiler = Compiler::new();
/// compiler.parse_str(
///     r#"SecRule REQUEST_URI "@rx ^/admin(/|$)" "id:100,phase:1,msg:'admin probe'""#,
///     "inline",
/// )?;
/// let rules = compiler.finish();
///
/// let tx = Transaction::new(7);
/// let hits = rules.eval_phase(Phase::RequestHeaders, &tx, "/admin/panel");
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].rule_id, 100);
/// # Ok::<(), seclang::CompileError>(())
/// ```
#[derive(Debug)]
pub struct Compiler {
    rules: Vec<Rule>,
    phases: [Vec<usize>; NUMBER_OF_PHASES],
    /// Index of the most recent top-level rule, for chain attachment.
    last: Option<usize>,
    /// Source-reference stack, innermost last. Empty outside a pass.
    sources: Vec<String>,
    diagnostics: Diagnostics,
    raw_directive: String,
    audit: Arc<AuditLog>,
}

impl Compiler {
    /// A compiler with a fresh, unconfigured audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::with_audit_log(Arc::new(AuditLog::new()))
    }

    /// A compiler wired to a shared audit log.
    #[must_use]
    pub fn with_audit_log(audit: Arc<AuditLog>) -> Self {
        Self {
            rules: Vec::new(),
            phases: std::array::from_fn(|_| Vec::new()),
            last: None,
            sources: Vec::new(),
            diagnostics: Diagnostics::default(),
            raw_directive: String::new(),
            audit,
        }
    }

    /// Compiles every directive in `input`, attributing diagnostics to
    /// `reference` (a sentinel stands in when it is empty).
    ///
    /// # Errors
    ///
    /// [`CompileError::Directives`] when any directive was rejected,
    /// [`CompileError::Io`] when an `Include` could not be read, and
    /// [`CompileError::AuditInit`] when the audit log failed to come up.
    /// Rules compiled before a rejection stay in the table.
    pub fn parse_str(&mut self, input: &str, reference: &str) -> Result<(), CompileError> {
        let reference = if reference.is_empty() {
            MISSING_REFERENCE.to_string()
        } else {
            reference.to_string()
        };
        self.run_pass(input, reference)
    }

    /// Reads `path` and compiles its directives.
    ///
    /// # Errors
    ///
    /// [`CompileError::Io`] when the file cannot be read; otherwise as
    /// [`Compiler::parse_str`].
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<(), CompileError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.run_pass(&input, path.display().to_string())
    }

    /// Adds one rule directive.
    ///
    /// When the previous top-level rule left a chain pending, the incoming
    /// rule becomes its continuation: it inherits the chain's phase and
    /// skips every id check. Otherwise it must carry a fresh non-zero id.
    ///
    /// # Errors
    ///
    /// [`RuleError::InvalidPhase`] for an out-of-range `phase:`,
    /// [`RuleError::Operator`] when the operator cannot be built,
    /// [`RuleError::MissingId`] and [`RuleError::DuplicateId`] for id
    /// defects on top-level rules. A rejected rule is not inserted.
    pub fn add_rule(&mut self, directive: RuleDirective) -> Result<(), RuleError> {
        let declared = declared_phase(directive.actions.phase)?;
        let operator = Operator::new(
            &directive.operator.name,
            &directive.operator.parameter,
            directive.operator.negated,
        )?;

        let mut rule = Rule {
            id: directive.actions.id.unwrap_or(0),
            phase: declared,
            operator: Some(operator),
            targets: directive.targets,
            msg: directive.actions.msg,
            actions: directive.actions.rest,
            chained: directive.actions.chain,
            chain_next: None,
            marker: None,
            file: self.current_reference().to_string(),
            line: directive.line,
        };

        if let Some(last) = self.last {
            if let Some(tail) = self.pending_chain_tail(last) {
                rule.phase = self.rules[tail].phase;
                let index = self.rules.len();
                self.rules.push(rule);
                self.rules[tail].chain_next = Some(index);
                return Ok(());
            }
        }

        if rule.id == 0 {
            return Err(RuleError::MissingId {
                file: rule.file,
                line: rule.line,
            });
        }
        if self.lookup_id(rule.id).is_some() {
            return Err(RuleError::DuplicateId { id: rule.id });
        }

        let index = self.rules.len();
        let phase = rule.phase;
        self.rules.push(rule);
        self.phases[phase.index()].push(index);
        self.last = Some(index);
        Ok(())
    }

    /// Adds one action-only directive, backed by the always-true operator.
    ///
    /// Actions are appended as they come: no id checks, no chain
    /// attachment, and a pending chain stays pending right past them.
    ///
    /// # Errors
    ///
    /// [`RuleError::InvalidPhase`] for an out-of-range `phase:`.
    pub fn add_action(&mut self, directive: ActionDirective) -> Result<(), RuleError> {
        let phase = declared_phase(directive.actions.phase)?;
        let rule = Rule {
            id: directive.actions.id.unwrap_or(0),
            phase,
            operator: Some(Operator::unconditional()),
            targets: Vec::new(),
            msg: directive.actions.msg,
            actions: directive.actions.rest,
            chained: false,
            chain_next: None,
            marker: None,
            file: self.current_reference().to_string(),
            line: directive.line,
        };
        let index = self.rules.len();
        self.rules.push(rule);
        self.phases[phase.index()].push(index);
        Ok(())
    }

    /// Adds a named marker to every phase, one predicate-less rule each.
    pub fn add_marker(&mut self, name: &str) {
        let file = self.current_reference().to_string();
        for phase in Phase::ALL {
            let rule = Rule {
                id: 0,
                phase,
                operator: None,
                targets: Vec::new(),
                msg: None,
                actions: Vec::new(),
                chained: false,
                chain_next: None,
                marker: Some(name.to_string()),
                file: file.clone(),
                line: 0,
            };
            let index = self.rules.len();
            self.rules.push(rule);
            self.phases[phase.index()].push(index);
        }
    }

    /// Drains the accumulated diagnostic report. Empty when every pass so
    /// far succeeded or the report was already read.
    pub fn drain_diagnostics(&mut self) -> String {
        self.diagnostics.drain()
    }

    /// Returns the raw text of the directive most recently scanned and
    /// clears the buffer. An odd number of double quotes is balanced by
    /// appending one more.
    pub fn take_directive_text(&mut self) -> String {
        let mut text = std::mem::take(&mut self.raw_directive);
        let quotes = text.chars().filter(|&c| c == '"').count();
        if quotes % 2 == 1 {
            text.push('"');
        }
        text
    }

    /// Freezes the table. Rules compiled before any failed pass are kept,
    /// so a partially-loaded table stays observable.
    #[must_use]
    pub fn finish(self) -> RuleSet {
        let entries: usize = self.phases.iter().map(Vec::len).sum();
        let set = RuleSet {
            rules: self.rules,
            phases: self.phases,
        };
        info!(rules = set.len(), entries, "rule set frozen");
        set
    }

    fn run_pass(&mut self, input: &str, reference: String) -> Result<(), CompileError> {
        self.last = None;
        self.sources.push(reference);
        let outcome = self.scan(input);
        self.sources.pop();
        outcome?;
        self.finish_pass()
    }

    fn scan(&mut self, input: &str) -> Result<(), CompileError> {
        for (line, text) in parse::logical_lines(input) {
            self.buffer_directive(&text);
            match parse::directive(&text) {
                Ok(directive) => self.dispatch(directive, line)?,
                Err(err) => {
                    let reference = self.current_reference().to_string();
                    warn!(
                        file = %reference,
                        line,
                        column = err.column(),
                        "rejected directive: {err}"
                    );
                    self.diagnostics
                        .record(&reference, line, err.column(), err.message(), &text);
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, directive: Directive, line: usize) -> Result<(), CompileError> {
        match directive {
            Directive::Rule(mut rule) => {
                rule.line = line;
                if let Err(err) = self.add_rule(rule) {
                    self.reject(line, &err);
                }
            }
            Directive::Action(mut action) => {
                action.line = line;
                if let Err(err) = self.add_action(action) {
                    self.reject(line, &err);
                }
            }
            Directive::Marker(name) => self.add_marker(&name),
            Directive::Include(path) => self.include(&path)?,
        }
        Ok(())
    }

    fn include(&mut self, path: &str) -> Result<(), CompileError> {
        let resolved = self.resolve_include(path);
        let input = fs::read_to_string(&resolved).map_err(|source| CompileError::Io {
            path: resolved.display().to_string(),
            source,
        })?;
        self.sources.push(resolved.display().to_string());
        // A chain cannot span a source boundary.
        let saved = self.last.take();
        let outcome = self.scan(&input);
        self.last = saved;
        self.sources.pop();
        outcome
    }

    /// Relative include paths resolve against the including file's
    /// directory, falling back to the working directory when the current
    /// source is not a file.
    fn resolve_include(&self, path: &str) -> PathBuf {
        let include = Path::new(path);
        if include.is_absolute() {
            return include.to_path_buf();
        }
        match self.sources.last().map(Path::new).and_then(Path::parent) {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(include),
            _ => include.to_path_buf(),
        }
    }

    fn finish_pass(&mut self) -> Result<(), CompileError> {
        self.audit
            .init()
            .map_err(|source| CompileError::AuditInit { source })?;
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(CompileError::Directives {
                report: self.diagnostics.drain(),
            })
        }
    }

    fn reject(&mut self, line: usize, error: &RuleError) {
        let reference = self.current_reference().to_string();
        warn!(file = %reference, line, "rejected rule: {error}");
        self.diagnostics
            .record(&reference, line, 1, &error.to_string(), "");
    }

    // The side buffer keeps the raw text of the directive being built.
    // SecRule and SecAction lines restart it; other lines accumulate only
    // once a rule keyword has seeded the buffer.
    fn buffer_directive(&mut self, text: &str) {
        let text = text.trim();
        let keyword = text.split_whitespace().next().unwrap_or("");
        if keyword == "SecRule" || keyword == "SecAction" {
            self.raw_directive.clear();
        } else if self.raw_directive.is_empty() {
            return;
        }
        self.raw_directive.push_str(text);
        self.raw_directive.push(' ');
    }

    fn current_reference(&self) -> &str {
        match self.sources.last() {
            Some(reference) => reference,
            None => MISSING_REFERENCE,
        }
    }

    /// Index of the link still waiting for its continuation, when the
    /// chain hanging off `head` has one.
    fn pending_chain_tail(&self, head: usize) -> Option<usize> {
        let mut cursor = head;
        loop {
            let rule = &self.rules[cursor];
            if !rule.chained {
                return None;
            }
            match rule.chain_next {
                Some(next) => cursor = next,
                None => return Some(cursor),
            }
        }
    }

    fn lookup_id(&self, id: u64) -> Option<usize> {
        self.phases
            .iter()
            .flatten()
            .copied()
            .find(|&index| self.rules[index].id == id)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

fn declared_phase(declared: Option<u64>) -> Result<Phase, RuleError> {
    match declared {
        Some(number) => {
            Phase::from_number(number).ok_or(RuleError::InvalidPhase { phase: number })
        }
        None => Ok(Phase::RequestBody),
    }
}
