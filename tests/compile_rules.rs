use std::fs;
use std::sync::Arc;

use seclang::{AuditLog, CompileError, Compiler, Phase};
use tempfile::tempdir;

#[test]
fn include_pulls_rules_from_a_sibling_file() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("extra.conf"),
        "SecRule ARGS \"@rx b\" \"id:201,phase:1\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("main.conf"),
        "SecRule ARGS \"@rx a\" \"id:200,phase:1\"\nInclude extra.conf\n",
    )
    .unwrap();

    let mut compiler = Compiler::new();
    compiler.parse_file(dir.path().join("main.conf")).unwrap();
    let rules = compiler.finish();

    assert!(rules.rule_by_id(200).is_some());
    assert!(rules.rule_by_id(201).is_some());
    assert_eq!(rules.entries(Phase::RequestHeaders).count(), 2);
}

#[test]
fn includes_resolve_against_the_including_file() {
    // deeper.conf sits next to inner.conf, not next to main.conf.
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("conf.d")).unwrap();
    fs::write(
        dir.path().join("conf.d/inner.conf"),
        "Include deeper.conf\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("conf.d/deeper.conf"),
        "SecRule ARGS \"@rx x\" \"id:210,phase:2\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("main.conf"), "Include conf.d/inner.conf\n").unwrap();

    let mut compiler = Compiler::new();
    compiler.parse_file(dir.path().join("main.conf")).unwrap();
    assert!(compiler.finish().rule_by_id(210).is_some());
}

#[test]
fn nested_include_attributes_errors_to_the_innermost_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("leaf.conf"), "SecBogus nonsense\n").unwrap();
    fs::write(dir.path().join("mid.conf"), "Include leaf.conf\n").unwrap();
    fs::write(dir.path().join("main.conf"), "Include mid.conf\n").unwrap();

    let mut compiler = Compiler::new();
    let err = compiler.parse_file(dir.path().join("main.conf")).unwrap_err();
    match err {
        CompileError::Directives { report } => {
            assert!(report.contains("leaf.conf"), "report: {report}");
        }
        other => panic!("expected a directives report, got {other:?}"),
    }
}

#[test]
fn missing_include_aborts_the_pass_but_keeps_earlier_rules() {
    let mut compiler = Compiler::new();
    let program = concat!(
        "SecRule ARGS \"@rx a\" \"id:220,phase:1\"\n",
        "Include /nonexistent/rules.conf\n",
        "SecRule ARGS \"@rx b\" \"id:221,phase:1\"\n",
    );
    let err = compiler.parse_str(program, "main.conf").unwrap_err();
    match err {
        CompileError::Io { path, .. } => assert!(path.contains("nonexistent")),
        other => panic!("expected an io error, got {other:?}"),
    }

    // The scan stopped at the failed include.
    let rules = compiler.finish();
    assert!(rules.rule_by_id(220).is_some());
    assert!(rules.rule_by_id(221).is_none());
}

#[test]
fn missing_file_is_an_io_error() {
    let mut compiler = Compiler::new();
    let err = compiler.parse_file("/definitely/not/here.conf").unwrap_err();
    assert!(matches!(err, CompileError::Io { .. }));
    assert!(err.to_string().contains("here.conf"));
}

#[test]
fn chains_do_not_cross_an_include_boundary() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("inner.conf"),
        "SecRule ARGS \"@rx inner\" \"id:231,phase:1\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("main.conf"),
        concat!(
            "SecRule ARGS \"@rx head\" \"id:230,phase:1,chain\"\n",
            "Include inner.conf\n",
            "SecRule ARGS \"@rx tail\"\n",
        ),
    )
    .unwrap();

    let mut compiler = Compiler::new();
    compiler.parse_file(dir.path().join("main.conf")).unwrap();
    let rules = compiler.finish();

    // The included rule became its own top-level entry; the chain resumed
    // with the line after the Include.
    let head = rules.rule_by_id(230).unwrap();
    assert_eq!(rules.chain(head).count(), 2);
    assert!(rules.rule_by_id(231).is_some());
    assert_eq!(rules.entries(Phase::RequestHeaders).count(), 2);
}

#[test]
fn a_pending_chain_does_not_leak_into_the_next_pass() {
    let mut compiler = Compiler::new();
    compiler
        .parse_str("SecRule ARGS \"@rx a\" \"id:240,phase:1,chain\"\n", "one.conf")
        .unwrap();
    compiler
        .parse_str("SecRule ARGS \"@rx b\" \"id:241,phase:1\"\n", "two.conf")
        .unwrap();
    let rules = compiler.finish();

    let head = rules.rule_by_id(240).unwrap();
    assert_eq!(rules.chain(head).count(), 1);
    assert!(rules.rule_by_id(241).is_some());
    assert_eq!(rules.entries(Phase::RequestHeaders).count(), 2);
}

#[test]
fn audit_log_failure_fails_the_pass() {
    let audit = Arc::new(AuditLog::with_path("/nonexistent-dir/audit.log"));
    let mut compiler = Compiler::with_audit_log(audit);
    let err = compiler
        .parse_str("SecRule ARGS \"@rx a\" \"id:250,phase:1\"\n", "ok.conf")
        .unwrap_err();
    assert!(matches!(err, CompileError::AuditInit { .. }));

    // The rule itself was fine and stays in the table.
    assert!(compiler.finish().rule_by_id(250).is_some());
}

#[test]
fn audit_failure_reports_before_directive_defects() {
    let audit = Arc::new(AuditLog::with_path("/nonexistent-dir/audit.log"));
    let mut compiler = Compiler::with_audit_log(audit);
    let err = compiler.parse_str("SecBogus\n", "bad.conf").unwrap_err();
    assert!(matches!(err, CompileError::AuditInit { .. }));

    // The directive report is still buffered once the audit log is sorted.
    let report = compiler.drain_diagnostics();
    assert!(report.contains("bad.conf"), "report: {report}");
}

#[test]
fn audit_log_sink_is_created_on_first_pass() {
    let dir = tempdir().unwrap();
    let sink = dir.path().join("audit.log");
    let audit = Arc::new(AuditLog::with_path(&sink));
    let mut compiler = Compiler::with_audit_log(Arc::clone(&audit));

    compiler.parse_str("SecMarker START\n", "m.conf").unwrap();
    assert!(sink.exists());
    assert_eq!(audit.path(), Some(sink.as_path()));
}

#[test]
fn diagnostics_start_fresh_for_each_failing_pass() {
    let mut compiler = Compiler::new();
    let first = compiler.parse_str("SecBogus one\n", "a.conf").unwrap_err();
    assert!(
        first.to_string().starts_with("Rules error. File: a.conf."),
        "got: {first}"
    );

    let second = compiler.parse_str("SecBogus two\n", "b.conf").unwrap_err();
    assert!(
        second.to_string().starts_with("Rules error. File: b.conf."),
        "got: {second}"
    );
}

#[test]
fn rules_accumulate_across_passes() {
    let mut compiler = Compiler::new();
    compiler
        .parse_str("SecRule ARGS \"@rx a\" \"id:260,phase:1\"\n", "one.conf")
        .unwrap();
    compiler
        .parse_str("SecRule ARGS \"@rx b\" \"id:261,phase:4\"\n", "two.conf")
        .unwrap();
    let rules = compiler.finish();

    assert_eq!(rules.len(), 2);
    assert_eq!(rules.entries(Phase::RequestHeaders).count(), 1);
    assert_eq!(rules.entries(Phase::ResponseBody).count(), 1);
}

#[test]
fn failed_pass_keeps_the_rules_before_the_defect() {
    let mut compiler = Compiler::new();
    let err = compiler
        .parse_str(
            concat!(
                "SecRule ARGS \"@rx good\" \"id:270,phase:1\"\n",
                "SecRule ARGS \"@rx dup\" \"id:270,phase:1\"\n",
                "SecRule ARGS \"@rx more\" \"id:271,phase:1\"\n",
            ),
            "partial.conf",
        )
        .unwrap_err();
    assert!(err.to_string().contains("rule id: 270 is duplicated"));

    // The scan kept going past the duplicate.
    let rules = compiler.finish();
    assert!(rules.rule_by_id(270).is_some());
    assert!(rules.rule_by_id(271).is_some());
    assert_eq!(rules.len(), 2);
}

#[test]
fn rule_provenance_names_file_and_line() {
    let mut compiler = Compiler::new();
    compiler
        .parse_str(
            "\n# comment\nSecRule ARGS \"@rx a\" \"id:280,phase:1\"\n",
            "prov.conf",
        )
        .unwrap();
    let rules = compiler.finish();

    let rule = rules.rule_by_id(280).unwrap();
    assert_eq!(rule.file(), "prov.conf");
    assert_eq!(rule.line(), 3);
}
