use cfb::parser::Parser;
use cfb::{Block, Document, FieldValues, InstructionKind as K};
use validator::{RULES, Severity, validate};

/// Build a block sequence from `(kind, [(field, value)])` pairs.
fn blocks(layout: &[(K, &[(&str, &str)])]) -> Vec<Block> {
    let mut document = Document::new();
    for (kind, values) in layout {
        let values: FieldValues = values.iter().copied().collect();
        document.add_with_values(*kind, values);
    }
    document.blocks().to_vec()
}

fn error_ids(blocks: &[Block]) -> Vec<&'static str> {
    validate(blocks).errors.iter().map(|f| f.rule).collect()
}

fn warning_ids(blocks: &[Block]) -> Vec<&'static str> {
    validate(blocks).warnings.iter().map(|f| f.rule).collect()
}

#[test]
fn empty_document_needs_a_base_image() {
    let report = validate(&[]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].rule, "require-base-kind");
    assert!(report.warnings.is_empty());
    assert!(!report.is_valid());
}

#[test]
fn minimal_document_is_valid() {
    let doc = blocks(&[(K::From, &[("image", "fedora:39")]), (K::Run, &[("command", "echo hi")])]);
    let report = validate(&doc);
    assert!(report.is_valid());
    assert!(report.is_empty());
    assert_eq!(report.badge(), None);
}

#[test]
fn out_of_range_port_is_an_error() {
    let doc = blocks(&[(K::From, &[("image", "x")]), (K::Expose, &[("port", "99999")])]);
    assert_eq!(error_ids(&doc), vec!["valid-expose-port"]);

    for port in ["0", "-1", "abc", "65536"] {
        let doc = blocks(&[(K::From, &[("image", "x")]), (K::Expose, &[("port", port)])]);
        assert_eq!(error_ids(&doc), vec!["valid-expose-port"], "port {port}");
    }
    for port in ["1", "80", "65535", "8080/tcp", " 443"] {
        let doc = blocks(&[(K::From, &[("image", "x")]), (K::Expose, &[("port", port)])]);
        assert!(error_ids(&doc).is_empty(), "port {port}");
    }
}

#[test]
fn missing_port_is_not_checked() {
    let doc = blocks(&[(K::From, &[("image", "x")]), (K::Expose, &[])]);
    assert!(validate(&doc).is_valid());
}

#[test]
fn duplicate_cmd_only_warns() {
    let doc = blocks(&[
        (K::From, &[("image", "x")]),
        (K::Cmd, &[("command", "a")]),
        (K::Cmd, &[("command", "b")]),
    ]);
    let report = validate(&doc);
    assert!(report.is_valid());
    assert_eq!(warning_ids(&doc), vec!["single-effective-startup-command"]);
    assert_eq!(report.badge(), Some((Severity::Warning, 1)));
}

#[test]
fn duplicate_entrypoint_warns() {
    let doc = blocks(&[
        (K::From, &[("image", "x")]),
        (K::Entrypoint, &[("command", "a")]),
        (K::Entrypoint, &[("command", "b")]),
    ]);
    assert_eq!(warning_ids(&doc), vec!["single-effective-entrypoint"]);
}

#[test]
fn from_should_be_first_unless_preceded_by_arg() {
    let doc = blocks(&[(K::Run, &[("command", "x")]), (K::From, &[("image", "x")])]);
    assert_eq!(warning_ids(&doc), vec!["base-kind-should-be-first"]);

    let doc = blocks(&[(K::Arg, &[("name", "V")]), (K::From, &[("image", "x")])]);
    assert!(warning_ids(&doc).is_empty());

    // ARG first without any FROM: both the error and the warning fire
    let doc = blocks(&[(K::Arg, &[("name", "V")])]);
    assert_eq!(error_ids(&doc), vec!["require-base-kind"]);
    assert_eq!(warning_ids(&doc), vec!["base-kind-should-be-first"]);
}

#[test]
fn copy_before_workdir_follows_order() {
    let mut document = Document::new();
    document.add_with_values(K::From, [("image", "x")].into_iter().collect());
    let workdir = document.add_with_values(K::Workdir, [("path", "/app")].into_iter().collect());
    let copy = document.add_with_values(
        K::Copy,
        [("source", "."), ("dest", ".")].into_iter().collect(),
    );
    assert!(warning_ids(document.blocks()).is_empty());

    document.move_to(copy, 1);
    assert_eq!(warning_ids(document.blocks()), vec!["workdir-before-copy"]);

    document.move_to(copy, 2);
    assert!(warning_ids(document.blocks()).is_empty());

    document.remove(workdir);
    assert_eq!(warning_ids(document.blocks()), vec!["workdir-before-copy"]);
}

#[test]
fn add_counts_as_copy() {
    let doc = blocks(&[
        (K::From, &[("image", "x")]),
        (K::Add, &[("source", "a.tar"), ("dest", "/opt")]),
        (K::Workdir, &[("path", "/opt")]),
    ]);
    assert_eq!(warning_ids(&doc), vec!["workdir-before-copy"]);
}

#[test]
fn user_needs_prior_creation() {
    let doc = blocks(&[(K::From, &[("image", "x")]), (K::User, &[("username", "app")])]);
    assert_eq!(warning_ids(&doc), vec!["user-requires-creation"]);

    let doc = blocks(&[
        (K::From, &[("image", "x")]),
        (K::Run, &[("command", "RUN UserAdd -m app")]),
        (K::User, &[("username", "app")]),
    ]);
    assert!(warning_ids(&doc).is_empty());

    let doc = blocks(&[(K::From, &[("image", "x")]), (K::User, &[("username", "root")])]);
    assert!(warning_ids(&doc).is_empty());
}

#[test]
fn user_creation_after_user_does_not_count() {
    let doc = blocks(&[
        (K::From, &[("image", "x")]),
        (K::User, &[("username", "app")]),
        (K::Run, &[("command", "groupadd app")]),
    ]);
    assert_eq!(warning_ids(&doc), vec!["user-requires-creation"]);
}

#[test]
fn empty_required_values_are_errors() {
    let doc = blocks(&[
        (K::From, &[("image", "  ")]),
        (K::Run, &[("command", "")]),
        (K::Copy, &[("source", "a")]),
        (K::Env, &[("value", "1")]),
    ]);
    assert_eq!(
        error_ids(&doc),
        vec![
            "run-command-non-empty",
            "base-image-non-empty",
            "copy-paths-present",
            "env-key-value-present",
        ]
    );
}

#[test]
fn every_violation_is_reported_once() {
    let doc = blocks(&[
        (K::Cmd, &[("command", "a")]),
        (K::Cmd, &[("command", "b")]),
        (K::Expose, &[("port", "0")]),
    ]);
    let report = validate(&doc);
    assert_eq!(error_ids(&doc), vec!["require-base-kind", "valid-expose-port"]);
    assert_eq!(
        warning_ids(&doc),
        vec!["base-kind-should-be-first", "single-effective-startup-command"]
    );
    assert_eq!(report.len(), 4);
    assert_eq!(report.badge(), Some((Severity::Error, 2)));

    let ids: Vec<&str> = report.findings().map(|f| f.rule).collect();
    assert_eq!(ids[..2], ["require-base-kind", "valid-expose-port"]);
}

#[test]
fn three_rules_three_findings() {
    let doc = blocks(&[
        (K::From, &[("image", "x")]),
        (K::Expose, &[("port", "70000")]),
        (K::Run, &[("command", " ")]),
        (K::Entrypoint, &[("command", "a")]),
        (K::Entrypoint, &[("command", "b")]),
    ]);
    assert_eq!(validate(&doc).len(), 3);
}

#[test]
fn catalogue_order_and_severities() {
    let ids: Vec<&str> = RULES.iter().map(|r| r.id).collect();
    assert_eq!(
        ids,
        vec![
            "require-base-kind",
            "base-kind-should-be-first",
            "single-effective-startup-command",
            "single-effective-entrypoint",
            "workdir-before-copy",
            "valid-expose-port",
            "user-requires-creation",
            "run-command-non-empty",
            "base-image-non-empty",
            "copy-paths-present",
            "env-key-value-present",
        ]
    );
    let errors = RULES.iter().filter(|r| r.severity == Severity::Error).count();
    assert_eq!(errors, 6);
    assert!(validator::rules::find("valid-expose-port").is_some());
}

#[test]
fn validation_has_no_memory() {
    let doc = blocks(&[(K::Expose, &[("port", "0")])]);
    assert_eq!(validate(&doc), validate(&doc));
}

#[test]
fn findings_convert_to_diagnostics() {
    let report = validate(&[]);
    let diagnostic = report.errors[0].to_diagnostic(0usize);
    assert_eq!(diagnostic.code.as_deref(), Some("require-base-kind"));
    assert!(diagnostic.labels.is_empty());
    assert!(diagnostic.notes[0].starts_with("help: "));
    assert_eq!(
        report.errors[0].to_string(),
        "error[require-base-kind]: A FROM instruction is required. Specify a base image."
    );
}

#[test]
fn findings_name_the_blocks_at_fault() {
    let mut document = Document::new();
    document.add_with_values(K::From, [("image", "x")].into_iter().collect());
    let first = document.add_with_values(K::Cmd, [("command", "a")].into_iter().collect());
    let second = document.add_with_values(K::Cmd, [("command", "b")].into_iter().collect());
    let last = document.add_with_values(K::Cmd, [("command", "c")].into_iter().collect());
    let port = document.add_with_values(K::Expose, [("port", "0")].into_iter().collect());

    let report = validator::validate_document(&document);
    assert_eq!(report.errors[0].blocks, vec![port]);
    assert_eq!(report.warnings[0].blocks, vec![first, second]);
    assert!(!report.warnings[0].blocks.contains(&last));
    // built in memory, so nothing to point at in a file
    assert!(report.errors[0].spans.is_empty());
}

#[test]
fn parsed_findings_label_their_source() {
    let source = "# FROM\n\n- image: fedora:39\n\n# EXPOSE\n\n- port: 99999\n\n# ENV\n\n- key: MODE\n";
    let (document, _) = Parser::new(source.to_string(), 7).parse().unwrap();
    let report = validator::validate_document(&document);
    assert_eq!(error_ids(document.blocks()), vec!["valid-expose-port", "env-key-value-present"]);

    let expose = &report.errors[0];
    assert_eq!(expose.spans.len(), 1);
    assert_eq!(&source[expose.spans[0].clone()], "# EXPOSE\n\n- port: 99999");

    let diagnostic = expose.to_diagnostic(document.source_id);
    assert_eq!(diagnostic.labels.len(), 1);
    assert_eq!(diagnostic.labels[0].file_id, 7);
    assert_eq!(diagnostic.labels[0].range, expose.spans[0]);

    let env = &report.errors[1];
    assert_eq!(&source[env.spans[0].clone()], "# ENV\n\n- key: MODE");
}

#[test]
fn document_wide_findings_have_no_blocks() {
    let doc = blocks(&[(K::Run, &[("command", "make")])]);
    let report = validate(&doc);
    assert_eq!(report.errors[0].rule, "require-base-kind");
    assert!(report.errors[0].blocks.is_empty());
    assert_eq!(report.warnings[0].rule, "base-kind-should-be-first");
    assert_eq!(report.warnings[0].blocks, vec![doc[0].id]);
}

#[test]
fn sample_documents_pass() {
    for sample in cfb::SAMPLES {
        let report = validator::validate_document(&sample.load());
        assert!(report.is_valid(), "{}: {:?}", sample.key, report.errors);
    }
}
