pub mod finding;
pub mod rules;

use cfb::Block;

pub use finding::{Finding, Report, Severity};
pub use rules::{RULES, Rule, Verdict};

/// Run every rule over `blocks` and collect each violation.
///
/// Rules are independent: all of them run on every pass, so the report
/// lists the complete set of problems rather than the first one hit.
pub fn validate(blocks: &[Block]) -> Report {
    let mut report = Report::default();
    for rule in RULES {
        let Verdict::Fail(indices) = (rule.check)(blocks) else {
            continue;
        };
        tracing::debug!(
            rule = rule.id,
            severity = %rule.severity,
            blocks = indices.len(),
            "rule failed"
        );
        let at_fault: Vec<&Block> = indices.iter().filter_map(|&i| blocks.get(i)).collect();
        let finding = Finding {
            rule: rule.id,
            severity: rule.severity,
            message: rule.message,
            help: rule.help,
            blocks: at_fault.iter().map(|b| b.id).collect(),
            spans: at_fault.iter().filter_map(|b| b.span.clone()).collect(),
        };
        match rule.severity {
            Severity::Error => report.errors.push(finding),
            Severity::Warning => report.warnings.push(finding),
        }
    }
    report
}

/// Validate a whole document.
pub fn validate_document(document: &cfb::Document) -> Report {
    validate(document.blocks())
}
