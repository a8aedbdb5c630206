use std::fmt;
use std::ops::Range;

use cfb::BlockId;
use codespan_reporting::diagnostic::{Diagnostic, Label};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// One violated rule. Findings are rebuilt on every pass and carry no
/// identity beyond their content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    pub help: &'static str,
    /// Blocks at fault, in document order. Empty when the problem is
    /// something the document lacks.
    pub blocks: Vec<BlockId>,
    /// Canvas source spans of those blocks, for blocks read from a file.
    pub spans: Vec<Range<usize>>,
}

impl Finding {
    /// A codespan diagnostic for this finding, labelling every offending
    /// block that came from the canvas file `file_id`.
    pub fn to_diagnostic<FileId: Copy>(&self, file_id: FileId) -> Diagnostic<FileId> {
        let diagnostic = match self.severity {
            Severity::Error => Diagnostic::error(),
            Severity::Warning => Diagnostic::warning(),
        };
        let labels = self
            .spans
            .iter()
            .map(|span| Label::primary(file_id, span.clone()))
            .collect();
        diagnostic
            .with_code(self.rule)
            .with_message(self.message)
            .with_labels(labels)
            .with_notes(vec![format!("help: {}", self.help)])
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.rule, self.message)
    }
}

/// Result of one validation pass, findings in rule-catalogue order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl Report {
    /// True when no error-severity finding exists. Warnings never count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors first, then warnings.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Count shown on the validate button: errors if any, else warnings.
    pub fn badge(&self) -> Option<(Severity, usize)> {
        if !self.errors.is_empty() {
            Some((Severity::Error, self.errors.len()))
        } else if !self.warnings.is_empty() {
            Some((Severity::Warning, self.warnings.len()))
        } else {
            None
        }
    }
}
