use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use cfb::parser::ParseError;
use validator::Report;

/// Renders parse diagnostics and validation findings to stderr.
pub struct Reporter {
    writer: StandardStream,
    config: term::Config,
    pub files: SimpleFiles<String, String>,
}

impl Reporter {
    pub fn new(no_color: bool) -> Self {
        let color_choice = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Reporter {
            writer: StandardStream::stderr(color_choice),
            config: term::Config::default(),
            files: SimpleFiles::new(),
        }
    }

    pub fn add_file(&mut self, name: String, source: String) -> usize {
        self.files.add(name, source)
    }

    pub fn emit(&self, diagnostic: &Diagnostic<usize>) {
        let _ = term::emit_to_write_style(
            &mut self.writer.lock(),
            &self.config,
            &self.files,
            diagnostic,
        );
    }

    pub fn emit_parse_errors(&self, errors: &[ParseError]) {
        for error in errors {
            self.emit(&error.to_diagnostic());
        }
    }

    /// Findings are labelled against the canvas registered as `file_id`.
    pub fn emit_report(&self, report: &Report, file_id: usize) {
        for finding in report.findings() {
            self.emit(&finding.to_diagnostic(file_id));
        }
    }
}
