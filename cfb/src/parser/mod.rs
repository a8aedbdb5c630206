pub mod error;
mod structural;

pub use error::ParseError;

use crate::document::Document;

/// Reads a Markdown canvas file into a [`Document`].
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Parse the whole canvas.
    ///
    /// On success returns the document together with any warnings. If at
    /// least one error was found, every diagnostic (warnings included) is
    /// returned instead.
    pub fn parse(&self) -> Result<(Document, Vec<ParseError>), Vec<ParseError>> {
        let (mut document, diagnostics) = structural::parse_canvas(&self.source, self.file_id);
        document.source_id = self.file_id;

        if diagnostics.iter().any(|d| !d.is_warning()) {
            tracing::debug!(count = diagnostics.len(), "canvas rejected");
            return Err(diagnostics);
        }
        tracing::debug!(
            blocks = document.len(),
            warnings = diagnostics.len(),
            "canvas parsed"
        );
        Ok((document, diagnostics))
    }
}
