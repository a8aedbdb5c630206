use std::fmt::Write;

use crate::document::Document;
use crate::instruction::InputShape;

/// One `# KEYWORD` heading per block; single-line values as `- name: value`
/// items, multi-line values as a fenced code block.
pub(super) fn write(document: &Document) -> String {
    let mut out = String::new();
    for (i, block) in document.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "# {}", block.kind.keyword());

        let mut items = Vec::new();
        let mut fenced = None;
        for field in block.kind.fields() {
            if !block.values.contains(field.name) {
                continue;
            }
            let value = block.values.get(field.name);
            if field.shape == InputShape::MultiLine && value.contains('\n') {
                fenced = Some(value);
            } else {
                items.push(format!("- {}: {}", field.name, value.replace('\n', " ")));
            }
        }

        if !items.is_empty() {
            out.push('\n');
            for item in items {
                out.push_str(&item);
                out.push('\n');
            }
        }
        if let Some(body) = fenced {
            let fence = "`".repeat(longest_backtick_run(body).max(2) + 1);
            let _ = write!(out, "\n{fence}sh\n{body}\n{fence}\n");
        }
    }
    out
}

fn longest_backtick_run(s: &str) -> usize {
    s.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}
