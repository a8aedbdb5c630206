use std::collections::HashSet;
use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser as CmarkParser, Tag, TagEnd};

use crate::block::FieldValues;
use crate::document::Document;
use crate::instruction::InstructionKind;
use crate::parser::error::ParseError;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a Markdown canvas into a document plus every diagnostic found.
pub fn parse_canvas(source: &str, file_id: usize) -> (Document, Vec<ParseError>) {
    let parser = CmarkParser::new_ext(source, Options::empty());
    let events: Vec<(Event<'_>, Range<usize>)> = parser.into_offset_iter().collect();

    let mut state = ParseState::new(source, file_id);
    state.process_events(&events);
    state.finalize()
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

enum Scope {
    /// Before the first instruction heading.
    Preamble,
    /// Under a heading that did not name an instruction; its items are
    /// skipped without further diagnostics.
    Unknown,
    Block(BlockBuilder),
}

struct BlockBuilder {
    kind: InstructionKind,
    values: FieldValues,
    seen: HashSet<&'static str>,
    span_start: usize,
}

struct ParseState<'a> {
    source: &'a str,
    file_id: usize,
    scope: Scope,
    document: Document,
    diagnostics: Vec<ParseError>,
}

impl<'a> ParseState<'a> {
    fn new(source: &'a str, file_id: usize) -> Self {
        ParseState {
            source,
            file_id,
            scope: Scope::Preamble,
            document: Document::new(),
            diagnostics: Vec::new(),
        }
    }

    fn process_events(&mut self, events: &[(Event<'_>, Range<usize>)]) {
        let mut i = 0;

        while i < events.len() {
            let (ref ev, ref range) = events[i];

            match ev {
                Event::Start(Tag::Heading { .. }) => {
                    let heading_span = range.clone();
                    i += 1;
                    let text = collect_heading_text(events, &mut i);
                    let text = normalize_heading(&text);

                    self.close_block(heading_span.start);
                    self.open_block(&text, heading_span);
                }

                // Each list item is one `name: value` field assignment
                Event::Start(Tag::List(_)) => {
                    i += 1;
                    self.process_list(events, &mut i);
                }

                // A fenced code block fills the kind's multi-line field
                Event::Start(Tag::CodeBlock(_)) => {
                    let span = range.clone();
                    i += 1;
                    let content = collect_text_until(events, &mut i, |e| {
                        matches!(e, TagEnd::CodeBlock)
                    });
                    self.assign_code_block(content, span);
                }

                _ => {
                    i += 1;
                }
            }
        }
    }

    fn open_block(&mut self, text: &str, span: Range<usize>) {
        match text.parse::<InstructionKind>() {
            Ok(kind) => {
                self.scope = Scope::Block(BlockBuilder {
                    kind,
                    values: FieldValues::new(),
                    seen: HashSet::new(),
                    span_start: span.start,
                });
            }
            Err(err) => {
                let expected: Vec<&str> =
                    InstructionKind::ALL.iter().map(|k| k.keyword()).collect();
                self.diagnostics.push(
                    ParseError::error(err.to_string(), trim_span(self.source, span), self.file_id)
                        .with_note(format!("expected one of: {}", expected.join(", "))),
                );
                self.scope = Scope::Unknown;
            }
        }
    }

    fn close_block(&mut self, span_end: usize) {
        let scope = std::mem::replace(&mut self.scope, Scope::Preamble);
        if let Scope::Block(builder) = scope {
            let span = trim_span(self.source, builder.span_start..span_end);
            self.document
                .push_parsed(builder.kind, builder.values, span);
        }
    }

    fn process_list(&mut self, events: &[(Event<'_>, Range<usize>)], i: &mut usize) {
        while *i < events.len() {
            let (ref ev, ref range) = events[*i];
            match ev {
                Event::End(TagEnd::List(_)) => {
                    *i += 1;
                    break;
                }
                Event::Start(Tag::Item) => {
                    let span = trim_span(self.source, range.clone());
                    *i += 1;
                    skip_item(events, i);
                    self.assign_item(span);
                }
                _ => {
                    *i += 1;
                }
            }
        }
    }

    /// Interpret the raw source of a list item as `name: value`.
    ///
    /// The raw text is used instead of the rendered inline events so values
    /// like `*.json` or `a_b_c` survive untouched.
    fn assign_item(&mut self, span: Range<usize>) {
        let file_id = self.file_id;
        let builder = match &mut self.scope {
            Scope::Block(builder) => builder,
            Scope::Unknown => return,
            Scope::Preamble => {
                self.diagnostics.push(
                    ParseError::error("field given before any instruction heading", span, file_id)
                        .with_note("start a block with a heading such as `# FROM`"),
                );
                return;
            }
        };

        let text = strip_list_marker(&self.source[span.clone()]);
        let Some((name, value)) = text.split_once(':') else {
            self.diagnostics.push(
                ParseError::error("expected `name: value`", span, file_id)
                    .with_note(field_list_note(builder.kind)),
            );
            return;
        };
        let name = name.trim().trim_matches('`');
        let value = value.trim();

        let Some(field) = builder.kind.field(name) else {
            self.diagnostics.push(
                ParseError::error(
                    format!("{} has no field `{}`", builder.kind, name),
                    span,
                    file_id,
                )
                .with_note(field_list_note(builder.kind)),
            );
            return;
        };

        if !builder.seen.insert(field.name) {
            self.diagnostics.push(ParseError::warning(
                format!("field `{}` is set more than once; the last value is used", field.name),
                span,
                file_id,
            ));
        }
        builder.values.set(field.name, value);
    }

    fn assign_code_block(&mut self, content: String, span: Range<usize>) {
        let file_id = self.file_id;
        let builder = match &mut self.scope {
            Scope::Block(builder) => builder,
            Scope::Unknown => return,
            Scope::Preamble => {
                self.diagnostics.push(ParseError::error(
                    "code block given before any instruction heading",
                    span,
                    file_id,
                ));
                return;
            }
        };

        let Some(field) = builder.kind.multi_line_field() else {
            self.diagnostics.push(
                ParseError::error(
                    format!("{} does not take a code block", builder.kind),
                    span,
                    file_id,
                )
                .with_note(field_list_note(builder.kind)),
            );
            return;
        };

        if !builder.seen.insert(field.name) {
            self.diagnostics.push(ParseError::warning(
                format!("field `{}` is set more than once; the last value is used", field.name),
                span,
                file_id,
            ));
        }
        builder.values.set(field.name, content.trim());
    }

    fn finalize(mut self) -> (Document, Vec<ParseError>) {
        self.close_block(self.source.len());
        (self.document, self.diagnostics)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Collect heading text (all Text events until End(Heading)).
fn collect_heading_text(events: &[(Event<'_>, Range<usize>)], i: &mut usize) -> String {
    let mut name = String::new();
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        match ev {
            Event::End(TagEnd::Heading(_)) => {
                *i += 1;
                break;
            }
            Event::Text(s) | Event::Code(s) => {
                name.push_str(s);
                *i += 1;
            }
            _ => {
                *i += 1;
            }
        }
    }
    name
}

fn normalize_heading(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collect all text content until a matching End tag.
fn collect_text_until(
    events: &[(Event<'_>, Range<usize>)],
    i: &mut usize,
    is_end: impl Fn(&TagEnd) -> bool,
) -> String {
    let mut text = String::new();
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        match ev {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            Event::Text(s) => {
                text.push_str(s);
                *i += 1;
            }
            _ => {
                *i += 1;
            }
        }
    }
    text
}

/// Advance past the events of one list item, nested items included.
fn skip_item(events: &[(Event<'_>, Range<usize>)], i: &mut usize) {
    let mut depth = 1u32;
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        *i += 1;
        match ev {
            Event::Start(Tag::Item) => depth += 1,
            Event::End(TagEnd::Item) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
}

/// Drop the `-`, `*`, `+`, `1.` or `1)` marker and fold continuation lines.
fn strip_list_marker(item: &str) -> String {
    let item = item.trim_start();
    let rest = if let Some(rest) = item.strip_prefix(['-', '*', '+']) {
        rest
    } else {
        let digits = item.chars().take_while(char::is_ascii_digit).count();
        item[digits..]
            .strip_prefix(['.', ')'])
            .filter(|_| digits > 0)
            .unwrap_or(item)
    };
    rest.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shrink a span so it ends before trailing whitespace.
fn trim_span(source: &str, span: Range<usize>) -> Range<usize> {
    let end = span.start + source[span.clone()].trim_end().len();
    span.start..end
}

fn field_list_note(kind: InstructionKind) -> String {
    let names: Vec<&str> = kind.fields().iter().map(|f| f.name).collect();
    format!("{} fields: {}", kind, names.join(", "))
}
