mod canvas;

use crate::block::{Block, BlockId, FieldValues};
use crate::instruction::{InputShape, InstructionKind};

/// Reasons an edit of a block's values is rejected. A rejected edit leaves
/// the document untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("no block with id {0}")]
    UnknownBlock(BlockId),

    #[error("{kind} has no field `{field}`")]
    UnknownField {
        kind: InstructionKind,
        field: String,
    },

    #[error("{kind} field `{field}` takes a single line")]
    LineBreak {
        kind: InstructionKind,
        field: &'static str,
    },

    #[error("required field(s) left empty: {}", .fields.join(", "))]
    MissingRequired { fields: Vec<&'static str> },
}

/// The ordered sequence of blocks on the canvas.
///
/// Order is the order instructions are emitted in. Block ids come from a
/// per-document counter and are never reused, even after `clear`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    blocks: Vec<Block>,
    next_id: u64,
    /// File id of the canvas this document was parsed from; finding labels
    /// point into that file.
    pub source_id: usize,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    /// Append a fresh block of `kind` with its initial values.
    pub fn add(&mut self, kind: InstructionKind) -> BlockId {
        self.insert(self.blocks.len(), kind)
    }

    /// Place a fresh block of `kind` at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, kind: InstructionKind) -> BlockId {
        let values = kind
            .fields()
            .iter()
            .filter(|f| !f.initial_value().is_empty())
            .map(|f| (f.name, f.initial_value()))
            .collect();
        self.insert_block(index, kind, values, None)
    }

    /// Append a block with exactly the given values, unchecked.
    pub fn add_with_values(&mut self, kind: InstructionKind, values: FieldValues) -> BlockId {
        self.insert_block(self.blocks.len(), kind, values, None)
    }

    pub(crate) fn push_parsed(
        &mut self,
        kind: InstructionKind,
        values: FieldValues,
        span: std::ops::Range<usize>,
    ) -> BlockId {
        self.insert_block(self.blocks.len(), kind, values, Some(span))
    }

    fn insert_block(
        &mut self,
        index: usize,
        kind: InstructionKind,
        values: FieldValues,
        span: Option<std::ops::Range<usize>>,
    ) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        let index = index.min(self.blocks.len());
        self.blocks.insert(
            index,
            Block {
                id,
                kind,
                values,
                span,
            },
        );
        tracing::debug!(%id, %kind, index, "block added");
        id
    }

    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        let index = self.position(id)?;
        tracing::debug!(%id, "block removed");
        Some(self.blocks.remove(index))
    }

    /// Move a block so it ends up at `index` (clamped to the end).
    /// Returns false when the id is unknown.
    pub fn move_to(&mut self, id: BlockId, index: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let block = self.blocks.remove(from);
        let to = index.min(self.blocks.len());
        self.blocks.insert(to, block);
        tracing::debug!(%id, from, to, "block moved");
        true
    }

    /// Replace every value of a block at once.
    ///
    /// Values are trimmed. Every required field of the kind must end up
    /// non-empty, every key must name a field of the kind, and only
    /// multi-line fields may contain line breaks.
    pub fn edit(&mut self, id: BlockId, values: FieldValues) -> Result<(), EditError> {
        let index = self.position(id).ok_or(EditError::UnknownBlock(id))?;
        let kind = self.blocks[index].kind;

        let mut trimmed = FieldValues::new();
        for (name, value) in values.iter() {
            let Some(field) = kind.field(name) else {
                return Err(EditError::UnknownField {
                    kind,
                    field: name.to_string(),
                });
            };
            let value = value.trim();
            if field.shape == InputShape::Text && value.contains(['\n', '\r']) {
                return Err(EditError::LineBreak {
                    kind,
                    field: field.name,
                });
            }
            trimmed.set(field.name, value);
        }

        let missing: Vec<&'static str> = kind
            .fields()
            .iter()
            .filter(|f| f.required && !trimmed.is_present(f.name))
            .map(|f| f.name)
            .collect();
        if !missing.is_empty() {
            return Err(EditError::MissingRequired { fields: missing });
        }

        self.blocks[index].values = trimmed;
        tracing::debug!(%id, "block edited");
        Ok(())
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Whether a base-image block exists. The editor prompts for one
    /// until it does.
    pub fn has_base_image(&self) -> bool {
        self.blocks.iter().any(|b| b.is(InstructionKind::From))
    }

    /// The complete build file: one generated line per block, in order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            out.push_str(&block.generate());
            out.push('\n');
        }
        out
    }

    /// Serialize to the Markdown canvas format read by [`crate::parser::Parser`].
    pub fn to_canvas(&self) -> String {
        canvas::write(self)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
