pub mod values;

use std::fmt;
use std::ops::Range;

use crate::instruction::InstructionKind;

pub use values::FieldValues;

/// Opaque block identifier, unique for the lifetime of its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

/// One placed instance of an instruction kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: InstructionKind,
    pub values: FieldValues,
    /// Byte span in the canvas source this block was read from, if any.
    pub span: Option<Range<usize>>,
}

impl Block {
    /// The build-file line this block contributes.
    pub fn generate(&self) -> String {
        self.kind.generate(&self.values)
    }

    /// Value of `field`, or `""` when unset.
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field)
    }

    pub fn is(&self, kind: InstructionKind) -> bool {
        self.kind == kind
    }
}
