pub mod block;
pub mod document;
pub mod instruction;
pub mod parser;
pub mod runtime;
pub mod sample;
pub mod tokenize;

pub use block::{Block, BlockId, FieldValues};
pub use document::{Document, EditError};
pub use instruction::{Category, FieldSpec, InputShape, InstructionKind};
pub use runtime::ContainerRuntime;
pub use sample::{SAMPLES, Sample};
pub use tokenize::tokenize;
