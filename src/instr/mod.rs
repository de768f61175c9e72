//! The instruction AST and its per-form parsers (§3.3, §4.2).

pub mod ast;
pub mod dispatch;
pub mod forms;
pub mod scan;

pub use ast::{FunctionKind, Instruction};
pub use dispatch::InstructionParser;
