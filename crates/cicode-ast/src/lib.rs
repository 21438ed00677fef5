//! Typed syntax for Cicode, lowered from the concrete syntax tree.
pub mod ast;
pub mod doc;
pub mod parser;
pub mod validate;

pub use ast::*;
pub use doc::{DocParam, FunctionDoc};
pub use parser::{CicodeParser, LowerError, parse_source_file};
pub use validate::validate_program;
