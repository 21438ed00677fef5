//! The Cicode grammar: the tree-sitter [`Language`] handle, the check that
//! it loads, and helpers for reading the trees it produces.

mod language;
mod syntax;

pub use language::{
    GrammarLoadError, grammar_artifact, language, load_language, new_parser,
    verify_language_loads,
};
pub use syntax::{SyntaxError, syntax_errors, to_sexp};
pub use tree_sitter::{Language, Node, Parser, Point, Tree, TreeCursor};
pub use tree_sitter_cicode::NODE_TYPES;
