//! Cicode language support for the [tree-sitter][] parsing library.
//!
//! ```
//! let mut parser = tree_sitter::Parser::new();
//! parser
//!     .set_language(&tree_sitter_cicode::language())
//!     .expect("Error loading Cicode grammar");
//! let tree = parser.parse("FUNCTION Main()\nEND\n", None).unwrap();
//! assert!(!tree.root_node().has_error());
//! ```
//!
//! [tree-sitter]: https://tree-sitter.github.io/

use tree_sitter_language::LanguageFn;

unsafe extern "C" {
    fn tree_sitter_cicode() -> *const ();
}

/// The raw language function exported by the generated parser.
pub const LANGUAGE: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_cicode) };

/// The tree-sitter Language for Cicode.
pub fn language() -> tree_sitter::Language {
    tree_sitter::Language::new(LANGUAGE)
}

/// The content of the [`node-types.json`][] file for this grammar.
///
/// [`node-types.json`]: https://tree-sitter.github.io/tree-sitter/using-parsers#static-node-types
pub const NODE_TYPES: &str = include_str!("../src/node-types.json");

/// The syntax highlighting query for this language.
pub const HIGHLIGHTS_QUERY: &str = "";

/// The syntax injection query for this language.
pub const INJECTIONS_QUERY: &str = "";

/// The symbol tagging query for this language.
pub const LOCALS_QUERY: &str = "";
