//! Loading the compiled Cicode parse tables into a [`Language`] handle.

use derive_more::{Display, Error, From};
use tree_sitter::{Language, LanguageError, Parser};
use tree_sitter_language::LanguageFn;

/// The compiled parse tables linked into this crate.
pub fn grammar_artifact() -> LanguageFn {
    tree_sitter_cicode::LANGUAGE
}

/// Failure to turn compiled parse tables into a usable [`Language`].
#[derive(Debug, Display, Error, From, PartialEq, Eq)]
pub enum GrammarLoadError {
    #[display("Error loading Cicode grammar: the language function returned no tables")]
    Empty,

    #[from]
    #[display("Error loading Cicode grammar: {_0}")]
    Incompatible(LanguageError),
}

/// Build a [`Language`] from `tables` and check that a parser accepts it.
pub fn load_language(tables: LanguageFn) -> Result<Language, GrammarLoadError> {
    // SAFETY: the function comes from a generated parser or a test double and
    // only hands out a pointer to static tables.
    if unsafe { tables.into_raw()() }.is_null() {
        return Err(GrammarLoadError::Empty);
    }
    let language = Language::new(tables);
    Parser::new().set_language(&language)?;
    Ok(language)
}

/// The Cicode language.
pub fn language() -> Language {
    tree_sitter_cicode::language()
}

/// A parser with the Cicode language already set.
pub fn new_parser() -> Result<Parser, GrammarLoadError> {
    let mut parser = Parser::new();
    parser.set_language(&language())?;
    Ok(parser)
}

/// Load the linked tables and report whether they produced a usable handle.
pub fn verify_language_loads() -> Result<Language, GrammarLoadError> {
    match load_language(grammar_artifact()) {
        Ok(language) => {
            tracing::debug!(
                name = language.name(),
                abi_version = language.abi_version(),
                node_kinds = language.node_kind_count(),
                "Grammar loaded"
            );
            Ok(language)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Grammar failed to load");
            Err(err)
        }
    }
}
