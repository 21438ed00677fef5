//! Documentation comments attached to functions.
//!
//! Doc comment lines directly above a function may describe it with
//! `<summary>`, `<param name="...">` and `<returns>` tags:
//!
//! ```text
//! // <summary>Opens the alarm page.</summary>
//! // <param name="page">Page to open.</param>
//! // <returns>0 on success.</returns>
//! INT FUNCTION OpenPage(STRING page)
//! ```
//!
//! The grammar turns each tag into a `doc_summary`, `doc_param` or
//! `doc_returns` node; this module cleans up their contents.

use serde::Serialize;

use crate::ast::{Identifier, Span};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FunctionDoc {
    pub summary: Option<String>,
    pub params: Vec<DocParam>,
    pub returns: Option<String>,
}

/// A `<param name="...">` entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DocParam {
    pub name: Identifier,
    pub description: String,
    /// The span of the opening tag.
    pub span: Span,
}

impl FunctionDoc {
    /// Description of the parameter `name`. Cicode names are case-insensitive.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|param| param.name.eq_ignore_ascii_case(name))
            .map(|param| param.description.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.params.is_empty() && self.returns.is_none()
    }

    /// Record a summary. Only the first one counts.
    pub fn add_summary(&mut self, content: &str) {
        self.summary.get_or_insert_with(|| clean_content(content));
    }

    /// Record a parameter description from its opening tag text (for example
    /// `// <param name="x">`). Tags without a `name` attribute are ignored.
    pub fn add_param(&mut self, tag: &str, content: &str, span: Span) {
        let attributes = tag
            .split_once("<param")
            .map_or("", |(_, rest)| rest.trim_end_matches('>'));
        if let Some(name) = attribute(attributes, "name") {
            self.params.push(DocParam {
                name,
                description: clean_content(content),
                span,
            });
        }
    }

    /// Record a return value description. Only the first one counts.
    pub fn add_returns(&mut self, content: &str) {
        self.returns.get_or_insert_with(|| clean_content(content));
    }
}

/// Drop the comment markers of continuation lines and collapse whitespace.
fn clean_content(content: &str) -> String {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                line
            } else {
                strip_comment_marker(line)
            }
        })
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_comment_marker(line: &str) -> &str {
    let line = line.trim_start();
    line.strip_prefix("//")
        .or_else(|| line.strip_prefix('!'))
        .unwrap_or(line)
}

/// The value of the attribute `name` in `key="value"` pairs. Keys are
/// whole words and compared without regard to case.
fn attribute(attributes: &str, name: &str) -> Option<String> {
    let mut rest = attributes.trim_start();
    while !rest.is_empty() {
        let key_len = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let (key, after) = rest.split_at(key_len);
        let after = after.trim_start();
        let Some(value) = after.strip_prefix('=') else {
            // An attribute without a value.
            rest = after;
            continue;
        };
        let value = value.trim_start();
        let (text, next) = match value.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &value[1..];
                let end = body.find(quote)?;
                (&body[..end], &body[end + 1..])
            }
            _ => {
                let end = value.find(char::is_whitespace).unwrap_or(value.len());
                value.split_at(end)
            }
        };
        if key.eq_ignore_ascii_case(name) {
            return Some(text.to_string());
        }
        rest = next.trim_start();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_line_content() {
        let mut doc = FunctionDoc::default();
        doc.add_summary("\n//   Adds two   numbers.\n! Quickly.\n// ");
        assert_eq!(doc.summary.as_deref(), Some("Adds two numbers. Quickly."));
    }

    #[test]
    fn test_first_entry_wins() {
        let mut doc = FunctionDoc::default();
        doc.add_returns("The sum.");
        doc.add_returns("Something else.");
        assert_eq!(doc.returns.as_deref(), Some("The sum."));
        assert!(doc.summary.is_none());
    }

    #[test]
    fn test_params() {
        let mut doc = FunctionDoc::default();
        doc.add_param("// <param name=\"a\">", "First operand.", Span::new(0, 19));
        doc.add_param("! <param  NAME = 'b' >", " Second operand. ", Span::new(20, 42));
        doc.add_param("// <param>", "no name", Span::new(43, 53));
        assert_eq!(doc.param("A"), Some("First operand."));
        assert_eq!(doc.param("b"), Some("Second operand."));
        assert_eq!(doc.params.len(), 2);
        assert_eq!(doc.params[1].span, Span::new(20, 42));
    }

    #[test]
    fn test_attribute_names_are_whole_words() {
        assert_eq!(attribute(" xname=\"a\"", "name"), None);
        assert_eq!(attribute(" xname=\"a\" name=\"b\"", "name").as_deref(), Some("b"));
        assert_eq!(attribute(" names=\"a\"", "name"), None);
        assert_eq!(attribute(" optional name=c", "name").as_deref(), Some("c"));
        assert_eq!(attribute(" name=\"unclosed", "name"), None);
        assert_eq!(attribute("", "name"), None);
    }

    #[test]
    fn test_param_tag_with_lookalike_attribute() {
        let mut doc = FunctionDoc::default();
        doc.add_param("// <param xname=\"a\">", "ignored", Span::new(0, 20));
        assert!(doc.is_empty());
    }
}
