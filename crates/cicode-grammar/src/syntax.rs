//! Reading Cicode syntax trees without recursion.
//!
//! Trees for deeply nested input can be far deeper than a thread stack
//! allows, so every walk here goes through a [`TreeCursor`].

use std::fmt::Write;
use std::ops::Range;

use tree_sitter::{Node, Point, TreeCursor};

/// A syntax problem found in a parsed tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: Range<usize>,
    pub start: Point,
}

/// Every `ERROR` and missing node under `root`, outermost first, in source
/// order.
pub fn syntax_errors(root: Node<'_>, source: &str) -> Vec<SyntaxError> {
    let mut errors = Vec::new();
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let descend = node.has_error() && !record_error(node, source, &mut errors);
        if !(descend && cursor.goto_first_child()) && !advance(&mut cursor, |_| {}) {
            return errors;
        }
    }
}

/// Push a [`SyntaxError`] when `node` itself is the problem.
fn record_error(node: Node<'_>, source: &str, errors: &mut Vec<SyntaxError>) -> bool {
    let message = if node.is_missing() {
        match node.kind() {
            "\n" => "expected a line break after the function header".to_string(),
            kind if node.is_named() => format!("missing {kind}"),
            kind => format!("missing `{kind}`"),
        }
    } else if node.is_error() {
        let text = source.get(node.byte_range()).unwrap_or_default();
        let first_line = text.lines().next().unwrap_or_default().trim();
        if first_line.chars().count() > 40 {
            let short: String = first_line.chars().take(40).collect();
            format!("unexpected `{short}...`")
        } else {
            format!("unexpected `{first_line}`")
        }
    } else {
        return false;
    };
    errors.push(SyntaxError {
        message,
        range: node.byte_range(),
        start: node.start_position(),
    });
    true
}

/// Move to the next node in pre-order that is not below the current one,
/// calling `leave` for every node the cursor climbs out of. Returns `false`
/// once the walk is back at its starting node.
fn advance(cursor: &mut TreeCursor<'_>, mut leave: impl FnMut(Node<'_>)) -> bool {
    loop {
        if cursor.goto_next_sibling() {
            return true;
        }
        if !cursor.goto_parent() {
            return false;
        }
        leave(cursor.node());
    }
}

/// Render `node` as an s-expression of its named and missing nodes.
pub fn to_sexp(node: Node<'_>) -> String {
    let mut out = String::new();
    let mut cursor = node.walk();
    loop {
        let current = cursor.node();
        let visible = is_visible(current);
        if visible {
            if !out.is_empty() {
                out.push(' ');
            }
            if let Some(field) = cursor.field_name() {
                let _ = write!(out, "{field}: ");
            }
            match (current.is_missing(), current.is_named()) {
                (true, true) => {
                    let _ = write!(out, "(MISSING {}", current.kind());
                }
                (true, false) => {
                    let _ = write!(out, "(MISSING {:?}", current.kind());
                }
                (false, _) => {
                    let _ = write!(out, "({}", current.kind());
                }
            }
        }
        if cursor.goto_first_child() {
            continue;
        }
        if visible {
            out.push(')');
        }
        let more = advance(&mut cursor, |parent| {
            if is_visible(parent) {
                out.push(')');
            }
        });
        if !more {
            return out;
        }
    }
}

fn is_visible(node: Node<'_>) -> bool {
    node.is_named() || node.is_missing()
}
