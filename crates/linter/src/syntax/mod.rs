//! Tree-sitter parsing for the languages llamalint checks.
//!
//! Python trees are folded into a [`python::Module`] holding what the rules
//! and formatter need; a tree with error nodes becomes a [`SyntaxError`].
//! JavaScript and TypeScript rules walk the parsed tree directly.

pub mod python;

use crate::Language;
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// A parse failure with the byte offset of the first error node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Grammar for a file; `.tsx` needs the TSX variant of the TypeScript grammar
fn grammar(path: &Path, language: Language) -> tree_sitter::Language {
    match language {
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript
            if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("tsx")) =>
        {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        }
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    }
}

/// Parse `text` with the grammar for `path`
///
/// `None` only when the grammar cannot be loaded or parsing is cancelled.
pub fn parse(path: &Path, language: Language, text: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    if let Err(err) = parser.set_language(&grammar(path, language)) {
        tracing::warn!(%language, %err, "Failed to load grammar");
        return None;
    }
    parser.parse(text, None)
}

/// Source text of a node
pub(crate) fn text<'a>(node: Node<'_>, src: &'a str) -> &'a str {
    src.get(node.byte_range()).unwrap_or("")
}

/// First direct child of the given kind, named or anonymous
pub(crate) fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

/// Named children, collected so callers can keep walking the tree
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Visit `node` and its descendants in document order
pub(crate) fn visit<'t>(node: Node<'t>, f: &mut impl FnMut(Node<'t>)) {
    f(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, f);
    }
}

/// The first error or missing node of a tree that has one
pub(crate) fn first_error(root: Node<'_>, src: &str) -> Option<SyntaxError> {
    if !root.has_error() {
        return None;
    }
    let mut found = None;
    visit(root, &mut |node| {
        if found.is_some() || !(node.is_error() || node.is_missing()) {
            return;
        }
        let message = if node.is_missing() {
            if node.is_named() {
                format!("expected {}", node.kind())
            } else {
                format!("expected '{}'", node.kind())
            }
        } else {
            let snippet = text(node, src).lines().next().unwrap_or("").trim();
            if snippet.is_empty() {
                "invalid syntax".to_string()
            } else {
                let snippet: String = snippet.chars().take(20).collect();
                format!("unexpected '{snippet}'")
            }
        };
        found = Some(SyntaxError {
            message,
            offset: node.start_byte(),
        });
    });
    found.or_else(|| {
        Some(SyntaxError {
            message: "invalid syntax".to_string(),
            offset: root.start_byte(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_language() {
        for (path, language, source) in [
            ("a.py", Language::Python, "import os\n"),
            ("a.js", Language::JavaScript, "const a = <div />;\n"),
            ("a.ts", Language::TypeScript, "let a = <number>b;\n"),
            ("a.tsx", Language::TypeScript, "const a = <div />;\n"),
        ] {
            let tree = parse(Path::new(path), language, source).unwrap();
            assert!(!tree.root_node().has_error(), "{path}");
        }
    }

    #[test]
    fn test_first_error() {
        let src = "x = 1\ny = (2,\n";
        let tree = parse(Path::new("a.py"), Language::Python, src).unwrap();
        let err = first_error(tree.root_node(), src).unwrap();
        assert!(!err.message.is_empty());
        assert!(err.offset <= src.len());

        let clean = "x = 1\n";
        let tree = parse(Path::new("a.py"), Language::Python, clean).unwrap();
        assert!(first_error(tree.root_node(), clean).is_none());
    }
}
