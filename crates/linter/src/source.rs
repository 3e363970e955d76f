use crate::syntax::{self, python, SyntaxError};
use crate::Language;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tree_sitter::Tree;

/// Byte offsets of line starts, for offset to line/column conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Create a new line index from source text
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];

        for (i, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a line/byte-column position (0-based)
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));

        let col = offset - self.line_starts[line];
        (line, col)
    }

    /// Get the byte offset of the start of a line (0-based)
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Get the number of lines
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Location of a diagnostic: byte range plus the 1-based line and column of its start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl SourceSpan {
    /// Zero-width span at the top of a file, for whole-file diagnostics
    #[must_use]
    pub const fn file_start() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// A file's text with lazily built syntax views
///
/// Rules share one `SourceFile` per lint pass, so each file is parsed at
/// most once.
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    language: Language,
    text: String,
    line_index: LineIndex,
    python: OnceLock<Result<python::Module, SyntaxError>>,
    script: OnceLock<Option<Tree>>,
}

impl SourceFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, language: Language, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            path: path.into(),
            language,
            line_index: LineIndex::new(&text),
            text,
            python: OnceLock::new(),
            script: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Build a span for a byte range
    #[must_use]
    pub fn span(&self, start: usize, end: usize) -> SourceSpan {
        let start = start.min(self.text.len());
        let (line, _) = self.line_index.line_col(start);
        let line_start = self.line_index.line_start(line).unwrap_or(0);
        let column = self
            .text
            .get(line_start..start)
            .map_or(0, |prefix| prefix.chars().count());
        SourceSpan {
            start,
            end: end.max(start).min(self.text.len()),
            line: line + 1,
            column: column + 1,
        }
    }

    /// Byte range of a 1-based line, without its line terminator
    #[must_use]
    pub fn line_range(&self, line: usize) -> Option<(usize, usize)> {
        let start = self.line_index.line_start(line.checked_sub(1)?)?;
        if start > self.text.len() {
            return None;
        }
        let end = self
            .line_index
            .line_start(line)
            .map_or(self.text.len(), |next| next - 1);
        let end = if self.text[start..end].ends_with('\r') {
            end - 1
        } else {
            end
        };
        Some((start, end))
    }

    /// Text of a 1-based line, without its line terminator
    #[must_use]
    pub fn line_text(&self, line: usize) -> &str {
        self.line_range(line)
            .map_or("", |(start, end)| &self.text[start..end])
    }

    /// Leading whitespace of the line containing `offset`
    #[must_use]
    pub fn indentation_at(&self, offset: usize) -> &str {
        let (line, _) = self.line_index.line_col(offset.min(self.text.len()));
        let text = self.line_text(line + 1);
        let trimmed = text.trim_start_matches([' ', '\t']);
        &text[..text.len() - trimmed.len()]
    }

    /// Line terminator used by the file, `\n` unless its first line ends in `\r\n`
    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        match self.text.find('\n') {
            Some(i) if self.text[..i].ends_with('\r') => "\r\n",
            _ => "\n",
        }
    }

    /// Python module view, parsed on first use
    pub fn python(&self) -> Result<&python::Module, &SyntaxError> {
        self.python
            .get_or_init(|| python::parse(&self.text))
            .as_ref()
    }

    /// JavaScript/TypeScript syntax tree, parsed on first use
    ///
    /// Trees with errors are kept; rules check what parsed cleanly.
    #[must_use]
    pub fn script_tree(&self) -> Option<&Tree> {
        self.script
            .get_or_init(|| syntax::parse(&self.path, self.language, &self.text))
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_col(0), (0, 0));
        assert_eq!(index.line_col(4), (1, 1));
        assert_eq!(index.line_col(6), (2, 0));
        assert_eq!(index.line_start(3), Some(7));
    }

    #[test]
    fn test_span_columns_count_characters() {
        let file = SourceFile::new("a.py", Language::Python, "x = 1\nnamé = 'ü' + y\n");
        let offset = file.text().find('y').unwrap();
        let span = file.span(offset, offset + 1);
        assert_eq!(span.line, 2);
        assert_eq!(span.column, 14);
    }

    #[test]
    fn test_line_text_strips_terminators() {
        let file = SourceFile::new("a.js", Language::JavaScript, "one\r\ntwo\nthree");
        assert_eq!(file.line_text(1), "one");
        assert_eq!(file.line_text(2), "two");
        assert_eq!(file.line_text(3), "three");
        assert_eq!(file.line_text(4), "");
        assert_eq!(file.line_text(0), "");
    }

    #[test]
    fn test_indentation_at() {
        let file = SourceFile::new("a.py", Language::Python, "def f():\n\t  return 1\n");
        let offset = file.text().find("return").unwrap();
        assert_eq!(file.indentation_at(offset), "\t  ");
    }

    #[test]
    fn test_line_ending() {
        assert_eq!(SourceFile::new("a.py", Language::Python, "x = 1\r\ny = 2\r\n").line_ending(), "\r\n");
        assert_eq!(SourceFile::new("a.py", Language::Python, "x = 1\n").line_ending(), "\n");
        assert_eq!(SourceFile::new("a.py", Language::Python, "x = 1").line_ending(), "\n");
    }

    #[test]
    fn test_script_tree_is_cached() {
        let file = SourceFile::new("a.ts", Language::TypeScript, "let a: number = 1;\n");
        let tree = file.script_tree().unwrap();
        assert_eq!(tree.root_node().kind(), "program");
        assert!(std::ptr::eq(tree, file.script_tree().unwrap()));
    }

    #[test]
    fn test_python_view_is_cached() {
        let file = SourceFile::new("a.py", Language::Python, "import os\n");
        assert!(std::ptr::eq(file.python().unwrap(), file.python().unwrap()));
    }
}
