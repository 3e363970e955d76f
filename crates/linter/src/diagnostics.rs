use crate::source::SourceSpan;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A text edit representing a change to apply to fix a lint issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Byte offset range in the file
    pub offset_range: OffsetRange,
    /// The text to replace the range with (empty string means deletion)
    pub new_text: String,
}

impl TextEdit {
    /// Create a new text edit
    #[must_use]
    pub fn new(start: usize, end: usize, new_text: impl Into<String>) -> Self {
        Self {
            offset_range: OffsetRange::new(start, end),
            new_text: new_text.into(),
        }
    }

    /// Create a deletion edit (replace range with empty string)
    #[must_use]
    pub fn delete(start: usize, end: usize) -> Self {
        Self {
            offset_range: OffsetRange::new(start, end),
            new_text: String::new(),
        }
    }

    /// Create an insertion edit (insert text at position)
    #[must_use]
    pub fn insert(position: usize, text: impl Into<String>) -> Self {
        Self {
            offset_range: OffsetRange::at(position),
            new_text: text.into(),
        }
    }
}

/// A code fix that can be applied to resolve a lint diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFix {
    /// Human-readable description of what the fix does
    pub label: String,
    /// The text edits to apply (in order)
    pub edits: Vec<TextEdit>,
}

impl CodeFix {
    /// Create a new code fix
    #[must_use]
    pub fn new(label: impl Into<String>, edits: Vec<TextEdit>) -> Self {
        Self {
            label: label.into(),
            edits,
        }
    }

    /// Create a simple deletion fix
    #[must_use]
    pub fn delete(label: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            edits: vec![TextEdit::delete(start, end)],
        }
    }
}

/// A single reported issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintDiagnostic {
    /// Byte range plus 1-based line/column of the start
    pub span: SourceSpan,
    /// Severity (from rule default or config override)
    pub severity: LintSeverity,
    /// Human-readable message
    pub message: String,
    /// Rule identifier (e.g., `"python-imports"`)
    pub rule: String,
    /// Offending source line(s)
    pub source: Option<String>,
    /// Optional auto-fix for this diagnostic
    pub fix: Option<CodeFix>,
}

impl LintDiagnostic {
    /// Create a new lint diagnostic
    #[must_use]
    pub fn new(
        span: SourceSpan,
        severity: LintSeverity,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            span,
            severity,
            message: message.into(),
            rule: rule.into(),
            source: None,
            fix: None,
        }
    }

    /// Create a warning diagnostic
    #[must_use]
    pub fn warning(span: SourceSpan, message: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::new(span, LintSeverity::Warning, message, rule)
    }

    /// Create an error diagnostic
    #[must_use]
    pub fn error(span: SourceSpan, message: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::new(span, LintSeverity::Error, message, rule)
    }

    /// Create an info diagnostic
    #[must_use]
    pub fn info(span: SourceSpan, message: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::new(span, LintSeverity::Info, message, rule)
    }

    /// Attach the offending source text
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add an auto-fix to this diagnostic
    #[must_use]
    pub fn with_fix(mut self, fix: CodeFix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Returns true if this diagnostic has an auto-fix available
    #[must_use]
    pub const fn has_fix(&self) -> bool {
        self.fix.is_some()
    }

    /// 1-based line
    #[must_use]
    pub const fn line(&self) -> usize {
        self.span.line
    }

    /// 1-based column
    #[must_use]
    pub const fn column(&self) -> usize {
        self.span.column
    }
}

/// Byte offset range in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OffsetRange {
    pub start: usize,
    pub end: usize,
}

impl std::fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl OffsetRange {
    /// Create a new offset range
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a zero-width range at an offset
    #[must_use]
    pub const fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Whether two ranges share any byte, or an insertion sits strictly inside the other
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
            || (self.start == self.end && other.start < self.start && self.start < other.end)
            || (other.start == other.end && self.start < other.start && other.start < self.end)
    }
}

/// Lint severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Diagnostics for one file, ordered by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintResult {
    pub path: PathBuf,
    pub diagnostics: Vec<LintDiagnostic>,
    /// Number of fixes written back to the file
    pub fixes_applied: usize,
}

impl LintResult {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, diagnostics: Vec<LintDiagnostic>) -> Self {
        Self {
            path: path.into(),
            diagnostics,
            fixes_applied: 0,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn count(&self, severity: LintSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == LintSeverity::Error)
    }

    #[must_use]
    pub fn fixable_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.has_fix()).count()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> SourceSpan {
        SourceSpan {
            start,
            end,
            line: 1,
            column: start + 1,
        }
    }

    #[test]
    fn test_offset_range_at() {
        let range = OffsetRange::at(15);
        assert_eq!(range.start, 15);
        assert_eq!(range.end, 15);
    }

    #[test]
    fn test_offset_range_overlaps() {
        assert!(OffsetRange::new(0, 5).overlaps(&OffsetRange::new(4, 8)));
        assert!(!OffsetRange::new(0, 5).overlaps(&OffsetRange::new(5, 8)));
        assert!(OffsetRange::at(3).overlaps(&OffsetRange::new(0, 5)));
        assert!(!OffsetRange::at(5).overlaps(&OffsetRange::new(0, 5)));
        assert!(!OffsetRange::at(2).overlaps(&OffsetRange::at(2)));
    }

    #[test]
    fn test_lint_diagnostic_warning() {
        let diag = LintDiagnostic::warning(span(5, 10), "Test warning", "test-rule");
        assert_eq!(diag.severity, LintSeverity::Warning);
        assert_eq!(diag.message, "Test warning");
        assert_eq!(diag.rule, "test-rule");
        assert_eq!(diag.column(), 6);
        assert!(!diag.has_fix());
    }

    #[test]
    fn test_text_edit_insert() {
        let edit = TextEdit::insert(10, "inserted text");
        assert_eq!(edit.offset_range, OffsetRange::at(10));
        assert_eq!(edit.new_text, "inserted text");
    }

    #[test]
    fn test_diagnostic_with_fix_and_source() {
        let diag = LintDiagnostic::warning(span(5, 10), "Test warning", "test-rule")
            .with_source("x = 1  ")
            .with_fix(CodeFix::delete("Fix it", 5, 10));
        assert!(diag.has_fix());
        assert_eq!(diag.source.as_deref(), Some("x = 1  "));
        assert_eq!(diag.fix.unwrap().edits[0].new_text, "");
    }

    #[test]
    fn test_severity_display_and_serde() {
        assert_eq!(LintSeverity::Warning.to_string(), "warning");
        assert_eq!(serde_json::to_string(&LintSeverity::Error).unwrap(), "\"error\"");
    }

    #[test]
    fn test_lint_result_counts() {
        let result = LintResult::new(
            "a.py",
            vec![
                LintDiagnostic::error(span(0, 1), "e", "r"),
                LintDiagnostic::warning(span(1, 2), "w", "r")
                    .with_fix(CodeFix::delete("d", 1, 2)),
                LintDiagnostic::info(span(2, 3), "i", "r"),
            ],
        );
        assert!(result.has_errors());
        assert_eq!(result.count(LintSeverity::Warning), 1);
        assert_eq!(result.fixable_count(), 1);
        assert!(!result.is_clean());
    }
}
