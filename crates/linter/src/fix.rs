/// Applying fix edits to source text and writing results back to disk
use crate::diagnostics::{LintDiagnostic, OffsetRange, TextEdit};
use crate::error::{LintError, Result};
use std::io::Write;
use std::path::Path;

/// Outcome of [`apply_fixes`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub content: String,
    /// Diagnostics whose fix was applied in full
    pub applied: usize,
}

/// Apply the fixes attached to `diagnostics`
///
/// Edits are applied from the end of the file towards the start. A fix
/// whose edits overlap an edit of an already accepted fix is skipped as a
/// whole, as is a fix with an edit outside the content.
#[must_use]
pub fn apply_fixes(content: &str, diagnostics: &[LintDiagnostic]) -> FixOutcome {
    let mut fixes: Vec<&LintDiagnostic> = diagnostics.iter().filter(|d| d.has_fix()).collect();
    // Latest-starting fix first
    fixes.sort_by_key(|d| std::cmp::Reverse(last_edit_start(d)));

    let mut accepted: Vec<&TextEdit> = Vec::new();
    let mut applied = 0;
    'fixes: for diagnostic in fixes {
        let edits = diagnostic.fix.as_ref().map_or(&[][..], |f| f.edits.as_slice());
        for edit in edits {
            let range = edit.offset_range;
            if range.start > range.end
                || range.end > content.len()
                || !content.is_char_boundary(range.start)
                || !content.is_char_boundary(range.end)
            {
                tracing::warn!(
                    rule = %diagnostic.rule,
                    start = range.start,
                    end = range.end,
                    len = content.len(),
                    "Edit range out of bounds, skipping fix"
                );
                continue 'fixes;
            }
            if accepted.iter().any(|e| e.offset_range.overlaps(&range)) {
                tracing::debug!(rule = %diagnostic.rule, "Skipping fix overlapping an earlier fix");
                continue 'fixes;
            }
        }
        accepted.extend(edits);
        applied += 1;
    }

    // At equal starts the replacement goes first so an insertion lands before it
    accepted.sort_by_key(|e| std::cmp::Reverse((e.offset_range.start, e.offset_range.end)));
    let mut result = content.to_string();
    for edit in accepted {
        let range: OffsetRange = edit.offset_range;
        result.replace_range(range.start..range.end, &edit.new_text);
    }

    FixOutcome {
        content: result,
        applied,
    }
}

fn last_edit_start(diagnostic: &LintDiagnostic) -> usize {
    diagnostic
        .fix
        .iter()
        .flat_map(|f| &f.edits)
        .map(|e| e.offset_range.start)
        .max()
        .unwrap_or(0)
}

/// Replace the file at `path` with `content` via a temporary file in the same directory
///
/// An existing file keeps its permissions.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let io_err = |source| LintError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    temp.write_all(content.as_bytes()).map_err(io_err)?;
    if let Ok(metadata) = std::fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(io_err)?;
    }
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CodeFix, LintSeverity};
    use crate::source::SourceSpan;

    fn fixable(edits: Vec<TextEdit>) -> LintDiagnostic {
        LintDiagnostic::new(SourceSpan::default(), LintSeverity::Warning, "msg", "test-rule")
            .with_fix(CodeFix::new("fix", edits))
    }

    #[test]
    fn test_apply_fixes_end_to_start() {
        let content = "a  \nb \n";
        let diagnostics = vec![
            fixable(vec![TextEdit::delete(1, 3)]),
            fixable(vec![TextEdit::delete(5, 6)]),
        ];
        let outcome = apply_fixes(content, &diagnostics);
        assert_eq!(outcome.content, "a\nb\n");
        assert_eq!(outcome.applied, 2);
    }

    #[test]
    fn test_apply_fixes_skips_overlapping() {
        let content = "hello world";
        let diagnostics = vec![
            fixable(vec![TextEdit::new(0, 5, "HELLO")]),
            fixable(vec![TextEdit::new(3, 8, "xx")]),
        ];
        let outcome = apply_fixes(content, &diagnostics);
        assert_eq!(outcome.content, "helxxrld");
        assert_eq!(outcome.applied, 1);
    }

    #[test]
    fn test_apply_fixes_skips_out_of_range() {
        let content = "abc";
        let diagnostics = vec![
            fixable(vec![TextEdit::new(2, 10, "x")]),
            fixable(vec![TextEdit::insert(0, "> ")]),
        ];
        let outcome = apply_fixes(content, &diagnostics);
        assert_eq!(outcome.content, "> abc");
        assert_eq!(outcome.applied, 1);
    }

    #[test]
    fn test_multi_edit_fix() {
        let content = "import os, sys\n";
        let diagnostics = vec![fixable(vec![
            TextEdit::new(9, 11, "\nimport "),
            TextEdit::insert(0, "# split\n"),
        ])];
        let outcome = apply_fixes(content, &diagnostics);
        assert_eq!(outcome.content, "# split\nimport os\nimport sys\n");
    }

    #[test]
    fn test_write_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        std::fs::write(&path, "old").unwrap();
        write_atomic(&path, "new\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.py");
        std::fs::write(&path, "#!/usr/bin/env python\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        write_atomic(&path, "#!/usr/bin/env python3\n").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_write_atomic_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.py");
        write_atomic(&path, "x = 1\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x = 1\n");
    }
}
