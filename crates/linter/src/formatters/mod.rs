/// Built-in formatters
///
/// Each formatter rewrites a whole file and must be idempotent: formatting
/// its own output yields the same text. Lines inside multi-line string
/// literals and block comments keep their indentation.
use crate::source::LineIndex;

mod javascript;
mod python;
mod typescript;
mod whitespace;

pub use javascript::{JavaScriptFormatter, ScriptFormatOptions};
pub use python::{PythonFormatter, PythonFormatterOptions};
pub use typescript::TypeScriptFormatter;
pub use whitespace::{WhitespaceFormatter, WhitespaceFormatterOptions};

/// For each 0-based line, whether it continues a literal that started on an earlier line
pub(crate) fn protected_lines(
    text: &str,
    ranges: impl IntoIterator<Item = (usize, usize)>,
) -> Vec<bool> {
    let index = LineIndex::new(text);
    let mut protected = vec![false; index.line_count()];
    for (start, end) in ranges {
        let (first, _) = index.line_col(start);
        let (last, _) = index.line_col(end);
        for line in protected.iter_mut().take(last + 1).skip(first + 1) {
            *line = true;
        }
    }
    protected
}

/// Rewrite the leading whitespace of every unprotected line with `reindent`
pub(crate) fn reindent_lines(
    text: &str,
    protected: &[bool],
    reindent: impl Fn(&str) -> String,
) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split_inclusive('\n').enumerate() {
        if protected.get(i).copied().unwrap_or(false) {
            out.push_str(line);
            continue;
        }
        let body = line.trim_start_matches([' ', '\t']);
        let leading = &line[..line.len() - body.len()];
        out.push_str(&reindent(leading));
        out.push_str(body);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_lines() {
        let text = "a = '''x\n  y\n  z'''\nb\n";
        let protected = protected_lines(text, [(4, 18)]);
        assert_eq!(protected, vec![false, true, true, false, false]);
    }

    #[test]
    fn test_reindent_lines_skips_protected() {
        let text = "\tone\n\ttwo\n";
        let out = reindent_lines(text, &[false, true], |lead| lead.replace('\t', "  "));
        assert_eq!(out, "  one\n\ttwo\n");
    }
}
