/// Built-in lint rule implementations
///
/// Each rule lives in its own file and implements [`FileLintRule`](crate::traits::FileLintRule).
/// Python rules work on the module view from [`crate::syntax::python`];
/// JavaScript and TypeScript rules walk the tree-sitter tree of the file.
use crate::diagnostics::{LintDiagnostic, LintSeverity};
use crate::source::SourceFile;
use crate::syntax::python::Module;

mod javascript_imports;
mod no_trailing_whitespace;
mod python_docstrings;
mod python_imports;
mod python_naming;
mod typescript_types;

pub use javascript_imports::{JavaScriptImportsOptions, JavaScriptImportsRuleImpl};
pub use no_trailing_whitespace::NoTrailingWhitespaceRuleImpl;
pub use python_docstrings::{DocstringStyle, PythonDocstringsOptions, PythonDocstringsRuleImpl};
pub use python_imports::{PythonImportsOptions, PythonImportsRuleImpl};
pub use python_naming::{NamingCase, PythonNamingOptions, PythonNamingRuleImpl};
pub use typescript_types::{TypeScriptTypesOptions, TypeScriptTypesRuleImpl};

/// Build a diagnostic for a byte range, attaching the line it starts on
pub(crate) fn report(
    file: &SourceFile,
    start: usize,
    end: usize,
    severity: LintSeverity,
    message: impl Into<String>,
    rule: &str,
) -> LintDiagnostic {
    let span = file.span(start, end);
    LintDiagnostic::new(span, severity, message, rule).with_source(file.line_text(span.line))
}

/// The parsed module, or the single `Syntax error` diagnostic Python rules report instead
pub(crate) fn python_module<'a>(
    file: &'a SourceFile,
    severity: LintSeverity,
    rule: &str,
) -> Result<&'a Module, LintDiagnostic> {
    file.python().map_err(|err| {
        report(
            file,
            err.offset,
            err.offset,
            severity,
            format!("Syntax error: {err}"),
            rule,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Language;

    #[test]
    fn test_python_module_syntax_error() {
        let file = SourceFile::new("a.py", Language::Python, "import os\nx = 1)\n");
        let diag = python_module(&file, LintSeverity::Warning, "python-imports").unwrap_err();
        assert!(diag.message.starts_with("Syntax error: "), "{}", diag.message);
        assert_eq!(diag.line(), 2);
        assert_eq!(diag.rule, "python-imports");
    }
}
