mod config;
mod diagnostics;
mod error;
mod fix;
mod formatters;
mod language;
mod linter;
mod registry;
mod rules;
mod source;
mod syntax;
mod traits;
mod walker;

pub use config::{LintConfig, LintRuleConfig, LintSeverity, Preset, RuleOptions};
pub use diagnostics::{
    CodeFix, LintDiagnostic, LintResult, LintSeverity as DiagnosticSeverity, OffsetRange,
    TextEdit,
};
pub use error::{LintError, Result};
pub use fix::{apply_fixes, write_atomic, FixOutcome};
pub use formatters::{
    JavaScriptFormatter, PythonFormatter, PythonFormatterOptions, ScriptFormatOptions,
    TypeScriptFormatter, WhitespaceFormatter, WhitespaceFormatterOptions,
};
pub use language::Language;
pub use linter::{Linter, DIRECTORY_ERROR, FILE_ERROR};
pub use registry::{
    all_formatter_names, all_rule_names, file_rules, find_formatter, find_rule, formatters,
    formatters_for_language, rules_for_language, suggest_rule,
};
pub use rules::{
    DocstringStyle, JavaScriptImportsOptions, JavaScriptImportsRuleImpl, NamingCase,
    NoTrailingWhitespaceRuleImpl, PythonDocstringsOptions, PythonDocstringsRuleImpl,
    PythonImportsOptions, PythonImportsRuleImpl, PythonNamingOptions, PythonNamingRuleImpl,
    TypeScriptTypesOptions, TypeScriptTypesRuleImpl,
};
pub use source::{SourceFile, SourceSpan};
pub use traits::{FileLintRule, Formatter, LintRule, RuleExample, RuleOption};
pub use walker::{walk_files, walk_files_with_prefix};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types for working with
/// the linter. Import with:
///
/// ```rust,ignore
/// use llamalint_linter::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{LintConfig, LintSeverity};
    pub use crate::diagnostics::{LintDiagnostic, LintResult, LintSeverity as DiagnosticSeverity};
    pub use crate::linter::Linter;
    pub use crate::traits::{FileLintRule, Formatter, LintRule};
    pub use crate::Language;
}
