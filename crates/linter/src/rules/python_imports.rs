use super::{python_module, report};
use crate::config::RuleOptions;
use crate::diagnostics::{CodeFix, LintDiagnostic, LintSeverity, TextEdit};
use crate::source::SourceFile;
use crate::syntax::python::{Import, ImportKind, Module};
use crate::traits::{FileLintRule, LintRule, RuleExample, RuleOption};
use crate::Language;
use serde::Deserialize;
use std::collections::HashSet;

const NAME: &str = "python-imports";

/// Options for the `python-imports` rule
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PythonImportsOptions {
    /// Check that imports are properly ordered
    pub check_order: bool,
    /// Report `from . import x` style imports
    pub require_absolute_imports: bool,
    pub allow_unused_imports: bool,
    /// Maximum length of a line holding an import
    pub max_import_line_length: usize,
}

impl Default for PythonImportsOptions {
    fn default() -> Self {
        Self {
            check_order: true,
            require_absolute_imports: false,
            allow_unused_imports: false,
            max_import_line_length: 100,
        }
    }
}

/// Lint rule that enforces import hygiene in Python modules
pub struct PythonImportsRuleImpl;

impl LintRule for PythonImportsRuleImpl {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "Python Imports"
    }

    fn description(&self) -> &'static str {
        "Enforces import standards for Python code"
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::Python]
    }

    fn default_severity(&self) -> LintSeverity {
        LintSeverity::Warning
    }

    fn options(&self) -> &'static [RuleOption] {
        &[
            RuleOption {
                name: "check_order",
                description: "Check that imports are properly ordered",
                default: "true",
                choices: &[],
            },
            RuleOption {
                name: "require_absolute_imports",
                description: "Require absolute imports instead of relative imports",
                default: "false",
                choices: &[],
            },
            RuleOption {
                name: "allow_unused_imports",
                description: "Allow unused imports",
                default: "false",
                choices: &[],
            },
            RuleOption {
                name: "max_import_line_length",
                description: "Maximum line length for a single import",
                default: "100",
                choices: &[],
            },
        ]
    }

    fn examples(&self) -> &'static [RuleExample] {
        &[
            RuleExample {
                invalid: "import sys, os\nfrom math import *",
                valid: "import os\nimport sys\n\nfrom math import sqrt, sin",
                explanation: "Imports should be on separate lines, sorted alphabetically, and star imports should be avoided",
            },
            RuleExample {
                invalid: "from os import path\nimport os",
                valid: "import os\nfrom os import path",
                explanation: "Plain imports of a module come before imports from it",
            },
        ]
    }
}

impl FileLintRule for PythonImportsRuleImpl {
    fn check(&self, file: &SourceFile, options: &RuleOptions) -> Vec<LintDiagnostic> {
        let opts: PythonImportsOptions = options.parse();
        let severity = self.default_severity();
        let module = match python_module(file, severity, NAME) {
            Ok(module) => module,
            Err(diagnostic) => return vec![diagnostic],
        };

        let imports = &module.imports;
        let mut diagnostics = Vec::new();

        for import in imports {
            let (start, end) = (import.start, import.end);

            if import.kind == ImportKind::Import && import.names.len() > 1 {
                let mut diagnostic = report(
                    file,
                    start,
                    end,
                    severity,
                    "Multiple modules imported on one line",
                    NAME,
                );
                if let Some(fix) = split_import_fix(file, import, start, end) {
                    diagnostic = diagnostic.with_fix(fix);
                }
                diagnostics.push(diagnostic);
            }

            if import.kind == ImportKind::From && import.is_wildcard() {
                diagnostics.push(report(
                    file,
                    start,
                    end,
                    severity,
                    format!("Wildcard import from {}", display_module(import)),
                    NAME,
                ));
            }

            if import.level > 0 && opts.require_absolute_imports {
                diagnostics.push(report(file, start, end, severity, "Relative import used", NAME));
            }

            let length = file.line_text(import.line).chars().count();
            if length > opts.max_import_line_length {
                diagnostics.push(report(
                    file,
                    start,
                    end,
                    severity,
                    format!(
                        "Import line too long ({length} > {})",
                        opts.max_import_line_length
                    ),
                    NAME,
                ));
            }
        }

        if opts.check_order {
            check_order(file, module, imports, severity, &mut diagnostics);
        }

        if !opts.allow_unused_imports {
            let used: HashSet<&str> = module.used_names.iter().map(String::as_str).collect();
            for import in imports.iter().filter(|i| !i.is_future()) {
                for name in import.names.iter().filter(|n| n.name != "*") {
                    if used.contains(name.binding(import.kind)) {
                        continue;
                    }
                    let shown = name.display();
                    let message = match import.kind {
                        ImportKind::Import => format!("Unused import: {shown}"),
                        ImportKind::From if import.module.is_empty() => {
                            format!("Unused import: {}{shown}", display_module(import))
                        }
                        ImportKind::From => {
                            format!("Unused import: {}.{shown}", display_module(import))
                        }
                    };
                    diagnostics.push(report(
                        file,
                        import.start,
                        import.end,
                        severity,
                        message,
                        NAME,
                    ));
                }
            }
        }

        diagnostics
    }
}

/// Module as written, including the leading dots of a relative import
fn display_module(import: &Import) -> String {
    format!("{}{}", ".".repeat(import.level), import.module)
}

/// Sort key shared with the formatter: absolute before relative, then case-insensitive root
fn order_key(import: &Import) -> (bool, String) {
    (import.level > 0, import.root().to_ascii_lowercase())
}

fn out_of_order(prev: &Import, current: &Import) -> bool {
    if current.is_future() {
        return !prev.is_future();
    }
    if prev.is_future() {
        return false;
    }
    match (prev.kind, current.kind) {
        (ImportKind::From, ImportKind::Import) => prev.root() == current.root(),
        (a, b) if a == b => order_key(prev) > order_key(current),
        _ => false,
    }
}

/// Compare adjacent top-level imports; a blank line or other statement starts a new group
fn check_order(
    file: &SourceFile,
    module: &Module,
    imports: &[Import],
    severity: LintSeverity,
    diagnostics: &mut Vec<LintDiagnostic>,
) {
    let top_level: Vec<(usize, &Import)> = imports
        .iter()
        .filter_map(|i| Some((i.statement?, i)))
        .collect();

    for pair in top_level.windows(2) {
        let ((prev_index, prev), (index, current)) = (pair[0], pair[1]);
        if index != prev_index + 1 || module.statements[index].blank_before {
            continue;
        }
        if !out_of_order(prev, current) {
            continue;
        }
        let excerpt: Vec<&str> = (prev.line..=current.line).map(|l| file.line_text(l)).collect();
        diagnostics.push(
            report(
                file,
                current.start,
                current.end,
                severity,
                "Imports not in proper order",
                NAME,
            )
            .with_source(excerpt.join("\n")),
        );
    }
}

/// Rewrite `import a, b as c` as one statement per line
///
/// Only offered when the statement is alone on its line, so the new lines
/// can reuse its indentation.
fn split_import_fix(file: &SourceFile, import: &Import, start: usize, end: usize) -> Option<CodeFix> {
    let src = file.text();
    let line_start = src[..start].rfind('\n').map_or(0, |i| i + 1);
    if !src[line_start..start].chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }
    let after = src[end..].split('\n').next().unwrap_or("").trim();
    if !(after.is_empty() || after.starts_with('#')) {
        return None;
    }

    let indent = file.indentation_at(start);
    let lines: Vec<String> = import
        .names
        .iter()
        .map(|n| match &n.alias {
            Some(alias) => format!("import {} as {alias}", n.name),
            None => format!("import {}", n.name),
        })
        .collect();
    Some(CodeFix::new(
        "Split into one import per line",
        vec![TextEdit::new(
            start,
            end,
            lines.join(&format!("{}{indent}", file.line_ending())),
        )],
    ))
}
