use super::{python_module, report};
use crate::config::RuleOptions;
use crate::diagnostics::{LintDiagnostic, LintSeverity};
use crate::source::SourceFile;
use crate::syntax::python::{DefinitionKind, Name};
use crate::traits::{FileLintRule, LintRule, RuleExample, RuleOption};
use crate::Language;
use serde::Deserialize;

const NAME: &str = "python-naming";

/// Convention for names
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum NamingCase {
    /// `PascalCase`
    #[serde(rename = "PascalCase", alias = "pascal")]
    Pascal,
    /// camelCase
    #[serde(rename = "camelCase", alias = "camel")]
    Camel,
    /// `snake_case`
    #[serde(rename = "snake_case", alias = "snake")]
    Snake,
    /// `UPPER_CASE`
    #[serde(rename = "UPPER_CASE", alias = "upper")]
    Upper,
}

impl NamingCase {
    /// Whether `name` follows this convention, ignoring leading and trailing underscores
    #[must_use]
    pub fn check(self, name: &str) -> bool {
        let name = name.trim_matches('_');
        match self {
            NamingCase::Pascal => is_pascal_case(name),
            NamingCase::Camel => is_camel_case(name),
            NamingCase::Snake => is_snake_case(name),
            NamingCase::Upper => is_upper_case(name),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            NamingCase::Pascal => "PascalCase",
            NamingCase::Camel => "camelCase",
            NamingCase::Snake => "snake_case",
            NamingCase::Upper => "UPPER_CASE",
        }
    }
}

fn is_camel_case(s: &str) -> bool {
    s.chars().next().is_none_or(char::is_lowercase) && !s.contains('_')
}

fn is_pascal_case(s: &str) -> bool {
    s.chars().next().is_none_or(char::is_uppercase) && !s.contains('_')
}

fn is_snake_case(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_lowercase() || c.is_ascii_digit() || c == '_')
}

fn is_upper_case(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Module-level names written entirely in upper case are treated as constants
fn looks_constant(name: &str) -> bool {
    name.chars().any(char::is_alphabetic) && !name.chars().any(char::is_lowercase)
}

/// Options for the `python-naming` rule
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PythonNamingOptions {
    pub class_style: NamingCase,
    /// Functions and methods
    pub function_style: NamingCase,
    /// Module-level variables
    pub variable_style: NamingCase,
    /// Module-level names written in upper case
    pub constant_style: NamingCase,
}

impl Default for PythonNamingOptions {
    fn default() -> Self {
        Self {
            class_style: NamingCase::Pascal,
            function_style: NamingCase::Snake,
            variable_style: NamingCase::Snake,
            constant_style: NamingCase::Upper,
        }
    }
}

/// Lint rule that enforces naming conventions for classes, functions and module-level names
pub struct PythonNamingRuleImpl;

impl LintRule for PythonNamingRuleImpl {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "Python Naming Conventions"
    }

    fn description(&self) -> &'static str {
        "Enforces naming conventions for Python code elements"
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
                name: "class_style",
                description: "Style for class names",
                default: "PascalCase",
                choices: &["PascalCase", "camelCase", "snake_case"],
            },
            RuleOption {
                name: "function_style",
                description: "Style for function names",
                default: "snake_case",
                choices: &["PascalCase", "camelCase", "snake_case"],
            },
            RuleOption {
                name: "variable_style",
                description: "Style for variable names",
                default: "snake_case",
                choices: &["PascalCase", "camelCase", "snake_case"],
            },
            RuleOption {
                name: "constant_style",
                description: "Style for constant names",
                default: "UPPER_CASE",
                choices: &["PascalCase", "camelCase", "snake_case", "UPPER_CASE"],
            },
        ]
    }

    fn examples(&self) -> &'static [RuleExample] {
        &[
            RuleExample {
                invalid: "class myClass:\n    pass",
                valid: "class MyClass:\n    pass",
                explanation: "Class names should be in PascalCase",
            },
            RuleExample {
                invalid: "def GetValue():\n    return 42",
                valid: "def get_value():\n    return 42",
                explanation: "Function names should be in snake_case",
            },
        ]
    }
}

impl FileLintRule for PythonNamingRuleImpl {
    fn check(&self, file: &SourceFile, options: &RuleOptions) -> Vec<LintDiagnostic> {
        let opts: PythonNamingOptions = options.parse();
        let severity = self.default_severity();
        let module = match python_module(file, severity, NAME) {
            Ok(module) => module,
            Err(diagnostic) => return vec![diagnostic],
        };
        let mut diagnostics = Vec::new();

        let mut flag = |target: &Name, kind: &str, case: NamingCase| {
            let name = target.text.as_str();
            if is_dunder(name) || name.trim_matches('_').is_empty() || case.check(name) {
                return;
            }
            diagnostics.push(report(
                file,
                target.start,
                target.end,
                severity,
                format!("{kind} name '{name}' should be {}", case.label()),
                NAME,
            ));
        };

        for def in &module.definitions {
            match def.kind {
                DefinitionKind::Class => flag(&def.name, "Class", opts.class_style),
                DefinitionKind::Function => flag(&def.name, "Function", opts.function_style),
            }
        }

        for target in &module.assignments {
            if looks_constant(&target.text) {
                flag(target, "Constant", opts.constant_style);
            } else {
                flag(target, "Variable", opts.variable_style);
            }
        }

        diagnostics
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}
