use super::{python_module, report};
use crate::config::RuleOptions;
use crate::diagnostics::{CodeFix, LintDiagnostic, LintSeverity, TextEdit};
use crate::source::SourceFile;
use crate::syntax::python::{string_body, Definition, DefinitionKind};
use crate::traits::{FileLintRule, LintRule, RuleExample, RuleOption};
use crate::Language;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

const NAME: &str = "python-docstrings";

static NUMPY_PARAMETERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Parameters[ \t]*\r?\n[ \t]*-{3,}").expect("valid regex"));

static NUMPY_RETURNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Returns|Yields)[ \t]*\r?\n[ \t]*-{3,}").expect("valid regex"));

/// Docstring convention to enforce
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocstringStyle {
    /// `Args:` / `Returns:` / `Attributes:` sections
    #[default]
    Google,
    /// `:param x:` / `:return:` directives
    Sphinx,
    /// Underlined `Parameters` / `Returns` sections
    Numpy,
    /// Presence only
    Any,
}

/// Options for the `python-docstrings` rule
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PythonDocstringsOptions {
    pub required_modules: bool,
    pub required_classes: bool,
    /// Functions and methods
    pub required_methods: bool,
    /// Skip `_private` functions
    pub ignore_private: bool,
    /// Skip `__dunder__` functions
    pub ignore_dunder: bool,
    /// Skip `test_*` functions
    pub ignore_test_methods: bool,
    pub style: DocstringStyle,
}

impl Default for PythonDocstringsOptions {
    fn default() -> Self {
        Self {
            required_modules: true,
            required_classes: true,
            required_methods: true,
            ignore_private: true,
            ignore_dunder: true,
            ignore_test_methods: true,
            style: DocstringStyle::Google,
        }
    }
}

impl PythonDocstringsOptions {
    fn ignores(&self, def: &Definition) -> bool {
        (self.ignore_private && def.is_private())
            || (self.ignore_dunder && def.is_dunder())
            || (self.ignore_test_methods && def.name.text.starts_with("test_"))
    }
}

/// Lint rule that requires docstrings and checks their sections
pub struct PythonDocstringsRuleImpl;

impl LintRule for PythonDocstringsRuleImpl {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "Python Docstrings"
    }

    fn description(&self) -> &'static str {
        "Enforces docstring standards for Python code"
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
                name: "required_modules",
                description: "Whether module docstrings are required",
                default: "true",
                choices: &[],
            },
            RuleOption {
                name: "required_classes",
                description: "Whether class docstrings are required",
                default: "true",
                choices: &[],
            },
            RuleOption {
                name: "required_methods",
                description: "Whether method and function docstrings are required",
                default: "true",
                choices: &[],
            },
            RuleOption {
                name: "ignore_private",
                description: "Whether to ignore private methods (starting with _)",
                default: "true",
                choices: &[],
            },
            RuleOption {
                name: "ignore_dunder",
                description: "Whether to ignore dunder methods (like __init__)",
                default: "true",
                choices: &[],
            },
            RuleOption {
                name: "ignore_test_methods",
                description: "Whether to ignore test methods (starting with test_)",
                default: "true",
                choices: &[],
            },
            RuleOption {
                name: "style",
                description: "Docstring style to enforce",
                default: "google",
                choices: &["google", "sphinx", "numpy", "any"],
            },
        ]
    }

    fn examples(&self) -> &'static [RuleExample] {
        &[
            RuleExample {
                invalid: "def calculate_total(items, tax_rate):\n    total = sum(items)\n    return total * (1 + tax_rate)",
                valid: "def calculate_total(items, tax_rate):\n    \"\"\"Calculate the total cost with tax.\n\n    Args:\n        items: List of item prices\n        tax_rate: The tax rate as a decimal\n\n    Returns:\n        Total cost including tax\n    \"\"\"\n    total = sum(items)\n    return total * (1 + tax_rate)",
                explanation: "Functions should have docstrings describing parameters and return values",
            },
            RuleExample {
                invalid: "class User:\n    def __init__(self, name, email):\n        self.name = name\n        self.email = email",
                valid: "class User:\n    \"\"\"User class representing app users.\n\n    Attributes:\n        name: The user's full name\n        email: The user's email address\n    \"\"\"\n\n    def __init__(self, name, email):\n        self.name = name\n        self.email = email",
                explanation: "Classes should have docstrings describing their purpose and attributes",
            },
        ]
    }
}

impl FileLintRule for PythonDocstringsRuleImpl {
    fn check(&self, file: &SourceFile, options: &RuleOptions) -> Vec<LintDiagnostic> {
        let opts: PythonDocstringsOptions = options.parse();
        let severity = self.default_severity();
        let module = match python_module(file, severity, NAME) {
            Ok(module) => module,
            Err(diagnostic) => return vec![diagnostic],
        };
        let src = file.text();
        let newline = file.line_ending();
        let mut diagnostics = Vec::new();

        if opts.required_modules && module.docstring.is_none() {
            if let Some(first) = module.statements.first() {
                let at = line_start(src, first.start);
                diagnostics.push(
                    report(file, 0, 0, severity, "Module lacks a docstring", NAME).with_fix(
                        CodeFix::new(
                            "Add module docstring",
                            vec![TextEdit::insert(
                                at,
                                format!("\"\"\"Module docstring.\"\"\"{newline}{newline}"),
                            )],
                        ),
                    ),
                );
            }
        }

        for def in &module.definitions {
            let (required, label) = match def.kind {
                DefinitionKind::Class => (opts.required_classes, "Class"),
                DefinitionKind::Function => {
                    (opts.required_methods && !opts.ignores(def), "Function")
                }
            };
            if !required {
                continue;
            }

            let (start, end) = (def.start, def.name.end);

            let Some((doc_start, doc_end)) = def.docstring else {
                let mut diagnostic = report(
                    file,
                    start,
                    end,
                    severity,
                    format!("{label} '{}' lacks a docstring", def.name.text),
                    NAME,
                );
                if let Some(fix) = stub_fix(file, def, opts.style) {
                    diagnostic = diagnostic.with_fix(fix);
                }
                diagnostics.push(diagnostic);
                continue;
            };

            let issues = style_issues(string_body(&src[doc_start..doc_end]), def, opts.style);
            if !issues.is_empty() {
                diagnostics.push(report(
                    file,
                    start,
                    end,
                    severity,
                    format!(
                        "{label} '{}' docstring style issues: {}",
                        def.name.text,
                        issues.join(", ")
                    ),
                    NAME,
                ));
            }
        }

        diagnostics
    }
}

fn line_start(src: &str, offset: usize) -> usize {
    src[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn documents_return(def: &Definition) -> bool {
    def.returns_value || def.returns.as_deref().is_some_and(|r| r != "None")
}

fn style_issues(docstring: &str, def: &Definition, style: DocstringStyle) -> Vec<&'static str> {
    let mut issues = Vec::new();
    match (style, def.kind) {
        (DocstringStyle::Google, DefinitionKind::Function) => {
            if !def.params.is_empty()
                && !docstring.contains("Args:")
                && !docstring.contains("Parameters:")
            {
                issues.push("missing Args/Parameters section");
            }
            if documents_return(def)
                && !docstring.contains("Returns:")
                && !docstring.contains("Yields:")
            {
                issues.push("missing Returns/Yields section");
            }
        }
        (DocstringStyle::Google, DefinitionKind::Class) => {
            if !def.attributes.is_empty() && !docstring.contains("Attributes:") {
                issues.push("missing Attributes section");
            }
        }
        (DocstringStyle::Sphinx, DefinitionKind::Function) => {
            if !def.params.is_empty() && !docstring.contains(":param") {
                issues.push("missing :param directives");
            }
            if documents_return(def)
                && !docstring.contains(":return:")
                && !docstring.contains(":returns:")
            {
                issues.push("missing :return: directive");
            }
        }
        (DocstringStyle::Numpy, DefinitionKind::Function) => {
            if !def.params.is_empty() && !NUMPY_PARAMETERS.is_match(docstring) {
                issues.push("missing Parameters section");
            }
            if documents_return(def) && !NUMPY_RETURNS.is_match(docstring) {
                issues.push("missing Returns section");
            }
        }
        _ => {}
    }
    issues
}

/// Insert a stub docstring above the first statement of the body
fn stub_fix(file: &SourceFile, def: &Definition, style: DocstringStyle) -> Option<CodeFix> {
    let body = def.body?;
    let at = line_start(file.text(), body);
    let indent = file.indentation_at(body);
    let newline = file.line_ending();

    let (summary, params, returns, attributes): (String, &[String], bool, &[String]) =
        match def.kind {
            DefinitionKind::Class => (
                format!("{} class.", def.name.text),
                &[],
                false,
                def.attributes.as_slice(),
            ),
            DefinitionKind::Function => (
                "Function description.".to_string(),
                def.params.as_slice(),
                documents_return(def),
                &[],
            ),
        };

    let mut sections: Vec<Vec<String>> = Vec::new();
    match style {
        DocstringStyle::Google => {
            if !params.is_empty() {
                let mut lines = vec!["Args:".to_string()];
                lines.extend(params.iter().map(|p| format!("    {p}: Description.")));
                sections.push(lines);
            }
            if returns {
                sections.push(vec!["Returns:".into(), "    Description.".into()]);
            }
            if !attributes.is_empty() {
                let mut lines = vec!["Attributes:".to_string()];
                lines.extend(attributes.iter().map(|a| format!("    {a}: Description.")));
                sections.push(lines);
            }
        }
        DocstringStyle::Sphinx => {
            let mut lines: Vec<String> =
                params.iter().map(|p| format!(":param {p}: Description.")).collect();
            if returns {
                lines.push(":return: Description.".into());
            }
            lines.extend(attributes.iter().map(|a| format!(":ivar {a}: Description.")));
            if !lines.is_empty() {
                sections.push(lines);
            }
        }
        DocstringStyle::Numpy => {
            for (title, names) in [("Parameters", params), ("Attributes", attributes)] {
                if names.is_empty() {
                    continue;
                }
                let mut lines = vec![title.to_string(), "-".repeat(title.len())];
                for name in names {
                    lines.push(name.clone());
                    lines.push("    Description.".into());
                }
                sections.push(lines);
            }
            if returns {
                sections.push(vec![
                    "Returns".into(),
                    "-------".into(),
                    "object".into(),
                    "    Description.".into(),
                ]);
            }
        }
        DocstringStyle::Any => {}
    }

    let text = if sections.is_empty() {
        format!("{indent}\"\"\"{summary}\"\"\"{newline}")
    } else {
        let mut text = format!("{indent}\"\"\"{summary}{newline}");
        for section in sections {
            text.push_str(newline);
            for line in section {
                text.push_str(indent);
                text.push_str(&line);
                text.push_str(newline);
            }
        }
        text.push_str(indent);
        text.push_str("\"\"\"");
        text.push_str(newline);
        text
    };

    Some(CodeFix::new("Add docstring", vec![TextEdit::insert(at, text)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check_with(source: &str, options: serde_json::Value) -> Vec<LintDiagnostic> {
        let file = SourceFile::new("test.py", Language::Python, source);
        let options = match options {
            serde_json::Value::Object(table) => RuleOptions::new(table),
            _ => RuleOptions::default(),
        };
        PythonDocstringsRuleImpl.check(&file, &options)
    }

    fn check(source: &str) -> Vec<LintDiagnostic> {
        check_with(source, json!({}))
    }

    fn messages(diagnostics: &[LintDiagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    fn apply(source: &str, diagnostic: &LintDiagnostic) -> String {
        let mut text = source.to_string();
        for edit in diagnostic.fix.as_ref().unwrap().edits.iter().rev() {
            text.replace_range(edit.offset_range.start..edit.offset_range.end, &edit.new_text);
        }
        text
    }

    #[test]
    fn test_documented_module_is_clean() {
        let source = r#""""Utilities."""


def add(a, b):
    """Add two numbers.

    Args:
        a: First.
        b: Second.

    Returns:
        The sum.
    """
    return a + b
"#;
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_missing_module_docstring() {
        let source = "#!/usr/bin/env python\nimport os\n";
        let diagnostics = check(source);
        assert_eq!(messages(&diagnostics), vec!["Module lacks a docstring"]);
        assert_eq!(diagnostics[0].line(), 1);
        assert_eq!(
            apply(source, &diagnostics[0]),
            "#!/usr/bin/env python\n\"\"\"Module docstring.\"\"\"\n\nimport os\n"
        );
    }

    #[test]
    fn test_empty_module_is_not_flagged() {
        assert!(check("").is_empty());
        assert!(check("# just a comment\n").is_empty());
    }

    #[test]
    fn test_missing_function_docstring_fix() {
        let source = "\"\"\"Mod.\"\"\"\n\n\ndef add(a, b):\n    return a + b\n";
        let diagnostics = check(source);
        assert_eq!(messages(&diagnostics), vec!["Function 'add' lacks a docstring"]);
        assert_eq!(diagnostics[0].line(), 4);
        assert_eq!(diagnostics[0].source.as_deref(), Some("def add(a, b):"));

        let fixed = apply(source, &diagnostics[0]);
        assert_eq!(
            fixed,
            "\"\"\"Mod.\"\"\"\n\n\ndef add(a, b):\n    \"\"\"Function description.\n\n    Args:\n        a: Description.\n        b: Description.\n\n    Returns:\n        Description.\n    \"\"\"\n    return a + b\n"
        );
        assert!(check(&fixed).is_empty());
    }

    #[test]
    fn test_stub_fix_satisfies_each_style() {
        let source = "\"\"\"Mod.\"\"\"\n\n\nclass Point:\n    def move(self, dx):\n        self.x = dx\n        return self\n";
        for style in ["google", "sphinx", "numpy", "any"] {
            let options = json!({ "style": style });
            let mut text = source.to_string();
            // Fixes shift offsets, so apply one at a time
            while let Some(diagnostic) = check_with(&text, options.clone())
                .into_iter()
                .find(LintDiagnostic::has_fix)
            {
                text = apply(&text, &diagnostic);
            }
            assert!(check_with(&text, options).is_empty(), "{style}:\n{text}");
        }
    }

    #[test]
    fn test_fixes_keep_crlf_line_endings() {
        let source = "import os\r\n\r\n\r\ndef area(width):\r\n    return width\r\n";
        let diagnostics = check(source);
        assert_eq!(
            messages(&diagnostics),
            vec!["Module lacks a docstring", "Function 'area' lacks a docstring"]
        );

        let fixed = apply(source, &diagnostics[1]);
        assert_eq!(
            fixed,
            "import os\r\n\r\n\r\ndef area(width):\r\n    \"\"\"Function description.\r\n\r\n    Args:\r\n        width: Description.\r\n\r\n    Returns:\r\n        Description.\r\n    \"\"\"\r\n    return width\r\n"
        );
        assert!(!fixed.replace("\r\n", "").contains('\n'));

        let fixed = apply(source, &diagnostics[0]);
        assert!(fixed.starts_with("\"\"\"Module docstring.\"\"\"\r\n\r\nimport os\r\n"));
    }

    #[test]
    fn test_inline_body_has_no_fix() {
        let diagnostics = check("\"\"\"Mod.\"\"\"\ndef noop(): pass\n");
        assert_eq!(messages(&diagnostics), vec!["Function 'noop' lacks a docstring"]);
        assert!(!diagnostics[0].has_fix());
    }

    #[test]
    fn test_ignored_functions() {
        let source = "\"\"\"Mod.\"\"\"\n\n\nclass C:\n    \"\"\"C.\"\"\"\n\n    def __init__(self):\n        pass\n\n    def _helper(self):\n        pass\n\n    def test_it(self):\n        pass\n";
        assert!(check(source).is_empty());

        let diagnostics = check_with(source, json!({ "ignore_private": false }));
        assert_eq!(messages(&diagnostics), vec!["Function '_helper' lacks a docstring"]);
    }

    #[test]
    fn test_google_class_attributes() {
        let source = "\"\"\"Mod.\"\"\"\n\n\nclass User:\n    \"\"\"A user.\"\"\"\n\n    def __init__(self, name):\n        self.name = name\n";
        let diagnostics = check(source);
        assert_eq!(
            messages(&diagnostics),
            vec!["Class 'User' docstring style issues: missing Attributes section"]
        );
    }

    #[test]
    fn test_sphinx_style() {
        let source = "\"\"\"Mod.\"\"\"\n\n\ndef area(width, height):\n    \"\"\"Compute the area.\"\"\"\n    return width * height\n";
        let diagnostics = check_with(source, json!({ "style": "sphinx" }));
        assert_eq!(
            messages(&diagnostics),
            vec!["Function 'area' docstring style issues: missing :param directives, missing :return: directive"]
        );

        let documented = "\"\"\"Mod.\"\"\"\n\n\ndef area(width, height):\n    \"\"\"Compute the area.\n\n    :param width: Width.\n    :param height: Height.\n    :return: The area.\n    \"\"\"\n    return width * height\n";
        assert!(check_with(documented, json!({ "style": "sphinx" })).is_empty());
    }

    #[test]
    fn test_numpy_style() {
        let documented = "\"\"\"Mod.\"\"\"\n\n\ndef scale(x):\n    \"\"\"Scale a value.\n\n    Parameters\n    ----------\n    x : float\n        Value.\n\n    Returns\n    -------\n    float\n    \"\"\"\n    return x * 2\n";
        assert!(check_with(documented, json!({ "style": "numpy" })).is_empty());

        let diagnostics = check_with(documented, json!({ "style": "google" }));
        assert_eq!(
            messages(&diagnostics),
            vec!["Function 'scale' docstring style issues: missing Args/Parameters section, missing Returns/Yields section"]
        );
    }

    #[test]
    fn test_any_style_only_requires_presence() {
        let source = "\"\"\"Mod.\"\"\"\n\n\ndef area(width):\n    \"\"\"Area.\"\"\"\n    return width\n";
        assert!(check_with(source, json!({ "style": "any" })).is_empty());
    }

    #[test]
    fn test_requirements_can_be_disabled() {
        let source = "class A:\n    def run(self):\n        pass\n";
        let options = json!({
            "required_modules": false,
            "required_classes": false,
            "required_methods": false
        });
        assert!(check_with(source, options).is_empty());
    }

    #[test]
    fn test_syntax_error() {
        let diagnostics = check("def f(:\n");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.starts_with("Syntax error"));
    }
}
