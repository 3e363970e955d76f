use super::report;
use crate::config::RuleOptions;
use crate::diagnostics::{LintDiagnostic, LintSeverity};
use crate::source::SourceFile;
use crate::syntax::{self, text};
use crate::traits::{FileLintRule, LintRule, RuleExample, RuleOption};
use crate::Language;
use serde::Deserialize;
use tree_sitter::{Node, Tree};

const NAME: &str = "javascript-imports";

/// Options for the `javascript-imports` rule
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JavaScriptImportsOptions {
    /// ES `import` declarations come before any top-level `require()`
    pub check_order: bool,
    pub prefer_named_exports: bool,
    /// Report `require()` and `module.exports`
    pub prefer_es_modules: bool,
}

impl Default for JavaScriptImportsOptions {
    fn default() -> Self {
        Self {
            check_order: true,
            prefer_named_exports: false,
            prefer_es_modules: true,
        }
    }
}

/// Lint rule that enforces module syntax conventions in JavaScript
pub struct JavaScriptImportsRuleImpl;

impl LintRule for JavaScriptImportsRuleImpl {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "JavaScript Imports"
    }

    fn description(&self) -> &'static str {
        "Enforces import standards for JavaScript code"
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::JavaScript]
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
                name: "prefer_named_exports",
                description: "Prefer named exports over default exports",
                default: "false",
                choices: &[],
            },
            RuleOption {
                name: "prefer_es_modules",
                description: "Prefer ES modules (import/export) over CommonJS (require)",
                default: "true",
                choices: &[],
            },
        ]
    }

    fn examples(&self) -> &'static [RuleExample] {
        &[RuleExample {
            invalid: "const lib = require(\"lib\");\nimport { something } from \"something\";\n",
            valid: "import { something } from \"something\";\nimport lib from \"lib\";\n",
            explanation: "ES module imports should be grouped together and come before CommonJS imports",
        }]
    }
}

/// Module-system constructs found in a syntax tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleSyntax {
    /// `import x from "y"` at the top level
    EsImport,
    /// `require(...)`, anywhere
    Require { top_level: bool },
    /// `module.exports` or `exports.name`
    CommonJsExport,
    /// `export default`
    DefaultExport,
}

/// Scopes that make a `require()` inside them conditional or lazy
const NESTED_SCOPES: &[&str] = &[
    "statement_block",
    "arrow_function",
    "class_body",
    "function_expression",
    "function_declaration",
    "generator_function",
    "generator_function_declaration",
    "method_definition",
];

fn is_top_level(node: Node<'_>) -> bool {
    let mut parent = node.parent();
    while let Some(scope) = parent {
        if NESTED_SCOPES.contains(&scope.kind()) {
            return false;
        }
        parent = scope.parent();
    }
    true
}

fn is_identifier(node: Node<'_>, src: &str, name: &str) -> bool {
    node.kind() == "identifier" && text(node, src) == name
}

/// Each construct with the byte range to report, in source order
fn scan(tree: &Tree, src: &str) -> Vec<(usize, usize, ModuleSyntax)> {
    let keyword = |node: Node<'_>| (node.start_byte(), node.start_byte() + 6);
    let mut found = Vec::new();
    syntax::visit(tree.root_node(), &mut |node| {
        let on_program = node.parent().is_some_and(|p| p.kind() == "program");
        match node.kind() {
            "import_statement" if on_program => {
                let (start, end) = keyword(node);
                found.push((start, end, ModuleSyntax::EsImport));
            }
            "export_statement" if on_program && syntax::child_of_kind(node, "default").is_some() => {
                let (start, end) = keyword(node);
                found.push((start, end, ModuleSyntax::DefaultExport));
            }
            "call_expression" => {
                let function = node.child_by_field_name("function");
                if let Some(function) = function.filter(|&f| is_identifier(f, src, "require")) {
                    found.push((
                        function.start_byte(),
                        function.end_byte(),
                        ModuleSyntax::Require {
                            top_level: is_top_level(node),
                        },
                    ));
                }
            }
            "member_expression" => {
                let Some(object) = node.child_by_field_name("object") else {
                    return;
                };
                let property = node.child_by_field_name("property").map(|p| text(p, src));
                if is_identifier(object, src, "exports")
                    || (is_identifier(object, src, "module") && property == Some("exports"))
                {
                    found.push((object.start_byte(), object.end_byte(), ModuleSyntax::CommonJsExport));
                }
            }
            _ => {}
        }
    });
    found.sort_by_key(|&(start, _, _)| start);
    found
}

impl FileLintRule for JavaScriptImportsRuleImpl {
    fn check(&self, file: &SourceFile, options: &RuleOptions) -> Vec<LintDiagnostic> {
        let opts: JavaScriptImportsOptions = options.parse();
        let severity = self.default_severity();
        let Some(tree) = file.script_tree() else {
            return Vec::new();
        };
        let mut diagnostics = Vec::new();
        let mut seen_require = false;

        for (start, end, syntax) in scan(tree, file.text()) {
            let message = match syntax {
                ModuleSyntax::EsImport if opts.check_order && seen_require => {
                    "ES module imports should come before CommonJS require() calls"
                }
                ModuleSyntax::Require { top_level } => {
                    seen_require |= top_level;
                    if !opts.prefer_es_modules {
                        continue;
                    }
                    "Use an ES module import instead of require()"
                }
                ModuleSyntax::CommonJsExport if opts.prefer_es_modules => {
                    "Use an ES module export instead of CommonJS exports"
                }
                ModuleSyntax::DefaultExport if opts.prefer_named_exports => {
                    "Prefer named exports over default exports"
                }
                _ => continue,
            };
            diagnostics.push(report(file, start, end, severity, message, NAME));
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check_with(source: &str, options: serde_json::Value) -> Vec<LintDiagnostic> {
        let file = SourceFile::new("test.js", Language::JavaScript, source);
        let options = match options {
            serde_json::Value::Object(table) => RuleOptions::new(table),
            _ => RuleOptions::default(),
        };
        JavaScriptImportsRuleImpl.check(&file, &options)
    }

    fn check(source: &str) -> Vec<LintDiagnostic> {
        check_with(source, json!({}))
    }

    fn messages(diagnostics: &[LintDiagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn test_es_modules_are_clean() {
        let source = "import fs from \"fs\";\nimport { join } from 'path';\n\nexport function main() {\n  return import('./lazy.js').then(() => import.meta.url);\n}\n";
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_require_before_import() {
        let source = "const lib = require(\"lib\");\nimport { something } from \"something\";\n";
        let diagnostics = check(source);
        assert_eq!(
            messages(&diagnostics),
            vec![
                "Use an ES module import instead of require()",
                "ES module imports should come before CommonJS require() calls",
            ]
        );
        assert_eq!(diagnostics[0].line(), 1);
        assert_eq!(diagnostics[0].column(), 13);
        assert_eq!(diagnostics[1].line(), 2);
    }

    #[test]
    fn test_order_only_without_es_preference() {
        let source = "const lib = require(\"lib\");\nimport x from \"x\";\n";
        let diagnostics = check_with(source, json!({ "prefer_es_modules": false }));
        assert_eq!(
            messages(&diagnostics),
            vec!["ES module imports should come before CommonJS require() calls"]
        );

        let diagnostics = check_with(
            source,
            json!({ "prefer_es_modules": false, "check_order": false }),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_nested_require_does_not_affect_order() {
        let source = "function load() {\n  return require('x');\n}\nimport y from 'y';\n";
        let diagnostics = check(source);
        assert_eq!(
            messages(&diagnostics),
            vec!["Use an ES module import instead of require()"]
        );
    }

    #[test]
    fn test_commonjs_exports() {
        let source = "module.exports = { a };\nexports.b = 1;\nconst x = obj.exports.c;\n";
        let diagnostics = check(source);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .all(|d| d.message == "Use an ES module export instead of CommonJS exports"));
    }

    #[test]
    fn test_method_named_require_is_ignored() {
        assert!(check("loader.require('x');\n").is_empty());
    }

    #[test]
    fn test_prefer_named_exports() {
        let source = "export default function App() {}\n";
        assert!(check(source).is_empty());
        let diagnostics = check_with(source, json!({ "prefer_named_exports": true }));
        assert_eq!(
            messages(&diagnostics),
            vec!["Prefer named exports over default exports"]
        );
    }

    #[test]
    fn test_require_in_arrow_function_is_nested() {
        let source = "const load = () => require('x');\nimport y from 'y';\n";
        assert_eq!(
            messages(&check(source)),
            vec!["Use an ES module import instead of require()"]
        );
    }

    #[test]
    fn test_keywords_in_strings_and_comments_are_ignored() {
        let source = "// const a = require('a');\nconst s = \"require('b')\";\n/* module.exports */\n";
        assert!(check(source).is_empty());
    }
}
