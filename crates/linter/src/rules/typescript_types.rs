use super::report;
use crate::config::RuleOptions;
use crate::diagnostics::{LintDiagnostic, LintSeverity};
use crate::source::SourceFile;
use crate::syntax::{self, named_children, text};
use crate::traits::{FileLintRule, LintRule, RuleExample, RuleOption};
use crate::Language;
use serde::Deserialize;
use tree_sitter::{Node, Tree};

const NAME: &str = "typescript-types";

/// Function forms with an optional `name` field
const FUNCTIONS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "generator_function",
    "function_signature",
];

/// Methods in classes, object literals and interfaces
const METHODS: &[&str] = &[
    "method_definition",
    "method_signature",
    "abstract_method_signature",
];

/// Options for the `typescript-types` rule
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct TypeScriptTypesOptions {
    pub require_return_types: bool,
    pub require_parameter_types: bool,
    pub no_any: bool,
    /// Report `type X = { ... }` aliases
    pub prefer_interfaces: bool,
}

impl Default for TypeScriptTypesOptions {
    fn default() -> Self {
        Self {
            require_return_types: true,
            require_parameter_types: true,
            no_any: true,
            prefer_interfaces: false,
        }
    }
}

/// Lint rule that requires explicit type annotations in TypeScript
pub struct TypeScriptTypesRuleImpl;

impl LintRule for TypeScriptTypesRuleImpl {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "TypeScript Types"
    }

    fn description(&self) -> &'static str {
        "Enforces TypeScript type annotation standards"
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::TypeScript]
    }

    fn default_severity(&self) -> LintSeverity {
        LintSeverity::Error
    }

    fn options(&self) -> &'static [RuleOption] {
        &[
            RuleOption {
                name: "require_return_types",
                description: "Require explicit return type annotations on functions",
                default: "true",
                choices: &[],
            },
            RuleOption {
                name: "require_parameter_types",
                description: "Require explicit parameter type annotations",
                default: "true",
                choices: &[],
            },
            RuleOption {
                name: "no_any",
                description: "Disallow use of the 'any' type",
                default: "true",
                choices: &[],
            },
            RuleOption {
                name: "prefer_interfaces",
                description: "Prefer interfaces over type aliases for object types",
                default: "false",
                choices: &[],
            },
        ]
    }

    fn examples(&self) -> &'static [RuleExample] {
        &[
            RuleExample {
                invalid: "function getData() {\n  return { id: 1, name: \"test\" };\n}",
                valid: "function getData(): { id: number; name: string } {\n  return { id: 1, name: \"test\" };\n}",
                explanation: "Functions should have explicit return type annotations",
            },
            RuleExample {
                invalid: "function updateUser(user) {\n  // Update user\n}",
                valid: "function updateUser(user: User): void {\n  // Update user\n}",
                explanation: "Function parameters should have explicit type annotations",
            },
        ]
    }
}

type Span = (usize, usize);

fn span(node: Node<'_>) -> Span {
    (node.start_byte(), node.end_byte())
}

#[derive(Debug)]
struct Param {
    name: String,
    span: Span,
    typed: bool,
}

/// A function, method or arrow function whose signature should be annotated
#[derive(Debug)]
struct Signature {
    name: String,
    /// Range the diagnostics point at
    span: Span,
    params: Vec<Param>,
    has_return_type: bool,
    /// Constructors and setters never declare a return type
    needs_return_type: bool,
}

fn signatures(tree: &Tree, src: &str) -> Vec<Signature> {
    let mut found = Vec::new();
    syntax::visit(tree.root_node(), &mut |node| {
        let kind = node.kind();
        let signature = if FUNCTIONS.contains(&kind) {
            function(node, src)
        } else if METHODS.contains(&kind) {
            method(node, src)
        } else if kind == "arrow_function" {
            arrow_function(node, src)
        } else {
            None
        };
        found.extend(signature);
    });
    found
}

/// `function name<T>(params): Type`
fn function(node: Node<'_>, src: &str) -> Option<Signature> {
    let name = node.child_by_field_name("name");
    let at = name.or_else(|| syntax::child_of_kind(node, "function"))?;
    Some(Signature {
        name: name.map_or_else(|| "anonymous".to_string(), |n| text(n, src).to_string()),
        span: span(at),
        params: params(node.child_by_field_name("parameters")?, src),
        has_return_type: node.child_by_field_name("return_type").is_some(),
        needs_return_type: true,
    })
}

/// `name(params) {` or `name(params): Type;`
fn method(node: Node<'_>, src: &str) -> Option<Signature> {
    let name_node = node.child_by_field_name("name")?;
    let name = text(name_node, src);
    Some(Signature {
        name: name.to_string(),
        span: span(name_node),
        params: params(node.child_by_field_name("parameters")?, src),
        has_return_type: node.child_by_field_name("return_type").is_some(),
        needs_return_type: name != "constructor" && syntax::child_of_kind(node, "set").is_none(),
    })
}

/// `name = (params) => ...` as a binding, class field or assignment
///
/// Arrows passed as arguments take their types from the callee and are skipped,
/// as are bindings with a type annotation of their own.
fn arrow_function(node: Node<'_>, src: &str) -> Option<Signature> {
    let parent = node.parent()?;
    let target = match parent.kind() {
        "variable_declarator" | "public_field_definition" => {
            if parent.child_by_field_name("type").is_some() {
                return None;
            }
            parent.child_by_field_name("name")
        }
        "assignment_expression" => parent
            .child_by_field_name("left")
            .map(|left| left.child_by_field_name("property").unwrap_or(left)),
        _ => return None,
    };
    let name = target
        .filter(|t| t.kind().ends_with("identifier"))
        .map_or_else(|| "anonymous".to_string(), |t| text(t, src).to_string());

    if let Some(param) = node.child_by_field_name("parameter") {
        return Some(Signature {
            name,
            span: span(param),
            params: vec![Param {
                name: text(param, src).to_string(),
                span: span(param),
                typed: false,
            }],
            has_return_type: false,
            needs_return_type: true,
        });
    }

    let parameters = node.child_by_field_name("parameters")?;
    Some(Signature {
        name,
        span: (parameters.start_byte(), parameters.start_byte() + 1),
        params: params(parameters, src),
        has_return_type: node.child_by_field_name("return_type").is_some(),
        needs_return_type: true,
    })
}

fn params(parameters: Node<'_>, src: &str) -> Vec<Param> {
    named_children(parameters)
        .into_iter()
        .filter(|p| matches!(p.kind(), "required_parameter" | "optional_parameter"))
        .filter_map(|p| param(p, src))
        .collect()
}

fn param(node: Node<'_>, src: &str) -> Option<Param> {
    let mut pattern = node.child_by_field_name("pattern")?;
    if pattern.kind() == "rest_pattern" {
        pattern = named_children(pattern).into_iter().next()?;
    }
    let name = match pattern.kind() {
        "object_pattern" | "array_pattern" => "destructured parameter".to_string(),
        _ => text(pattern, src).to_string(),
    };
    Some(Param {
        name,
        span: span(pattern),
        typed: pattern.kind() == "this" || node.child_by_field_name("type").is_some(),
    })
}

/// Every `any` used as a type
fn any_types(tree: &Tree, src: &str) -> Vec<Span> {
    let mut found = Vec::new();
    syntax::visit(tree.root_node(), &mut |node| {
        if node.kind() == "predefined_type" && text(node, src) == "any" {
            found.push(span(node));
        }
    });
    found
}

/// `type Name<...> = { ... }`; the range covers `type Name` and the name follows
fn object_type_aliases<'a>(tree: &Tree, src: &'a str) -> Vec<(Span, &'a str)> {
    let mut found = Vec::new();
    syntax::visit(tree.root_node(), &mut |node| {
        if node.kind() != "type_alias_declaration" {
            return;
        }
        let is_object = node
            .child_by_field_name("value")
            .is_some_and(|v| v.kind() == "object_type");
        if let (true, Some(name)) = (is_object, node.child_by_field_name("name")) {
            found.push(((node.start_byte(), name.end_byte()), text(name, src)));
        }
    });
    found
}

impl FileLintRule for TypeScriptTypesRuleImpl {
    fn check(&self, file: &SourceFile, options: &RuleOptions) -> Vec<LintDiagnostic> {
        let opts: TypeScriptTypesOptions = options.parse();
        let severity = self.default_severity();
        let Some(tree) = file.script_tree() else {
            return Vec::new();
        };
        let src = file.text();
        let mut diagnostics = Vec::new();

        for signature in signatures(tree, src) {
            if opts.require_return_types
                && signature.needs_return_type
                && !signature.has_return_type
            {
                let (start, end) = signature.span;
                diagnostics.push(report(
                    file,
                    start,
                    end,
                    severity,
                    format!(
                        "Function '{}' lacks a return type annotation",
                        signature.name
                    ),
                    NAME,
                ));
            }
            if opts.require_parameter_types {
                for param in signature.params.iter().filter(|p| !p.typed) {
                    let (start, end) = param.span;
                    diagnostics.push(report(
                        file,
                        start,
                        end,
                        severity,
                        format!(
                            "Parameter '{}' of '{}' lacks a type annotation",
                            param.name, signature.name
                        ),
                        NAME,
                    ));
                }
            }
        }

        if opts.no_any {
            for (start, end) in any_types(tree, src) {
                diagnostics.push(report(
                    file,
                    start,
                    end,
                    severity,
                    "Avoid the 'any' type",
                    NAME,
                ));
            }
        }

        if opts.prefer_interfaces {
            for ((start, end), name) in object_type_aliases(tree, src) {
                diagnostics.push(report(
                    file,
                    start,
                    end,
                    severity,
                    format!("Use an interface instead of a type alias for object type '{name}'"),
                    NAME,
                ));
            }
        }

        diagnostics.sort_by_key(|d| d.span.start);
        diagnostics
    }
}
