use super::{child_of_kind, first_error, named_children, text, visit, SyntaxError};
use crate::Language;
use std::path::Path;
use tree_sitter::Node;

/// A top-level statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement {
    pub start: usize,
    pub end: usize,
    /// 1-based line of the first character
    pub line: usize,
    /// Whether a blank line separates this statement from the previous one
    pub blank_before: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import a.b as c`
    Import,
    /// `from a import b`
    From,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    /// The name bound in the importing namespace (`import a.b` binds `a`)
    #[must_use]
    pub fn binding(&self, kind: ImportKind) -> &str {
        match (&self.alias, kind) {
            (Some(alias), _) => alias,
            (None, ImportKind::Import) => self.name.split('.').next().unwrap_or(&self.name),
            (None, ImportKind::From) => &self.name,
        }
    }

    /// The alias if any, else the imported name as written
    #[must_use]
    pub fn display(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Import {
    /// Index into [`Module::statements`] for a top-level import
    pub statement: Option<usize>,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub kind: ImportKind,
    /// Module of a `from` import, or the first module of an `import`
    pub module: String,
    /// Leading dots of a relative `from` import
    pub level: usize,
    pub names: Vec<ImportedName>,
}

impl Import {
    /// First dotted component of the module
    #[must_use]
    pub fn root(&self) -> &str {
        self.module.split('.').next().unwrap_or("")
    }

    #[must_use]
    pub fn is_future(&self) -> bool {
        self.kind == ImportKind::From && self.module == "__future__"
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.names.iter().any(|n| n.name == "*")
    }
}

/// An identifier with its byte range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Name {
    fn new(node: Node<'_>, src: &str) -> Self {
        Self {
            text: text(node, src).to_string(),
            start: node.start_byte(),
            end: node.end_byte(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Class,
    Function,
}

/// A `class` or `def` with what the rules need from its body
#[derive(Debug, Clone)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: Name,
    /// Start of the header, `async` included
    pub start: usize,
    /// Byte range of the docstring literal, when the body starts with one
    pub docstring: Option<(usize, usize)>,
    /// Start of the first body statement when the body is indented on its own lines
    pub body: Option<usize>,
    /// Parameter names, without `self`/`cls` and bare `*` or `/` markers
    pub params: Vec<String>,
    /// Return annotation text
    pub returns: Option<String>,
    /// Whether the body returns a value or yields
    pub returns_value: bool,
    /// Attributes assigned in a class body or via `self.<name> =`
    pub attributes: Vec<String>,
}

impl Definition {
    #[must_use]
    pub fn is_dunder(&self) -> bool {
        let name = &self.name.text;
        name.len() > 4 && name.starts_with("__") && name.ends_with("__")
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.name.text.starts_with('_') && !self.is_dunder()
    }
}

/// A parsed Python file
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// Top-level statements, comments excluded
    pub statements: Vec<Statement>,
    /// Byte range of the module docstring literal
    pub docstring: Option<(usize, usize)>,
    /// Every import, nested ones included, in source order
    pub imports: Vec<Import>,
    /// Every `class` and `def`, in source order
    pub definitions: Vec<Definition>,
    /// Names bound by top-level assignments
    pub assignments: Vec<Name>,
    /// Identifiers read outside imports (attribute names excluded), plus `__all__` entries
    pub used_names: Vec<String>,
    /// Byte ranges of string literals
    pub strings: Vec<(usize, usize)>,
}

/// The text between the quotes of a string literal
#[must_use]
pub fn string_body(literal: &str) -> &str {
    let text = literal.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if text.len() >= quote.len() * 2 {
            if let Some(inner) = text.strip_prefix(quote).and_then(|t| t.strip_suffix(quote)) {
                return inner;
            }
        }
    }
    text
}

/// Parse Python source
///
/// Fails with the first error or missing node of the tree.
pub fn parse(src: &str) -> Result<Module, SyntaxError> {
    let Some(tree) = super::parse(Path::new("module.py"), Language::Python, src) else {
        return Ok(Module::default());
    };
    let root = tree.root_node();
    if let Some(err) = first_error(root, src) {
        return Err(err);
    }

    let mut module = Module::default();
    let top: Vec<Node<'_>> = named_children(root)
        .into_iter()
        .filter(|n| n.kind() != "comment")
        .collect();

    let mut prev_end = 0;
    for node in &top {
        module.statements.push(Statement {
            start: node.start_byte(),
            end: node.end_byte(),
            line: node.start_position().row + 1,
            blank_before: has_blank_line(&src[prev_end..node.start_byte()]),
        });
        prev_end = node.end_byte();

        if node.kind() == "expression_statement" {
            for assignment in named_children(*node).into_iter().filter(|n| n.kind() == "assignment") {
                for target in assignment_targets(assignment) {
                    module.assignments.push(Name::new(target, src));
                }
            }
        }
    }
    module.docstring = top.first().and_then(|n| docstring_literal(*n));

    visit(root, &mut |node| match node.kind() {
        "import_statement" | "import_from_statement" | "future_import_statement" => {
            let statement = node
                .parent()
                .filter(|p| p.id() == root.id())
                .and_then(|_| top.iter().position(|t| t.id() == node.id()));
            module.imports.push(import(node, statement, src));
        }
        "function_definition" | "class_definition" => {
            if let Some(definition) = definition(node, src) {
                module.definitions.push(definition);
            }
        }
        "string" => module.strings.push((node.start_byte(), node.end_byte())),
        _ => {}
    });
    collect_used_names(root, src, &mut module.used_names);

    Ok(module)
}

fn has_blank_line(gap: &str) -> bool {
    let lines: Vec<&str> = gap.split('\n').collect();
    lines.len() > 2 && lines[1..lines.len() - 1].iter().any(|l| l.trim().is_empty())
}

/// The string literal of a statement made of nothing else
fn docstring_literal(statement: Node<'_>) -> Option<(usize, usize)> {
    if statement.kind() != "expression_statement" {
        return None;
    }
    let children = named_children(statement);
    let [expression] = children.as_slice() else {
        return None;
    };
    let literal = match expression.kind() {
        "string" => *expression,
        "concatenated_string" => named_children(*expression).into_iter().next()?,
        _ => return None,
    };
    Some((literal.start_byte(), literal.end_byte()))
}

/// Identifier nodes bound by an assignment chain (`a = b = 1`, `x, (y, z) = t`, `n: int = 0`)
fn assignment_targets(assignment: Node<'_>) -> Vec<Node<'_>> {
    let mut targets = Vec::new();
    let mut current = Some(assignment);
    while let Some(node) = current.filter(|n| n.kind() == "assignment") {
        if let Some(left) = node.child_by_field_name("left") {
            pattern_names(left, &mut targets);
        }
        current = node.child_by_field_name("right");
    }
    targets
}

fn pattern_names<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    match node.kind() {
        "identifier" => out.push(node),
        "pattern_list" | "tuple_pattern" | "list_pattern" => {
            for child in named_children(node) {
                pattern_names(child, out);
            }
        }
        _ => {}
    }
}

/// Attribute names assigned through `self.<name>` in a target
fn self_attributes<'t>(node: Node<'t>, src: &str, out: &mut Vec<Node<'t>>) {
    match node.kind() {
        "attribute" => {
            let on_self = node
                .child_by_field_name("object")
                .is_some_and(|o| o.kind() == "identifier" && text(o, src) == "self");
            if let Some(attribute) = node.child_by_field_name("attribute").filter(|_| on_self) {
                out.push(attribute);
            }
        }
        "pattern_list" | "tuple_pattern" | "list_pattern" => {
            for child in named_children(node) {
                self_attributes(child, src, out);
            }
        }
        _ => {}
    }
}

fn import(node: Node<'_>, statement: Option<usize>, src: &str) -> Import {
    let names: Vec<ImportedName> = {
        let mut cursor = node.walk();
        node.children_by_field_name("name", &mut cursor)
            .map(|n| imported_name(n, src))
            .collect()
    };
    let (kind, module, level, names) = match node.kind() {
        "import_statement" => {
            let module = names.first().map(|n| n.name.clone()).unwrap_or_default();
            (ImportKind::Import, module, 0, names)
        }
        "future_import_statement" => (ImportKind::From, "__future__".to_string(), 0, names),
        _ => {
            let (module, level) = match node.child_by_field_name("module_name") {
                Some(relative) if relative.kind() == "relative_import" => {
                    let level = child_of_kind(relative, "import_prefix")
                        .map_or(0, |p| text(p, src).chars().filter(|c| *c == '.').count());
                    let module = child_of_kind(relative, "dotted_name")
                        .map(|m| compact(text(m, src)))
                        .unwrap_or_default();
                    (module, level)
                }
                Some(module) => (compact(text(module, src)), 0),
                None => (String::new(), 0),
            };
            let names = if child_of_kind(node, "wildcard_import").is_some() {
                vec![ImportedName {
                    name: "*".to_string(),
                    alias: None,
                }]
            } else {
                names
            };
            (ImportKind::From, module, level, names)
        }
    };
    Import {
        statement,
        start: node.start_byte(),
        end: node.end_byte(),
        line: node.start_position().row + 1,
        kind,
        module,
        level,
        names,
    }
}

fn imported_name(node: Node<'_>, src: &str) -> ImportedName {
    if node.kind() == "aliased_import" {
        return ImportedName {
            name: node
                .child_by_field_name("name")
                .map(|n| compact(text(n, src)))
                .unwrap_or_default(),
            alias: node
                .child_by_field_name("alias")
                .map(|a| text(a, src).to_string()),
        };
    }
    ImportedName {
        name: compact(text(node, src)),
        alias: None,
    }
}

/// Dotted name without the whitespace Python allows around dots
fn compact(dotted: &str) -> String {
    dotted.split_whitespace().collect()
}

fn definition(node: Node<'_>, src: &str) -> Option<Definition> {
    let kind = if node.kind() == "class_definition" {
        DefinitionKind::Class
    } else {
        DefinitionKind::Function
    };
    let name = node.child_by_field_name("name")?;
    let block = node.child_by_field_name("body");
    let body_statements: Vec<Node<'_>> = block
        .map(named_children)
        .unwrap_or_default()
        .into_iter()
        .filter(|n| n.kind() != "comment")
        .collect();

    let first = body_statements.first().copied();
    let header_end = block
        .and_then(|b| b.prev_sibling())
        .map_or(name.end_byte(), |colon| colon.end_byte());
    let body = first
        .filter(|f| src.get(header_end..f.start_byte()).is_some_and(|gap| gap.contains('\n')))
        .map(|f| f.start_byte());

    let mut definition = Definition {
        kind,
        name: Name::new(name, src),
        start: node.start_byte(),
        docstring: first.and_then(docstring_literal),
        body,
        params: Vec::new(),
        returns: None,
        returns_value: false,
        attributes: Vec::new(),
    };

    match kind {
        DefinitionKind::Function => {
            if let Some(parameters) = node.child_by_field_name("parameters") {
                definition.params = named_children(parameters)
                    .into_iter()
                    .filter_map(|p| parameter_name(p, src))
                    .filter(|p| p != "self" && p != "cls")
                    .collect();
            }
            definition.returns = node
                .child_by_field_name("return_type")
                .map(|r| text(r, src).to_string());
            definition.returns_value = block.is_some_and(|b| returns_value(b));
        }
        DefinitionKind::Class => {
            if let Some(block) = block {
                definition.attributes = class_attributes(block, src);
            }
        }
    }
    Some(definition)
}

fn parameter_name(node: Node<'_>, src: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(text(node, src).to_string()),
        "default_parameter" | "typed_default_parameter" => {
            node.child_by_field_name("name").and_then(|n| parameter_name(n, src))
        }
        "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => named_children(node)
            .into_iter()
            .next()
            .and_then(|n| parameter_name(n, src)),
        _ => None,
    }
}

/// Whether a function body returns something other than a bare `None`, or yields
fn returns_value(node: Node<'_>) -> bool {
    match node.kind() {
        "function_definition" | "class_definition" | "lambda" => false,
        "yield" => true,
        "return_statement" => named_children(node).iter().any(|n| n.kind() != "none"),
        _ => named_children(node).into_iter().any(returns_value),
    }
}

fn class_attributes(block: Node<'_>, src: &str) -> Vec<String> {
    let mut attributes: Vec<String> = Vec::new();
    let mut push = |node: Node<'_>| {
        let name = text(node, src);
        if !attributes.iter().any(|a| a == name) {
            attributes.push(name.to_string());
        }
    };
    visit(block, &mut |node| {
        // Only the head of an `a = b = 1` chain
        if node.kind() != "assignment" || node.parent().is_some_and(|p| p.kind() == "assignment") {
            return;
        }
        let direct = node
            .parent()
            .filter(|p| p.kind() == "expression_statement")
            .and_then(|p| p.parent())
            .is_some_and(|p| p.id() == block.id());
        let mut found = Vec::new();
        if direct {
            found.extend(assignment_targets(node));
        }
        let mut current = Some(node);
        while let Some(assignment) = current.filter(|n| n.kind() == "assignment") {
            if let Some(left) = assignment.child_by_field_name("left") {
                self_attributes(left, src, &mut found);
            }
            current = assignment.child_by_field_name("right");
        }
        found.sort_by_key(Node::start_byte);
        for name in found {
            push(name);
        }
    });
    attributes
}

fn collect_used_names(node: Node<'_>, src: &str, names: &mut Vec<String>) {
    match node.kind() {
        "import_statement" | "import_from_statement" | "future_import_statement" => return,
        "identifier" => {
            let attribute_name = node.parent().is_some_and(|p| {
                p.kind() == "attribute"
                    && p.child_by_field_name("attribute")
                        .is_some_and(|a| a.id() == node.id())
            });
            if !attribute_name {
                names.push(text(node, src).to_string());
            }
        }
        "assignment"
            if assignment_targets(node)
                .iter()
                .any(|t| text(*t, src) == "__all__") =>
        {
            if let Some(value) = node.child_by_field_name("right") {
                visit(value, &mut |n| {
                    if n.kind() == "string" {
                        names.push(string_body(text(n, src)).to_string());
                    }
                });
            }
        }
        _ => {}
    }
    for child in named_children(node) {
        collect_used_names(child, src, names);
    }
}
