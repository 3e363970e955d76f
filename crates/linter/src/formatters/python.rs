use super::{protected_lines, reindent_lines};
use crate::config::RuleOptions;
use crate::source::SourceFile;
use crate::syntax::python::{self, Import, ImportKind, ImportedName, Module};
use crate::traits::{Formatter, RuleOption};
use crate::Language;
use serde::Deserialize;
use std::collections::HashMap;

/// Options for the `python-formatter`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PythonFormatterOptions {
    /// Spaces per indentation tab
    pub indent_width: usize,
    pub sort_imports: bool,
    /// `from` imports longer than this are wrapped in parentheses
    pub line_length: usize,
}

impl Default for PythonFormatterOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            sort_imports: true,
            line_length: 88,
        }
    }
}

/// Expands indentation tabs and sorts the leading import block
pub struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn name(&self) -> &'static str {
        "python-formatter"
    }

    fn description(&self) -> &'static str {
        "Normalizes Python indentation and sorts imports"
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::Python]
    }

    fn priority(&self) -> u8 {
        80
    }

    fn options(&self) -> &'static [RuleOption] {
        &[
            RuleOption {
                name: "indent_width",
                description: "Number of spaces replacing each indentation tab",
                default: "4",
                choices: &[],
            },
            RuleOption {
                name: "sort_imports",
                description: "Sort and split the leading import block",
                default: "true",
                choices: &[],
            },
            RuleOption {
                name: "line_length",
                description: "Wrap 'from' imports longer than this",
                default: "88",
                choices: &[],
            },
        ]
    }

    fn format(&self, file: &SourceFile, options: &RuleOptions) -> String {
        let opts: PythonFormatterOptions = options.parse();
        let module = match file.python() {
            Ok(module) => module,
            Err(err) => {
                tracing::debug!(path = %file.path().display(), %err, "not formatting file with syntax error");
                return file.text().to_string();
            }
        };

        let text = expand_tabs(file.text(), module, opts.indent_width);
        if !opts.sort_imports {
            return text;
        }
        match python::parse(&text) {
            Ok(module) => sort_import_block(&text, &module, &opts),
            Err(_) => text,
        }
    }
}

fn expand_tabs(text: &str, module: &Module, width: usize) -> String {
    let protected = protected_lines(text, module.strings.iter().copied());
    let spaces = " ".repeat(width);
    reindent_lines(text, &protected, |leading| leading.replace('\t', &spaces))
}

/// Rewrite each blank-line separated group of top-level imports at the start of the module
fn sort_import_block(text: &str, module: &Module, opts: &PythonFormatterOptions) -> String {
    let by_statement: HashMap<usize, &Import> = module
        .imports
        .iter()
        .filter_map(|i| Some((i.statement?, i)))
        .collect();
    let is_import = |index: usize| by_statement.contains_key(&index);

    let mut edits = Vec::new();
    let mut i = usize::from(module.docstring.is_some());
    while i < module.statements.len() && is_import(i) {
        let mut j = i + 1;
        while j < module.statements.len() && is_import(j) && !module.statements[j].blank_before {
            j += 1;
        }
        let group: Vec<&Import> = (i..j).map(|k| by_statement[&k]).collect();
        if let Some(edit) = sort_group(text, &group, opts) {
            edits.push(edit);
        }
        i = j;
    }

    let mut out = text.to_string();
    for (start, end, replacement) in edits.into_iter().rev() {
        out.replace_range(start..end, &replacement);
    }
    out
}

fn sort_group(
    text: &str,
    group: &[&Import],
    opts: &PythonFormatterOptions,
) -> Option<(usize, usize, String)> {
    // An import without names cannot be rewritten faithfully
    if group.iter().any(|i| i.names.is_empty()) {
        return None;
    }
    let start = group.first()?.start;
    let last_end = group.last()?.end;
    let end = text[last_end..]
        .find('\n')
        .map_or(text.len(), |n| last_end + n);
    let region = &text[start..end];

    // Comments and several statements per line stay as written
    if region.contains('#') || region.contains(';') {
        return None;
    }

    let mut future = Vec::new();
    let mut plain = Vec::new();
    let mut from = Vec::new();
    for import in group {
        match import.kind {
            ImportKind::Import => {
                for name in &import.names {
                    let key = (name.name.to_lowercase(), name.name.clone());
                    plain.push((key, format!("import {}", render_name(name))));
                }
            }
            ImportKind::From => {
                let line = render_from(import, opts);
                if import.is_future() {
                    future.push(line);
                } else {
                    let key = (
                        import.level > 0,
                        import.root().to_lowercase(),
                        import.module.to_lowercase(),
                        import.level,
                    );
                    from.push((key, line));
                }
            }
        }
    }
    future.sort();
    future.dedup();
    plain.sort();
    plain.dedup();
    from.sort();
    from.dedup();

    let lines: Vec<String> = future
        .into_iter()
        .chain(plain.into_iter().map(|(_, line)| line))
        .chain(from.into_iter().map(|(_, line)| line))
        .collect();
    let sorted = lines.join("\n");
    (sorted != region).then_some((start, end, sorted))
}

fn render_name(name: &ImportedName) -> String {
    match &name.alias {
        Some(alias) => format!("{} as {alias}", name.name),
        None => name.name.clone(),
    }
}

fn render_from(import: &Import, opts: &PythonFormatterOptions) -> String {
    let mut names: Vec<&ImportedName> = import.names.iter().collect();
    names.sort_by_key(|n| (n.name.to_lowercase(), n.name.clone(), n.alias.clone()));
    names.dedup();
    let names: Vec<String> = names.into_iter().map(render_name).collect();

    let head = format!("from {}{} import ", ".".repeat(import.level), import.module);
    let line = format!("{head}{}", names.join(", "));
    if line.len() <= opts.line_length || names.len() < 2 {
        return line;
    }
    let indent = " ".repeat(opts.indent_width);
    let mut wrapped = format!("{head}(\n");
    for name in names {
        wrapped.push_str(&format!("{indent}{name},\n"));
    }
    wrapped.push(')');
    wrapped
}
