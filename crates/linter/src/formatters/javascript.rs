use super::{protected_lines, reindent_lines};
use crate::config::RuleOptions;
use crate::source::SourceFile;
use crate::syntax;
use crate::traits::{Formatter, RuleOption};
use crate::Language;
use serde::Deserialize;
use tree_sitter::Tree;

/// Options shared by the JavaScript and TypeScript formatters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptFormatOptions {
    /// Columns per indentation level
    pub tab_width: usize,
    pub use_tabs: bool,
    /// Prefer `'` over `"` for string literals
    pub single_quote: bool,
}

impl Default for ScriptFormatOptions {
    fn default() -> Self {
        Self {
            tab_width: 2,
            use_tabs: false,
            single_quote: false,
        }
    }
}

pub(super) const SCRIPT_OPTIONS: &[RuleOption] = &[
    RuleOption {
        name: "tab_width",
        description: "Number of spaces per indentation level",
        default: "2",
        choices: &[],
    },
    RuleOption {
        name: "use_tabs",
        description: "Indent with tabs instead of spaces",
        default: "false",
        choices: &[],
    },
    RuleOption {
        name: "single_quote",
        description: "Use single quotes instead of double quotes",
        default: "false",
        choices: &[],
    },
];

/// Normalizes indentation and string quotes in JavaScript
pub struct JavaScriptFormatter;

impl Formatter for JavaScriptFormatter {
    fn name(&self) -> &'static str {
        "javascript-formatter"
    }

    fn description(&self) -> &'static str {
        "Normalizes JavaScript indentation and string quotes"
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::JavaScript]
    }

    fn priority(&self) -> u8 {
        80
    }

    fn options(&self) -> &'static [RuleOption] {
        SCRIPT_OPTIONS
    }

    fn format(&self, file: &SourceFile, options: &RuleOptions) -> String {
        format_script(file, &options.parse())
    }
}

/// Format JavaScript or TypeScript source
pub(super) fn format_script(file: &SourceFile, opts: &ScriptFormatOptions) -> String {
    let text = file.text();
    let Some(tree) = file.script_tree() else {
        return text.to_string();
    };
    let quote = if opts.single_quote { '\'' } else { '"' };
    let (strings, protected_ranges) = literal_ranges(tree, text);

    // Quote swaps keep every byte offset, so the literal ranges below stay valid
    let mut requoted = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in strings {
        if let Some(swapped) = requote(&text[start..end], quote) {
            requoted.push_str(&text[last..start]);
            requoted.push_str(&swapped);
            last = end;
        }
    }
    requoted.push_str(&text[last..]);

    let protected = protected_lines(&requoted, protected_ranges);

    let width = opts.tab_width.max(1);
    reindent_lines(&requoted, &protected, |leading| {
        let columns: usize = leading
            .chars()
            .map(|c| if c == '\t' { width } else { 1 })
            .sum();
        if opts.use_tabs {
            format!("{}{}", "\t".repeat(columns / width), " ".repeat(columns % width))
        } else {
            " ".repeat(columns)
        }
    })
}

/// String literals, then every range whose lines must keep their indentation:
/// strings, template literals and block comments
fn literal_ranges(tree: &Tree, text: &str) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
    let mut strings = Vec::new();
    let mut protected = Vec::new();
    syntax::visit(tree.root_node(), &mut |node| match node.kind() {
        "string" => {
            strings.push((node.start_byte(), node.end_byte()));
            protected.push((node.start_byte(), node.end_byte()));
        }
        "template_string" => protected.push((node.start_byte(), node.end_byte())),
        "comment" if syntax::text(node, text).starts_with("/*") => {
            protected.push((node.start_byte(), node.end_byte()));
        }
        _ => {}
    });
    (strings, protected)
}

/// The literal re-quoted with `quote`, when that needs no escaping
fn requote(literal: &str, quote: char) -> Option<String> {
    let open = literal.chars().next()?;
    if open == quote || literal.len() < 2 || !literal.ends_with(open) {
        return None;
    }
    let body = &literal[1..literal.len() - 1];
    if body.contains(['\\', quote, '\n']) {
        return None;
    }
    Some(format!("{quote}{body}{quote}"))
}
