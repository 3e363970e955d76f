use crate::config::RuleOptions;
use crate::source::SourceFile;
use crate::traits::{Formatter, RuleOption};
use crate::Language;
use serde::Deserialize;

/// Options for the `whitespace-formatter`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhitespaceFormatterOptions {
    /// Longest run of consecutive blank lines kept
    pub max_blank_lines: usize,
}

impl Default for WhitespaceFormatterOptions {
    fn default() -> Self {
        Self { max_blank_lines: 2 }
    }
}

/// Normalizes line endings, trailing whitespace and blank lines in every language
pub struct WhitespaceFormatter;

impl Formatter for WhitespaceFormatter {
    fn name(&self) -> &'static str {
        "whitespace-formatter"
    }

    fn description(&self) -> &'static str {
        "Normalizes line endings, trailing whitespace and blank lines"
    }

    fn languages(&self) -> &'static [Language] {
        Language::ALL
    }

    fn priority(&self) -> u8 {
        10
    }

    fn options(&self) -> &'static [RuleOption] {
        &[RuleOption {
            name: "max_blank_lines",
            description: "Maximum number of consecutive blank lines",
            default: "2",
            choices: &[],
        }]
    }

    fn format(&self, file: &SourceFile, options: &RuleOptions) -> String {
        let opts: WhitespaceFormatterOptions = options.parse();
        normalize(file.text(), opts.max_blank_lines)
    }
}

fn normalize(text: &str, max_blank_lines: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.split('\n') {
        let line = line.trim_end_matches([' ', '\t', '\r']);
        if line.is_empty() {
            blank_run += 1;
            if blank_run > max_blank_lines {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    let content_len = out.trim_end_matches('\n').len();
    out.truncate(content_len);
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
