use super::report;
use crate::config::RuleOptions;
use crate::diagnostics::{CodeFix, LintDiagnostic, LintSeverity};
use crate::source::SourceFile;
use crate::traits::{FileLintRule, LintRule, RuleExample};
use crate::Language;

const NAME: &str = "no-trailing-whitespace";

/// Lint rule that reports spaces and tabs at the end of a line
pub struct NoTrailingWhitespaceRuleImpl;

impl LintRule for NoTrailingWhitespaceRuleImpl {
    fn name(&self) -> &'static str {
        NAME
    }

    fn title(&self) -> &'static str {
        "No Trailing Whitespace"
    }

    fn description(&self) -> &'static str {
        "Disallows whitespace at the end of lines"
    }

    fn languages(&self) -> &'static [Language] {
        Language::ALL
    }

    fn default_severity(&self) -> LintSeverity {
        LintSeverity::Warning
    }

    fn examples(&self) -> &'static [RuleExample] {
        &[RuleExample {
            invalid: "x = 1   \n",
            valid: "x = 1\n",
            explanation: "Trailing whitespace is invisible noise in diffs",
        }]
    }
}

impl FileLintRule for NoTrailingWhitespaceRuleImpl {
    fn check(&self, file: &SourceFile, _options: &RuleOptions) -> Vec<LintDiagnostic> {
        let text = file.text();
        let severity = self.default_severity();
        let mut diagnostics = Vec::new();

        for line in 1..=file.line_index().line_count() {
            let Some((start, end)) = file.line_range(line) else {
                continue;
            };
            let content = &text[start..end];
            let trimmed = content.trim_end_matches([' ', '\t']);
            if trimmed.len() == content.len() {
                continue;
            }
            let ws_start = start + trimmed.len();
            diagnostics.push(
                report(file, ws_start, end, severity, "Trailing whitespace", NAME)
                    .with_fix(CodeFix::delete("Remove trailing whitespace", ws_start, end)),
            );
        }

        diagnostics
    }
}
