//! Rendering lint results for humans and CI
//!
//! Every renderer returns a `String` so the command decides where it goes.

use crate::OutputFormat;
use colored::Colorize;
use llamalint_linter::{DiagnosticSeverity, LintDiagnostic, LintResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// One diagnostic as written to JSON reports
///
/// Field order is part of the format: CI scripts grep for
/// `"severity":"error"` in the compact output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub rule_id: String,
    pub file_path: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub severity: String,
    pub source: Option<String>,
    pub fixable: bool,
}

impl DiagnosticRecord {
    fn new(result: &LintResult, diagnostic: &LintDiagnostic) -> Self {
        Self {
            rule_id: diagnostic.rule.clone(),
            file_path: display_path(result),
            line: diagnostic.line(),
            column: diagnostic.column(),
            message: diagnostic.message.clone(),
            severity: diagnostic.severity.to_string(),
            source: diagnostic.source.clone(),
            fixable: diagnostic.has_fix(),
        }
    }
}

/// Diagnostic totals across a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub fixable: usize,
}

impl Summary {
    pub fn new(results: &[LintResult]) -> Self {
        Self {
            files: results.iter().filter(|r| !r.diagnostics.is_empty()).count(),
            errors: results.iter().map(|r| r.count(DiagnosticSeverity::Error)).sum(),
            warnings: results.iter().map(|r| r.count(DiagnosticSeverity::Warning)).sum(),
            infos: results.iter().map(|r| r.count(DiagnosticSeverity::Info)).sum(),
            fixable: results.iter().map(LintResult::fixable_count).sum(),
        }
    }

    pub const fn is_clean(&self) -> bool {
        self.errors == 0 && self.warnings == 0 && self.infos == 0
    }
}

fn display_path(result: &LintResult) -> String {
    let path = result.path();
    let path = path.strip_prefix("./").unwrap_or(path);
    path.display().to_string().replace('\\', "/")
}

fn diagnostics(results: &[LintResult]) -> impl Iterator<Item = (&LintResult, &LintDiagnostic)> {
    results
        .iter()
        .flat_map(|r| r.diagnostics.iter().map(move |d| (r, d)))
}

pub fn records(results: &[LintResult]) -> Vec<DiagnosticRecord> {
    diagnostics(results)
        .map(|(result, diagnostic)| DiagnosticRecord::new(result, diagnostic))
        .collect()
}

/// Render `results` in `format`
pub fn render(format: OutputFormat, results: &[LintResult]) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(results),
        OutputFormat::Json => render_json(results)?,
        OutputFormat::Xml => render_xml(results),
        OutputFormat::Github => render_github(results),
    })
}

pub fn render_text(results: &[LintResult]) -> String {
    let mut out = String::new();
    for (result, diagnostic) in diagnostics(results) {
        let label = match diagnostic.severity {
            DiagnosticSeverity::Error => "error".red().bold(),
            DiagnosticSeverity::Warning => "warning".yellow().bold(),
            DiagnosticSeverity::Info => "info".cyan().bold(),
        };
        let _ = writeln!(
            out,
            "{label}[{}]: {}",
            diagnostic.rule.bold(),
            diagnostic.message
        );
        let _ = writeln!(
            out,
            "  {} {}:{}:{}",
            "-->".dimmed(),
            display_path(result),
            diagnostic.line(),
            diagnostic.column()
        );
        if let Some(source) = &diagnostic.source {
            let _ = writeln!(out, "   {} {}", "|".dimmed(), source.trim_end());
        }
        if let Some(fix) = &diagnostic.fix {
            let _ = writeln!(out, "   {} {}", "fix:".green(), fix.label);
        }
    }
    out
}

/// Compact JSON array, one object per diagnostic
pub fn render_json(results: &[LintResult]) -> serde_json::Result<String> {
    let mut json = serde_json::to_string(&records(results))?;
    json.push('\n');
    Ok(json)
}

pub fn render_xml(results: &[LintResult]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<results>\n");
    for record in records(results) {
        let _ = writeln!(
            out,
            "  <issue rule_id=\"{}\" severity=\"{}\" file=\"{}\" line=\"{}\" column=\"{}\">{}</issue>",
            xml_escape(&record.rule_id),
            record.severity,
            xml_escape(&record.file_path),
            record.line,
            record.column,
            xml_escape(&record.message),
        );
    }
    out.push_str("</results>\n");
    out
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// GitHub Actions workflow commands for PR annotations
pub fn render_github(results: &[LintResult]) -> String {
    let mut out = String::new();
    for (result, diagnostic) in diagnostics(results) {
        let command = match diagnostic.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "notice",
        };
        let _ = writeln!(
            out,
            "::{command} file={},line={},col={}::{} [{}]",
            github_property(&display_path(result)),
            diagnostic.line(),
            diagnostic.column(),
            github_data(&diagnostic.message),
            diagnostic.rule
        );
    }
    out
}

fn github_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn github_property(text: &str) -> String {
    github_data(text).replace(':', "%3A").replace(',', "%2C")
}

/// One-line outcome for text output
pub fn render_summary(summary: &Summary) -> String {
    if summary.is_clean() {
        return "✓ No issues found".green().bold().to_string();
    }
    let mut line = format!(
        "Found {} {} and {} {}",
        summary.errors,
        plural(summary.errors, "error"),
        summary.warnings,
        plural(summary.warnings, "warning")
    );
    if summary.infos > 0 {
        let _ = write!(line, " ({} info)", summary.infos);
    }
    let _ = write!(line, " in {} {}", summary.files, plural(summary.files, "file"));
    if summary.errors > 0 {
        format!("✗ {line}").red().bold().to_string()
    } else {
        format!("! {line}").yellow().bold().to_string()
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llamalint_linter::{CodeFix, SourceSpan};

    fn span(line: usize, column: usize) -> SourceSpan {
        SourceSpan {
            start: 0,
            end: 1,
            line,
            column,
        }
    }

    fn sample() -> Vec<LintResult> {
        colored::control::set_override(false);
        vec![
            LintResult::new(
                "./src/app.py",
                vec![
                    LintDiagnostic::error(span(2, 1), "Import line too long (60 > 40)", "python-imports")
                        .with_source("from collections import OrderedDict"),
                    LintDiagnostic::warning(span(4, 15), "Trailing whitespace", "no-trailing-whitespace")
                        .with_fix(CodeFix::delete("Remove trailing whitespace", 3, 5)),
                ],
            ),
            LintResult::new("web/clean.ts", Vec::new()),
            LintResult::new(
                "web/a,b.ts",
                vec![LintDiagnostic::info(span(1, 1), "Use \"x\" & <y>\nnext", "typescript-types")],
            ),
        ]
    }

    #[test]
    fn test_render_text() {
        insta::assert_snapshot!(render_text(&sample()), @r#"
        error[python-imports]: Import line too long (60 > 40)
          --> src/app.py:2:1
           | from collections import OrderedDict
        warning[no-trailing-whitespace]: Trailing whitespace
          --> src/app.py:4:15
           fix: Remove trailing whitespace
        info[typescript-types]: Use "x" & <y>
        next
          --> web/a,b.ts:1:1
        "#);
    }

    #[test]
    fn test_render_json_is_compact() {
        let json = render_json(&sample()).unwrap();
        assert!(json.contains(r#""severity":"error""#));
        insta::assert_snapshot!(json, @r#"[{"rule_id":"python-imports","file_path":"src/app.py","line":2,"column":1,"message":"Import line too long (60 > 40)","severity":"error","source":"from collections import OrderedDict","fixable":false},{"rule_id":"no-trailing-whitespace","file_path":"src/app.py","line":4,"column":15,"message":"Trailing whitespace","severity":"warning","source":null,"fixable":true},{"rule_id":"typescript-types","file_path":"web/a,b.ts","line":1,"column":1,"message":"Use \"x\" & <y>\nnext","severity":"info","source":null,"fixable":false}]"#);

        let parsed: Vec<DiagnosticRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, records(&sample()));
    }

    #[test]
    fn test_render_xml_escapes() {
        insta::assert_snapshot!(render_xml(&sample()), @r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <results>
          <issue rule_id="python-imports" severity="error" file="src/app.py" line="2" column="1">Import line too long (60 &gt; 40)</issue>
          <issue rule_id="no-trailing-whitespace" severity="warning" file="src/app.py" line="4" column="15">Trailing whitespace</issue>
          <issue rule_id="typescript-types" severity="info" file="web/a,b.ts" line="1" column="1">Use &quot;x&quot; &amp; &lt;y&gt;
        next</issue>
        </results>
        "#);
    }

    #[test]
    fn test_render_github() {
        insta::assert_snapshot!(render_github(&sample()), @r#"
        ::error file=src/app.py,line=2,col=1::Import line too long (60 > 40) [python-imports]
        ::warning file=src/app.py,line=4,col=15::Trailing whitespace [no-trailing-whitespace]
        ::notice file=web/a%2Cb.ts,line=1,col=1::Use "x" & <y>%0Anext [typescript-types]
        "#);
    }

    #[test]
    fn test_summary() {
        let summary = Summary::new(&sample());
        assert_eq!(
            summary,
            Summary {
                files: 2,
                errors: 1,
                warnings: 1,
                infos: 1,
                fixable: 1,
            }
        );
        assert_eq!(
            render_summary(&summary),
            "✗ Found 1 error and 1 warning (1 info) in 2 files"
        );
        assert_eq!(render_summary(&Summary::default()), "✓ No issues found");
    }
}
