use crate::ExitCode;
use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use llamalint_linter::{
    file_rules, find_rule, suggest_rule, DiagnosticSeverity, FileLintRule, Language,
};
use std::fmt::Write;
use std::sync::Arc;

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List the built-in rules
    List {
        /// Only rules for this language (python, javascript, typescript)
        #[arg(short, long)]
        language: Option<String>,

        /// Only rules with this default severity
        #[arg(short, long, value_enum)]
        severity: Option<SeverityFilter>,
    },

    /// Describe one rule: languages, severity, options and examples
    Show {
        /// Rule id, e.g. python-imports
        rule_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SeverityFilter {
    Error,
    Warning,
    Info,
}

impl SeverityFilter {
    const fn matches(self, severity: DiagnosticSeverity) -> bool {
        matches!(
            (self, severity),
            (Self::Error, DiagnosticSeverity::Error)
                | (Self::Warning, DiagnosticSeverity::Warning)
                | (Self::Info, DiagnosticSeverity::Info)
        )
    }
}

pub fn run(command: RulesCommand) -> Result<ExitCode> {
    match command {
        RulesCommand::List { language, severity } => {
            let language = match language {
                Some(name) => Some(parse_language(&name)?),
                None => None,
            };
            print!("{}", render_list(language, severity));
        }
        RulesCommand::Show { rule_id } => {
            let Some(rule) = find_rule(&rule_id) else {
                bail!("{}", unknown_rule(&rule_id));
            };
            print!("{}", render_rule(rule.as_ref()));
        }
    }
    Ok(ExitCode::Success)
}

fn parse_language(name: &str) -> Result<Language> {
    match Language::from_name(name) {
        Some(language) => Ok(language),
        None => bail!("Unknown language '{name}'. Expected python, javascript or typescript"),
    }
}

fn unknown_rule(rule_id: &str) -> String {
    let mut message = format!("Unknown rule '{rule_id}'.");
    if let Some(suggestion) = suggest_rule(rule_id) {
        let _ = write!(message, " Did you mean '{suggestion}'?");
    }
    message.push_str(" Run `llamalint rules list` to see all rules.");
    message
}

fn languages(rule: &dyn FileLintRule) -> String {
    rule.languages()
        .iter()
        .map(|l| l.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_list(language: Option<Language>, severity: Option<SeverityFilter>) -> String {
    let rules: Vec<&Arc<dyn FileLintRule>> = file_rules()
        .iter()
        .filter(|rule| language.is_none_or(|l| rule.applies_to(l)))
        .filter(|rule| severity.is_none_or(|s| s.matches(rule.default_severity())))
        .collect();

    let mut out = String::new();
    for rule in &rules {
        let _ = writeln!(
            out,
            "{:<24} {:<8} {}",
            rule.name().bold(),
            rule.default_severity().to_string(),
            languages(rule.as_ref()).dimmed()
        );
        let _ = writeln!(out, "    {}", rule.description());
    }
    let _ = writeln!(out, "\n{} rule(s)", rules.len());
    out
}

fn render_rule(rule: &dyn FileLintRule) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", rule.name().bold(), rule.title());
    let _ = writeln!(out);
    let _ = writeln!(out, "Description: {}", rule.description());
    let _ = writeln!(out, "Languages:   {}", languages(rule));
    let _ = writeln!(out, "Severity:    {}", rule.default_severity());

    if !rule.options().is_empty() {
        let _ = writeln!(out, "\n{}", "Options:".bold());
        for option in rule.options() {
            let _ = writeln!(out, "  {}: {}", option.name.cyan(), option.description);
            let _ = writeln!(out, "    Default: {}", option.default);
            if !option.choices.is_empty() {
                let _ = writeln!(out, "    Choices: {}", option.choices.join(", "));
            }
        }
    }

    if !rule.examples().is_empty() {
        let _ = writeln!(out, "\n{}", "Examples:".bold());
        for example in rule.examples() {
            let _ = writeln!(out, "  {}", example.explanation);
            let _ = writeln!(out, "  {}", "Invalid:".red());
            for line in example.invalid.lines() {
                let _ = writeln!(out, "    {line}");
            }
            let _ = writeln!(out, "  {}", "Valid:".green());
            for line in example.valid.lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
    }
    out
}
