/// Trait hierarchy for lint rules and formatters
///
/// Rules and formatters are stateless singletons shared through the
/// registry; per-project settings reach them as [`RuleOptions`].
use crate::config::RuleOptions;
use crate::diagnostics::{LintDiagnostic, LintSeverity};
use crate::source::SourceFile;
use crate::Language;

/// A documented option of a rule or formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOption {
    pub name: &'static str,
    pub description: &'static str,
    /// Default value, as written in a config file
    pub default: &'static str,
    /// Accepted values, when the option is an enumeration
    pub choices: &'static [&'static str],
}

/// Invalid code paired with its corrected form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleExample {
    pub invalid: &'static str,
    pub valid: &'static str,
    pub explanation: &'static str,
}

/// Base trait for all lint rules
pub trait LintRule: Send + Sync {
    /// Unique identifier for this rule (e.g., `"python-imports"`)
    fn name(&self) -> &'static str;

    /// Short display title (e.g., `"Python Imports"`)
    fn title(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Languages this rule checks
    fn languages(&self) -> &'static [Language];

    /// Default severity (can be overridden by config)
    fn default_severity(&self) -> LintSeverity;

    fn options(&self) -> &'static [RuleOption] {
        &[]
    }

    fn examples(&self) -> &'static [RuleExample] {
        &[]
    }

    fn applies_to(&self, language: Language) -> bool {
        self.languages().contains(&language)
    }
}

/// Lint rule that checks one file at a time
pub trait FileLintRule: LintRule {
    /// Check a single file for issues
    ///
    /// The `options` contain the language section of the config with the
    /// rule's own options layered on top. Rules deserialize them into their
    /// own options struct with [`RuleOptions::parse`].
    fn check(&self, file: &SourceFile, options: &RuleOptions) -> Vec<LintDiagnostic>;
}

/// A source rewriter run by `llamalint format`
pub trait Formatter: Send + Sync {
    /// Unique identifier (e.g., `"python-formatter"`)
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn languages(&self) -> &'static [Language];

    /// Formatters run in ascending priority
    fn priority(&self) -> u8;

    fn options(&self) -> &'static [RuleOption] {
        &[]
    }

    /// Return the formatted text; must be idempotent
    fn format(&self, file: &SourceFile, options: &RuleOptions) -> String;

    fn applies_to(&self, language: Language) -> bool {
        self.languages().contains(&language)
    }
}
