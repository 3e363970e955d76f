use crate::diagnostics::LintSeverity as DiagnosticSeverity;
use crate::error::{LintError, Result};
use crate::{registry, Language};
use llamalint_config::{OptionTable, ProjectConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Severity level for a lint rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    Off,
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LintSeverity {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "off" => Some(Self::Off),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// The diagnostic severity this level reports with (`None` when off)
    #[must_use]
    pub const fn to_diagnostic(self) -> Option<DiagnosticSeverity> {
        match self {
            Self::Off => None,
            Self::Info => Some(DiagnosticSeverity::Info),
            Self::Warn => Some(DiagnosticSeverity::Warning),
            Self::Error => Some(DiagnosticSeverity::Error),
        }
    }

    #[must_use]
    pub const fn from_diagnostic(severity: DiagnosticSeverity) -> Self {
        match severity {
            DiagnosticSeverity::Info => Self::Info,
            DiagnosticSeverity::Warning => Self::Warn,
            DiagnosticSeverity::Error => Self::Error,
        }
    }
}

/// Configuration for a single lint rule
///
/// Supports multiple formats:
/// ```yaml
/// # Simple severity
/// python-naming: warn
///
/// # Object style with options
/// python-imports:
///   severity: error
///   options:
///     max_import_line_length: 120
///
/// # ESLint-style array: [severity, options]
/// typescript-types: [warn, { no_any: false }]
///
/// # Options only, severity from presets
/// python-docstrings: { style: numpy }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LintRuleConfig {
    /// Just a severity level (simple case)
    Severity(LintSeverity),

    /// Detailed config with options
    Detailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        severity: Option<LintSeverity>,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<serde_json::Value>,
    },
}

impl LintRuleConfig {
    /// Get the severity for this rule configuration, if it sets one
    #[must_use]
    pub const fn severity(&self) -> Option<LintSeverity> {
        match self {
            Self::Severity(s) => Some(*s),
            Self::Detailed { severity, .. } => *severity,
        }
    }

    /// Get the options for this rule configuration (if any)
    #[must_use]
    pub const fn options(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Severity(_) => None,
            Self::Detailed { options, .. } => options.as_ref(),
        }
    }
}

/// Custom deserializer for `LintRuleConfig` to handle ESLint-style array syntax
impl<'de> Deserialize<'de> for LintRuleConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, MapAccess, SeqAccess, Visitor};

        struct LintRuleConfigVisitor;

        impl<'de> Visitor<'de> for LintRuleConfigVisitor {
            type Value = LintRuleConfig;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str(
                    "a severity string ('off', 'info', 'warn', 'error'), \
                     an array [severity, options], \
                     or an object { severity, options }",
                )
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                LintSeverity::parse(value)
                    .map(LintRuleConfig::Severity)
                    .ok_or_else(|| E::custom(format!("unknown severity: {value}")))
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                // Unquoted `off` in YAML 1.1 style documents
                if value {
                    Err(E::custom("expected a severity, got `true`"))
                } else {
                    Ok(LintRuleConfig::Severity(LintSeverity::Off))
                }
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                // ESLint numeric levels
                let severity = match value {
                    0 => LintSeverity::Off,
                    1 => LintSeverity::Warn,
                    2 => LintSeverity::Error,
                    _ => return Err(E::custom(format!("unknown severity level: {value}"))),
                };
                Ok(LintRuleConfig::Severity(severity))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map_err(|_| E::custom(format!("unknown severity level: {value}")))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                // ESLint-style: [severity, options]
                let severity: LintSeverity = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &"array with severity"))?;

                let options: Option<serde_json::Value> = seq.next_element()?;

                Ok(LintRuleConfig::Detailed {
                    severity: Some(severity),
                    options,
                })
            }

            fn visit_map<A>(self, map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut table =
                    OptionTable::deserialize(de::value::MapAccessDeserializer::new(map))?;

                // `{ severity, options }`, or options inline next to an optional severity
                let severity = match table.remove("severity") {
                    Some(value) => Some(
                        serde_json::from_value::<LintSeverity>(value).map_err(de::Error::custom)?,
                    ),
                    None => None,
                };
                let options = if table.keys().all(|k| k == "options") {
                    table.remove("options")
                } else if table.contains_key("options") {
                    return Err(de::Error::custom(
                        "'options' cannot be combined with inline rule options",
                    ));
                } else {
                    Some(serde_json::Value::Object(table))
                };
                Ok(LintRuleConfig::Detailed { severity, options })
            }
        }

        deserializer.deserialize_any(LintRuleConfigVisitor)
    }
}

/// Built-in base configurations usable in `extends`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every rule at its default severity
    Recommended,
    /// Every rule at `error`
    Strict,
}

impl Preset {
    pub const ALL: &'static [Preset] = &[Self::Recommended, Self::Strict];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::Recommended),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
        }
    }

    fn severity(self, default: DiagnosticSeverity) -> LintSeverity {
        match self {
            Self::Recommended => LintSeverity::from_diagnostic(default),
            Self::Strict => LintSeverity::Error,
        }
    }
}

/// Rule or formatter options after merging language sections and per-id entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOptions(OptionTable);

impl RuleOptions {
    #[must_use]
    pub const fn new(table: OptionTable) -> Self {
        Self(table)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    #[must_use]
    pub const fn as_table(&self) -> &OptionTable {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserialize into a rule's options struct
    ///
    /// Unknown keys are ignored since language sections are shared by all
    /// rules of that language. A malformed value falls back to defaults.
    #[must_use]
    pub fn parse<T: DeserializeOwned + Default>(&self) -> T {
        self.try_parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Invalid options, using defaults");
            T::default()
        })
    }

    pub fn try_parse<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.0.clone()))
    }

    fn extend_from(&mut self, value: Option<&serde_json::Value>) {
        if let Some(serde_json::Value::Object(table)) = value {
            for (key, value) in table {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Lint settings derived from a [`ProjectConfig`]
///
/// The `rules` table mixes two kinds of keys: language names hold options
/// shared by that language's rules (`rules.python.max_import_line_length`),
/// everything else is a rule id with a [`LintRuleConfig`].
#[derive(Debug, Clone, Default)]
pub struct LintConfig {
    presets: Vec<Preset>,
    rules: HashMap<String, LintRuleConfig>,
    language_options: HashMap<Language, serde_json::Value>,
    disabled_rules: HashSet<String>,
    formatter_options: HashMap<String, serde_json::Value>,
    disabled_formatters: HashSet<String>,
}

impl LintConfig {
    /// Parse and validate the lint-related parts of a project config
    ///
    /// Unknown rule, formatter and preset names are errors; the message
    /// suggests the closest valid name.
    pub fn from_project(config: &ProjectConfig) -> Result<Self> {
        let rule_names = registry::all_rule_names();
        let formatter_names = registry::all_formatter_names();
        let language_names: Vec<&str> = Language::ALL.iter().map(|l| l.name()).collect();

        let mut presets = Vec::new();
        for name in config.presets() {
            let preset = Preset::from_name(name).ok_or_else(|| {
                let valid: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                LintError::Config(unknown_name("preset", name, &valid))
            })?;
            presets.push(preset);
        }

        let mut rules = HashMap::new();
        let mut language_options = HashMap::new();
        for (key, value) in &config.rules {
            if let Some(language) = Language::from_name(key) {
                if !value.is_object() {
                    return Err(LintError::Config(format!(
                        "rules.{key} must be a table of options"
                    )));
                }
                language_options.insert(language, value.clone());
            } else if rule_names.contains(&key.as_str()) {
                let entry: LintRuleConfig = serde_json::from_value(value.clone())
                    .map_err(|e| LintError::Config(format!("rules.{key}: {e}")))?;
                if entry.options().is_some_and(|o| !o.is_object()) {
                    return Err(LintError::Config(format!(
                        "rules.{key}: options must be a table"
                    )));
                }
                rules.insert(key.clone(), entry);
            } else {
                let mut valid = language_names.clone();
                valid.extend(rule_names.iter().copied());
                return Err(LintError::Config(unknown_name("rule", key, &valid)));
            }
        }

        for name in &config.disabled_rules {
            if !rule_names.contains(&name.as_str()) {
                return Err(LintError::Config(unknown_name("rule", name, &rule_names)));
            }
        }

        let mut formatter_options = HashMap::new();
        for (key, value) in &config.formatters {
            if Language::from_name(key).is_none() && !formatter_names.contains(&key.as_str()) {
                let mut valid = language_names.clone();
                valid.extend(formatter_names.iter().copied());
                return Err(LintError::Config(unknown_name("formatter", key, &valid)));
            }
            formatter_options.insert(key.clone(), value.clone());
        }

        for name in &config.disabled_formatters {
            if !formatter_names.contains(&name.as_str()) {
                return Err(LintError::Config(unknown_name(
                    "formatter",
                    name,
                    &formatter_names,
                )));
            }
        }

        tracing::debug!(
            presets = presets.len(),
            rule_entries = rules.len(),
            language_sections = language_options.len(),
            "Lint config parsed"
        );

        Ok(Self {
            presets,
            rules,
            language_options,
            disabled_rules: config.disabled_rules.iter().cloned().collect(),
            formatter_options,
            disabled_formatters: config.disabled_formatters.iter().cloned().collect(),
        })
    }

    /// Get the severity for a rule, considering presets and overrides
    #[must_use]
    pub fn get_severity(&self, rule_name: &str) -> LintSeverity {
        if self.disabled_rules.contains(rule_name) {
            return LintSeverity::Off;
        }
        let Some(rule) = registry::find_rule(rule_name) else {
            return LintSeverity::Off;
        };

        if let Some(severity) = self.rules.get(rule_name).and_then(LintRuleConfig::severity) {
            return severity;
        }

        let default = rule.default_severity();
        if self.presets.is_empty() {
            return Preset::Recommended.severity(default);
        }
        // Later presets override earlier ones
        self.presets
            .iter()
            .fold(LintSeverity::Off, |_, preset| preset.severity(default))
    }

    /// Check if a rule is enabled (not Off)
    #[must_use]
    pub fn is_enabled(&self, rule_name: &str) -> bool {
        self.get_severity(rule_name) != LintSeverity::Off
    }

    /// Effective options of a rule for a file of `language`
    #[must_use]
    pub fn rule_options(&self, rule_name: &str, language: Language) -> RuleOptions {
        let mut options = RuleOptions::default();
        options.extend_from(self.language_options.get(&language));
        options.extend_from(self.rules.get(rule_name).and_then(LintRuleConfig::options));
        options
    }

    #[must_use]
    pub fn is_formatter_enabled(&self, formatter_name: &str) -> bool {
        !self.disabled_formatters.contains(formatter_name)
    }

    /// Effective options of a formatter for a file of `language`
    #[must_use]
    pub fn formatter_options(&self, formatter_name: &str, language: Language) -> RuleOptions {
        let mut options = RuleOptions::default();
        options.extend_from(self.formatter_options.get(language.name()));
        options.extend_from(self.formatter_options.get(formatter_name));
        options
    }

    #[must_use]
    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }
}

/// The candidate most similar to `name`, if any is close enough
pub(crate) fn closest_name<'a>(name: &str, valid: &[&'a str]) -> Option<&'a str> {
    valid
        .iter()
        .map(|candidate| (strsim::jaro_winkler(name, candidate), *candidate))
        .filter(|(score, _)| *score >= 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate)
}

/// Error text for an unknown name, with the closest match when one is close enough
fn unknown_name(kind: &str, name: &str, valid: &[&str]) -> String {
    use std::fmt::Write;

    let mut message = format!("unknown {kind} '{name}'");
    if let Some(candidate) = closest_name(name, valid) {
        let _ = write!(message, ". Did you mean '{candidate}'?");
    }
    let _ = write!(message, "\n\nValid {kind} names are:\n");
    for candidate in valid {
        let _ = writeln!(message, "  - {candidate}");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn project(yaml: &str) -> ProjectConfig {
        serde_saphyr::from_str(yaml).unwrap()
    }

    #[test]
    fn test_rule_config_formats() {
        let simple: LintRuleConfig = serde_json::from_value(json!("warn")).unwrap();
        assert_eq!(simple, LintRuleConfig::Severity(LintSeverity::Warn));

        let array: LintRuleConfig =
            serde_json::from_value(json!(["error", { "no_any": false }])).unwrap();
        assert_eq!(array.severity(), Some(LintSeverity::Error));
        assert_eq!(array.options(), Some(&json!({ "no_any": false })));

        let object: LintRuleConfig =
            serde_json::from_value(json!({ "severity": "info", "options": { "style": "numpy" } }))
                .unwrap();
        assert_eq!(object.severity(), Some(LintSeverity::Info));

        let options_only: LintRuleConfig =
            serde_json::from_value(json!({ "style": "numpy" })).unwrap();
        assert_eq!(options_only.severity(), None);
        assert_eq!(options_only.options(), Some(&json!({ "style": "numpy" })));

        let numeric: LintRuleConfig = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(numeric.severity(), Some(LintSeverity::Error));

        let off: LintRuleConfig = serde_json::from_value(json!(false)).unwrap();
        assert_eq!(off.severity(), Some(LintSeverity::Off));
        assert!(serde_json::from_value::<LintRuleConfig>(json!(true)).is_err());
    }

    #[test]
    fn test_rule_config_severity_beside_inline_options() {
        let mixed: LintRuleConfig =
            serde_json::from_value(json!({ "severity": "error", "check_order": false })).unwrap();
        assert_eq!(mixed.severity(), Some(LintSeverity::Error));
        assert_eq!(mixed.options(), Some(&json!({ "check_order": false })));

        let from_yaml: LintRuleConfig =
            serde_saphyr::from_str("{ severity: error, check_order: false }").unwrap();
        assert_eq!(from_yaml.severity(), Some(LintSeverity::Error));

        assert!(serde_json::from_value::<LintRuleConfig>(
            json!({ "severity": "warn", "options": {}, "style": "numpy" })
        )
        .is_err());
    }

    #[test]
    fn test_rule_config_from_yaml() {
        let entry: LintRuleConfig =
            serde_saphyr::from_str("[warning, { check_order: false }]").unwrap();
        assert_eq!(entry.severity(), Some(LintSeverity::Warn));
    }

    #[test]
    fn test_invalid_severity() {
        let result: std::result::Result<LintRuleConfig, _> = serde_json::from_value(json!("loud"));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_is_recommended() {
        let config = LintConfig::from_project(&ProjectConfig::default()).unwrap();
        assert_eq!(config.get_severity("python-imports"), LintSeverity::Warn);
        assert_eq!(config.get_severity("typescript-types"), LintSeverity::Error);
        assert!(config.is_enabled("no-trailing-whitespace"));
        assert!(!config.is_enabled("not-a-rule"));
    }

    #[test]
    fn test_strict_preset() {
        let config = LintConfig::from_project(&project("extends: strict")).unwrap();
        assert_eq!(config.get_severity("python-naming"), LintSeverity::Error);
    }

    #[test]
    fn test_rule_override_and_disable() {
        let config = LintConfig::from_project(&project(
            "extends: strict\nrules:\n  python-naming: off\n  python-imports: info\ndisabled_rules: [typescript-types]\n",
        ))
        .unwrap();
        assert_eq!(config.get_severity("python-naming"), LintSeverity::Off);
        assert_eq!(config.get_severity("python-imports"), LintSeverity::Info);
        assert_eq!(config.get_severity("typescript-types"), LintSeverity::Off);
        assert_eq!(config.get_severity("python-docstrings"), LintSeverity::Error);
    }

    #[test]
    fn test_rule_options_layering() {
        let config = LintConfig::from_project(&project(
            "rules:\n  python:\n    max_import_line_length: 120\n    check_order: false\n  python-imports: [warn, { max_import_line_length: 80 }]\n",
        ))
        .unwrap();
        let options = config.rule_options("python-imports", Language::Python);
        assert_eq!(options.get("max_import_line_length"), Some(&json!(80)));
        assert_eq!(options.get("check_order"), Some(&json!(false)));

        let js = config.rule_options("python-imports", Language::JavaScript);
        assert_eq!(js.get("check_order"), None);
    }

    #[test]
    fn test_formatter_options_layering() {
        let config = LintConfig::from_project(&project(
            "formatters:\n  javascript:\n    tab_width: 4\n  javascript-formatter:\n    single_quote: true\ndisabled_formatters: [python-formatter]\n",
        ))
        .unwrap();
        let options = config.formatter_options("javascript-formatter", Language::JavaScript);
        assert_eq!(options.get("tab_width"), Some(&json!(4)));
        assert_eq!(options.get("single_quote"), Some(&json!(true)));
        assert!(!config.is_formatter_enabled("python-formatter"));
    }

    #[test]
    fn test_unknown_rule_suggests() {
        let err = LintConfig::from_project(&project("rules:\n  python-import: warn\n")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown rule 'python-import'"));
        assert!(message.contains("Did you mean 'python-imports'?"));
    }

    #[test]
    fn test_unknown_preset() {
        let err = LintConfig::from_project(&project("extends: recomended")).unwrap_err();
        assert!(err.to_string().contains("Did you mean 'recommended'?"));
    }

    #[test]
    fn test_unknown_disabled_rule() {
        let err = LintConfig::from_project(&project("disabled_rules: [bogus]")).unwrap_err();
        assert!(err.to_string().contains("unknown rule 'bogus'"));
    }

    #[test]
    fn test_language_section_must_be_table() {
        assert!(LintConfig::from_project(&project("rules:\n  python: warn\n")).is_err());
    }

    #[test]
    fn test_rule_options_parse_fallback() {
        #[derive(Debug, Default, Deserialize, PartialEq)]
        #[serde(default)]
        struct Opts {
            width: usize,
        }
        let mut table = OptionTable::new();
        table.insert("width".to_string(), json!("wide"));
        let options = RuleOptions::new(table);
        assert_eq!(options.parse::<Opts>(), Opts::default());
        assert!(options.try_parse::<Opts>().is_err());
    }
}
