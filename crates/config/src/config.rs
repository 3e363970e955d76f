use serde::{Deserialize, Serialize};

/// Free-form option table (`rules`, `formatters`).
///
/// Kept as raw JSON so that rule-specific parsing stays with the linter,
/// which knows the rule ids and their option shapes.
pub type OptionTable = serde_json::Map<String, serde_json::Value>;

const DEFAULT_INCLUDE: &[&str] = &[
    "**/*.py",
    "**/*.pyi",
    "**/*.js",
    "**/*.jsx",
    "**/*.ts",
    "**/*.tsx",
];

const DEFAULT_EXCLUDE: &[&str] = &[
    "**/node_modules/**",
    "**/.venv/**",
    "**/__pycache__/**",
    "**/dist/**",
    "**/build/**",
    "**/.git/**",
];

/// `extends` can name a single base or a list of them
///
/// Each entry is either a built-in preset (`recommended`, `strict`) or a
/// path to another config file, relative to the file that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtendsConfig {
    /// `extends: recommended`
    Single(String),
    /// `extends: [recommended, ../shared.llamalint.yaml]`
    Multiple(Vec<String>),
}

impl ExtendsConfig {
    /// All entries, normalizing the single form to a list
    #[must_use]
    pub fn entries(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => vec![s.as_str()],
            Self::Multiple(v) => v.iter().map(String::as_str).collect(),
        }
    }

    /// Build from a list, collapsing one entry to the single form
    #[must_use]
    pub fn from_entries(mut entries: Vec<String>) -> Option<Self> {
        match entries.len() {
            0 => None,
            1 => entries.pop().map(Self::Single),
            _ => Some(Self::Multiple(entries)),
        }
    }
}

/// Project configuration as written in `.llamalint.yaml`
///
/// ```yaml
/// extends: recommended
/// exclude: ["**/generated/**"]
/// rules:
///   python:
///     max_import_line_length: 120
///   python-naming: off
///   typescript-types: [warn, { no_any: false }]
/// disabled_rules: [javascript-imports]
/// formatters:
///   python-formatter:
///     indent_width: 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Base configurations to build on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<ExtendsConfig>,

    /// File patterns to lint (defaults to every supported language)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    /// File patterns to skip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    /// `rules.<language>.<option>` sections and per-rule entries
    #[serde(default, skip_serializing_if = "OptionTable::is_empty")]
    pub rules: OptionTable,

    /// Rule ids that never run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_rules: Vec<String>,

    /// Per-formatter or per-language formatter options
    #[serde(default, skip_serializing_if = "OptionTable::is_empty")]
    pub formatters: OptionTable,

    /// Formatter ids that never run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_formatters: Vec<String>,
}

impl ProjectConfig {
    /// The configuration written by `llamalint init` and used when no file is found
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            extends: Some(ExtendsConfig::Single("recommended".to_string())),
            include: Some(DEFAULT_INCLUDE.iter().map(ToString::to_string).collect()),
            exclude: Some(DEFAULT_EXCLUDE.iter().map(ToString::to_string).collect()),
            ..Self::default()
        }
    }

    /// Include patterns, falling back to the defaults when unset
    #[must_use]
    pub fn effective_include(&self) -> Vec<String> {
        self.include.clone().unwrap_or_else(|| {
            DEFAULT_INCLUDE.iter().map(ToString::to_string).collect()
        })
    }

    /// Exclude patterns, falling back to the defaults when unset
    #[must_use]
    pub fn effective_exclude(&self) -> Vec<String> {
        self.exclude.clone().unwrap_or_else(|| {
            DEFAULT_EXCLUDE.iter().map(ToString::to_string).collect()
        })
    }

    /// Preset names left in `extends` (file references are resolved away)
    #[must_use]
    pub fn presets(&self) -> Vec<&str> {
        self.extends
            .as_ref()
            .map(ExtendsConfig::entries)
            .unwrap_or_default()
    }

    /// Options configured for a rule or language section
    #[must_use]
    pub fn rule_entry(&self, key: &str) -> Option<&serde_json::Value> {
        self.rules.get(key)
    }

    /// Options configured for a formatter or language section
    #[must_use]
    pub fn formatter_entry(&self, key: &str) -> Option<&serde_json::Value> {
        self.formatters.get(key)
    }

    pub fn disable_rule(&mut self, rule_id: &str) {
        if !self.disabled_rules.iter().any(|r| r == rule_id) {
            self.disabled_rules.push(rule_id.to_string());
        }
    }

    pub fn enable_rule(&mut self, rule_id: &str) {
        self.disabled_rules.retain(|r| r != rule_id);
    }

    /// Disable every rule in `rule_ids` (the CLI `--ignore` flag)
    pub fn ignore_rules<S: AsRef<str>>(&mut self, rule_ids: &[S]) {
        for rule_id in rule_ids {
            self.disable_rule(rule_id.as_ref());
        }
    }

    pub fn disable_formatter(&mut self, formatter_id: &str) {
        if !self.disabled_formatters.iter().any(|f| f == formatter_id) {
            self.disabled_formatters.push(formatter_id.to_string());
        }
    }

    #[must_use]
    pub fn is_rule_disabled(&self, rule_id: &str) -> bool {
        self.disabled_rules.iter().any(|r| r == rule_id)
    }

    #[must_use]
    pub fn is_formatter_disabled(&self, formatter_id: &str) -> bool {
        self.disabled_formatters.iter().any(|f| f == formatter_id)
    }

    /// Layer `local` on top of `self` (the base)
    ///
    /// Include is replaced, excludes and disabled lists are unioned, option
    /// tables are deep-merged with local keys winning, and presets keep
    /// base-first order.
    #[must_use]
    pub fn merge(&self, local: &Self) -> Self {
        let mut presets: Vec<String> = Vec::new();
        for preset in self.presets().into_iter().chain(local.presets()) {
            if !presets.iter().any(|p| p == preset) {
                presets.push(preset.to_string());
            }
        }

        let exclude = match (&self.exclude, &local.exclude) {
            (None, None) => None,
            (base, over) => Some(union(
                base.as_deref().unwrap_or_default(),
                over.as_deref().unwrap_or_default(),
            )),
        };

        let mut rules = self.rules.clone();
        deep_merge(&mut rules, &local.rules);
        let mut formatters = self.formatters.clone();
        deep_merge(&mut formatters, &local.formatters);

        Self {
            extends: ExtendsConfig::from_entries(presets),
            include: local.include.clone().or_else(|| self.include.clone()),
            exclude,
            rules,
            disabled_rules: union(&self.disabled_rules, &local.disabled_rules),
            formatters,
            disabled_formatters: union(&self.disabled_formatters, &local.disabled_formatters),
        }
    }

    pub fn to_yaml(&self) -> Result<String, String> {
        serde_saphyr::to_string(self).map_err(|e| e.to_string())
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| e.to_string())
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string(self).map_err(|e| e.to_string())
    }
}

fn union(base: &[String], over: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(base.len() + over.len());
    for item in base.iter().chain(over) {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

/// Recursively merge `over` into `base`; objects merge, anything else is replaced
fn deep_merge(base: &mut OptionTable, over: &OptionTable) {
    for (key, value) in over {
        match (base.get_mut(key), value) {
            (Some(serde_json::Value::Object(existing)), serde_json::Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}
