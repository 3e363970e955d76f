/// Registry of all built-in lint rules and formatters
///
/// Rules are registered here so the engine and the CLI's `rules`
/// command can enumerate them.
use crate::formatters::{
    JavaScriptFormatter, PythonFormatter, TypeScriptFormatter, WhitespaceFormatter,
};
use crate::rules::{
    JavaScriptImportsRuleImpl, NoTrailingWhitespaceRuleImpl, PythonDocstringsRuleImpl,
    PythonImportsRuleImpl, PythonNamingRuleImpl, TypeScriptTypesRuleImpl,
};
use crate::traits::{FileLintRule, Formatter};
use crate::Language;
use std::sync::{Arc, LazyLock};

static FILE_RULES: LazyLock<Vec<Arc<dyn FileLintRule>>> = LazyLock::new(|| {
    vec![
        Arc::new(PythonImportsRuleImpl),
        Arc::new(PythonDocstringsRuleImpl),
        Arc::new(PythonNamingRuleImpl),
        Arc::new(JavaScriptImportsRuleImpl),
        Arc::new(TypeScriptTypesRuleImpl),
        Arc::new(NoTrailingWhitespaceRuleImpl),
    ]
});

static FORMATTERS: LazyLock<Vec<Arc<dyn Formatter>>> = LazyLock::new(|| {
    let mut formatters: Vec<Arc<dyn Formatter>> = vec![
        Arc::new(WhitespaceFormatter),
        Arc::new(PythonFormatter),
        Arc::new(JavaScriptFormatter),
        Arc::new(TypeScriptFormatter),
    ];
    formatters.sort_by_key(|f| f.priority());
    formatters
});

/// Get all file lint rules, in registration order
#[must_use]
pub fn file_rules() -> &'static [Arc<dyn FileLintRule>] {
    &FILE_RULES
}

/// Get all formatters, in ascending priority
#[must_use]
pub fn formatters() -> &'static [Arc<dyn Formatter>] {
    &FORMATTERS
}

/// Get all rule names
#[must_use]
pub fn all_rule_names() -> Vec<&'static str> {
    FILE_RULES.iter().map(|r| r.name()).collect()
}

#[must_use]
pub fn all_formatter_names() -> Vec<&'static str> {
    FORMATTERS.iter().map(|f| f.name()).collect()
}

#[must_use]
pub fn find_rule(name: &str) -> Option<&'static Arc<dyn FileLintRule>> {
    FILE_RULES.iter().find(|r| r.name() == name)
}

/// Closest registered rule id to a misspelled `name`
#[must_use]
pub fn suggest_rule(name: &str) -> Option<&'static str> {
    crate::config::closest_name(name, &all_rule_names())
}

#[must_use]
pub fn find_formatter(name: &str) -> Option<&'static Arc<dyn Formatter>> {
    FORMATTERS.iter().find(|f| f.name() == name)
}

/// Rules that check files of `language`
pub fn rules_for_language(
    language: Language,
) -> impl Iterator<Item = &'static Arc<dyn FileLintRule>> {
    FILE_RULES.iter().filter(move |r| r.applies_to(language))
}

/// Formatters that apply to `language`, in ascending priority
pub fn formatters_for_language(
    language: Language,
) -> impl Iterator<Item = &'static Arc<dyn Formatter>> {
    FORMATTERS.iter().filter(move |f| f.applies_to(language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_names_are_unique() {
        let names = all_rule_names();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len());
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_find_rule() {
        let rule = find_rule("python-imports").unwrap();
        assert_eq!(rule.languages(), &[Language::Python]);
        assert!(find_rule("python-import").is_none());
    }

    #[test]
    fn test_rules_for_language() {
        let names: Vec<_> = rules_for_language(Language::TypeScript)
            .map(|r| r.name())
            .collect();
        assert_eq!(names, vec!["typescript-types", "no-trailing-whitespace"]);
    }

    #[test]
    fn test_formatters_sorted_by_priority() {
        let priorities: Vec<_> = formatters().iter().map(|f| f.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted);
        assert_eq!(formatters()[0].name(), "whitespace-formatter");
        assert!(find_formatter("typescript-formatter").is_some());
    }

    #[test]
    fn test_every_rule_is_documented() {
        for rule in file_rules() {
            assert!(!rule.description().is_empty(), "{}", rule.name());
            assert!(!rule.languages().is_empty(), "{}", rule.name());
        }
    }

    #[test]
    fn test_suggest_rule() {
        assert_eq!(suggest_rule("python-import"), Some("python-imports"));
        assert_eq!(suggest_rule("typescript-type"), Some("typescript-types"));
        assert_eq!(suggest_rule("zzz"), None);
    }
}
