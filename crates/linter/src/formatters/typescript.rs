use super::javascript::{format_script, SCRIPT_OPTIONS};
use crate::config::RuleOptions;
use crate::source::SourceFile;
use crate::traits::{Formatter, RuleOption};
use crate::Language;

/// JavaScript formatting applied to TypeScript, configured separately
pub struct TypeScriptFormatter;

impl Formatter for TypeScriptFormatter {
    fn name(&self) -> &'static str {
        "typescript-formatter"
    }

    fn description(&self) -> &'static str {
        "Normalizes TypeScript indentation and string quotes"
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::TypeScript]
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_formats_typescript() {
        let file = SourceFile::new(
            "test.ts",
            Language::TypeScript,
            "interface A {\n\tname: 'x' | 'y';\n}\n",
        );
        let options = match json!({ "tab_width": 4 }) {
            serde_json::Value::Object(table) => RuleOptions::new(table),
            _ => unreachable!(),
        };
        assert_eq!(
            TypeScriptFormatter.format(&file, &options),
            "interface A {\n    name: \"x\" | \"y\";\n}\n"
        );
    }
}
