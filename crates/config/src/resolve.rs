use crate::{load_config, ConfigError, ExtendsConfig, ProjectConfig, Result};
use std::path::{Path, PathBuf};

const CONFIG_EXTENSIONS: &[&str] = &[".yaml", ".yml", ".json", ".toml"];

/// Whether an `extends` entry names another config file rather than a preset
#[must_use]
pub fn is_path_reference(entry: &str) -> bool {
    entry.contains('/')
        || entry.contains('\\')
        || entry.starts_with('.')
        || CONFIG_EXTENSIONS.iter().any(|ext| entry.ends_with(ext))
}

/// Load a config file and flatten its `extends` chain
///
/// File references are loaded relative to the file naming them and merged
/// underneath it, in the order listed. Preset names survive in `extends`
/// for the linter to apply.
#[tracing::instrument(fields(path = %path.display()))]
pub fn resolve_config(path: &Path) -> Result<ProjectConfig> {
    let mut stack = Vec::new();
    resolve_inner(path, &mut stack)
}

fn resolve_inner(path: &Path, stack: &mut Vec<PathBuf>) -> Result<ProjectConfig> {
    let canonical = path
        .canonicalize()
        .map_err(|_| ConfigError::NotFound(path.to_path_buf()))?;
    if stack.contains(&canonical) {
        return Err(ConfigError::ExtendsCycle(path.to_path_buf()));
    }
    stack.push(canonical);

    let local = load_config(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut base = ProjectConfig::default();
    let mut presets = Vec::new();
    for entry in local.presets() {
        if is_path_reference(entry) {
            let target = base_dir.join(entry);
            tracing::debug!(from = %path.display(), to = %target.display(), "Resolving extends");
            let parent = resolve_inner(&target, stack)?;
            base = base.merge(&parent);
        } else {
            presets.push(entry.to_string());
        }
    }

    let local = ProjectConfig {
        extends: ExtendsConfig::from_entries(presets),
        ..local
    };

    stack.pop();
    Ok(base.merge(&local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_path_reference() {
        assert!(is_path_reference("./base.yaml"));
        assert!(is_path_reference("../shared/.llamalint.yml"));
        assert!(is_path_reference("base.json"));
        assert!(is_path_reference("configs\\base"));
        assert!(!is_path_reference("recommended"));
        assert!(!is_path_reference("strict"));
    }

    #[test]
    fn test_resolve_without_extends() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".llamalint.yaml");
        fs::write(&path, "extends: strict\nexclude: [\"gen/**\"]\n").unwrap();

        let config = resolve_config(&path).unwrap();
        assert_eq!(config.presets(), vec!["strict"]);
        assert_eq!(config.exclude, Some(vec!["gen/**".to_string()]));
    }

    #[test]
    fn test_resolve_file_extends() {
        let temp_dir = TempDir::new().unwrap();
        let shared = temp_dir.path().join("shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(
            shared.join("base.yaml"),
            "extends: recommended\nexclude: [\"**/vendor/**\"]\ndisabled_rules: [python-naming]\nrules:\n  python:\n    style: google\n    check_order: true\n",
        )
        .unwrap();

        let project = temp_dir.path().join("project");
        fs::create_dir_all(&project).unwrap();
        let path = project.join(".llamalint.yaml");
        fs::write(
            &path,
            "extends: [../shared/base.yaml, strict]\nexclude: [\"**/gen/**\"]\nrules:\n  python:\n    style: numpy\n",
        )
        .unwrap();

        let config = resolve_config(&path).unwrap();
        assert_eq!(config.presets(), vec!["recommended", "strict"]);
        assert_eq!(
            config.exclude,
            Some(vec!["**/vendor/**".to_string(), "**/gen/**".to_string()])
        );
        assert!(config.is_rule_disabled("python-naming"));
        assert_eq!(
            config.rule_entry("python"),
            Some(&serde_json::json!({ "style": "numpy", "check_order": true }))
        );
    }

    #[test]
    fn test_resolve_cycle() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.yaml"), "extends: ./b.yaml\n").unwrap();
        fs::write(temp_dir.path().join("b.yaml"), "extends: ./a.yaml\n").unwrap();

        let result = resolve_config(&temp_dir.path().join("a.yaml"));
        assert!(matches!(result, Err(ConfigError::ExtendsCycle(_))));
    }

    #[test]
    fn test_resolve_missing_base() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".llamalint.yaml");
        fs::write(&path, "extends: ./missing.yaml\n").unwrap();

        let result = resolve_config(&path);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
