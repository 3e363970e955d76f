use crate::{ConfigError, ProjectConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
pub const CONFIG_FILES: &[&str] = &[
    ".llamalint.yaml",
    ".llamalint.yml",
    ".llamalint.json",
    ".llamalint.toml",
    "pyproject.toml",
    "package.json",
];

const PYPROJECT: &str = "pyproject.toml";
const PACKAGE_JSON: &str = "package.json";

/// Find a llamalint config file by walking up the directory tree from the given start directory.
///
/// `pyproject.toml` and `package.json` only count when they carry a llamalint
/// section; otherwise the search continues.
#[tracing::instrument(fields(start = %start_dir.display()))]
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current_dir = start_dir.to_path_buf();
    let mut checked_dirs = 0;

    loop {
        tracing::trace!(dir = %current_dir.display(), "Checking directory for config files");
        for file_name in CONFIG_FILES {
            let config_path = current_dir.join(file_name);
            if !config_path.is_file() {
                continue;
            }
            if embeds_config(&config_path)? {
                tracing::info!(path = %config_path.display(), checked_dirs, "Found config file");
                return Ok(Some(config_path));
            }
            tracing::trace!(path = %config_path.display(), "No llamalint section, skipping");
        }

        checked_dirs += 1;
        if !current_dir.pop() {
            tracing::debug!(checked_dirs, "No config file found");
            break;
        }
    }

    Ok(None)
}

/// Dedicated config files always qualify; host manifests need a llamalint section
fn embeds_config(path: &Path) -> Result<bool> {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    match file_name {
        PYPROJECT => {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str::<toml::Table>(&contents)
                .ok()
                .and_then(|table| pyproject_section(&table).cloned())
                .is_some())
        }
        PACKAGE_JSON => {
            let contents = fs::read_to_string(path)?;
            Ok(serde_json::from_str::<serde_json::Value>(&contents)
                .ok()
                .is_some_and(|value| value.get("llamalint").is_some()))
        }
        _ => Ok(true),
    }
}

fn pyproject_section(table: &toml::Table) -> Option<&toml::Value> {
    table.get("tool")?.as_table()?.get("llamalint")
}

/// Load a llamalint config from the specified path.
/// Automatically detects the format based on file name and extension.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    tracing::debug!("Reading config file");
    let contents = fs::read_to_string(path)?;
    let config = load_config_from_str(&contents, path)?;
    tracing::info!(
        disabled_rules = config.disabled_rules.len(),
        rule_entries = config.rules.len(),
        "Config loaded successfully"
    );
    Ok(config)
}

/// Load a llamalint config from a string.
/// The path is used for error messages and format detection.
#[tracing::instrument(skip(contents), fields(path = %path.display(), size = contents.len()))]
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<ProjectConfig> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");

    tracing::debug!(extension, file_name, "Detecting config format");

    if contents.trim().is_empty() {
        tracing::debug!("Empty config file, using defaults");
        return Ok(ProjectConfig::default());
    }

    let config = match (file_name, extension) {
        (PYPROJECT, _) => {
            tracing::trace!("Reading [tool.llamalint] from pyproject.toml");
            parse_pyproject(contents, path)?
        }
        (PACKAGE_JSON, _) => {
            tracing::trace!("Reading \"llamalint\" from package.json");
            parse_package_json(contents, path)?
        }
        (_, "yml" | "yaml") => {
            tracing::trace!("Parsing as YAML");
            parse_yaml(contents, path)?
        }
        (_, "json") => {
            tracing::trace!("Parsing as JSON");
            parse_json(contents, path)?
        }
        (_, "toml") => {
            tracing::trace!("Parsing as TOML");
            parse_toml(contents, path)?
        }
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    tracing::debug!("Validating config");
    validate_config(&config, path)?;

    Ok(config)
}

/// Parse YAML configuration
fn parse_yaml(contents: &str, path: &Path) -> Result<ProjectConfig> {
    if is_empty_yaml(contents) {
        return Ok(ProjectConfig::default());
    }
    serde_saphyr::from_str(contents).map_err(|e| invalid(path, format!("YAML parse error: {e}")))
}

/// A document holding only comments, blank lines and markers
fn is_empty_yaml(contents: &str) -> bool {
    contents.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Parse JSON configuration
fn parse_json(contents: &str, path: &Path) -> Result<ProjectConfig> {
    serde_json::from_str(contents).map_err(|e| invalid(path, format!("JSON parse error: {e}")))
}

/// Parse TOML configuration
fn parse_toml(contents: &str, path: &Path) -> Result<ProjectConfig> {
    toml::from_str(contents).map_err(|e| invalid(path, format!("TOML parse error: {e}")))
}

fn parse_pyproject(contents: &str, path: &Path) -> Result<ProjectConfig> {
    let table: toml::Table =
        toml::from_str(contents).map_err(|e| invalid(path, format!("TOML parse error: {e}")))?;
    let Some(section) = pyproject_section(&table) else {
        return Err(invalid(path, "missing [tool.llamalint] table".to_string()));
    };
    section
        .clone()
        .try_into()
        .map_err(|e| invalid(path, format!("[tool.llamalint]: {e}")))
}

fn parse_package_json(contents: &str, path: &Path) -> Result<ProjectConfig> {
    let mut value: serde_json::Value =
        serde_json::from_str(contents).map_err(|e| invalid(path, format!("JSON parse error: {e}")))?;
    let Some(section) = value.get_mut("llamalint").map(serde_json::Value::take) else {
        return Err(invalid(path, "missing \"llamalint\" key".to_string()));
    };
    serde_json::from_value(section).map_err(|e| invalid(path, format!("\"llamalint\": {e}")))
}

fn invalid(path: &Path, message: String) -> ConfigError {
    ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    }
}

/// Validate the loaded configuration
///
/// Rule and formatter ids are checked by the linter, which owns the registry.
#[tracing::instrument(skip(config, path), fields(path = %path.display()))]
fn validate_config(config: &ProjectConfig, path: &Path) -> Result<()> {
    let patterns = config
        .include
        .iter()
        .flatten()
        .chain(config.exclude.iter().flatten());
    for pattern in patterns {
        if pattern.trim().is_empty() {
            return Err(invalid(path, "empty file pattern".to_string()));
        }
        for expanded in crate::matcher::expand_braces(pattern) {
            let normalized = crate::matcher::normalize_pattern(&expanded);
            if let Err(e) = glob::Pattern::new(&normalized) {
                return Err(ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    if let Some(extends) = &config.extends {
        if extends.entries().iter().any(|entry| entry.trim().is_empty()) {
            return Err(invalid(path, "empty extends entry".to_string()));
        }
    }

    for (key, value) in &config.formatters {
        if !value.is_object() {
            return Err(invalid(
                path,
                format!("formatter options for '{key}' must be a table"),
            ));
        }
    }

    tracing::debug!("Config validation passed");
    Ok(())
}
