use anyhow::{Context, Result};
use llamalint_config::{find_config, resolve_config, ProjectConfig};
use llamalint_linter::{LintResult, Linter};
use std::path::{Path, PathBuf};

/// Resolved configuration shared by the commands that lint or format
pub struct CommandContext {
    pub config: ProjectConfig,
    /// Config file in use, if one was found
    pub config_path: Option<PathBuf>,
    /// Directory include/exclude patterns are relative to
    pub root: PathBuf,
}

impl CommandContext {
    /// Load the config given with `--config`, or search upwards from the current directory
    ///
    /// Without a config file the default configuration applies.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => Some(path),
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                find_config(&cwd).context("Failed to search for a config file")?
            }
        };

        let Some(path) = config_path else {
            tracing::debug!("No config file found, using defaults");
            return Ok(Self {
                config: ProjectConfig::default_config(),
                config_path: None,
                root: PathBuf::from("."),
            });
        };

        let config = resolve_config(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        tracing::debug!(config = %path.display(), root = %root.display(), "Loaded config");
        Ok(Self {
            config,
            config_path: Some(path),
            root,
        })
    }

    /// Build a linter for this config, skipping the `ignore`d rule ids
    pub fn linter(&self, ignore: &[String]) -> Result<Linter> {
        let mut config = self.config.clone();
        config.ignore_rules(ignore);
        let linter = Linter::new(&config).with_context(|| match &self.config_path {
            Some(path) => format!("Invalid configuration in {}", path.display()),
            None => "Invalid configuration".to_string(),
        })?;
        Ok(linter.with_root(&self.root))
    }
}

/// The paths to operate on, defaulting to the current directory
pub fn targets(paths: &[PathBuf]) -> Vec<PathBuf> {
    if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths.to_vec()
    }
}

/// Lint every target in order; directories are walked, files linted directly
pub fn lint_targets(linter: &Linter, paths: &[PathBuf], fix: bool) -> Vec<LintResult> {
    paths
        .iter()
        .flat_map(|path| {
            if path.is_file() {
                vec![linter.lint_file(path, fix)]
            } else {
                linter.lint_directory(path, fix)
            }
        })
        .collect()
}
