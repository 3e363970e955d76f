use crate::{ExitCode, OutputOptions};
use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use llamalint_config::ProjectConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    fn render(self, config: &ProjectConfig) -> std::result::Result<String, String> {
        match self {
            Self::Yaml => config.to_yaml(),
            Self::Json => config.to_json(),
            Self::Toml => config.to_toml(),
        }
    }
}

pub fn run(
    dir: Option<PathBuf>,
    format: ConfigFormat,
    force: bool,
    output: OutputOptions,
) -> Result<ExitCode> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let path = write_default_config(&dir, format, force)?;
    if output.show_info {
        println!("{} Created {}", "✓".green(), path.display());
    }
    Ok(ExitCode::Success)
}

/// Write `.llamalint.<ext>` with the default configuration into `dir`
pub fn write_default_config(dir: &Path, format: ConfigFormat, force: bool) -> Result<PathBuf> {
    let path = dir.join(format!(".llamalint.{}", format.extension()));
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let contents = format
        .render(&ProjectConfig::default_config())
        .map_err(|e| anyhow!("Failed to serialize config: {e}"))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Wrote default config");
    Ok(path)
}
