use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, LintError>;

#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error("Invalid lint configuration: {0}")]
    Config(String),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<llamalint_config::ConfigError> for LintError {
    fn from(err: llamalint_config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
