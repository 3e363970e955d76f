use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid configuration in {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("Unsupported configuration file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Configuration extends itself through {}", .0.display())]
    ExtendsCycle(PathBuf),
}
