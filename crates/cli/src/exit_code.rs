//! Exit codes for the llamalint CLI.
//!
//! Scripts and CI systems can tell failure modes apart by these codes.

/// Exit codes used by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// No errors
    Success = 0,
    /// Lint errors found, unformatted files under `--check`, or a failed gate
    LintError = 1,
    /// Missing or invalid config file, or an invalid argument
    ConfigError = 2,
    /// File read/write failure
    IoError = 4,
    /// A report file is not valid JSON
    ParseError = 5,
}

impl ExitCode {
    /// Exit the process with this exit code.
    pub fn exit(self) -> ! {
        std::process::exit(self as i32)
    }

    /// Map a command failure to its exit code
    ///
    /// The first recognised error in the chain wins; anything else is
    /// treated as a usage problem.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.is::<serde_json::Error>() {
                return Self::ParseError;
            }
            if let Some(lint_err) = cause.downcast_ref::<llamalint_linter::LintError>() {
                return match lint_err {
                    llamalint_linter::LintError::Config(_) => Self::ConfigError,
                    llamalint_linter::LintError::Io { .. } => Self::IoError,
                };
            }
            if let Some(config_err) = cause.downcast_ref::<llamalint_config::ConfigError>() {
                return match config_err {
                    llamalint_config::ConfigError::Io(_) => Self::IoError,
                    _ => Self::ConfigError,
                };
            }
            if cause.is::<std::io::Error>() {
                return Self::IoError;
            }
        }
        Self::ConfigError
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::LintError => write!(f, "lint error"),
            Self::ConfigError => write!(f, "configuration error"),
            Self::IoError => write!(f, "I/O error"),
            Self::ParseError => write!(f, "parse error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_codes() {
        assert_eq!(ExitCode::Success as i32, 0);
        assert_eq!(ExitCode::LintError as i32, 1);
        assert_eq!(ExitCode::ConfigError as i32, 2);
        assert_eq!(ExitCode::IoError as i32, 4);
        assert_eq!(ExitCode::ParseError as i32, 5);
    }

    #[test]
    fn test_from_error() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = anyhow::Error::from(json).context("Failed to parse report");
        assert_eq!(ExitCode::from_error(&err), ExitCode::ParseError);

        let io: anyhow::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).context("reading");
        assert_eq!(ExitCode::from_error(&io.unwrap_err()), ExitCode::IoError);

        let config = anyhow::Error::from(llamalint_linter::LintError::Config("bad".into()));
        assert_eq!(ExitCode::from_error(&config), ExitCode::ConfigError);

        assert_eq!(
            ExitCode::from_error(&anyhow::anyhow!("unknown rule")),
            ExitCode::ConfigError
        );
    }
}
