mod commands;
mod exit_code;
mod progress;
mod report;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::check::CheckArgs;
use commands::format::FormatArgs;
use commands::init::ConfigFormat;
use commands::lint::LintArgs;
use commands::rules::RulesCommand;
use exit_code::ExitCode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "llamalint")]
#[command(about = "Lint and format Python, JavaScript and TypeScript", long_about = None)]
#[command(version, subcommand_precedence_over_arg = true)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Path to a llamalint config file (searched upwards from the current directory by default)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// Force colored output even when not a TTY
    #[arg(long, global = true, conflicts_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long, global = true, conflicts_with = "color")]
    no_color: bool,

    /// Suppress all output except diagnostics and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Suppress progress indicators (spinners)
    #[arg(long, global = true)]
    no_progress: bool,

    /// Files or directories to lint when no subcommand is given
    paths: Vec<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output verbosity options
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    /// Whether to show progress indicators (spinners)
    pub show_progress: bool,
    /// Whether to show informational output (success messages, summaries)
    pub show_info: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint rules, optionally applying their fixes
    Lint(LintArgs),

    /// Lint without fixing and report files whose formatting would change
    ///
    /// Recommended for CI pipelines.
    Check(CheckArgs),

    /// Format files in place
    Format(FormatArgs),

    /// Write a default config file
    Init {
        /// Directory to write the config file into
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Config file format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// List and describe the built-in rules
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },

    /// Fail when a saved JSON report contains an error record
    Gate {
        /// JSON report written by `llamalint lint -f json`
        report: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Text,
    /// Compact JSON array of diagnostics
    Json,
    /// XML document of issues
    Xml,
    /// GitHub Actions workflow commands for PR annotations
    Github,
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    if let Some(enabled) = color_override(cli.color, cli.no_color, |name| {
        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }) {
        colored::control::set_override(enabled);
    }

    let output = OutputOptions {
        show_progress: !cli.quiet && !cli.no_progress,
        show_info: !cli.quiet,
    };

    let config = cli.config;
    let result = match cli.command {
        None => commands::lint::run(
            config,
            &LintArgs {
                paths: cli.paths,
                ..LintArgs::default()
            },
            output,
        ),
        Some(Commands::Lint(args)) => commands::lint::run(config, &args, output),
        Some(Commands::Check(args)) => commands::check::run(config, &args, output),
        Some(Commands::Format(args)) => commands::format::run(config, &args, output),
        Some(Commands::Init { dir, format, force }) => {
            commands::init::run(dir, format, force, output)
        }
        Some(Commands::Rules { command }) => commands::rules::run(command),
        Some(Commands::Gate { report }) => commands::gate::run(&report, output),
    };

    match result {
        Ok(code) => code.exit(),
        Err(err) => {
            let code = ExitCode::from_error(&err);
            eprintln!("{} {err:#}", "✗".red().bold());
            tracing::debug!(%code, "Command failed");
            code.exit()
        }
    }
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins; otherwise logging is off unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "llamalint=debug,llamalint_linter=debug,llamalint_config=debug"
    } else {
        "off"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Decide whether colors are forced on or off.
///
/// Priority order (highest to lowest):
/// 1. `--color` flag (force colors on)
/// 2. `--no-color` flag (force colors off)
/// 3. `NO_COLOR` environment variable (if set to any value, disable colors)
/// 4. `CLICOLOR_FORCE` environment variable (if set to non-zero, force colors)
/// 5. `CLICOLOR` environment variable (if set to "0", disable colors)
/// 6. `None`: the `colored` crate decides based on TTY detection
///
/// See: <https://no-color.org/> and <https://bixense.com/clicolors/>
fn color_override(
    force_color: bool,
    no_color: bool,
    var: impl Fn(&str) -> Option<String>,
) -> Option<bool> {
    if force_color {
        return Some(true);
    }
    if no_color || var("NO_COLOR").is_some() {
        return Some(false);
    }
    if let Some(val) = var("CLICOLOR_FORCE") {
        return (!val.is_empty() && val != "0").then_some(true);
    }
    match var("CLICOLOR") {
        Some(val) if val == "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_paths_parse_as_lint() {
        let cli = Cli::try_parse_from(["llamalint", "src", "tests"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.paths, vec![PathBuf::from("src"), PathBuf::from("tests")]);
    }

    #[test]
    fn test_lint_flags() {
        let cli = Cli::try_parse_from([
            "llamalint", "lint", "-q", "--fix", "-i", "python-naming", "--ignore",
            "typescript-types", "-f", "json", "src",
        ])
        .unwrap();
        assert!(cli.quiet);
        let Some(Commands::Lint(args)) = cli.command else {
            panic!("expected lint");
        };
        assert!(args.fix);
        assert_eq!(args.ignore, vec!["python-naming", "typescript-types"]);
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.paths, vec![PathBuf::from("src")]);
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let cli = Cli::try_parse_from(["llamalint", "--quiet", "lint", "-f", "json"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.paths.is_empty());
        let Some(Commands::Lint(args)) = cli.command else {
            panic!("expected lint");
        };
        assert_eq!(args.output_format, OutputFormat::Json);

        let cli = Cli::try_parse_from(["llamalint", "--no-color", "rules", "list"]).unwrap();
        assert!(cli.no_color);
        assert!(matches!(cli.command, Some(Commands::Rules { .. })));
    }

    #[test]
    fn test_fix_conflicts_with_dry_run() {
        assert!(Cli::try_parse_from(["llamalint", "lint", "--fix", "--fix-dry-run"]).is_err());
    }

    #[test]
    fn test_color_flags() {
        assert_eq!(color_override(true, false, env(&[("NO_COLOR", "1")])), Some(true));
        assert_eq!(color_override(false, true, env(&[])), Some(false));
        assert_eq!(color_override(false, false, env(&[])), None);
    }

    #[test]
    fn test_no_color_env() {
        // Presence alone is enough
        assert_eq!(color_override(false, false, env(&[("NO_COLOR", "")])), Some(false));
        assert_eq!(
            color_override(false, false, env(&[("NO_COLOR", "1"), ("CLICOLOR_FORCE", "1")])),
            Some(false)
        );
    }

    #[test]
    fn test_clicolor_env() {
        assert_eq!(color_override(false, false, env(&[("CLICOLOR_FORCE", "1")])), Some(true));
        assert_eq!(color_override(false, false, env(&[("CLICOLOR_FORCE", "0")])), None);
        assert_eq!(color_override(false, false, env(&[("CLICOLOR_FORCE", "")])), None);
        assert_eq!(color_override(false, false, env(&[("CLICOLOR", "0")])), Some(false));
        assert_eq!(color_override(false, false, env(&[("CLICOLOR", "1")])), None);
    }
}
