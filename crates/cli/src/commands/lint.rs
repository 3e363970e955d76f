use crate::commands::common::{lint_targets, targets, CommandContext};
use crate::progress::maybe_spinner;
use crate::report::{self, Summary};
use crate::{ExitCode, OutputFormat, OutputOptions};
use anyhow::Result;
use colored::Colorize;
use llamalint_linter::LintResult;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, clap::Args)]
pub struct LintArgs {
    /// Files or directories to lint (defaults to the current directory)
    pub paths: Vec<PathBuf>,

    /// Automatically fix lint issues that have safe fixes
    #[arg(long, conflicts_with = "fix_dry_run")]
    pub fix: bool,

    /// Show what would be fixed without modifying files
    #[arg(long, conflicts_with = "fix")]
    pub fix_dry_run: bool,

    /// Rule id to skip (repeatable)
    #[arg(short, long, value_name = "RULE")]
    pub ignore: Vec<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

pub fn run(
    config_path: Option<PathBuf>,
    args: &LintArgs,
    output: OutputOptions,
) -> Result<ExitCode> {
    let start_time = std::time::Instant::now();
    let ctx = CommandContext::load(config_path)?;
    let linter = ctx.linter(&args.ignore)?;
    let human = matches!(args.output_format, OutputFormat::Text);

    let spinner = maybe_spinner(
        human && output.show_progress,
        if args.fix {
            "Linting and fixing files..."
        } else {
            "Linting files..."
        },
    );
    let results = lint_targets(&linter, &targets(&args.paths), args.fix);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let summary = Summary::new(&results);
    print!("{}", report::render(args.output_format, &results)?);

    if human && output.show_info {
        if args.fix_dry_run {
            display_dry_run(&results);
        }
        let fixed: usize = results.iter().map(|r| r.fixes_applied).sum();
        if fixed > 0 {
            println!("{}", format!("✓ Fixed {fixed} issue(s)").green().bold());
        }
        if !results.iter().all(LintResult::is_clean) {
            println!();
        }
        println!("{}", report::render_summary(&summary));
        if summary.fixable > 0 && !args.fix && !args.fix_dry_run {
            println!(
                "  {} {} issue(s) fixable with --fix",
                "ℹ".cyan(),
                summary.fixable
            );
        }
        println!(
            "  {} {} file(s) in {:.2}s",
            "⏱".dimmed(),
            results.len(),
            start_time.elapsed().as_secs_f64()
        );
    }

    tracing::debug!(
        errors = summary.errors,
        warnings = summary.warnings,
        "Lint finished"
    );
    Ok(if summary.errors > 0 {
        ExitCode::LintError
    } else {
        ExitCode::Success
    })
}

/// List the fixes `--fix` would apply, grouped by file
fn display_dry_run(results: &[LintResult]) {
    let fixable: Vec<&LintResult> = results.iter().filter(|r| r.fixable_count() > 0).collect();
    if fixable.is_empty() {
        return;
    }

    println!();
    println!("{}", "Dry run - would fix the following issues:".cyan());
    println!();
    for result in &fixable {
        println!("{}:", result.path.display().to_string().bold());
        for diagnostic in &result.diagnostics {
            if let Some(fix) = &diagnostic.fix {
                println!(
                    "  {} {} ({})",
                    "→".green(),
                    fix.label,
                    diagnostic.rule.dimmed()
                );
            }
        }
        println!();
    }
    let total: usize = fixable.iter().map(|r| r.fixable_count()).sum();
    println!(
        "{}",
        format!("ℹ Would fix {total} issue(s)").cyan().bold()
    );
}
