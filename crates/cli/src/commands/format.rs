use crate::commands::common::{targets, CommandContext};
use crate::progress::maybe_spinner;
use crate::{ExitCode, OutputOptions};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use llamalint_linter::{write_atomic, Language, Linter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, clap::Args)]
pub struct FormatArgs {
    /// Files or directories to format (defaults to the current directory)
    pub paths: Vec<PathBuf>,

    /// Write the formatted result here instead of in place (single input file only)
    #[arg(short, long, value_name = "FILE", conflicts_with = "check")]
    pub output: Option<PathBuf>,

    /// Only list files whose formatting would change
    #[arg(long)]
    pub check: bool,
}

/// What formatting did to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOutcome {
    pub path: PathBuf,
    pub changed: bool,
}

/// Result of formatting a batch of files
#[derive(Debug, Default)]
pub struct FormatRun {
    pub outcomes: Vec<FormatOutcome>,
    /// Files that could not be read or written
    pub failures: Vec<anyhow::Error>,
}

pub fn run(
    config_path: Option<PathBuf>,
    args: &FormatArgs,
    output: OutputOptions,
) -> Result<ExitCode> {
    let ctx = CommandContext::load(config_path)?;
    let linter = ctx.linter(&[])?;
    let files = collect_files(&linter, &targets(&args.paths))?;

    if let Some(destination) = &args.output {
        let [source] = files.as_slice() else {
            bail!("--output needs exactly one input file, got {}", files.len());
        };
        let formatted = linter
            .format_file(source)
            .with_context(|| format!("Failed to format {}", source.display()))?;
        write_atomic(destination, &formatted)
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        if output.show_info {
            println!(
                "{} {} -> {}",
                "✓".green(),
                source.display(),
                destination.display()
            );
        }
        return Ok(ExitCode::Success);
    }

    let spinner = maybe_spinner(output.show_progress && !args.check, "Formatting files...");
    let FormatRun { outcomes, failures } = format_files(&linter, &files, !args.check);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    for err in &failures {
        eprintln!("{} {err:#}", "✗".red().bold());
    }

    let changed: Vec<&FormatOutcome> = outcomes.iter().filter(|o| o.changed).collect();
    for outcome in &changed {
        if args.check {
            println!("{} {}", "Would reformat:".yellow(), outcome.path.display());
        } else if output.show_info {
            println!("{} {}", "✓ Formatted".green(), outcome.path.display());
        }
    }

    if output.show_info {
        let unchanged = outcomes.len() - changed.len();
        let verb = if args.check { "would be reformatted" } else { "reformatted" };
        println!(
            "{} file(s) {verb}, {unchanged} file(s) left unchanged",
            changed.len()
        );
    }

    Ok(if !failures.is_empty() {
        ExitCode::IoError
    } else if args.check && !changed.is_empty() {
        ExitCode::LintError
    } else {
        ExitCode::Success
    })
}

/// Expand targets into the files the configuration formats
///
/// Explicit files are kept when their language is known and the
/// include/exclude patterns allow them.
pub fn collect_files(linter: &Linter, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Cannot access {}", path.display()))?;
        if metadata.is_dir() {
            files.extend(linter.discover(path)?);
        } else if Language::from_path(path).is_some() && !linter.is_ignored(path) {
            files.push(path.clone());
        } else {
            tracing::debug!(path = %path.display(), "Skipping file");
        }
    }
    Ok(files)
}

/// Format each file, writing changes back when `write` is set
///
/// A file that fails is recorded and the rest are still formatted.
pub fn format_files(linter: &Linter, files: &[PathBuf], write: bool) -> FormatRun {
    let mut run = FormatRun::default();
    for path in files {
        match format_one(linter, path, write) {
            Ok(outcome) => run.outcomes.push(outcome),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to format file");
                run.failures.push(err);
            }
        }
    }
    run
}

fn format_one(linter: &Linter, path: &Path, write: bool) -> Result<FormatOutcome> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let formatted = linter.format_source(path, &content);
    let changed = formatted != content;
    if changed && write {
        write_atomic(path, &formatted)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(FormatOutcome {
        path: path.to_path_buf(),
        changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use llamalint_config::ProjectConfig;
    use std::fs;

    fn linter(root: &Path) -> Linter {
        Linter::new(&ProjectConfig::default_config())
            .unwrap()
            .with_root(root)
    }

    #[test]
    fn test_format_files_in_place() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "import sys, os\n\n\n\n\nx = 1   \n").unwrap();
        fs::write(dir.path().join("b.js"), "const b = 'b';\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "   \n").unwrap();
        let linter = linter(dir.path());

        let files = collect_files(&linter, &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 2);

        let outcomes = format_files(&linter, &files, true).outcomes;
        assert!(outcomes[0].changed);
        assert!(outcomes[1].changed);
        assert_eq!(
            fs::read_to_string(dir.path().join("a.py")).unwrap(),
            "import os\nimport sys\n\n\nx = 1\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("b.js")).unwrap(),
            "const b = \"b\";\n"
        );
        assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "   \n");

        let again = format_files(&linter, &files, true).outcomes;
        assert!(again.iter().all(|o| !o.changed));
    }

    #[test]
    fn test_check_mode_leaves_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        fs::write(&path, "let a = 1;\t\n").unwrap();

        let outcomes = format_files(&linter(dir.path()), &[path.clone()], false).outcomes;
        assert!(outcomes[0].changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "let a = 1;\t\n");
    }

    #[test]
    fn test_unreadable_file_does_not_stop_run() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.py");
        let good = dir.path().join("good.js");
        fs::write(&bad, [0xff, 0xfe, b'\n']).unwrap();
        fs::write(&good, "const g = 'g';\n").unwrap();

        let run = format_files(&linter(dir.path()), &[bad, good.clone()], true);
        assert_eq!(run.failures.len(), 1);
        assert!(run.failures[0].to_string().starts_with("Failed to read"));
        assert_eq!(run.outcomes.len(), 1);
        assert!(run.outcomes[0].changed);
        assert_eq!(fs::read_to_string(&good).unwrap(), "const g = \"g\";\n");
    }

    #[test]
    fn test_collect_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_files(&linter(dir.path()), &[dir.path().join("missing.py")]).unwrap_err();
        assert!(err.to_string().starts_with("Cannot access"));
    }
}
