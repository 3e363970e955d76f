/// The lint engine: runs configured rules and formatters over sources, files and directories
use crate::config::{LintConfig, LintSeverity};
use crate::diagnostics::{LintDiagnostic, LintResult};
use crate::error::{LintError, Result};
use crate::fix::{apply_fixes, write_atomic};
use crate::registry;
use crate::source::{SourceFile, SourceSpan};
use crate::traits::FileLintRule;
use crate::walker::walk_files_with_prefix;
use crate::Language;
use llamalint_config::{FileFilter, ProjectConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Rule id of the diagnostic reported for unreadable files
pub const FILE_ERROR: &str = "file-error";
/// Rule id of the diagnostic reported for missing directories
pub const DIRECTORY_ERROR: &str = "directory-error";

/// Lints and formats files according to a project configuration
#[derive(Debug, Clone)]
pub struct Linter {
    config: LintConfig,
    filter: FileFilter,
    /// Include/exclude patterns are matched relative to this directory
    root: PathBuf,
}

impl Linter {
    /// Validate `config` and build a linter rooted at the current directory
    #[tracing::instrument(skip(config))]
    pub fn new(config: &ProjectConfig) -> Result<Self> {
        let lint_config = LintConfig::from_project(config)?;
        let filter = FileFilter::from_config(config)?;
        Ok(Self {
            config: lint_config,
            filter,
            root: PathBuf::from("."),
        })
    }

    /// Match include/exclude patterns relative to `root`
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn config(&self) -> &LintConfig {
        &self.config
    }

    /// Look up a registered rule by id
    #[must_use]
    pub fn get_rule(&self, id: &str) -> Option<&'static Arc<dyn FileLintRule>> {
        registry::find_rule(id)
    }

    /// Every registered rule
    #[must_use]
    pub fn rules(&self) -> &'static [Arc<dyn FileLintRule>] {
        registry::file_rules()
    }

    /// Effective severity of a rule under this configuration
    #[must_use]
    pub fn rule_severity(&self, id: &str) -> LintSeverity {
        self.config.get_severity(id)
    }

    /// Whether the include/exclude patterns skip `path`
    #[must_use]
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.filter.is_ignored(&self.relative_path(path))
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        if let Ok(relative) = path.strip_prefix(&self.root) {
            return relative.to_path_buf();
        }
        if let (Ok(root), Ok(absolute)) = (self.root.canonicalize(), path.canonicalize()) {
            if let Ok(relative) = absolute.strip_prefix(&root) {
                return relative.to_path_buf();
            }
        }
        path.to_path_buf()
    }

    /// Lint in-memory content as if it were the file at `path`
    ///
    /// Diagnostics are sorted by line, column and rule id. Paths with an
    /// unknown extension yield no diagnostics.
    #[tracing::instrument(skip(self, content), fields(path = %path.display()))]
    pub fn lint_source(&self, path: &Path, content: &str) -> Vec<LintDiagnostic> {
        let Some(language) = Language::from_path(path) else {
            return Vec::new();
        };
        let file = SourceFile::new(path, language, content);

        let mut diagnostics = Vec::new();
        for rule in registry::rules_for_language(language) {
            let Some(severity) = self.config.get_severity(rule.name()).to_diagnostic() else {
                continue;
            };
            let options = self.config.rule_options(rule.name(), language);
            let found = rule.check(&file, &options);
            tracing::trace!(rule = rule.name(), count = found.len(), "Rule finished");
            diagnostics.extend(found.into_iter().map(|mut d| {
                d.severity = severity;
                d
            }));
        }

        sort_diagnostics(&mut diagnostics);
        diagnostics
    }

    /// Lint one file, optionally writing fixes back
    ///
    /// With `fix`, the fixed content is written atomically and the returned
    /// diagnostics are those remaining after the fixes.
    pub fn lint_file(&self, path: &Path, fix: bool) -> LintResult {
        if Language::from_path(path).is_none() || self.is_ignored(path) {
            tracing::debug!(path = %path.display(), "Skipping ignored file");
            return LintResult::new(path, Vec::new());
        }
        self.lint_checked_file(path, fix)
    }

    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    fn lint_checked_file(&self, path: &Path, fix: bool) -> LintResult {
        let content = match read_source(path) {
            Ok(content) => content,
            Err(message) => {
                tracing::warn!(path = %path.display(), %message, "Cannot lint file");
                return LintResult::new(path, vec![whole_file_error(FILE_ERROR, message)]);
            }
        };

        let mut diagnostics = self.lint_source(path, &content);
        if !fix {
            return LintResult::new(path, diagnostics);
        }

        let outcome = apply_fixes(&content, &diagnostics);
        if outcome.applied == 0 || outcome.content == content {
            return LintResult::new(path, diagnostics);
        }
        if let Err(err) = write_atomic(path, &outcome.content) {
            tracing::warn!(%err, "Failed to write fixes");
            diagnostics.push(whole_file_error(FILE_ERROR, err.to_string()));
            sort_diagnostics(&mut diagnostics);
            return LintResult::new(path, diagnostics);
        }

        tracing::info!(fixes = outcome.applied, "Applied fixes");
        let mut result = LintResult::new(path, self.lint_source(path, &outcome.content));
        result.fixes_applied = outcome.applied;
        result
    }

    /// Lint every matching file below `dir`, ordered by path
    #[tracing::instrument(skip(self), fields(dir = %dir.display()))]
    pub fn lint_directory(&self, dir: &Path, fix: bool) -> Vec<LintResult> {
        if !dir.is_dir() {
            return vec![LintResult::new(
                dir,
                vec![whole_file_error(
                    DIRECTORY_ERROR,
                    format!("Directory not found: {}", dir.display()),
                )],
            )];
        }

        let files = match self.discover(dir) {
            Ok(files) => files,
            Err(err) => {
                return vec![LintResult::new(
                    dir,
                    vec![whole_file_error(DIRECTORY_ERROR, err.to_string())],
                )];
            }
        };

        let mut results: Vec<LintResult> = files
            .iter()
            .map(|file| self.lint_checked_file(file, fix))
            .collect();
        results.sort_by(|a, b| a.path.cmp(&b.path));
        results
    }

    /// Files below `dir` that this configuration lints, sorted by path
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut prefix = self.relative_path(dir);
        if prefix.is_absolute() {
            // Outside the project root: match patterns relative to `dir` itself
            prefix = PathBuf::new();
        }
        walk_files_with_prefix(dir, &prefix, &self.filter)
    }

    /// Run the enabled formatters for the language of `path` over `content`
    #[tracing::instrument(skip(self, content), fields(path = %path.display()))]
    pub fn format_source(&self, path: &Path, content: &str) -> String {
        let Some(language) = Language::from_path(path) else {
            return content.to_string();
        };
        let mut text = content.to_string();
        for formatter in registry::formatters_for_language(language) {
            if !self.config.is_formatter_enabled(formatter.name()) {
                continue;
            }
            let options = self.config.formatter_options(formatter.name(), language);
            let file = SourceFile::new(path, language, text);
            text = formatter.format(&file, &options);
            tracing::trace!(formatter = formatter.name(), "Formatter finished");
        }
        text
    }

    /// Read `path` and return its formatted content
    pub fn format_file(&self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path).map_err(|source| LintError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.format_source(path, &content))
    }
}

fn read_source(path: &Path) -> std::result::Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Failed to read file: {e}"))?;
    String::from_utf8(bytes).map_err(|_| "File is not valid UTF-8".to_string())
}

fn whole_file_error(rule: &str, message: impl Into<String>) -> LintDiagnostic {
    LintDiagnostic::error(SourceSpan::file_start(), message, rule)
}

fn sort_diagnostics(diagnostics: &mut [LintDiagnostic]) {
    diagnostics.sort_by(|a, b| {
        (a.line(), a.column(), &a.rule).cmp(&(b.line(), b.column(), &b.rule))
    });
}
