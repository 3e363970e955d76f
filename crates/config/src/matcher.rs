use crate::{ConfigError, ProjectConfig, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Component, Path};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled include/exclude globs
///
/// Paths are matched relative to the project root, with `/` separators.
/// A file is linted when no exclude matches and at least one include does.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl FileFilter {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Build from the effective include/exclude of a config
    pub fn from_config(config: &ProjectConfig) -> Result<Self> {
        Self::new(&config.effective_include(), &config.effective_exclude())
    }

    /// Whether a root-relative file path should be skipped
    #[must_use]
    pub fn is_ignored(&self, rel_path: &Path) -> bool {
        let path = to_slash(rel_path);
        if self.exclude.iter().any(|p| p.matches_with(&path, MATCH_OPTIONS)) {
            tracing::trace!(path, "Excluded");
            return true;
        }
        let included = self.include.iter().any(|p| p.matches_with(&path, MATCH_OPTIONS));
        if !included {
            tracing::trace!(path, "Not in include set");
        }
        !included
    }

    /// Whether a root-relative directory is excluded as a whole
    ///
    /// `**/dist/**` excludes the `dist` directory itself, so the walker can
    /// prune it instead of visiting every file below.
    #[must_use]
    pub fn is_excluded_dir(&self, rel_dir: &Path) -> bool {
        let dir = to_slash(rel_dir);
        if dir.is_empty() {
            return false;
        }
        self.exclude.iter().any(|p| {
            if p.matches_with(&dir, MATCH_OPTIONS) {
                return true;
            }
            p.as_str()
                .strip_suffix("/**")
                .and_then(|prefix| Pattern::new(prefix).ok())
                .is_some_and(|prefix| prefix.matches_with(&dir, MATCH_OPTIONS))
        })
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>> {
    let mut compiled = Vec::new();
    for pattern in patterns {
        for expanded in expand_braces(pattern.as_ref()) {
            let normalized = normalize_pattern(&expanded);
            let glob = Pattern::new(&normalized).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.as_ref().to_string(),
                message: e.to_string(),
            })?;
            compiled.push(glob);
        }
    }
    Ok(compiled)
}

/// Join the normal components of a path with `/`
fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalize a glob pattern for consistent matching
///
/// Handles:
/// - Leading "./" prefix (removes it)
/// - Leading "/" prefix (removes it - patterns are relative to the project root)
/// - Consecutive slashes (collapses to single slash)
pub(crate) fn normalize_pattern(pattern: &str) -> String {
    let mut normalized = pattern.trim();

    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest;
    }
    let mut normalized = normalized.trim_start_matches('/').to_string();

    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }

    normalized
}

/// Expand brace patterns like "src/**/*.{ts,tsx}" into separate patterns
///
/// Groups are expanded left to right, so `{a,b}/*.{c,d}` yields four patterns.
pub(crate) fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(start) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(len) = pattern[start..].find('}') else {
        return vec![pattern.to_string()];
    };
    let end = start + len;

    let before = &pattern[..start];
    let after = &pattern[end + 1..];
    pattern[start + 1..end]
        .split(',')
        .flat_map(|opt| expand_braces(&format!("{before}{}{after}", opt.trim())))
        .collect()
}
