/// File discovery for directory linting and formatting
use crate::error::{LintError, Result};
use crate::Language;
use llamalint_config::FileFilter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every lintable file under `root`, sorted by path
///
/// Paths handed to `filter` are relative to `root`.
pub fn walk_files(root: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>> {
    walk_files_with_prefix(root, Path::new(""), filter)
}

/// Like [`walk_files`], matching `prefix.join(relative path)` against the filter
///
/// The engine uses this when the walked directory sits below the project root.
#[tracing::instrument(skip(filter), fields(root = %root.display()))]
pub fn walk_files_with_prefix(
    root: &Path,
    prefix: &Path,
    filter: &FileFilter,
) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(LintError::Io {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let relative = |path: &Path| prefix.join(path.strip_prefix(root).unwrap_or(path));
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !filter.is_excluded_dir(&relative(entry.path()))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(%err, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || Language::from_path(entry.path()).is_none() {
            continue;
        }
        if filter.is_ignored(&relative(entry.path())) {
            continue;
        }
        files.push(entry.into_path());
    }

    tracing::debug!(count = files.len(), "Discovered files");
    Ok(files)
}
