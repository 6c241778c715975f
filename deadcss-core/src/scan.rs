//! Parallel, deterministic file discovery with directory pruning.
//!
//! - Excluded directories are skipped as whole subtrees via `WalkDir::filter_entry`
//! - Remaining entries are filtered in parallel via Rayon's `par_bridge`
//! - Results are collected into a `BTreeSet` so processing order is stable

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{DeadcssError, DeadcssResult};

/// Directories excluded by default.
pub const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules"];

/// Extension filter. `None` accepts every file, an empty filter accepts none.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    extensions: Option<HashSet<String>>,
}

impl ExtensionFilter {
    /// Accept every file.
    pub fn any() -> Self {
        Self { extensions: None }
    }

    /// Accept files whose suffix is one of `extensions` (case-insensitive,
    /// leading dot optional).
    pub fn of<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: Some(
                extensions
                    .iter()
                    .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
                    .collect(),
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.as_ref().is_some_and(|exts| exts.is_empty())
    }

    pub fn accepts(&self, path: &Path) -> bool {
        match &self.extensions {
            None => true,
            Some(exts) => path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| exts.contains(&ext.to_ascii_lowercase())),
        }
    }
}

/// Parse a comma separated extension list such as `".js, .py"`.
///
/// Empty entries are dropped, so `""` yields an empty list. Entries holding
/// path separators, wildcards or inner whitespace are rejected.
pub fn parse_extension_list(list: &str) -> DeadcssResult<Vec<String>> {
    list.split(',')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(|ext| {
            if ext.contains(|c: char| matches!(c, '/' | '\\' | '*' | '?') || c.is_whitespace()) {
                Err(DeadcssError::invalid_argument(format!(
                    "invalid file extension {:?}",
                    ext
                )))
            } else {
                Ok(ext.to_string())
            }
        })
        .collect()
}

/// Checks if a directory entry below the walk root should be pruned.
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

fn walk_root(root: &Path, filter: &ExtensionFilter, excludes: &HashSet<&str>) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(if filter.accepts(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if e.file_type().is_file() && filter.accepts(path) {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to collect files from {}", root.display()))
}

/// Collect files under `roots` matching `extensions`, using the default
/// exclusions.
pub fn collect_files<P: AsRef<Path>>(
    roots: &[P],
    extensions: &ExtensionFilter,
) -> Result<BTreeSet<PathBuf>> {
    collect_files_with_excludes(roots, extensions, &[])
}

/// Collect files with additional excluded directory names.
pub fn collect_files_with_excludes<P: AsRef<Path>>(
    roots: &[P],
    extensions: &ExtensionFilter,
    excludes: &[&str],
) -> Result<BTreeSet<PathBuf>> {
    let mut files = BTreeSet::new();
    if extensions.is_empty() {
        return Ok(files);
    }

    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().copied())
        .collect();

    for root in roots {
        let root = root.as_ref();
        if !root.exists() {
            anyhow::bail!("Path does not exist: {}", root.display());
        }
        files.extend(walk_root(root, extensions, &all_excludes)?);
    }
    Ok(files)
}
