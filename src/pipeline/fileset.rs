// ABOUTME: Glob-based source file collection and copy helpers
// ABOUTME: Matches files under a base directory against include/exclude patterns

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ConfigError;
use crate::runner::Result;

/// Compile a list of glob patterns into a single matcher. `*` does not
/// cross path separators, so `*.txt` matches top-level files only while
/// `**/*.txt` matches at any depth.
pub fn build_matcher(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|e| ConfigError::InvalidGlob {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })?;
    Ok(set)
}

/// Collect files under `base` whose path relative to `base` matches one of
/// the include patterns and none of the excludes. Results are sorted so a
/// file list is stable across runs.
pub fn collect_files(base: &Path, includes: &[String], excludes: &[String]) -> Result<Vec<PathBuf>> {
    let include_set = build_matcher(includes)?;
    let exclude_set = build_matcher(excludes)?;

    if !base.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(base).follow_links(false) {
        let entry = entry.map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = match entry.path().strip_prefix(base) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if include_set.is_match(relative) && !exclude_set.is_match(relative) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Copy a file, creating the destination's parent directories as needed.
/// Returns the number of bytes copied.
pub async fn copy_file(src: &Path, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = tokio::fs::copy(src, dest).await?;
    Ok(bytes)
}

/// Copy all matched files under `base` into `dest_dir`, preserving their
/// directory structure relative to `base`. Returns (file count, total bytes).
pub async fn copy_tree(
    base: &Path,
    includes: &[String],
    excludes: &[String],
    dest_dir: &Path,
) -> Result<(usize, u64)> {
    let files = collect_files(base, includes, excludes)?;
    let mut total_bytes = 0;
    for file in &files {
        let relative = file.strip_prefix(base).unwrap_or(file);
        total_bytes += copy_file(file, &dest_dir.join(relative)).await?;
    }
    Ok((files.len(), total_bytes))
}

/// Copy all matched files under `base` into `dest_dir` with their directory
/// structure flattened. Returns (file count, total bytes).
pub async fn copy_flat(
    base: &Path,
    includes: &[String],
    excludes: &[String],
    dest_dir: &Path,
) -> Result<(usize, u64)> {
    let files = collect_files(base, includes, excludes)?;
    let mut total_bytes = 0;
    for file in &files {
        if let Some(file_name) = file.file_name() {
            total_bytes += copy_file(file, &dest_dir.join(file_name)).await?;
        }
    }
    Ok((files.len(), total_bytes))
}

/// Human readable byte count for task summaries.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
