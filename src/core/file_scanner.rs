use std::path::{Component, Path, PathBuf};

use colored::Colorize;
use glob::Pattern;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use super::language::LanguageTable;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths relative to the root.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// A path that could not be visited or read, relative to the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: String,
    pub reason: String,
}

/// Result of scanning files.
pub struct ScanResult {
    /// Root-relative, `/`-separated, sorted.
    pub files: Vec<String>,
    pub failures: Vec<FileFailure>,
}

/// Root-relative path with `/` separators regardless of platform.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_denied(entry: &DirEntry, deny_dirs: &[String]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| deny_dirs.iter().any(|d| d == name))
}

pub fn scan_files(
    root: &Path,
    languages: &LanguageTable,
    deny_dirs: &[String],
    ignore_patterns: &[String],
    verbose: bool,
) -> ScanResult {
    let mut files = Vec::new();
    let mut failures = Vec::new();

    // Separate ignore patterns into literal paths and glob patterns
    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => {
                    if verbose {
                        eprintln!(
                            "{} Invalid ignore pattern '{}': {}",
                            "warning:".bold().yellow(),
                            p,
                            e
                        );
                    }
                }
            }
        } else {
            literal_ignore_paths.push(PathBuf::from(p.trim_end_matches('/')));
        }
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            let denied = is_denied(entry, deny_dirs);
            if denied {
                trace!(path = %entry.path().display(), "pruned denied directory");
            }
            !denied
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| relative_path(root, p))
                    .unwrap_or_default();
                if verbose {
                    eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                }
                failures.push(FileFailure {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = relative_path(root, path);

        if literal_ignore_paths
            .iter()
            .any(|ignore_path| Path::new(&relative).starts_with(ignore_path))
        {
            continue;
        }
        if glob_patterns.iter().any(|p| p.matches(&relative)) {
            continue;
        }

        if languages.for_path(path).is_some() {
            files.push(relative);
        }
    }

    files.sort();
    debug!(files = files.len(), failures = failures.len(), "collected source files");

    ScanResult { files, failures }
}
