//! Scan pipeline.
//!
//! 1. **Collection**: walk the root, keep files with a known language. A
//!    file root is scanned on its own.
//! 2. **Parsing** (parallel, per file): read, locate comments, extract
//!    candidates, run per-record validation.
//! 3. **Admission** (serial): insert into the [`RecordStore`] in file-then-line
//!    order, attaching duplicate-anchor errors.
//! 4. **Analysis**: build the [`DependencyGraph`] over the complete store.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Result;
use colored::Colorize;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, trace};

use super::{
    extract::Extractor,
    file_scanner::{FileFailure, ScanResult, relative_path, scan_files},
    graph::DependencyGraph,
    language::LanguageTable,
    store::RecordStore,
    validate::{ValidatedRecord, Validator, admit},
};
use crate::config::Config;

/// Fatal scan errors. Everything else is reported, not raised.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan root '{}' does not exist", .0.display())]
    RootNotFound(PathBuf),
    #[error("cannot read scan root '{}': {source}", .path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Shared abort switch. Files not yet dispatched when it flips are skipped;
/// files already being parsed finish.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a finished scan knows.
#[derive(Debug)]
pub struct ScanOutcome {
    pub root: PathBuf,
    pub store: RecordStore,
    pub graph: DependencyGraph,
    /// Files that were read and parsed.
    pub files_scanned: usize,
    pub files_with_metadata: usize,
    /// Unreadable or oversized files, in path order.
    pub failures: Vec<FileFailure>,
    pub cancelled: bool,
}

enum FileParse {
    Parsed {
        path: String,
        records: Vec<ValidatedRecord>,
    },
    Failed(FileFailure),
    Skipped,
}

/// Scan settings resolved from config and CLI flags.
///
/// # Configuration Priority
///
/// 1. CLI arguments
/// 2. `.scisrc.json` config file
/// 3. Built-in defaults
pub struct ScanContext {
    pub config: Config,
    pub root_dir: PathBuf,
    pub verbose: bool,
    languages: LanguageTable,
    cancel: CancelFlag,
}

impl ScanContext {
    pub fn new(root_dir: &Path, config: Config, verbose: bool) -> Result<Self> {
        let languages = config.language_table()?;
        Ok(Self {
            config,
            root_dir: root_dir.to_path_buf(),
            verbose,
            languages,
            cancel: CancelFlag::new(),
        })
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolve the root into the directory paths are relative to and the
    /// files to parse.
    fn collect(&self) -> Result<(PathBuf, ScanResult), ScanError> {
        let root = &self.root_dir;
        let metadata = fs::metadata(root).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ScanError::RootNotFound(root.clone()),
            _ => ScanError::RootUnreadable {
                path: root.clone(),
                source,
            },
        })?;

        if !metadata.is_dir() {
            let base = root
                .parent()
                .map_or_else(PathBuf::new, Path::to_path_buf);
            let file = relative_path(&base, root);
            debug!(file = %file, "scanning single file");
            return Ok((
                base,
                ScanResult {
                    files: vec![file],
                    failures: Vec::new(),
                },
            ));
        }

        fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
            path: root.clone(),
            source,
        })?;
        let scanned = scan_files(
            root,
            &self.languages,
            &self.config.deny_dirs,
            &self.config.ignores,
            self.verbose,
        );
        Ok((root.clone(), scanned))
    }

    pub fn scan(&self) -> Result<ScanOutcome, ScanError> {
        let (base, scanned) = self.collect()?;

        let validator = Validator::new(&self.config.recommended_tags);

        // Parallel reading and parsing. Collect keeps the sorted file order.
        let parses: Vec<FileParse> = scanned
            .files
            .par_iter()
            .map(|path| {
                if self.cancel.is_cancelled() {
                    trace!(file = %path, "skipped after cancellation");
                    return FileParse::Skipped;
                }
                self.parse_file(&base, path, &validator)
            })
            .collect();

        let mut store = RecordStore::new();
        let mut failures = scanned.failures;
        let mut files_scanned = 0;
        let mut files_with_metadata = 0;

        for parse in parses {
            match parse {
                FileParse::Parsed { path, records } => {
                    files_scanned += 1;
                    if !records.is_empty() {
                        files_with_metadata += 1;
                        debug!(file = %path, records = records.len(), "found metadata");
                    }
                    for record in records {
                        if admit(&mut store, record) {
                            trace!(file = %path, "duplicate anchor");
                        }
                    }
                }
                FileParse::Failed(failure) => {
                    if self.verbose {
                        eprintln!(
                            "{} {} - {}",
                            "warning:".bold().yellow(),
                            failure.path,
                            failure.reason
                        );
                    }
                    failures.push(failure);
                }
                FileParse::Skipped => {}
            }
        }
        failures.sort_by(|a, b| a.path.cmp(&b.path));

        let graph = DependencyGraph::build(&store);
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            debug!(files_scanned, "scan cancelled, reporting partial results");
        }

        Ok(ScanOutcome {
            root: self.root_dir.clone(),
            store,
            graph,
            files_scanned,
            files_with_metadata,
            failures,
            cancelled,
        })
    }

    fn parse_file(&self, base: &Path, path: &str, validator: &Validator<'_>) -> FileParse {
        let full_path = base.join(path);
        let Some(language) = self.languages.for_path(&full_path) else {
            return FileParse::Skipped;
        };

        let text = match read_bounded(&full_path, self.config.max_file_size) {
            Ok(text) => text,
            Err(reason) => {
                return FileParse::Failed(FileFailure {
                    path: path.to_string(),
                    reason,
                });
            }
        };

        let extractor = Extractor::new(&language.syntax, self.config.symbol_lookahead);
        let records = extractor
            .extract(path, &text)
            .into_iter()
            .map(|candidate| validator.validate(candidate))
            .collect();

        FileParse::Parsed {
            path: path.to_string(),
            records,
        }
    }
}

/// Read a file as text, refusing anything over `max_size` bytes. Invalid
/// UTF-8 is replaced rather than rejected.
fn read_bounded(path: &Path, max_size: u64) -> Result<String, String> {
    let metadata = fs::metadata(path).map_err(|e| format!("Failed to read file: {}", e))?;
    if metadata.len() > max_size {
        return Err(format!(
            "File is {} bytes, larger than the {} byte limit",
            metadata.len(),
            max_size
        ));
    }

    let bytes = fs::read(path).map_err(|e| format!("Failed to read file: {}", e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
