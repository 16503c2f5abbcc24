//! File driver: discovery, per-file processing and run reporting.
//!
//! This is the only layer that touches the filesystem or logs. It decides
//! which files are eligible, feeds their text to a [`Rewriter`] and writes
//! the results back when asked to.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use bareimport::config::RewriteConfig;
//! use bareimport::driver::{run, DriverOptions};
//! use bareimport::rewrite::Rewriter;
//!
//! let config = RewriteConfig::default();
//! let rewriter = Rewriter::from_config(&config)?;
//! let summary = run(Path::new("dist"), &rewriter, &DriverOptions::from(&config))?;
//! println!("{} rewritten, {} failed", summary.rewritten, summary.failed.len());
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{RewriteConfig, DEFAULT_EXTENSIONS};
use crate::rewrite::{RewriteError, RewriteResult, Rewriter};

/// Errors that can occur while driving a run.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("Failed to serialize source map for {path}: {source}")]
    SourceMap {
        path: PathBuf,
        #[source]
        source: sourcemap::Error,
    },

    #[error("Path does not exist: {0}")]
    MissingRoot(PathBuf),
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Settings that only concern the driver, not the rewrite itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    /// File extensions to process, without the dot.
    pub extensions: Vec<String>,
    /// Also process files under `node_modules`.
    pub include_node_modules: bool,
    /// Write rewritten files back to disk.
    pub write: bool,
    /// Write a `.map` file next to every rewritten file.
    pub source_maps: bool,
    /// Log every rewritten specifier at info level.
    pub verbose: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_node_modules: false,
            write: false,
            source_maps: false,
            verbose: false,
        }
    }
}

impl From<&RewriteConfig> for DriverOptions {
    fn from(config: &RewriteConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            include_node_modules: config.include_node_modules,
            write: false,
            source_maps: config.source_maps,
            verbose: config.verbose,
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// At least one import was rewritten.
    Rewritten {
        path: PathBuf,
        specifiers: Vec<String>,
    },
    /// Nothing eligible was found.
    Unchanged { path: PathBuf },
}

/// Totals for a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files handed to the rewriter.
    pub scanned: usize,
    /// Files with at least one rewritten import.
    pub rewritten: usize,
    /// Files left as they were.
    pub unchanged: usize,
    /// Files that failed, with the reason. Their contents were not modified
    /// and no source map was left for them.
    pub failed: Vec<(PathBuf, String)>,
    /// Every rewritten specifier, by file.
    pub specifiers: Vec<(PathBuf, Vec<String>)>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    fn record(&mut self, outcome: FileOutcome) {
        self.scanned += 1;
        match outcome {
            FileOutcome::Rewritten { path, specifiers } => {
                self.rewritten += 1;
                self.specifiers.push((path, specifiers));
            }
            FileOutcome::Unchanged { .. } => self.unchanged += 1,
        }
    }
}

/// Returns true if any component of `path` is `node_modules`.
pub fn is_node_modules_path(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == "node_modules")
}

/// Check if a file should be handed to the rewriter.
pub fn is_eligible_file(path: &Path, options: &DriverOptions) -> bool {
    if !options.include_node_modules && is_node_modules_path(path) {
        return false;
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    options
        .extensions
        .iter()
        .any(|e| e.eq_ignore_ascii_case(ext))
}

/// Collect every eligible file under `root`, in a stable order.
///
/// `root` may also be a single file, which is returned if eligible.
pub fn collect_files(root: &Path, options: &DriverOptions) -> DriverResult<Vec<PathBuf>> {
    if !root.exists() {
        return Err(DriverError::MissingRoot(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored_dir(e, options))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        // Skip directories
        if entry.file_type().is_dir() {
            continue;
        }

        if is_eligible_file(path, options) {
            files.push(path.to_path_buf());
        } else {
            debug!(path = %path.display(), "skipping ineligible file");
        }
    }

    Ok(files)
}

/// Check if a directory should be ignored during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry, options: &DriverOptions) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    match name.as_ref() {
        "node_modules" => !options.include_node_modules,
        ".git" | "coverage" | ".turbo" => true,
        _ => false,
    }
}

/// Path of the source map written for `path`: `<path>.map`.
pub fn source_map_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".map");
    PathBuf::from(name)
}

/// Rewrite one file, writing it back when `options.write` is set.
///
/// On error the file on disk is left untouched.
pub fn process_file(
    path: &Path,
    rewriter: &Rewriter,
    options: &DriverOptions,
) -> DriverResult<FileOutcome> {
    let original = fs::read_to_string(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let file = path.display().to_string();
    let result = rewriter.rewrite(&file, &original)?;

    if !result.changed() {
        return Ok(FileOutcome::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if options.write {
        write_result(path, &original, &result, options)?;
    }

    if options.verbose {
        for specifier in &result.rewritten {
            info!(file = %file, specifier = %specifier, "rewrote namespace import");
        }
    }

    Ok(FileOutcome::Rewritten {
        path: path.to_path_buf(),
        specifiers: result.rewritten,
    })
}

fn write_result(
    path: &Path,
    original: &str,
    result: &RewriteResult,
    options: &DriverOptions,
) -> DriverResult<()> {
    // Serialize the map first so a failure leaves both files untouched.
    let map_bytes = if options.source_maps {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sm = result.map.to_source_map(&name, original, &result.code);
        let mut bytes = Vec::new();
        sm.to_writer(&mut bytes)
            .map_err(|source| DriverError::SourceMap {
                path: path.to_path_buf(),
                source,
            })?;
        Some(bytes)
    } else {
        None
    };

    // The map goes first: a failed map write must not leave a rewritten file.
    let map_path = source_map_path(path);
    if let Some(bytes) = map_bytes {
        fs::write(&map_path, bytes).map_err(|source| DriverError::Write {
            path: map_path.clone(),
            source,
        })?;
    }

    fs::write(path, &result.code).map_err(|source| {
        if options.source_maps {
            let _ = fs::remove_file(&map_path);
        }
        DriverError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Process every eligible file under `root`.
///
/// A failing file is recorded in the summary and the run moves on. Only a
/// missing root aborts the run.
pub fn run(root: &Path, rewriter: &Rewriter, options: &DriverOptions) -> DriverResult<RunSummary> {
    let mut summary = RunSummary::default();

    for path in collect_files(root, options)? {
        match process_file(&path, rewriter, options) {
            Ok(outcome) => summary.record(outcome),
            Err(e) => {
                // Log error but continue with other files
                warn!(path = %path.display(), error = %e, "failed to rewrite file");
                summary.scanned += 1;
                summary.failed.push((path, e.to_string()));
            }
        }
    }

    Ok(summary)
}
