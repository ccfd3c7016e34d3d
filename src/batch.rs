//! Batch driver.
//!
//! Walks the mapping table in declared order, runs the pipeline on each
//! upstream file and writes the result under the output root.  Per-entry
//! problems are logged and recorded in the [`BatchReport`]; only a bad
//! output root stops the run.
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::error::{BatchError, CleanupToolError, EntryError};
use crate::pipeline::Pipeline;
use crate::types::{MappingEntry, MappingTable, Stage};

/// External command run over the output tree after all files are written.
#[derive(Debug, Clone)]
pub struct CleanupCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CleanupCommand {
    /// Build from a command line; `None` when `argv` is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Root that every `source_path` is relative to.
    pub source_root: PathBuf,
    /// Root that every `target_path` is relative to.
    pub output_root: PathBuf,
    /// Remove the output root before writing.
    pub clear_output: bool,
    pub cleanup: Option<CleanupCommand>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub identity: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupStatus {
    Succeeded,
    Failed { message: String },
}

/// What a batch run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Files written, in processing order.
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedEntry>,
    /// Files written as untransformed source because the transform failed.
    pub fallbacks: Vec<PathBuf>,
    /// Rename notices removed across all files.
    pub pruned_statements: usize,
    pub cleanup: Option<CleanupStatus>,
}

/// Run the whole batch.
pub fn run_batch(
    table: &MappingTable,
    pipeline: &Pipeline<'_>,
    options: &BatchOptions,
) -> Result<BatchReport, BatchError> {
    prepare_output_root(&options.output_root, options.clear_output)?;
    warn_duplicate_targets(table);

    let mut report = BatchReport::default();
    for entry in table.iter() {
        match process_entry(entry, pipeline, options) {
            Ok((path, stage, removed)) => {
                if stage == Stage::Failed {
                    report.fallbacks.push(path.clone());
                }
                report.pruned_statements += removed;
                report.written.push(path);
            }
            Err(err) => {
                tracing::warn!("skipping {}: {}", entry.source_identity, err);
                report.skipped.push(SkippedEntry {
                    identity: entry.source_identity.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if let Some(cleanup) = &options.cleanup {
        report.cleanup = Some(match run_cleanup(cleanup, &options.output_root) {
            Ok(()) => CleanupStatus::Succeeded,
            Err(err) => {
                tracing::warn!("{}; keeping generated files as written", err);
                CleanupStatus::Failed {
                    message: err.to_string(),
                }
            }
        });
    }

    tracing::info!(
        "wrote {} file(s), skipped {}, {} untransformed, pruned {} notice(s)",
        report.written.len(),
        report.skipped.len(),
        report.fallbacks.len(),
        report.pruned_statements
    );

    Ok(report)
}

fn prepare_output_root(root: &Path, clear: bool) -> Result<(), BatchError> {
    let fail = |source| BatchError::OutputRoot {
        path: root.to_path_buf(),
        source,
    };
    if clear && root.exists() {
        std::fs::remove_dir_all(root).map_err(fail)?;
    }
    std::fs::create_dir_all(root).map_err(fail)
}

/// Two entries writing the same file is allowed but almost certainly a
/// mistake in the table; the later entry wins.
fn warn_duplicate_targets(table: &MappingTable) {
    let mut owners: HashMap<&Path, &str> = HashMap::new();
    for entry in table.iter() {
        if let Some(previous) = owners.insert(&entry.target_path, &entry.source_identity) {
            tracing::warn!(
                "{} and {} both write {}; the later entry wins",
                previous,
                entry.source_identity,
                entry.target_path.display()
            );
        }
    }
}

fn process_entry(
    entry: &MappingEntry,
    pipeline: &Pipeline<'_>,
    options: &BatchOptions,
) -> Result<(PathBuf, Stage, usize), EntryError> {
    let source_path = options.source_root.join(&entry.source_path);
    if !source_path.is_file() {
        return Err(EntryError::SourceMissing {
            identity: entry.source_identity.clone(),
            path: source_path,
        });
    }
    let source = std::fs::read_to_string(&source_path).map_err(|source| EntryError::Read {
        path: source_path.clone(),
        source,
    })?;

    let mut outcome = pipeline.transform(&source, entry);

    let target_path = options.output_root.join(&entry.target_path);
    write_atomically(&target_path, &outcome.text)?;
    if !outcome.is_fallback() {
        outcome.stage = Stage::Written;
    }

    tracing::debug!(
        "{} -> {} ({:?})",
        entry.source_identity,
        target_path.display(),
        outcome.stage
    );
    Ok((target_path, outcome.stage, outcome.removed))
}

/// Write through a temporary file in the target directory so a reader
/// never sees a half-written file.
fn write_atomically(path: &Path, text: &str) -> Result<(), EntryError> {
    let fail = |source| EntryError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(fail)?;

    let mut file = tempfile::NamedTempFile::new_in(parent).map_err(fail)?;
    file.write_all(text.as_bytes()).map_err(fail)?;
    file.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}

fn run_cleanup(cleanup: &CleanupCommand, output_root: &Path) -> Result<(), CleanupToolError> {
    tracing::info!("running cleanup tool `{}`", cleanup.program);
    let status = Command::new(&cleanup.program)
        .args(&cleanup.args)
        .arg(output_root)
        .status()
        .map_err(|source| CleanupToolError::Spawn {
            program: cleanup.program.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CleanupToolError::Failed {
            program: cleanup.program.clone(),
            status: status.to_string(),
        })
    }
}
