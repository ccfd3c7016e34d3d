//! Error taxonomy.
//!
//! Only [`ConfigError`] (and the output-root variant of [`BatchError`])
//! stops a run.  Everything else is contained to the entry it belongs to
//! and surfaces as a warning in the log and the batch report.
use std::path::PathBuf;

/// The mapping document could not be turned into a usable table.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read mapping file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed mapping document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("mapping document has no top-level `classes` table")]
    MissingCollection,

    #[error("invalid mapping entry `{identity}`: {reason}")]
    InvalidEntry { identity: String, reason: String },

    /// Two entries share a simple class name in different namespaces, so a
    /// simple-name lookup is ambiguous.
    #[error(
        "class name `{name}` is mapped ambiguously by `{first}` and `{second}`; \
         qualify the mapping table by namespace"
    )]
    AmbiguousClassName {
        name: String,
        first: String,
        second: String,
    },
}

/// A single mapping entry could not be processed.  The batch continues.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("source file for `{identity}` not found at {path}")]
    SourceMissing { identity: String, path: PathBuf },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The transform could not produce rewritten text.  The pipeline falls
/// back to the untouched source when this happens.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("source does not parse ({errors} syntax error(s))")]
    Parse { errors: usize },

    /// The parser or the tree walk panicked on this input.
    #[error("transform panicked")]
    Panicked,

    #[error("edits overlap at byte {offset}")]
    OverlappingEdits { offset: usize },
}

/// The external post-pass cleanup tool did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum CleanupToolError {
    #[error("cannot start cleanup tool `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cleanup tool `{program}` exited with {status}")]
    Failed { program: String, status: String },
}

/// Errors that abort a whole batch run.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot prepare output directory {path}: {source}")]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
