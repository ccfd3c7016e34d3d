//! nsforward: forward-namespace polyfill generation for PHP frameworks.
//!
//! Given an upstream framework release and a mapping table, produces
//! copies of the mapped classes declared at their *future* namespace and
//! name, with the deprecation notices that only announce the rename
//! removed.  Unrelated deprecations are left exactly as they were.
//!
//! The crate is split into the following modules:
//!
//! - [`types`]: the mapping table, its derived views and shared enums
//! - [`config`]: loading and validating the TOML mapping document
//! - [`names`]: qualified-name helpers
//! - `parser`: `mago_syntax` parsing with panic containment
//! - [`edit`]: span-anchored text edits (the printer)
//! - [`detector`]: rename-notice classification
//! - [`rewriter`]: namespace and class-name declaration rewriting
//! - [`pipeline`]: the per-file transform state machine and banner
//! - [`batch`]: iterating the table and writing the output tree
//! - [`error`]: the error taxonomy
pub mod batch;
pub mod config;
pub mod detector;
pub mod edit;
pub mod error;
pub mod names;
mod parser;
pub mod pipeline;
pub mod rewriter;
pub mod types;

pub use batch::{BatchOptions, BatchReport, CleanupCommand, run_batch};
pub use config::{load_config, parse_config};
pub use detector::{DeprecationCallSite, Detector, ReferenceTokens, Verdict};
pub use error::{BatchError, CleanupToolError, ConfigError, EntryError, TransformError};
pub use pipeline::header::HEADER_MARKER;
pub use pipeline::{FileOutcome, Pipeline};
pub use rewriter::DeclarationRewriter;
pub use types::{
    ClassNameMapping, Config, DetectorSettings, MappingEntry, MappingTable, NamespaceMapping, Stage,
};
