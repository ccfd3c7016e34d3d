//! Per-file transform pipeline.
//!
//! `Loaded → Parsed → Pruned → Rewritten → Printed → Headered`, with
//! `Written` set by the batch driver once the text is on disk.  Any
//! failure jumps to [`Stage::Failed`] and the outcome carries the original
//! source unchanged, so one bad file never stops a batch.
//!
//! Parsing, pruning and rewriting run against one borrowed tree; a failure
//! in any of them is logged as happening after `Loaded`.
//!
//! Sub-modules:
//! - [`prune`]: statement removal and the cleanup that follows it
//! - [`header`]: the generated-file banner
pub mod header;
mod prune;

use mago_syntax::ast::Program;

use crate::detector::{DeprecationCallSite, Detector, ReferenceTokens};
use crate::edit::{TextEdit, apply_edits};
use crate::error::TransformError;
use crate::parser::with_program;
use crate::rewriter::DeclarationRewriter;
use crate::types::{MappingEntry, MappingTable, Stage};

use prune::Pruner;

/// Result of transforming one file.
#[derive(Debug)]
pub struct FileOutcome {
    /// Text to write: the transformed file, or the original source when
    /// the transform failed.
    pub text: String,
    pub stage: Stage,
    /// Rename notices removed from the file.
    pub removed: usize,
    /// Whether a namespace or class-like declaration was renamed.
    pub renamed: bool,
    pub failure: Option<TransformError>,
}

impl FileOutcome {
    pub fn is_fallback(&self) -> bool {
        self.stage == Stage::Failed
    }
}

pub struct Pipeline<'t> {
    table: &'t MappingTable,
    detector: Detector,
}

impl<'t> Pipeline<'t> {
    pub fn new(table: &'t MappingTable, detector: Detector) -> Self {
        Self { table, detector }
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Transform `source`, the upstream file behind `entry`.
    ///
    /// Never fails: on error the original text comes back with
    /// [`Stage::Failed`] and the error attached.
    pub fn transform(&self, source: &str, entry: &MappingEntry) -> FileOutcome {
        let mut stage = Stage::Loaded;
        match self.run(source, entry, &mut stage) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    "{}: {} after stage {:?}; emitting the source untransformed",
                    entry.source_identity,
                    err,
                    stage
                );
                FileOutcome {
                    text: source.to_string(),
                    stage: Stage::Failed,
                    removed: 0,
                    renamed: false,
                    failure: Some(err),
                }
            }
        }
    }

    fn run(&self, source: &str, entry: &MappingEntry, stage: &mut Stage) -> Result<FileOutcome, TransformError> {
        let tokens = self.tokens_for(entry);
        let rewriter = DeclarationRewriter::new(self.table);

        let (pruned, renames) = with_program(source, |program| {
            let detector = self.detector_for(program);
            let pruner = Pruner {
                detector: &detector,
                tokens: &tokens,
                source,
            };
            (pruner.prune(program), rewriter.edits(program, entry))
        })?;
        *stage = Stage::Rewritten;

        let removed = pruned.removed;
        let renamed = !renames.is_empty();
        let edits: Vec<TextEdit> = pruned.edits.into_iter().chain(renames).collect();

        let printed = apply_edits(source, edits)?;
        *stage = Stage::Printed;

        let text = header::apply(&printed, &entry.source_identity);
        *stage = Stage::Headered;

        tracing::debug!(
            "{}: removed {} notice(s), renamed: {}",
            entry.source_identity,
            removed,
            renamed
        );

        Ok(FileOutcome {
            text,
            stage: *stage,
            removed,
            renamed,
            failure: None,
        })
    }

    /// List the deprecation calls in `source` and what pruning would do
    /// with each, without changing anything.
    pub fn survey(&self, source: &str, entry: &MappingEntry) -> Result<Vec<DeprecationCallSite>, TransformError> {
        let tokens = self.tokens_for(entry);
        with_program(source, |program| {
            let detector = self.detector_for(program);
            let pruner = Pruner {
                detector: &detector,
                tokens: &tokens,
                source,
            };
            pruner.survey(program)
        })
    }

    /// The configured detector, taught the names `program` imports the
    /// facade under.
    fn detector_for<'a>(&self, program: &'a Program<'a>) -> Detector {
        let aliases = prune::facade_aliases(program, &self.detector.settings().class);
        self.detector.with_facade_aliases(aliases)
    }

    fn tokens_for<'e>(&self, entry: &'e MappingEntry) -> ReferenceTokens<'e> {
        if self.detector.settings().config_aware {
            ReferenceTokens::for_entry(entry)
        } else {
            ReferenceTokens::none()
        }
    }
}
