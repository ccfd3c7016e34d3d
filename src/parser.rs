//! PHP parsing.
//!
//! The syntax tree comes from `mago_syntax`.  It is allocated in a
//! per-call arena and borrowed by the callback, so no tree outlives the
//! file it was parsed from.
use std::panic;

use bumpalo::Bump;
use mago_database::file::FileId;
use mago_syntax::ast::Program;
use mago_syntax::parser::parse_file_content;

use crate::error::TransformError;

/// Parse `source` and hand the program to `visit`.
///
/// A program with any syntax error is rejected rather than partially
/// processed: error recovery can produce a tree whose spans no longer
/// line up with real statements.  Panics inside the parser or inside
/// `visit` are caught and reported as [`TransformError::Panicked`].
pub(crate) fn with_program<T, F>(source: &str, visit: F) -> Result<T, TransformError>
where
    F: for<'a> FnOnce(&'a Program<'a>) -> T,
{
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        let arena = Bump::new();
        let file_id = FileId::new("input.php");
        let program = parse_file_content(&arena, file_id, source);

        if !program.errors.is_empty() {
            return Err(TransformError::Parse {
                errors: program.errors.len(),
            });
        }

        Ok(visit(program))
    }));

    match result {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!("parser panicked; leaving file untransformed");
            Err(TransformError::Panicked)
        }
    }
}
