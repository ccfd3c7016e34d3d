//! Rename-deprecation detection.
//!
//! The detector looks at a single statement and decides whether it exists
//! only to announce that the class is being renamed or moved.  It never
//! removes anything on its own; the pipeline turns its verdicts into
//! edits.
//!
//! Recognized shapes:
//!   - `Deprecation::notice($version, $message, $scope)` (and the
//!     `noticeWithNoReplacement` / `noticeWithNoReplacment` variants)
//!   - `Deprecation::withSuppressedNotice(function () { <notice>; })`
//!   - `Deprecation::withSuppressedNotice(fn () => <notice>)`
//!
//! The facade may also be called under a name the file imports it as
//! (`use Vendor\Deprecation as Dep;`).  Anything else, including calls
//! through a variable or `static::`, is kept.  A false positive changes class behaviour while a false negative
//! only leaves a stale warning behind, so every doubt resolves to keep.
mod call_shape;
mod triggers;

pub use triggers::ReferenceTokens;

use mago_syntax::ast::*;

use crate::types::DetectorSettings;
use call_shape::{CallShape, Callback};

/// What to do with one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Remove,
    Keep,
}

/// A recognized deprecation call and what pruning would do with it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeprecationCallSite {
    /// Source text of the whole statement.
    pub text: String,
    /// Byte offset of the statement in the file.
    pub offset: usize,
    pub verdict: Verdict,
}

/// Classifies statements as rename notices.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    settings: DetectorSettings,
    /// Local names a file imports the facade under (`use ... as Dep`).
    facade_aliases: Vec<String>,
}

impl Detector {
    pub fn new(settings: DetectorSettings) -> Self {
        Self {
            settings,
            facade_aliases: Vec::new(),
        }
    }

    /// A copy that also accepts `aliases` as the facade's name.
    pub fn with_facade_aliases(&self, aliases: Vec<String>) -> Self {
        Self {
            settings: self.settings.clone(),
            facade_aliases: aliases,
        }
    }

    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    /// Whether a static call target names the facade.  Aliases only match
    /// unqualified, the way PHP resolves them.
    pub(crate) fn is_facade(&self, class: &str) -> bool {
        crate::names::short_name(class).eq_ignore_ascii_case(&self.settings.class)
            || self.facade_aliases.iter().any(|alias| alias.eq_ignore_ascii_case(class))
    }

    /// Decide the fate of one statement.
    pub fn classify(&self, statement: &Statement<'_>, tokens: &ReferenceTokens<'_>) -> Verdict {
        self.inspect(statement, tokens).unwrap_or(Verdict::Keep)
    }

    /// Like [`classify`](Self::classify), but returns `None` for statements
    /// that are not deprecation calls at all.
    pub fn inspect(&self, statement: &Statement<'_>, tokens: &ReferenceTokens<'_>) -> Option<Verdict> {
        match statement {
            Statement::Expression(expr_stmt) => self.inspect_expression(expr_stmt.expression, tokens),
            _ => None,
        }
    }

    fn inspect_expression(&self, expr: &Expression<'_>, tokens: &ReferenceTokens<'_>) -> Option<Verdict> {
        match call_shape::recognize(expr, self) {
            CallShape::Notice(arguments) => Some(self.judge_notice(arguments, tokens)),
            CallShape::Wrapper(callback) => Some(self.judge_wrapper(callback, tokens)),
            CallShape::Other => None,
        }
    }

    /// A notice is about the rename if any of its string literals, taken in
    /// argument order, carries a trigger.
    fn judge_notice(&self, arguments: &ArgumentList<'_>, tokens: &ReferenceTokens<'_>) -> Verdict {
        let mut literals = Vec::new();
        for value in call_shape::argument_values(arguments) {
            call_shape::string_literals(value, &mut literals);
        }

        let config_aware = self.settings.config_aware && !tokens.is_empty();
        let hit = literals.iter().any(|text| {
            triggers::contains_phrase(text, &self.settings.phrases)
                || (config_aware && tokens.mentioned_in(text))
        });

        if hit { Verdict::Remove } else { Verdict::Keep }
    }

    /// The wrapper goes as a unit, and only when everything it runs is
    /// itself a rename notice.
    fn judge_wrapper(&self, callback: Callback<'_>, tokens: &ReferenceTokens<'_>) -> Verdict {
        match callback {
            Callback::Body(block) => {
                let mut statements = block.statements.iter().peekable();
                if statements.peek().is_none() {
                    return Verdict::Keep;
                }
                if statements.all(|s| self.classify(s, tokens) == Verdict::Remove) {
                    Verdict::Remove
                } else {
                    Verdict::Keep
                }
            }
            Callback::Expression(expr) => self.inspect_expression(expr, tokens).unwrap_or(Verdict::Keep),
            Callback::Opaque => Verdict::Keep,
        }
    }
}
