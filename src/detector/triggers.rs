//! Text triggers that mark a notice message as being about the rename.
//!
//! Two kinds of trigger exist.  Fixed phrases ("Will be renamed", …) are
//! plain substring matches.  Reference tokens are the names of the class
//! being processed, and only count when they appear as a whole name in the
//! message rather than as part of a longer word or a member reference.
use memchr::memmem;

use crate::names::is_ident_char;
use crate::types::MappingEntry;

/// Whether `text` contains any of `phrases` verbatim.
pub(crate) fn contains_phrase(text: &str, phrases: &[String]) -> bool {
    phrases
        .iter()
        .filter(|p| !p.is_empty())
        .any(|p| memmem::find(text.as_bytes(), p.as_bytes()).is_some())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Namespace,
    Class,
}

/// Names that tie a notice to the entry being transformed: its source and
/// target namespaces and simple class names.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTokens<'e> {
    tokens: Vec<(&'e str, TokenKind)>,
}

impl<'e> ReferenceTokens<'e> {
    /// No tokens; only fixed phrases will match.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn for_entry(entry: &'e MappingEntry) -> Self {
        let mut tokens = Vec::with_capacity(4);
        for (token, kind) in [
            (entry.target_namespace.as_str(), TokenKind::Namespace),
            (entry.target_class.as_str(), TokenKind::Class),
            (entry.source_namespace(), TokenKind::Namespace),
            (entry.source_class(), TokenKind::Class),
        ] {
            if !token.is_empty() && !tokens.contains(&(token, kind)) {
                tokens.push((token, kind));
            }
        }
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether any token occurs in `text` as a standalone name.
    pub fn mentioned_in(&self, text: &str) -> bool {
        self.tokens
            .iter()
            .any(|&(token, kind)| find_bounded(text, token, kind))
    }
}

fn find_bounded(text: &str, token: &str, kind: TokenKind) -> bool {
    memmem::find_iter(text.as_bytes(), token.as_bytes()).any(|pos| {
        let before = &text[..pos];
        let after = &text[pos + token.len()..];
        left_boundary(before, kind) && right_boundary(after, kind)
    })
}

fn left_boundary(before: &str, kind: TokenKind) -> bool {
    if before.ends_with("->") || before.ends_with("::") {
        return false;
    }
    let mut chars = before.chars().rev();
    match chars.next() {
        None => true,
        Some(c) if is_ident_char(c) => false,
        // `Foo\Bar`: a class may close a qualified name.  A namespace may
        // only follow a leading global `\`, not sit inside another name.
        Some('\\') => match kind {
            TokenKind::Class => true,
            TokenKind::Namespace => !chars.next().is_some_and(is_ident_char),
        },
        Some(_) => true,
    }
}

fn right_boundary(after: &str, kind: TokenKind) -> bool {
    if after.starts_with("::") || after.starts_with("->") {
        return false;
    }
    match after.chars().next() {
        None => true,
        Some(c) if is_ident_char(c) => false,
        Some('\\') => kind == TokenKind::Namespace,
        Some(_) => true,
    }
}
