//! Declaration rewriting.
//!
//! Moves a file's namespace declaration and the names of its class-like
//! declarations to their target identities.  Only the declarations
//! themselves change: `extends`, `implements`, type hints, `new` and
//! `instanceof` references to the old names are left as they are.
//!
//! Lookups are keyed by *old* names, so running the rewriter over its own
//! output changes nothing.
use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::edit::TextEdit;
use crate::names;
use crate::types::{MappingEntry, MappingTable};

pub struct DeclarationRewriter<'t> {
    table: &'t MappingTable,
}

impl<'t> DeclarationRewriter<'t> {
    pub fn new(table: &'t MappingTable) -> Self {
        Self { table }
    }

    /// Target for a declared namespace, or `None` to leave it alone.
    ///
    /// The entry's own namespace maps straight to its target; anything
    /// else goes through the longest-prefix table.
    pub fn resolve_namespace(&self, declared: &str, entry: &MappingEntry) -> Option<String> {
        let declared = names::normalize(declared);
        if declared == entry.source_namespace() {
            if declared == entry.target_namespace {
                return None;
            }
            return Some(entry.target_namespace.clone());
        }
        self.table.namespaces.rewrite(declared)
    }

    /// Target for a declared class-like name, or `None` to leave it alone.
    pub fn resolve_class(&self, declared: &str, entry: &MappingEntry) -> Option<String> {
        if declared == entry.source_class() {
            if declared == entry.target_class {
                return None;
            }
            return Some(entry.target_class.clone());
        }
        self.table.class_names.get(declared).map(str::to_string)
    }

    /// Edits that rename every namespace and class-like declaration in
    /// `program`.
    pub(crate) fn edits<'a>(&self, program: &'a Program<'a>, entry: &MappingEntry) -> Vec<TextEdit> {
        let mut edits = Vec::new();
        self.visit_statements(program.statements.iter(), entry, &mut edits);
        edits
    }

    fn visit_statements<'a>(
        &self,
        statements: impl Iterator<Item = &'a Statement<'a>>,
        entry: &MappingEntry,
        edits: &mut Vec<TextEdit>,
    ) {
        for statement in statements {
            match statement {
                Statement::Namespace(namespace) => {
                    if let Some(ident) = &namespace.name
                        && let Some(target) = self.resolve_namespace(ident.value(), entry)
                    {
                        let span = ident.span();
                        tracing::debug!("namespace {} -> {}", ident.value(), target);
                        edits.push(TextEdit::replace(
                            span.start.offset as usize,
                            span.end.offset as usize,
                            target,
                        ));
                    }
                    self.visit_statements(namespace.statements().iter(), entry, edits);
                }
                Statement::Class(class) => self.rename(&class.name, entry, edits),
                Statement::Interface(iface) => self.rename(&iface.name, entry, edits),
                Statement::Trait(trait_def) => self.rename(&trait_def.name, entry, edits),
                Statement::Enum(enum_def) => self.rename(&enum_def.name, entry, edits),
                _ => {}
            }
        }
    }

    fn rename(&self, name: &LocalIdentifier<'_>, entry: &MappingEntry, edits: &mut Vec<TextEdit>) {
        if let Some(target) = self.resolve_class(name.value, entry) {
            let span = name.span();
            tracing::debug!("class {} -> {}", name.value, target);
            edits.push(TextEdit::replace(
                span.start.offset as usize,
                span.end.offset as usize,
                target,
            ));
        }
    }
}
