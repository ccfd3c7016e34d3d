//! Statement pruning and the cleanup that follows it.
//!
//! Walks the method bodies of every class-like in the file, asks the
//! detector about each statement and turns removals into edits.  Nested
//! `{ }` blocks, `if`/`elseif`/`else` branches, loop bodies, `try` /
//! `catch` / `finally` blocks and `switch` arms are searched too.  A bare
//! single-statement body (`if ($x) foo();`) is never emptied because the
//! `if` would then guard whatever follows it.
//!
//! Cleanup runs in the same pass: a body left with nothing but whitespace
//! collapses to `{}`, stray `;` statements next to removed ones go, and an
//! import of the deprecation facade that nothing uses any more is dropped.
use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;

use crate::detector::{DeprecationCallSite, Detector, ReferenceTokens, Verdict};
use crate::edit::{TextEdit, expand_to_line};
use crate::names;

/// Edits produced by pruning one file.
#[derive(Debug, Default)]
pub(crate) struct Pruned {
    pub edits: Vec<TextEdit>,
    /// Statements the detector asked to remove.
    pub removed: usize,
}

pub(crate) struct Pruner<'p> {
    pub detector: &'p Detector,
    pub tokens: &'p ReferenceTokens<'p>,
    pub source: &'p str,
}

impl Pruner<'_> {
    pub(crate) fn prune<'a>(&self, program: &'a Program<'a>) -> Pruned {
        let mut pruned = Pruned::default();
        for_each_method_body(program.statements.iter(), &mut |block| {
            self.prune_statements(
                block.statements.iter(),
                Some((block.left_brace, block.right_brace)),
                &mut pruned,
            );
        });
        if pruned.removed > 0 {
            self.drop_unused_facade_import(program, &mut pruned);
        }
        pruned
    }

    /// Every recognized deprecation call that pruning would look at, with
    /// its verdict.
    pub(crate) fn survey<'a>(&self, program: &'a Program<'a>) -> Vec<DeprecationCallSite> {
        let mut sites = Vec::new();
        for_each_method_body(program.statements.iter(), &mut |block| {
            self.survey_statements(block.statements.iter(), &mut sites);
        });
        sites
    }

    fn survey_statements<'a>(
        &self,
        statements: impl Iterator<Item = &'a Statement<'a>>,
        sites: &mut Vec<DeprecationCallSite>,
    ) {
        for statement in statements {
            match self.detector.inspect(statement, self.tokens) {
                Some(verdict) => {
                    let span = statement.span();
                    sites.push(DeprecationCallSite {
                        text: self.text(span).to_string(),
                        offset: span.start.offset as usize,
                        verdict,
                    });
                }
                None => self.survey_nested(statement, sites),
            }
        }
    }

    fn survey_nested<'a>(&self, statement: &'a Statement<'a>, sites: &mut Vec<DeprecationCallSite>) {
        for body in nested_bodies(statement) {
            match body {
                Nested::Block(block) => self.survey_statements(block.statements.iter(), sites),
                Nested::List(statements) => self.survey_statements(statements.into_iter(), sites),
                Nested::Single(inner) => self.survey_nested(inner, sites),
            }
        }
    }

    /// Prune one statement list.  `braces` is set when the list is the
    /// inside of a `{ }` block and may therefore collapse to `{}`.
    fn prune_statements<'a>(
        &self,
        statements: impl Iterator<Item = &'a Statement<'a>>,
        braces: Option<(Span, Span)>,
        pruned: &mut Pruned,
    ) {
        let statements: Vec<&'a Statement<'a>> = statements.collect();
        let mut removals: Vec<Span> = Vec::new();

        for &statement in &statements {
            match self.detector.classify(statement, self.tokens) {
                Verdict::Remove => {
                    tracing::debug!("pruning `{}`", self.text(statement.span()));
                    removals.push(statement.span());
                }
                Verdict::Keep => self.descend(statement, pruned),
            }
        }

        if removals.is_empty() {
            return;
        }
        pruned.removed += removals.len();

        for statement in &statements {
            let span = statement.span();
            if self.text(span).trim() == ";" {
                removals.push(span);
            }
        }
        removals.sort_by_key(|s| s.start.offset);

        if let Some((left, right)) = braces {
            let start = left.end.offset as usize;
            let end = right.start.offset as usize;
            if self.blank_outside(start, end, &removals) {
                pruned.edits.push(TextEdit::delete(start, end));
                return;
            }
        }

        // Neighbours separated only by whitespace (`notice();;`) go as one
        // range so their shared line can be taken whole.
        let mut ranges: Vec<(usize, usize)> = Vec::with_capacity(removals.len());
        for span in removals {
            let (start, end) = (span.start.offset as usize, span.end.offset as usize);
            if let Some(last) = ranges.last_mut()
                && self.source.get(last.1..start).is_some_and(|gap| gap.trim().is_empty())
            {
                last.1 = end;
                continue;
            }
            ranges.push((start, end));
        }

        for (start, end) in ranges {
            let (start, end) = expand_to_line(self.source, start, end);
            pruned.edits.push(TextEdit::delete(start, end));
        }
    }

    fn descend<'a>(&self, statement: &'a Statement<'a>, pruned: &mut Pruned) {
        for body in nested_bodies(statement) {
            match body {
                Nested::Block(block) => self.prune_statements(
                    block.statements.iter(),
                    Some((block.left_brace, block.right_brace)),
                    pruned,
                ),
                Nested::List(statements) => self.prune_statements(statements.into_iter(), None, pruned),
                Nested::Single(inner) => self.descend(inner, pruned),
            }
        }
    }

    /// Whether `source[start..end]` is whitespace once `holes` are cut out.
    fn blank_outside(&self, start: usize, end: usize, holes: &[Span]) -> bool {
        let mut cursor = start;
        for hole in holes {
            let hole_start = hole.start.offset as usize;
            if hole_start > cursor && !self.source[cursor..hole_start].trim().is_empty() {
                return false;
            }
            cursor = cursor.max(hole.end.offset as usize);
        }
        cursor >= end || self.source[cursor..end].trim().is_empty()
    }

    /// Remove `use Vendor\Deprecation;` once no reference to the facade
    /// survives pruning.
    fn drop_unused_facade_import<'a>(&self, program: &'a Program<'a>, pruned: &mut Pruned) {
        let facade = &self.detector.settings().class;
        let mut imports = Vec::new();
        collect_facade_imports(program.statements.iter(), facade, &mut imports);

        for import in imports.into_iter().filter(|i| i.sole) {
            let span = import.span;
            let start = span.start.offset as usize;
            let end = span.end.offset as usize;
            let still_used = whole_word_positions(self.source, import.local).into_iter().any(|pos| {
                let inside_import = pos >= start && pos < end;
                let pruned_away = pruned.edits.iter().any(|e| e.start <= pos && pos < e.end);
                !inside_import && !pruned_away
            });
            if !still_used {
                tracing::debug!("dropping unused import `{}`", self.text(span));
                let (start, end) = expand_to_line(self.source, start, end);
                pruned.edits.push(TextEdit::delete(start, end));
            }
        }
    }

    fn text(&self, span: Span) -> &str {
        &self.source[span.start.offset as usize..span.end.offset as usize]
    }
}

/// Call `visit` with the concrete body of every method of every
/// class-like declared at the top level or inside a namespace.
fn for_each_method_body<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    visit: &mut dyn FnMut(&'a Block<'a>),
) {
    for statement in statements {
        let members = match statement {
            Statement::Namespace(namespace) => {
                for_each_method_body(namespace.statements().iter(), visit);
                continue;
            }
            Statement::Class(class) => &class.members,
            Statement::Interface(iface) => &iface.members,
            Statement::Trait(trait_def) => &trait_def.members,
            Statement::Enum(enum_def) => &enum_def.members,
            _ => continue,
        };
        for member in members.iter() {
            if let ClassLikeMember::Method(method) = member
                && let MethodBody::Concrete(block) = &method.body
            {
                visit(block);
            }
        }
    }
}

/// A statement list nested inside another statement.
enum Nested<'a> {
    /// `{ ... }`, which may collapse to `{}`.
    Block(&'a Block<'a>),
    /// Statements without braces of their own: colon-delimited bodies and
    /// `case` arms.
    List(Vec<&'a Statement<'a>>),
    /// A bare single-statement body.  Searched, never emptied.
    Single(&'a Statement<'a>),
}

/// The statement lists directly inside `statement`.
fn nested_bodies<'a>(statement: &'a Statement<'a>) -> Vec<Nested<'a>> {
    let mut bodies = Vec::new();
    match statement {
        Statement::Block(block) => bodies.push(Nested::Block(block)),
        Statement::If(if_stmt) => match &if_stmt.body {
            IfBody::Statement(body) => {
                bodies.push(Nested::Single(body.statement));
                for else_if in body.else_if_clauses.iter() {
                    bodies.push(Nested::Single(else_if.statement));
                }
                if let Some(else_clause) = &body.else_clause {
                    bodies.push(Nested::Single(else_clause.statement));
                }
            }
            IfBody::ColonDelimited(body) => {
                bodies.push(Nested::List(body.statements.iter().collect()));
                for else_if in body.else_if_clauses.iter() {
                    bodies.push(Nested::List(else_if.statements.iter().collect()));
                }
                if let Some(else_clause) = &body.else_clause {
                    bodies.push(Nested::List(else_clause.statements.iter().collect()));
                }
            }
        },
        Statement::Foreach(foreach) => match &foreach.body {
            ForeachBody::Statement(inner) => bodies.push(Nested::Single(inner)),
            ForeachBody::ColonDelimited(body) => bodies.push(Nested::List(body.statements.iter().collect())),
        },
        Statement::For(for_stmt) => match &for_stmt.body {
            ForBody::Statement(inner) => bodies.push(Nested::Single(inner)),
            ForBody::ColonDelimited(body) => bodies.push(Nested::List(body.statements.iter().collect())),
        },
        Statement::While(while_stmt) => match &while_stmt.body {
            WhileBody::Statement(inner) => bodies.push(Nested::Single(inner)),
            WhileBody::ColonDelimited(body) => bodies.push(Nested::List(body.statements.iter().collect())),
        },
        Statement::DoWhile(dw) => bodies.push(Nested::Single(dw.statement)),
        Statement::Try(try_stmt) => {
            bodies.push(Nested::Block(&try_stmt.block));
            for catch in try_stmt.catch_clauses.iter() {
                bodies.push(Nested::Block(&catch.block));
            }
            if let Some(finally) = &try_stmt.finally_clause {
                bodies.push(Nested::Block(&finally.block));
            }
        }
        Statement::Switch(switch) => match &switch.body {
            SwitchBody::BraceDelimited(body) => {
                for case in body.cases.iter() {
                    bodies.push(Nested::List(case.statements().iter().collect()));
                }
            }
            SwitchBody::ColonDelimited(body) => {
                for case in body.cases.iter() {
                    bodies.push(Nested::List(case.statements().iter().collect()));
                }
            }
        },
        _ => {}
    }
    bodies
}

/// One imported name that resolves to the facade class.
struct FacadeImport<'a> {
    /// The whole `use` statement.
    span: Span,
    /// The name the import binds in this file.
    local: &'a str,
    /// Whether the statement imports nothing else.
    sole: bool,
}

fn collect_facade_imports<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    facade: &str,
    imports: &mut Vec<FacadeImport<'a>>,
) {
    for statement in statements {
        match statement {
            Statement::Namespace(namespace) => {
                collect_facade_imports(namespace.statements().iter(), facade, imports);
            }
            Statement::Use(use_stmt) => {
                let UseItems::Sequence(seq) = &use_stmt.items else {
                    continue;
                };
                let sole = seq.items.iter().count() == 1;
                for item in seq.items.iter() {
                    if !names::short_name(item.name.value()).eq_ignore_ascii_case(facade) {
                        continue;
                    }
                    let local = match &item.alias {
                        Some(alias) => alias.identifier.value,
                        None => names::short_name(item.name.value()),
                    };
                    imports.push(FacadeImport {
                        span: statement.span(),
                        local,
                        sole,
                    });
                }
            }
            _ => {}
        }
    }
}

/// Names other than the facade's own that `program` imports it under
/// (`use Vendor\Deprecation as Dep;` yields `Dep`).
pub(crate) fn facade_aliases<'a>(program: &'a Program<'a>, facade: &str) -> Vec<String> {
    let mut imports = Vec::new();
    collect_facade_imports(program.statements.iter(), facade, &mut imports);
    imports
        .into_iter()
        .filter(|i| !i.local.eq_ignore_ascii_case(facade))
        .map(|i| i.local.to_string())
        .collect()
}

/// Byte offsets where `word` occurs as a whole identifier, ignoring ASCII
/// case as PHP does for class names.
fn whole_word_positions(source: &str, word: &str) -> Vec<usize> {
    let haystack = source.to_ascii_lowercase();
    let needle = word.to_ascii_lowercase();
    memchr::memmem::find_iter(haystack.as_bytes(), needle.as_bytes())
        .filter(|&pos| {
            let before_ok = !source[..pos].chars().next_back().is_some_and(names::is_ident_char);
            let after_ok = !source[pos + word.len()..]
                .chars()
                .next()
                .is_some_and(names::is_ident_char);
            before_ok && after_ok
        })
        .collect()
}
