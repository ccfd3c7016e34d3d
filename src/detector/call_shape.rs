//! Recognition of deprecation call shapes.
//!
//! Only static calls on the configured facade with a literal method name
//! are recognized.  Anything dynamic resolves to [`CallShape::Other`] so
//! that the detector keeps it.
use mago_syntax::ast::*;

use super::Detector;

/// The deprecation-relevant shape of one expression.
pub(crate) enum CallShape<'a> {
    /// `Deprecation::notice(...)` and its no-replacement variants.
    Notice(&'a ArgumentList<'a>),
    /// `Deprecation::withSuppressedNotice(callback)`.
    Wrapper(Callback<'a>),
    Other,
}

/// The callback passed to a wrapper call.
pub(crate) enum Callback<'a> {
    /// `function () { ... }`
    Body(&'a Block<'a>),
    /// `fn () => ...`
    Expression(&'a Expression<'a>),
    /// Missing, a named callable, a variable, ...
    Opaque,
}

pub(crate) fn recognize<'a>(expr: &'a Expression<'a>, detector: &Detector) -> CallShape<'a> {
    let Expression::Call(Call::StaticMethod(call)) = unparenthesize(expr) else {
        return CallShape::Other;
    };

    let Expression::Identifier(class) = call.class else {
        return CallShape::Other;
    };
    if !detector.is_facade(class.value()) {
        return CallShape::Other;
    }
    let settings = detector.settings();

    let ClassLikeMemberSelector::Identifier(method) = &call.method else {
        return CallShape::Other;
    };
    let method = method.value;

    if is_one_of(method, &settings.notice_methods) {
        CallShape::Notice(&call.argument_list)
    } else if is_one_of(method, &settings.wrapper_methods) {
        CallShape::Wrapper(callback(&call.argument_list))
    } else {
        CallShape::Other
    }
}

/// The value expressions of every argument, in order.
pub(crate) fn argument_values<'a>(
    argument_list: &'a ArgumentList<'a>,
) -> impl Iterator<Item = &'a Expression<'a>> {
    argument_list.arguments.iter().map(|arg| match arg {
        Argument::Positional(pos) => pos.value,
        Argument::Named(named) => named.value,
    })
}

/// Collect the string literals of an argument value.  Concatenation
/// operands are included; interpolated strings are not literals.
pub(crate) fn string_literals<'a>(expr: &'a Expression<'a>, out: &mut Vec<&'a str>) {
    match expr {
        Expression::Literal(Literal::String(lit_str)) => {
            if let Some(value) = lit_str.value {
                out.push(value);
            } else {
                let raw = lit_str.raw;
                let unquoted = raw
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .or_else(|| raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
                    .unwrap_or(raw);
                out.push(unquoted);
            }
        }
        Expression::Parenthesized(p) => string_literals(p.expression, out),
        Expression::Binary(bin) => {
            string_literals(bin.lhs, out);
            string_literals(bin.rhs, out);
        }
        _ => {}
    }
}

fn callback<'a>(argument_list: &'a ArgumentList<'a>) -> Callback<'a> {
    let Some(first) = argument_values(argument_list).next() else {
        return Callback::Opaque;
    };
    match unparenthesize(first) {
        Expression::Closure(closure) => Callback::Body(&closure.body),
        Expression::ArrowFunction(arrow) => Callback::Expression(arrow.expression),
        _ => Callback::Opaque,
    }
}

fn unparenthesize<'a>(mut expr: &'a Expression<'a>) -> &'a Expression<'a> {
    while let Expression::Parenthesized(p) = expr {
        expr = p.expression;
    }
    expr
}

fn is_one_of(method: &str, candidates: &[String]) -> bool {
    candidates.iter().any(|c| c.eq_ignore_ascii_case(method))
}
