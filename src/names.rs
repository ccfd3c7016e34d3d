//! Helpers for PHP qualified names.
//!
//! Names in the mapping table and in source declarations are compared in
//! their canonical form: no leading or trailing `\`.

/// Strip a leading `\` (fully-qualified syntax) and any trailing `\`.
pub fn normalize(name: &str) -> &str {
    let name = name.trim();
    let name = name.strip_prefix('\\').unwrap_or(name);
    name.strip_suffix('\\').unwrap_or(name)
}

/// The last segment of a qualified name (`Foo\Bar\Baz` → `Baz`).
pub fn short_name(name: &str) -> &str {
    match name.rfind('\\') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Everything before the last segment (`Foo\Bar\Baz` → `Foo\Bar`).
///
/// Returns an empty string for names in the global namespace.
pub fn namespace_of(name: &str) -> &str {
    match name.rfind('\\') {
        Some(pos) => &name[..pos],
        None => "",
    }
}

/// Join a namespace and a simple name, omitting the separator for the
/// global namespace.
pub fn join(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}\\{}", namespace, name)
    }
}

/// Whether `namespace` is `prefix` itself or lives underneath it.
///
/// The match has to land on a separator boundary: `A\B` is a prefix of
/// `A\B\C` but not of `A\Borange`.
pub fn strip_namespace_prefix<'a>(namespace: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = namespace.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('\\') {
        Some(rest)
    } else {
        None
    }
}

/// Characters that can continue a PHP identifier.
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || (c as u32) >= 0x80
}
