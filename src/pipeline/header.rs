//! Generated-file banner.
//!
//! Every generated file starts with a fixed comment block naming the
//! upstream class it was produced from.  Consumers grep for
//! [`HEADER_MARKER`], so its wording is part of the output contract.

/// Greppable phrase carried by every generated file.
pub const HEADER_MARKER: &str = "Forward-compatibility polyfill for";

/// The banner for a file generated from `source_identity`, including the
/// open tag.
pub fn banner(source_identity: &str) -> String {
    format!(
        "<?php\n\n\
         /**\n \
         * {} {}.\n \
         *\n \
         * This file is generated from the upstream source. Do not edit it by hand.\n \
         */\n\n",
        HEADER_MARKER, source_identity
    )
}

/// Replace the file's prologue with the banner.
pub fn apply(printed: &str, source_identity: &str) -> String {
    let body = strip_prologue(printed);
    let mut out = banner(source_identity);
    out.push_str(body);
    out
}

/// Drop the byte-order mark, the open tag and a file-level comment block
/// that sits directly in front of the `namespace` or `declare` statement.
///
/// A comment in front of anything else (typically a class docblock) is
/// kept.
pub fn strip_prologue(source: &str) -> &str {
    let mut rest = source.strip_prefix('\u{feff}').unwrap_or(source);

    let trimmed = rest.trim_start();
    if let Some(tag) = trimmed.get(..5)
        && tag.eq_ignore_ascii_case("<?php")
    {
        let after = &trimmed[5..];
        if after.is_empty() || after.starts_with(char::is_whitespace) {
            rest = after.trim_start();
        }
    }

    if rest.starts_with("/*")
        && let Some(end) = rest.find("*/")
    {
        let after = rest[end + 2..].trim_start();
        if starts_with_keyword(after, "namespace") || starts_with_keyword(after, "declare") {
            rest = after;
        }
    }

    rest
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    text.get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
        && !text[keyword.len()..]
            .chars()
            .next()
            .is_some_and(crate::names::is_ident_char)
}
