//! Placeholder scanning
//!
//! Placeholders follow the `{index[,alignment][:format]}` grammar with `{{`
//! and `}}` as literal-brace escapes. The body after an opening brace is
//! matched by a single regex; brace escaping itself is handled by the byte
//! loops in the renderer and the alias resolver, which only hand this module
//! the text after an unescaped `{`.

use std::sync::LazyLock;

use regex::Regex;

/// Matches the body of a format item, anchored right after the opening brace.
/// The format component may contain `}}` escapes but no single `}`.
static FORMAT_ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]+)\s*(?:,\s*(-?[0-9]+)\s*)?(?::((?:[^}]|\}\})*))?\}")
        .expect("format item pattern is valid")
});

/// A parsed placeholder body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FormatItem<'a> {
    pub(crate) index: usize,
    pub(crate) align: Option<isize>,
    pub(crate) format: Option<&'a str>,
    /// Bytes consumed after the opening brace, including the closing one.
    pub(crate) len: usize,
}

/// Parse the text immediately following an unescaped `{`. Returns `None` when
/// the text is not a well-formed format item (including absurdly large
/// indexes or alignments).
pub(crate) fn parse_format_item(rest: &str) -> Option<FormatItem<'_>> {
    let captures = FORMAT_ITEM_PATTERN.captures(rest)?;
    let index: usize = captures.get(1)?.as_str().parse().ok()?;
    let align = match captures.get(2) {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };
    Some(FormatItem {
        index,
        align,
        format: captures.get(3).map(|m| m.as_str()),
        len: captures.get(0)?.end(),
    })
}

/// Split an `AS <alias>` table format into the clause to emit verbatim and
/// the alias text. The keyword is case-insensitive and must not run into a
/// following word character, so formats like `ASC` do not match.
pub(crate) fn parse_alias_format(format: &str) -> Option<(&str, &str)> {
    let clause = format.trim_start();
    let keyword = clause.get(..2)?;
    if !keyword.eq_ignore_ascii_case("AS") {
        return None;
    }
    match clause.as_bytes().get(2) {
        Some(&next) if next.is_ascii_alphanumeric() || next == b'_' => None,
        _ => Some((clause, clause[2..].trim())),
    }
}
