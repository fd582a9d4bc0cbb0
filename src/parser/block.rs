//! Locating `[[concept]]` references and `{ ... }` relation blocks in raw text

use super::relations::quote_may_open;

/// A `[[name]]` occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Byte offset of the opening `[[`
    pub start: usize,
    /// Byte offset just past the closing `]]`
    pub end: usize,
    /// Link target, with any `|display` text removed
    pub name: &'a str,
}

/// Next well-formed `[[name]]` at or after `from`.
///
/// Names cannot contain brackets or line breaks; `[[[x]]]` yields `x`.
pub fn next_reference(text: &str, from: usize) -> Option<Reference<'_>> {
    let mut cursor = from;
    loop {
        let open = cursor + text.get(cursor..)?.find("[[")?;
        let name_start = open + 2;
        let close = name_start + text[name_start..].find("]]")?;
        let raw = &text[name_start..close];
        if raw.contains(|c: char| c == '[' || c == ']' || c == '\n') {
            cursor = open + 1;
            continue;
        }
        let name = raw.split('|').next().unwrap_or(raw).trim();
        if name.is_empty() {
            cursor = close + 2;
            continue;
        }
        return Some(Reference {
            start: open,
            end: close + 2,
            name,
        });
    }
}

/// Byte offset of the `{` opening a block directly after a reference, if any
pub fn block_open(text: &str, reference_end: usize) -> Option<usize> {
    let rest = text.get(reference_end..)?;
    let skipped = rest.len() - rest.trim_start().len();
    (rest[skipped..].starts_with('{')).then_some(reference_end + skipped)
}

/// Byte offset of the `}` closing the block opened at `open`.
///
/// Braces inside quoted values do not count.
pub fn block_close(text: &str, open: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut previous = Some('{');
    for (i, c) in text.get(open + 1..)?.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
                previous = Some(c);
            }
            continue;
        }
        match c {
            '"' | '\'' if quote_may_open(previous) => quote = Some(c),
            '}' => return Some(open + 1 + i),
            _ => {}
        }
        if !c.is_whitespace() {
            previous = Some(c);
        }
    }
    None
}
