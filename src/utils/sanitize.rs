//! Markup text escaping
//!
//! Escapes user-supplied text so it can be embedded in SVG content and attribute values.

use std::borrow::Cow;

/// Replace `<`, `>` and `"` with their entity equivalents.
///
/// All other characters, including `&`, pass through untouched, so already-escaped
/// text is left as is: `sanitize(sanitize(x)) == sanitize(x)`.
///
/// ```rust
/// use eduvis::utils::sanitize;
///
/// assert_eq!(sanitize("a < b"), "a &lt; b");
/// assert_eq!(sanitize("a &lt; b"), "a &lt; b");
/// ```
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if !text.contains(['<', '>', '"']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Entities that may legitimately start with `&` in escaped text.
pub(crate) const MARKUP_ENTITIES: [&str; 4] = ["&lt;", "&gt;", "&quot;", "&amp;"];

/// Longest topic text placed in a `<title>` or `<desc>` element.
pub(crate) const TITLE_LIMIT: usize = 200;

/// [`sanitize`] plus what XML character data additionally needs.
///
/// A `&` that does not start `&lt;`, `&gt;`, `&quot;` or `&amp;` becomes `&amp;`, and C0
/// control characters other than tab, newline and carriage return are dropped.
/// The result is still idempotent.
///
/// ```rust
/// use eduvis::utils::markup_text;
///
/// assert_eq!(markup_text("R&D <lab>"), "R&amp;D &lt;lab&gt;");
/// ```
pub fn markup_text(text: &str) -> Cow<'_, str> {
    let escaped = sanitize(text);
    let needs_work = escaped.char_indices().any(|(i, ch)| match ch {
        '&' => !starts_with_entity(&escaped[i..]),
        c => is_illegal_control(c),
    });
    if !needs_work {
        return escaped;
    }

    let mut out = String::with_capacity(escaped.len() + 16);
    for (i, ch) in escaped.char_indices() {
        match ch {
            '&' if !starts_with_entity(&escaped[i..]) => out.push_str("&amp;"),
            c if is_illegal_control(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn starts_with_entity(text: &str) -> bool {
    MARKUP_ENTITIES.iter().any(|e| text.starts_with(e))
}

fn is_illegal_control(ch: char) -> bool {
    matches!(ch, '\u{0}'..='\u{1f}') && !matches!(ch, '\t' | '\n' | '\r')
}

/// Cut `text` to at most `limit` characters without splitting an escape entity.
/// Returns the kept prefix and whether anything was cut.
pub(crate) fn truncate_entity_safe(text: &str, limit: usize) -> (&str, bool) {
    let Some((cut, _)) = text.char_indices().nth(limit) else {
        return (text, false);
    };
    let head = &text[..cut];
    if let Some(amp) = head.rfind('&') {
        let partial = !head[amp..].contains(';');
        if partial && starts_with_entity(&text[amp..]) {
            return (&head[..amp], true);
        }
    }
    (head, true)
}
