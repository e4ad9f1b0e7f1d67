//! Text helpers shared by the normalizer, renderer and bundler.

/// Convert text to a URL-safe slug.
///
/// Lowercases, replaces every run of characters outside `[a-z0-9]` with a
/// single hyphen and trims hyphens from both ends. `slugify(slugify(x))`
/// equals `slugify(x)`.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut slug = String::with_capacity(lower.len());
    let mut pending_hyphen = false;

    for c in lower.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape special XML characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// First sentence of a block of text, terminated with a period.
///
/// Returns an empty string when the text has no sentence content.
pub fn first_sentence(text: &str) -> String {
    let sentence = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_default();

    if sentence.is_empty() {
        String::new()
    } else {
        let collapsed = sentence.split_whitespace().collect::<Vec<_>>().join(" ");
        format!("{collapsed}.")
    }
}
