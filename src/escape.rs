//! HTML escaping shared by the page renderer and the mail composer
//!
//! Content document strings and form fields are untrusted; every one of them
//! goes through here before it lands in markup.

/// Encode `& < > ' "` for use in element content
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Encode a value placed inside a double-quoted attribute
///
/// Same table as [`escape_html`]; kept separate so call sites say which
/// context they write into.
pub fn escape_attr(input: &str) -> String {
    escape_html(input)
}
