//! Plain-text helpers shared by the news parsers.

/// Strip HTML tags from a string and normalize whitespace.
///
/// `&nbsp;` left over after XML unescaping is treated as a space.
pub(crate) fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `max_chars` characters of `s`, never splitting a code point.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_nbsp() {
        let html = r##"<a href="https://x">Acme ships TOPCon</a>&nbsp;&nbsp;<font color="#6f6f6f">PV Magazine</font>"##;
        assert_eq!(strip_html(html), "Acme ships TOPCon PV Magazine");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 300), "short");
    }
}
