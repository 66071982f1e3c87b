use std::borrow::Cow;

/// Encode text for literal inclusion in HTML text and quoted attribute
/// values.
///
/// `&`, `<`, `>`, `"` and `'` become character references. Characters that
/// are not allowed in HTML documents (C0 controls other than tab, line feed
/// and carriage return, DEL, C1 controls and the noncharacters U+FFFE and
/// U+FFFF) are replaced by a space. Everything else passes through, so the
/// common case of clean text is returned borrowed.
pub fn encode_for_html(text: &str) -> Cow<'_, str> {
    let Some(first) = text.find(needs_encoding) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len() + 16);
    out.push_str(&text[..first]);
    for c in text[first..].chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c if is_invalid(c) => out.push(' '),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn needs_encoding(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'') || is_invalid(c)
}

fn is_invalid(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => false,
        '\u{0}'..='\u{1F}' | '\u{7F}'..='\u{9F}' => true,
        '\u{FFFE}' | '\u{FFFF}' => true,
        _ => false,
    }
}
