//! HTML-safe JSON output.
//!
//! An [`EscapeTable`] maps every ASCII code point to the kind of escaping it
//! needs when a string is written into a JSON document. [`HtmlSafeFormatter`]
//! plugs the table into `serde_json` so that markup-significant characters
//! leave the serializer as HTML character references and can never be
//! reinterpreted as markup, even if the JSON ends up rendered as HTML.
//!
//! ```rust
//! use bulwark_xss::escape;
//!
//! let json = escape::to_string(&"a<b>(c)#").unwrap();
//! assert_eq!(json, r#""a&lt;b&gt;&#40;c&#41;&#35;""#);
//!
//! // Latin-1 Supplement / Latin Extended-A text is never escaped
//! assert_eq!(escape::to_string(&"Ærøskøbing").unwrap(), "\"Ærøskøbing\"");
//! ```

use crate::error::Result;
use bulwark_core::{Error, HttpResponse};
use serde::Serialize;
use serde_json::ser::Formatter;
use std::borrow::Cow;
use std::io;

/// How a single character is escaped during serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// Written as-is
    None,
    /// The serializer's own JSON escape (quote, backslash, control codes)
    Standard,
    /// Replaced by an HTML character reference
    Custom,
}

/// Fixed ASCII escape table plus the exemption range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeTable {
    ascii: [Escape; 128],
}

/// The table used for all HTML-safe JSON output.
pub static HTML_SAFE: EscapeTable = EscapeTable::html_safe();

/// Characters that are forced to [`Escape::Custom`] in [`EscapeTable::html_safe`].
pub const CUSTOM_ESCAPED: [char; 5] = ['<', '>', '(', ')', '#'];

impl EscapeTable {
    /// Standard JSON escapes only: control codes, `"` and `\`.
    pub const fn standard_json() -> Self {
        let mut ascii = [Escape::None; 128];
        let mut i = 0;
        while i < 0x20 {
            ascii[i] = Escape::Standard;
            i += 1;
        }
        ascii[b'"' as usize] = Escape::Standard;
        ascii[b'\\' as usize] = Escape::Standard;
        Self { ascii }
    }

    /// Standard JSON escapes plus custom escapes for `< > ( ) #`.
    pub const fn html_safe() -> Self {
        let mut table = Self::standard_json();
        let mut i = 0;
        while i < CUSTOM_ESCAPED.len() {
            table.ascii[CUSTOM_ESCAPED[i] as usize] = Escape::Custom;
            i += 1;
        }
        table
    }

    /// Mark an additional ASCII byte for custom escaping.
    ///
    /// Bytes the serializer already escapes (quote, backslash, control
    /// codes) keep their [`Escape::Standard`] entry.
    pub const fn with_custom(mut self, byte: u8) -> Self {
        if byte.is_ascii() && matches!(self.ascii[byte as usize], Escape::None) {
            self.ascii[byte as usize] = Escape::Custom;
        }
        self
    }

    /// Escape kind for a character. Exempt characters always map to
    /// [`Escape::None`]; non-ASCII characters are never escaped.
    pub fn escape_for(&self, c: char) -> Escape {
        if is_exempt(c) || !c.is_ascii() {
            return Escape::None;
        }
        self.ascii[c as usize]
    }

    /// Apply only the custom escapes of this table to `text`.
    pub fn escape_custom<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut out: Option<String> = None;
        let mut start = 0;

        for (i, c) in text.char_indices() {
            if self.escape_for(c) != Escape::Custom {
                continue;
            }
            let buf = out.get_or_insert_with(|| String::with_capacity(text.len() + 16));
            buf.push_str(&text[start..i]);
            buf.push_str(&custom_sequence(c));
            start = i + c.len_utf8();
        }

        match out {
            Some(mut buf) => {
                buf.push_str(&text[start..]);
                Cow::Owned(buf)
            }
            None => Cow::Borrowed(text),
        }
    }
}

impl Default for EscapeTable {
    fn default() -> Self {
        Self::html_safe()
    }
}

/// Latin-1 Supplement and Latin Extended-A letters (U+00C0..=U+017F) are
/// never escaped, whatever the table says.
pub fn is_exempt(c: char) -> bool {
    matches!(c, '\u{00C0}'..='\u{017F}')
}

/// HTML character reference for a custom-escaped character.
pub fn custom_sequence(c: char) -> Cow<'static, str> {
    match c {
        '<' => Cow::Borrowed("&lt;"),
        '>' => Cow::Borrowed("&gt;"),
        '&' => Cow::Borrowed("&amp;"),
        '"' => Cow::Borrowed("&#34;"),
        '\'' => Cow::Borrowed("&#39;"),
        other => Cow::Owned(format!("&#{};", other as u32)),
    }
}

/// `serde_json` formatter that adds the custom escapes of an [`EscapeTable`]
/// on top of the serializer's own string escaping.
#[derive(Debug, Clone, Copy)]
pub struct HtmlSafeFormatter {
    table: &'static EscapeTable,
}

impl HtmlSafeFormatter {
    pub fn new() -> Self {
        Self { table: &HTML_SAFE }
    }

    pub fn with_table(table: &'static EscapeTable) -> Self {
        Self { table }
    }
}

impl Default for HtmlSafeFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // Quote, backslash and control codes never reach this point: the
        // serializer escapes them itself between fragments.
        writer.write_all(self.table.escape_custom(fragment).as_bytes())
    }
}

/// Serialize `value` as HTML-safe JSON into `writer`.
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let mut ser = serde_json::Serializer::with_formatter(writer, HtmlSafeFormatter::new());
    value.serialize(&mut ser)?;
    Ok(())
}

/// Serialize `value` as HTML-safe JSON bytes.
pub fn to_vec<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(128);
    to_writer(&mut out, value)?;
    Ok(out)
}

/// Serialize `value` as an HTML-safe JSON string.
pub fn to_string<T: ?Sized + Serialize>(value: &T) -> Result<String> {
    let bytes = to_vec(value)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// JSON response helper that writes through [`HtmlSafeFormatter`].
#[derive(Debug)]
pub struct HtmlSafeJson<T: Serialize>(pub T);

impl<T: Serialize> HtmlSafeJson<T> {
    pub fn into_response(self) -> std::result::Result<HttpResponse, Error> {
        let body = to_vec(&self.0)?;
        Ok(HttpResponse::ok()
            .with_header("Content-Type", "application/json")
            .with_body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_table() {
        let table = EscapeTable::standard_json();

        assert_eq!(table.escape_for('\n'), Escape::Standard);
        assert_eq!(table.escape_for('\u{1f}'), Escape::Standard);
        assert_eq!(table.escape_for('"'), Escape::Standard);
        assert_eq!(table.escape_for('\\'), Escape::Standard);
        assert_eq!(table.escape_for('<'), Escape::None);
        assert_eq!(table.escape_for('a'), Escape::None);
    }

    #[test]
    fn test_html_safe_table() {
        for c in CUSTOM_ESCAPED {
            assert_eq!(HTML_SAFE.escape_for(c), Escape::Custom, "{c:?}");
        }
        assert_eq!(HTML_SAFE.escape_for('"'), Escape::Standard);
        assert_eq!(HTML_SAFE.escape_for('&'), Escape::None);
        assert_eq!(HTML_SAFE.escape_for(' '), Escape::None);
    }

    #[test]
    fn test_exemption_range() {
        assert!(is_exempt('\u{00C0}'));
        assert!(is_exempt('é'));
        assert!(is_exempt('ſ'));
        assert!(!is_exempt('\u{00BF}'));
        assert!(!is_exempt('\u{0180}'));
        assert!(!is_exempt('<'));
        assert_eq!(HTML_SAFE.escape_for('é'), Escape::None);
    }

    #[test]
    fn test_with_custom() {
        let table = EscapeTable::html_safe().with_custom(b'&');
        assert_eq!(table.escape_for('&'), Escape::Custom);
        assert_eq!(table.escape_custom("a&b"), "a&amp;b");
    }

    #[test]
    fn test_with_custom_keeps_standard_entries() {
        let table = EscapeTable::html_safe()
            .with_custom(b'"')
            .with_custom(b'\\')
            .with_custom(b'\n');

        assert_eq!(table, EscapeTable::html_safe());
        assert_eq!(table.escape_for('"'), Escape::Standard);
        assert_eq!(table.escape_for('\\'), Escape::Standard);
        assert_eq!(table.escape_for('\n'), Escape::Standard);
    }

    #[test]
    fn test_custom_sequences() {
        assert_eq!(custom_sequence('<'), "&lt;");
        assert_eq!(custom_sequence('>'), "&gt;");
        assert_eq!(custom_sequence('('), "&#40;");
        assert_eq!(custom_sequence(')'), "&#41;");
        assert_eq!(custom_sequence('#'), "&#35;");
    }

    #[test]
    fn test_escape_custom_borrows_when_clean() {
        assert!(matches!(HTML_SAFE.escape_custom("hello"), Cow::Borrowed(_)));
        assert_eq!(HTML_SAFE.escape_custom("x(1)"), "x&#40;1&#41;");
    }

    #[test]
    fn test_serialize_flagged_characters() {
        let out = to_string(&"a<b>(c)#").unwrap();
        assert_eq!(out, r#""a&lt;b&gt;&#40;c&#41;&#35;""#);
    }

    #[test]
    fn test_standard_escapes_untouched() {
        let out = to_string(&"say \"hi\"\n\\").unwrap();
        assert_eq!(out, r#""say \"hi\"\n\\""#);
    }

    #[test]
    fn test_latin_extended_unescaped() {
        let text = "ÀÉÎõüÿĀęŁœŸſ";
        assert_eq!(to_string(&text).unwrap(), format!("\"{text}\""));
    }

    #[test]
    fn test_nested_document() {
        let value = json!({
            "title": "<script>",
            "items": ["(1)", "#2"],
            "n": 3
        });
        let out = to_string(&value).unwrap();

        assert!(out.contains(r#""title":"&lt;script&gt;""#));
        assert!(out.contains(r#""items":["&#40;1&#41;","&#35;2"]"#));
        assert!(out.contains(r#""n":3"#));
    }

    #[test]
    fn test_position_independent() {
        let alone = to_string(&"<").unwrap();
        let nested = to_string(&json!({"a": ["x", "<"]})).unwrap();

        assert_eq!(alone, "\"&lt;\"");
        assert!(nested.contains("\"&lt;\""));
    }

    #[test]
    fn test_html_safe_json_response() {
        let response = HtmlSafeJson(json!({"v": "<i>"})).into_response().unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(
            response.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(response.text(), r#"{"v":"&lt;i&gt;"}"#);
    }
}
