//! C# string literals.

use natbind_ir::ReturnKind;

/// Quote `value` as a regular C# string literal.
///
/// Escape sequences follow the compiler's own literal display: the named
/// escapes for backslash, quote and the usual control characters, `\uXXXX`
/// for any other control character and for the line and paragraph
/// separators.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{b}' => out.push_str("\\v"),
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Declared return type of a constant member.
pub fn return_type(kind: ReturnKind) -> &'static str {
    match kind {
        ReturnKind::String => "string",
        ReturnKind::NullableString => "string?",
        ReturnKind::SpanOfChar => "global::System.ReadOnlySpan<char>",
        ReturnKind::SpanOfBytes => "global::System.ReadOnlySpan<byte>",
    }
}

/// The expression a constant member returns.
///
/// Empty values use the canonical empty forms; byte spans use a UTF-8 literal.
pub fn constant_expression(value: &str, kind: ReturnKind) -> String {
    match kind {
        ReturnKind::String | ReturnKind::NullableString if value.is_empty() => {
            "string.Empty".to_string()
        }
        ReturnKind::SpanOfChar | ReturnKind::SpanOfBytes if value.is_empty() => "[]".to_string(),
        ReturnKind::SpanOfBytes => format!("{}u8", quote(value)),
        ReturnKind::String | ReturnKind::NullableString | ReturnKind::SpanOfChar => quote(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_named_escapes() {
        assert_eq!(quote("a\\b"), r#""a\\b""#);
        assert_eq!(quote("tab\there"), r#""tab\there""#);
        assert_eq!(quote("line\r\n"), r#""line\r\n""#);
        assert_eq!(quote("nul\0"), r#""nul\0""#);
        assert_eq!(quote("say \"hi\""), r#""say \"hi\"""#);
    }

    #[test]
    fn test_quote_unicode_escapes() {
        assert_eq!(quote("\u{1b}[0m"), r#""\u001B[0m""#);
        assert_eq!(quote("a\u{2028}b"), r#""a\u2028b""#);
        assert_eq!(quote("\u{85}"), r#""\u0085""#);
    }

    #[test]
    fn test_quote_keeps_printable_text() {
        assert_eq!(quote("Grüße ¤ 😀"), "\"Grüße ¤ 😀\"");
    }

    #[test]
    fn test_empty_forms_for_every_kind() {
        assert_eq!(constant_expression("", ReturnKind::String), "string.Empty");
        assert_eq!(constant_expression("", ReturnKind::NullableString), "string.Empty");
        assert_eq!(constant_expression("", ReturnKind::SpanOfChar), "[]");
        assert_eq!(constant_expression("", ReturnKind::SpanOfBytes), "[]");
    }

    #[test]
    fn test_non_empty_forms() {
        assert_eq!(constant_expression("Hi", ReturnKind::String), "\"Hi\"");
        assert_eq!(constant_expression("Hi", ReturnKind::SpanOfChar), "\"Hi\"");
        assert_eq!(constant_expression("Hi", ReturnKind::SpanOfBytes), "\"Hi\"u8");
    }

    #[test]
    fn test_return_types() {
        assert_eq!(return_type(ReturnKind::NullableString), "string?");
        assert_eq!(
            return_type(ReturnKind::SpanOfBytes),
            "global::System.ReadOnlySpan<byte>"
        );
    }
}
