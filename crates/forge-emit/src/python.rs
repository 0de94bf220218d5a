//! Python literal formatting shared by the object-graph targets.

use std::fmt::Write as _;

/// Double-quoted Python string literal.
pub(crate) fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Python float literal that reads back as the same value.
pub(crate) fn float_literal(value: f64) -> String {
    // Debug always keeps a decimal point or exponent, both valid Python.
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("bell"), "\"bell\"");
        assert_eq!(string_literal("a\"b"), "\"a\\\"b\"");
    }

    #[test]
    fn test_string_literal_escapes_control_characters() {
        assert_eq!(string_literal("a\r\nb"), r#""a\r\nb""#);
        assert_eq!(string_literal("tab\there"), r#""tab\there""#);
        assert_eq!(string_literal("nul\0bell\u{7}"), r#""nul\x00bell\x07""#);
        assert_eq!(string_literal("del\u{7f}"), r#""del\x7f""#);
        assert_eq!(string_literal("qubit π"), "\"qubit π\"");
    }

    #[test]
    fn test_float_literal() {
        assert_eq!(float_literal(1.0), "1.0");
        assert_eq!(float_literal(0.5), "0.5");
        assert_eq!(float_literal(-0.25), "-0.25");
    }
}
