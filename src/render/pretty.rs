//! Block-style text for structured payload values.
//!
//! Nested JSON reads poorly in a terminal, so expanded sections print values
//! as indented `key: value` blocks with `- ` list markers instead.

use std::fmt::{self, Write};

use serde_json::Value;

const INDENT: &str = "  ";

/// Render `value` as block text, falling back to pretty JSON.
pub fn structured(value: &Value) -> String {
    match block(value) {
        Ok(text) => text,
        Err(_) => serde_json::to_string_pretty(value)
            .unwrap_or_else(|err| format!("<unprintable value: {err}>")),
    }
}

/// Decode a payload field that may carry structured data.
///
/// Strings that look like JSON documents are parsed; other values are
/// returned as they are.
pub fn decode_structured(value: &Value) -> Result<Value, serde_json::Error> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                serde_json::from_str(trimmed)
            } else {
                Ok(value.clone())
            }
        }
        other => Ok(other.clone()),
    }
}

/// Block text for `value`, one trailing newline included.
pub fn block(value: &Value) -> Result<String, fmt::Error> {
    let mut out = String::new();
    match value {
        Value::Object(map) if !map.is_empty() => write_map(&mut out, map, 0)?,
        Value::Array(items) if !items.is_empty() => write_seq(&mut out, items, 0)?,
        scalar => {
            write_scalar(&mut out, scalar, 0)?;
            out.push('\n');
        }
    }
    Ok(out)
}

fn write_map(
    out: &mut String,
    map: &serde_json::Map<String, Value>,
    depth: usize,
) -> fmt::Result {
    for (key, value) in map {
        indent(out, depth);
        write_key(out, key)?;
        write_nested(out, value, depth)?;
    }
    Ok(())
}

fn write_seq(out: &mut String, items: &[Value], depth: usize) -> fmt::Result {
    for item in items {
        indent(out, depth);
        match item {
            Value::Object(map) if !map.is_empty() => {
                // First key shares the line with the list marker.
                out.push_str("- ");
                let mut entries = map.iter();
                if let Some((key, value)) = entries.next() {
                    write_key(out, key)?;
                    write_nested(out, value, depth + 1)?;
                }
                for (key, value) in entries {
                    indent(out, depth + 1);
                    write_key(out, key)?;
                    write_nested(out, value, depth + 1)?;
                }
            }
            Value::Array(inner) if !inner.is_empty() => {
                out.push_str("-\n");
                write_seq(out, inner, depth + 1)?;
            }
            scalar => {
                out.push_str("- ");
                write_scalar(out, scalar, depth + 1)?;
                out.push('\n');
            }
        }
    }
    Ok(())
}

/// Value after a `key:` that is already on the line.
fn write_nested(out: &mut String, value: &Value, depth: usize) -> fmt::Result {
    match value {
        Value::Object(map) if !map.is_empty() => {
            out.push('\n');
            write_map(out, map, depth + 1)
        }
        Value::Array(items) if !items.is_empty() => {
            out.push('\n');
            write_seq(out, items, depth + 1)
        }
        scalar => {
            out.push(' ');
            write_scalar(out, scalar, depth + 1)?;
            out.push('\n');
            Ok(())
        }
    }
}

fn write_scalar(out: &mut String, value: &Value, depth: usize) -> fmt::Result {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => write!(out, "{b}")?,
        Value::Number(n) => write!(out, "{n}")?,
        Value::String(s) if s.contains('\n') => {
            out.push('|');
            for line in s.lines() {
                out.push('\n');
                indent(out, depth);
                out.push_str(line);
            }
        }
        Value::String(s) => write_text(out, s)?,
        Value::Array(_) => out.push_str("[]"),
        Value::Object(_) => out.push_str("{}"),
    }
    Ok(())
}

fn write_key(out: &mut String, key: &str) -> fmt::Result {
    write_text(out, key)?;
    out.push(':');
    Ok(())
}

/// Plain text when it reads back as the same string, double-quoted otherwise.
fn write_text(out: &mut String, text: &str) -> fmt::Result {
    if needs_quotes(text) {
        let quoted = serde_json::to_string(text).map_err(|_| fmt::Error)?;
        out.push_str(&quoted);
    } else {
        out.push_str(text);
    }
    Ok(())
}

/// Whether `text` would be misread as another scalar or as block syntax.
fn needs_quotes(text: &str) -> bool {
    const KEYWORDS: [&str; 9] = ["null", "~", "true", "false", "yes", "no", "on", "off", "y"];
    const LEADING: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%',
        '@', '`',
    ];

    if text.is_empty() || text.trim() != text {
        return true;
    }
    let lower = text.to_ascii_lowercase();
    if KEYWORDS.contains(&lower.as_str()) || text.parse::<f64>().is_ok() {
        return true;
    }
    text.starts_with(LEADING)
        || text.ends_with(':')
        || text.contains(": ")
        || text.contains(" #")
        || text.chars().any(char::is_control)
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_are_indented() {
        let text = structured(&json!({"usage": {"total_tokens": 12}}));
        assert_eq!(text, "usage:\n  total_tokens: 12\n");
    }

    #[test]
    fn message_lists_render_as_blocks() {
        let text = structured(&json!([
            {"role": "system", "content": "be brief"},
            {"role": "user", "content": "hi"}
        ]));
        assert_eq!(
            text,
            "- content: be brief\n  role: system\n- content: hi\n  role: user\n"
        );
    }

    #[test]
    fn multiline_strings_use_literal_blocks() {
        let text = structured(&json!({"content": "a\nb"}));
        assert_eq!(text, "content: |\n  a\n  b\n");
    }

    #[test]
    fn empty_containers_and_scalars() {
        assert_eq!(structured(&json!({})), "{}\n");
        assert_eq!(structured(&json!({"tags": []})), "tags: []\n");
        assert_eq!(structured(&json!(null)), "null\n");
    }

    #[test]
    fn strings_that_read_as_other_scalars_are_quoted() {
        assert_ne!(
            structured(&json!({"content": "null"})),
            structured(&json!({"content": null}))
        );
        assert_eq!(structured(&json!({"content": "null"})), "content: \"null\"\n");
        assert_eq!(structured(&json!({"flag": "true"})), "flag: \"true\"\n");
        assert_eq!(structured(&json!({"n": "42"})), "n: \"42\"\n");
        assert_eq!(structured(&json!({"n": 42})), "n: 42\n");
        assert_eq!(structured(&json!(["", " padded"])), "- \"\"\n- \" padded\"\n");
    }

    #[test]
    fn block_syntax_in_keys_and_values_is_quoted() {
        assert_eq!(
            structured(&json!({"a: b": "- item"})),
            "\"a: b\": \"- item\"\n"
        );
        assert_eq!(
            structured(&json!({"note": "see #3: done"})),
            "note: \"see #3: done\"\n"
        );
        assert_eq!(structured(&json!({"role": "user"})), "role: user\n");
    }

    #[test]
    fn decode_structured_parses_json_text() {
        let decoded = decode_structured(&json!("[{\"role\":\"user\"}]")).unwrap();
        assert_eq!(decoded, json!([{"role": "user"}]));
    }

    #[test]
    fn decode_structured_keeps_plain_text() {
        let decoded = decode_structured(&json!("just words")).unwrap();
        assert_eq!(decoded, json!("just words"));
    }

    #[test]
    fn decode_structured_reports_broken_json_text() {
        assert!(decode_structured(&json!("{not json")).is_err());
    }
}
