use crate::classify::{classify, BodyKind};
use crate::decorate::{Decorator, Role};
use crate::har::{Content, PostData, PostParameter};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use std::borrow::Cow;

pub const JSON_INDENT: usize = 2;

const INFERRED_JSON: &str = " (inferred application/json)";

/// Prefix every line of `text`, blank ones included, with `spaces` spaces.
pub fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.split('\n')
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty-print `value` with two spaces per level, keeping key order.
pub fn pretty_json(value: &Value, decorator: &dyn Decorator) -> String {
    let mut out = String::new();
    write_json(&mut out, value, 0, decorator);
    out
}

fn write_json(out: &mut String, value: &Value, depth: usize, decorator: &dyn Decorator) {
    match value {
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (index, item) in items.iter().enumerate() {
                out.push_str(&" ".repeat((depth + 1) * JSON_INDENT));
                write_json(out, item, depth + 1, decorator);
                if index + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&" ".repeat(depth * JSON_INDENT));
            out.push(']');
        }
        Value::Object(map) => {
            out.push_str("{\n");
            for (index, (key, item)) in map.iter().enumerate() {
                out.push_str(&" ".repeat((depth + 1) * JSON_INDENT));
                out.push_str(&decorator.paint(Role::Key, &Value::from(key.as_str()).to_string()));
                out.push_str(": ");
                write_json(out, item, depth + 1, decorator);
                if index + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&" ".repeat(depth * JSON_INDENT));
            out.push('}');
        }
        Value::Number(_) | Value::Bool(_) => {
            out.push_str(&decorator.paint(Role::Scalar, &value.to_string()))
        }
        Value::String(_) | Value::Null => {
            out.push_str(&decorator.paint(Role::Text, &value.to_string()))
        }
    }
}

/// Parse a body the classifier accepted as JSON. Returns the value and whether
/// the JSON type was inferred rather than declared.
fn parse_json_body(mime_type: &str, text: &str) -> Option<(Value, bool)> {
    let BodyKind::Json { inferred } = classify(mime_type, text) else {
        return None;
    };

    match serde_json::from_str::<Value>(text) {
        Ok(value) => Some((value, inferred)),
        Err(e) => {
            log::error!("Failed to parse JSON body, rendering as text: {e}");
            None
        }
    }
}

fn mime_line(mime_type: &str, inferred: bool, decorator: &dyn Decorator) -> String {
    let mut line = decorator.paint(Role::Label, "Mime Type: ") + &decorator.value(mime_type);
    if inferred {
        line += &decorator.paint(Role::Label, INFERRED_JSON);
    }
    line
}

fn field_line(label: &str, value: &str, decorator: &dyn Decorator) -> String {
    decorator.paint(Role::Label, &format!("{label}: ")) + &decorator.value(value)
}

/// Render request post data: mime type, body, then any form parameters.
pub fn format_post_body(post: &PostData, decorator: &dyn Decorator) -> String {
    let mut output = match parse_json_body(&post.mime_type, &post.text) {
        Some((value, inferred)) => {
            mime_line(&post.mime_type, inferred, decorator)
                + "\n"
                + &pretty_json(&value, decorator)
        }
        None if post.text.is_empty() => mime_line(&post.mime_type, false, decorator),
        None => mime_line(&post.mime_type, false, decorator) + "\n" + &post.text,
    };

    if !post.params.is_empty() {
        output += "\n";
        output += &decorator.paint(Role::Heading, "Parameters:");
        for param in &post.params {
            output += "\n";
            output += &indent(&format_parameter(param, decorator), 2);
        }
    }

    output
}

fn format_parameter(param: &PostParameter, decorator: &dyn Decorator) -> String {
    let value = match &param.value {
        Some(value) => decorator.value(value),
        None => decorator.paint(Role::Marker, "[no value]"),
    };
    let mut lines = vec![format!(
        "{} = {value}",
        decorator.paint(Role::Label, &param.name)
    )];

    let details = [
        ("Content Type", &param.content_type),
        ("File Name", &param.file_name),
        ("Comment", &param.comment),
    ];
    for (label, detail) in details {
        if let Some(detail) = detail {
            lines.push(indent(&field_line(label, detail, decorator), 2));
        }
    }

    lines.join("\n")
}

enum ContentText<'a> {
    Absent,
    Text(Cow<'a, str>),
    Binary(usize),
}

/// The content text to show, base64-decoded when the archive says it is encoded.
fn content_text(content: &Content) -> ContentText<'_> {
    let Some(text) = &content.text else {
        return ContentText::Absent;
    };

    let is_base64 = content
        .encoding
        .as_deref()
        .is_some_and(|encoding| encoding.eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return ContentText::Text(Cow::Borrowed(text));
    }

    match STANDARD.decode(text.trim()) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(decoded) => ContentText::Text(Cow::Owned(decoded)),
            Err(e) => ContentText::Binary(e.as_bytes().len()),
        },
        Err(e) => {
            log::warn!("Failed to decode base64 content, showing it as recorded: {e}");
            ContentText::Text(Cow::Borrowed(text))
        }
    }
}

/// Render response content: size/encoding/compression, then the text.
///
/// JSON content additionally leads with its mime type. An unknown size is
/// left out.
pub fn format_content(content: &Content, decorator: &dyn Decorator) -> String {
    let mut details = Vec::new();
    if content.size >= 0 {
        details.push(field_line("Size", &content.size.to_string(), decorator));
    }
    if let Some(encoding) = &content.encoding {
        details.push(field_line("Encoding", encoding, decorator));
    }
    if let Some(compression) = content.compression {
        details.push(field_line("Compression", &compression.to_string(), decorator));
    }

    match content_text(content) {
        ContentText::Absent => details.push(decorator.paint(Role::Marker, "[no text]")),
        ContentText::Binary(len) => details.push(
            decorator.paint(Role::Marker, &format!("[binary content: {len} bytes]")),
        ),
        ContentText::Text(text) => match parse_json_body(&content.mime_type, &text) {
            Some((value, inferred)) => {
                details.insert(0, mime_line(&content.mime_type, inferred, decorator));
                details.push(pretty_json(&value, decorator));
            }
            None => details.push(text.into_owned()),
        },
    }

    details.join("\n")
}
