use serde::de::IgnoredAny;

const JSON_MIME: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `inferred` is set when the mime type did not declare JSON.
    Json { inferred: bool },
    Plain,
}

/// True when the declared mime type names JSON.
///
/// The check runs against the trimmed, lowercased mime string so parameters
/// such as `; charset=utf-8` or vendor casing do not hide the token.
pub fn declares_json(mime_type: &str) -> bool {
    mime_type.trim().to_lowercase().contains(JSON_MIME)
}

/// True when `text` is one complete JSON value with nothing trailing it.
pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<IgnoredAny>(text).is_ok()
}

/// Decide how a body should be rendered.
///
/// A JSON mime type or a body that parses makes the body a JSON candidate. A
/// candidate that does not parse falls back to plain text, whatever its mime
/// type claims.
pub fn classify(mime_type: &str, text: &str) -> BodyKind {
    let declared = declares_json(mime_type);
    let valid = is_valid_json(text);

    if !(declared || valid) {
        return BodyKind::Plain;
    }
    if !valid {
        log::warn!("Body declared as {mime_type:?} is not valid JSON, rendering as text");
        return BodyKind::Plain;
    }

    BodyKind::Json {
        inferred: !declared,
    }
}

pub fn is_json(mime_type: &str, text: &str) -> bool {
    matches!(classify(mime_type, text), BodyKind::Json { .. })
}
