//! Chat message sanitization
//!
//! Trims leading and trailing whitespace from the content of every
//! non-system message before the request is forwarded upstream.

use serde_json::Value;
use tracing::info;

/// Role whose messages are forwarded untouched
const SYSTEM_ROLE: &str = "system";

/// Characters stripped from message edges: Unicode whitespace
/// (which includes U+00A0 no-break space) plus the U+FEFF byte-order mark.
/// U+0085 (NEL) is content, not whitespace, and is kept.
fn is_trimmable(c: char) -> bool {
    (c.is_whitespace() && c != '\u{0085}') || c == '\u{FEFF}'
}

/// Trim whitespace, no-break spaces and BOMs from both ends of `content`
pub fn trim_content(content: &str) -> &str {
    content.trim_matches(is_trimmable)
}

/// Return a copy of `body` with non-system message content trimmed
///
/// Bodies without a `messages` array, entries that are not objects and
/// contents that are not strings are passed through unchanged.
pub fn sanitize_body(body: &Value) -> Value {
    let mut sanitized = body.clone();

    let Some(messages) = sanitized.get_mut("messages").and_then(Value::as_array_mut) else {
        return sanitized;
    };

    for message in messages.iter_mut() {
        let Some(message) = message.as_object_mut() else {
            continue;
        };
        if message.get("role").and_then(Value::as_str) == Some(SYSTEM_ROLE) {
            continue;
        }
        if let Some(Value::String(content)) = message.get_mut("content") {
            let trimmed = trim_content(content).to_string();
            if trimmed.len() != content.len() {
                *content = trimmed;
            }
        }
    }

    info!(
        messages = %serde_json::to_string_pretty(&*messages).unwrap_or_default(),
        "Processed messages"
    );

    sanitized
}
