//! Error types for response extraction.
//!
//! The dispatcher never returns these: every extractor converts a
//! [`ParseError`] into "no result" at its boundary and logs it. They surface
//! only through the typed helpers such as
//! [`ParsedResult::parse_data_as`](crate::types::ParsedResult::parse_data_as).

/// Errors produced while turning a candidate span into JSON.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// `serde_json` rejected the candidate.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// No strategy could find the expected format in the text.
    #[error("could not parse {expected_format} from LLM response: {text}")]
    Unparseable {
        /// The format the extractor was looking for.
        expected_format: &'static str,
        /// A truncated copy of the offending text (max 200 chars).
        text: String,
    },

    /// The candidate parsed, but to a scalar where an object or array was required.
    #[error("expected a JSON object or array, found {found}")]
    NotAContainer {
        /// JSON type name of the value that was found.
        found: &'static str,
    },

    /// Recovered data failed to deserialize into the caller's type.
    #[error("JSON deserialization failed: {reason}")]
    DeserializationFailed {
        /// The serde error message.
        reason: String,
        /// The JSON that failed deserialization (max 200 chars).
        raw_json: String,
    },
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Maximum characters of input echoed back in errors and log events.
pub(crate) const PREVIEW_LEN: usize = 200;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// JSON type name, for error messages.
pub(crate) fn kind_label(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_input_unchanged() {
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "ééééé";
        assert_eq!(truncate(s, 2), "éé...");
    }

    #[test]
    fn not_a_container_message() {
        let err = ParseError::NotAContainer {
            found: kind_label(&serde_json::json!(42)),
        };
        assert_eq!(err.to_string(), "expected a JSON object or array, found number");
    }
}
