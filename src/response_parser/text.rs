//! Text normalization applied before any extractor runs.
//!
//! Everything here is total: it never fails and never allocates more than a
//! copy of its input.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Tags whose presence marks Anthropic-style pseudo-XML tool calls.
const XML_TOOL_MARKERS: &[&str] = &["<function_calls>", "<invoke", "<parameter"];

/// Reasoning block delimiters removed by [`strip_think_tags`].
const THINK_TAGS: &[(&str, &str)] = &[("<think>", "</think>"), ("<thinking>", "</thinking>")];

fn fence_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?i:json)?\s*").expect("fence marker regex is valid"))
}

/// Bracket shape of a text span: which pair encloses it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Array,
    Object,
    Other,
}

impl JsonShape {
    /// Classify `text` by its first and last non-whitespace characters.
    ///
    /// ```
    /// use llm_response_parser::response_parser::text::JsonShape;
    ///
    /// assert_eq!(JsonShape::of("  [1, 2]\n"), JsonShape::Array);
    /// assert_eq!(JsonShape::of("{\"a\": 1}"), JsonShape::Object);
    /// assert_eq!(JsonShape::of("[1, 2"), JsonShape::Other);
    /// assert_eq!(JsonShape::of("hello"), JsonShape::Other);
    /// ```
    pub fn of(text: &str) -> Self {
        let bytes = text.trim().as_bytes();
        match (bytes.first(), bytes.last()) {
            (Some(b'['), Some(b']')) if bytes.len() >= 2 => JsonShape::Array,
            (Some(b'{'), Some(b'}')) if bytes.len() >= 2 => JsonShape::Object,
            _ => JsonShape::Other,
        }
    }

    pub fn is_container(self) -> bool {
        !matches!(self, JsonShape::Other)
    }
}

/// Remove every ```` ``` ```` / ```` ```json ```` fence marker, keeping the
/// fenced content in place, then trim.
///
/// ```
/// use llm_response_parser::response_parser::text::strip_markdown_fences;
///
/// assert_eq!(strip_markdown_fences("```json\n[1]\n```"), "[1]");
/// ```
pub fn strip_markdown_fences(text: &str) -> String {
    fence_marker().replace_all(text, "").trim().to_string()
}

/// Drop `<think>...</think>` and `<thinking>...</thinking>` blocks that
/// open the text, before any answer content.
///
/// Tags further in are left alone: they may sit inside a JSON string or a
/// parameter body. A leading tag that never closes leaves the text as is.
///
/// ```
/// use llm_response_parser::response_parser::text::strip_think_tags;
///
/// assert_eq!(strip_think_tags("<think>reasoning</think>result"), "result");
/// assert_eq!(strip_think_tags("<thinking>also works</thinking>done"), "done");
/// assert_eq!(strip_think_tags("kept <think>inline</think>"), "kept <think>inline</think>");
/// assert_eq!(strip_think_tags("<think>no closing tag"), "<think>no closing tag");
/// ```
pub fn strip_think_tags(text: &str) -> &str {
    let mut rest = text;
    'blocks: loop {
        let trimmed = rest.trim_start();
        for (open, close) in THINK_TAGS {
            let Some(body) = trimmed.strip_prefix(open) else {
                continue;
            };
            if let Some(end) = body.find(close) {
                rest = &body[end + close.len()..];
                continue 'blocks;
            }
        }
        return rest;
    }
}

/// Whether the text carries pseudo-XML tool-call markup.
pub fn contains_xml_tool_markup(text: &str) -> bool {
    XML_TOOL_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Derive the single text blob the text-based extractors work on.
///
/// - bare string: itself
/// - object with a string `text` field: that field
/// - Chat-Completions envelope: `choices[0].message.content`
/// - Responses envelope with only `function_calls`: empty
/// - Messages envelope: the `text` blocks of `content`, newline-joined
/// - anything else: the compact JSON serialization
///
/// ```
/// use llm_response_parser::response_parser::text::response_text;
/// use serde_json::json;
///
/// assert_eq!(response_text(&json!("raw")), "raw");
/// assert_eq!(response_text(&json!({"text": "inner"})), "inner");
/// assert_eq!(response_text(&json!({"a": 1})), r#"{"a":1}"#);
/// ```
pub fn response_text(result: &Value) -> Cow<'_, str> {
    let map = match result {
        Value::String(s) => return Cow::Borrowed(s),
        Value::Object(map) => map,
        _ => return Cow::Owned(result.to_string()),
    };

    if let Some(Value::String(s)) = map.get("text") {
        return Cow::Borrowed(s);
    }
    if let Some(choices) = map.get("choices").and_then(Value::as_array) {
        return choices
            .first()
            .and_then(|choice| choice.pointer("/message/content"))
            .map(content_text)
            .unwrap_or_default();
    }
    if map.get("function_calls").is_some_and(Value::is_array) {
        return Cow::Borrowed("");
    }
    if let Some(blocks) = map.get("content").and_then(Value::as_array) {
        if is_content_block_list(blocks) {
            return Cow::Owned(join_text_blocks(blocks));
        }
    }
    Cow::Owned(result.to_string())
}

/// Chat message content: a plain string or a list of typed parts.
fn content_text(content: &Value) -> Cow<'_, str> {
    match content {
        Value::String(s) => Cow::Borrowed(s),
        Value::Array(parts) => Cow::Owned(join_text_blocks(parts)),
        _ => Cow::Borrowed(""),
    }
}

pub(crate) fn is_content_block_list(blocks: &[Value]) -> bool {
    !blocks.is_empty() && blocks.iter().all(|b| b.get("type").is_some_and(Value::is_string))
}

fn join_text_blocks(blocks: &[Value]) -> String {
    blocks
        .iter()
        .filter(|b| matches!(b.get("type").and_then(Value::as_str), Some("text" | "output_text")))
        .filter_map(|b| b.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}
