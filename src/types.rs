use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::response_parser::error::{truncate, ParseError, PREVIEW_LEN};

/// Which extraction strategy produced a [`ParsedResult`].
///
/// Carried for tracing and debugging only; nothing downstream branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Pseudo-XML tool call reached through the provider dispatcher.
    AnthropicXml,
    /// Pseudo-XML tool call parsed directly.
    XmlFunctionCall,
    /// `<fn_name>JSON</fn_name>` tag named after the expected function.
    DirectFunctionTag,
    /// Native `tool_use` content block from the Messages API.
    AnthropicToolUse,
    /// A triple-backtick fenced JSON block.
    MarkdownFenced,
    /// A bare (possibly salvaged) JSON array found in prose.
    JsonArrayText,
    /// Chat-Completions `tool_calls[].function.arguments`.
    OpenAiToolCall,
    /// Responses-API `function_calls[].arguments`.
    OpenAiFunctionCall,
}

impl Source {
    /// Stable string tag for this source.
    pub fn as_str(self) -> &'static str {
        match self {
            Source::AnthropicXml => "anthropic_xml",
            Source::XmlFunctionCall => "xml_function_call",
            Source::DirectFunctionTag => "direct_function_tag",
            Source::AnthropicToolUse => "anthropic_tool_use",
            Source::MarkdownFenced => "markdown_fenced",
            Source::JsonArrayText => "json_array_text",
            Source::OpenAiToolCall => "openai_tool_call",
            Source::OpenAiFunctionCall => "openai_function_call",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Source {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One piece of structured data recovered from an LLM response.
///
/// Immutable once built: fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedResult {
    description: String,
    data: Value,
    source: Source,
}

impl ParsedResult {
    pub(crate) fn new(description: impl Into<String>, data: Value, source: Source) -> Self {
        Self {
            description: description.into(),
            data,
            source,
        }
    }

    /// Free-text label from a `description` parameter or field, or `""`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The recovered JSON payload.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Which strategy produced this result.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Consume the result, keeping only its payload.
    pub fn into_data(self) -> Value {
        self.data
    }

    /// Deserialize the payload into a typed `T`.
    ///
    /// ```
    /// use llm_response_parser::{parse_json_array_from_text, ParsedResult};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Note { note: u8 }
    ///
    /// let results = parse_json_array_from_text(r#"[{"note": 60}, {"note": 64}]"#);
    /// let notes: Vec<Note> = results[0].parse_data_as().unwrap();
    /// assert_eq!(notes[1].note, 64);
    /// ```
    pub fn parse_data_as<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        T::deserialize(&self.data).map_err(|e| ParseError::DeserializationFailed {
            reason: e.to_string(),
            raw_json: truncate(&self.data.to_string(), PREVIEW_LEN),
        })
    }
}

/// Token counters reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmUsage {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// A completed provider call, as handed over by the client layer.
///
/// The parser reads `success` and `result` only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Provider payload: a bare string, an object with a `text` field, or a
    /// provider envelope (`choices`, `function_calls`, `content` blocks).
    #[serde(default)]
    pub result: Value,

    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub error_message: String,

    /// Provider response id, for conversation continuity.
    #[serde(default)]
    pub response_id: String,

    #[serde(default)]
    pub usage: LlmUsage,
}

impl LlmResponse {
    /// A successful response carrying `result`.
    pub fn ok(result: impl Into<Value>) -> Self {
        Self {
            result: result.into(),
            success: true,
            ..Default::default()
        }
    }

    /// A failed response carrying an error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error_message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_usage(mut self, usage: LlmUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_response_id(mut self, id: impl Into<String>) -> Self {
        self.response_id = id.into();
        self
    }
}

/// Which vendor produced the text, resolved once from the caller's string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProviderHint {
    Anthropic,
    OpenAi,
    #[default]
    Unknown,
}

impl ProviderHint {
    /// Resolve a provider name. Case-insensitive; anything unrecognized,
    /// including the empty string, is [`ProviderHint::Unknown`].
    ///
    /// ```
    /// use llm_response_parser::ProviderHint;
    ///
    /// assert_eq!(ProviderHint::from_name("Anthropic"), ProviderHint::Anthropic);
    /// assert_eq!(ProviderHint::from_name(" OPENAI "), ProviderHint::OpenAi);
    /// assert_eq!(ProviderHint::from_name(""), ProviderHint::Unknown);
    /// ```
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("anthropic") {
            ProviderHint::Anthropic
        } else if name.eq_ignore_ascii_case("openai") {
            ProviderHint::OpenAi
        } else {
            ProviderHint::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderHint::Anthropic => "anthropic",
            ProviderHint::OpenAi => "openai",
            ProviderHint::Unknown => "unknown",
        }
    }
}

impl From<&str> for ProviderHint {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl FromStr for ProviderHint {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for ProviderHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
