//! # Response Parser
//!
//! Recovers structured tool-call data from raw LLM responses: pseudo-XML
//! function calls, native tool-call envelopes, fenced JSON, and bare or
//! truncated JSON arrays embedded in prose.
//!
//! ## Extractors
//!
//! | Function | Recognizes |
//! |----------|------------|
//! | [`parse_structured_response`] | Any of the below, routed by provider |
//! | [`parse_anthropic_xml_response`] | `<function_calls><invoke><parameter>` |
//! | [`parse_direct_function_tags`] | `<fn_name>JSON</fn_name>` |
//! | [`parse_openai_json_response`] | Chat-Completions and Responses tool calls |
//! | [`parse_json_array_from_text`] | Bare JSON arrays, with salvage |
//! | [`parse_markdown_fenced_json`] | Triple-backtick JSON blocks |
//!
//! ## Shared Utilities
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`scan::find_balanced`] | Matching-bracket scan aware of string literals |
//! | [`text::response_text`] | Text blob of a provider payload |
//! | [`text::strip_think_tags`] | Remove leading `<think>` reasoning blocks |
//! | [`repair::try_repair_json`] | Fix common LLM JSON errors |

use std::borrow::Cow;

use serde_json::Value;

use crate::config::ParserConfig;
use crate::diagnostics::ParseDiagnostics;
use crate::types::{LlmResponse, ParsedResult, ProviderHint};

mod anthropic;
mod context;
pub mod error;
pub mod json_array;
pub mod markdown;
pub mod openai;
pub mod repair;
pub mod scan;
pub mod strategy;
pub mod text;
pub mod xml;

use context::Ctx;

pub use error::ParseError;
pub use json_array::parse_json_array_from_text;
pub use markdown::parse_markdown_fenced_json;
pub use openai::parse_openai_json_response;
pub use strategy::{Strategy, StrategyChain};
pub use xml::{parse_anthropic_xml_response, parse_direct_function_tags};

/// Entry point for turning an [`LlmResponse`] into [`ParsedResult`]s.
///
/// Stateless apart from its configuration, so one parser can be shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct ResponseParser {
    config: ParserConfig,
}

impl ResponseParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a response, routing by `hint`.
    ///
    /// `hint` accepts a [`ProviderHint`] or a provider name (`"Anthropic"`,
    /// `"openai"`, `""` for auto-detection). Never fails: an empty vector
    /// means nothing could be recovered, including when the response itself
    /// reports failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use llm_response_parser::{LlmResponse, ResponseParser};
    ///
    /// let text = "<function_calls>\n<invoke name=\"f\">\n\
    ///     <parameter name=\"sequence_data\">[{\"note\":60}]</parameter>\n\
    ///     <parameter name=\"description\">test</parameter>\n\
    ///     </invoke>\n</function_calls>";
    /// let response = LlmResponse::ok(text);
    ///
    /// let parser = ResponseParser::default();
    /// let hinted = parser.parse(&response, "Anthropic", "f");
    /// assert_eq!(hinted[0].description(), "test");
    /// assert_eq!(hinted, parser.parse(&response, "", "f"));
    /// ```
    pub fn parse(
        &self,
        response: &LlmResponse,
        hint: impl Into<ProviderHint>,
        function_name: &str,
    ) -> Vec<ParsedResult> {
        self.parse_with_diagnostics(response, hint, function_name).0
    }

    /// [`parse`](Self::parse), plus a record of how the results were found.
    pub fn parse_with_diagnostics(
        &self,
        response: &LlmResponse,
        hint: impl Into<ProviderHint>,
        function_name: &str,
    ) -> (Vec<ParsedResult>, ParseDiagnostics) {
        let mut diagnostics = ParseDiagnostics::default();
        if !response.success {
            tracing::debug!(error = %response.error_message, "not parsing failed response");
            return (Vec::new(), diagnostics);
        }

        let text = self.text_of(&response.result);
        let detected = detect_provider(&response.result, &text);
        let primary = match hint.into() {
            ProviderHint::Unknown => {
                diagnostics.auto_detected = true;
                detected
            }
            hinted => hinted,
        };

        let mut provider = primary;
        let mut ctx = Ctx::new(&self.config, Some(function_name), &mut diagnostics);
        let mut results = StrategyChain::for_provider(primary).run(&response.result, &text, &mut ctx);

        if results.is_empty() && detected != primary {
            tracing::debug!(
                hinted = %primary,
                detected = %detected,
                "hinted provider found nothing, trying detected provider"
            );
            provider = detected;
            results = StrategyChain::for_provider(detected).run(&response.result, &text, &mut ctx);
        }

        diagnostics.provider = provider;
        (results, diagnostics)
    }

    /// Run a caller-supplied chain instead of a provider's built-in one.
    ///
    /// ```
    /// use llm_response_parser::{LlmResponse, ResponseParser, Strategy, StrategyChain};
    ///
    /// let chain = StrategyChain::new([Strategy::JsonArrayText]);
    /// let response = LlmResponse::ok("values: [1, 2, 3]");
    /// let (results, diag) = ResponseParser::default().parse_with_chain(&response, &chain, "");
    /// assert_eq!(results.len(), 1);
    /// assert_eq!(diag.strategy, Some(Strategy::JsonArrayText));
    /// ```
    pub fn parse_with_chain(
        &self,
        response: &LlmResponse,
        chain: &StrategyChain,
        function_name: &str,
    ) -> (Vec<ParsedResult>, ParseDiagnostics) {
        let mut diagnostics = ParseDiagnostics::default();
        if !response.success {
            return (Vec::new(), diagnostics);
        }

        let text = self.text_of(&response.result);
        let results = chain.run(
            &response.result,
            &text,
            &mut Ctx::new(&self.config, Some(function_name), &mut diagnostics),
        );
        (results, diagnostics)
    }

    fn text_of<'a>(&self, result: &'a Value) -> Cow<'a, str> {
        let text = text::response_text(result);
        if !self.config.strip_think_tags {
            return text;
        }
        match text {
            Cow::Borrowed(s) => Cow::Borrowed(text::strip_think_tags(s)),
            Cow::Owned(s) => Cow::Owned(text::strip_think_tags(&s).to_string()),
        }
    }
}

/// Guess the provider from the payload shape, then from the text.
fn detect_provider(result: &Value, text: &str) -> ProviderHint {
    if openai::has_function_calls(result) {
        ProviderHint::OpenAi
    } else if anthropic::has_tool_use_blocks(result) || text::contains_xml_tool_markup(text) {
        ProviderHint::Anthropic
    } else {
        ProviderHint::OpenAi
    }
}

/// Parse with the default configuration, resolving the provider from its name.
///
/// `provider_name` is matched case-insensitively; an empty or unknown name
/// auto-detects. `function_name` does not filter by default.
pub fn parse_structured_response(
    response: &LlmResponse,
    provider_name: &str,
    function_name: &str,
) -> Vec<ParsedResult> {
    ResponseParser::default().parse(response, provider_name, function_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Source;
    use serde_json::json;

    const SCENARIO: &str = "<function_calls>\n<invoke name=\"f\">\n<parameter name=\"sequence_data\">[{\"note\":60,\"start\":0.0,\"duration\":1.0,\"velocity\":90}]</parameter>\n<parameter name=\"description\">test</parameter>\n</invoke>\n</function_calls>";

    #[test]
    fn anthropic_hint_scenario() {
        let results = parse_structured_response(&LlmResponse::ok(SCENARIO), "Anthropic", "");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].description(), "test");
        assert_eq!(results[0].source(), Source::AnthropicXml);
        assert_eq!(
            results[0].data()["sequence_data"],
            json!([{"note": 60, "start": 0.0, "duration": 1.0, "velocity": 90}])
        );
    }

    #[test]
    fn empty_hint_matches_explicit_hint() {
        let response = LlmResponse::ok(SCENARIO);
        assert_eq!(
            parse_structured_response(&response, "", ""),
            parse_structured_response(&response, "Anthropic", "")
        );
        assert_eq!(
            parse_structured_response(&response, "bogus", ""),
            parse_structured_response(&response, "ANTHROPIC", "")
        );
    }

    #[test]
    fn text_field_payload() {
        let response = LlmResponse::ok(json!({"text": SCENARIO}));
        assert_eq!(parse_structured_response(&response, "", "").len(), 1);
    }

    #[test]
    fn failed_response_is_empty() {
        let mut response = LlmResponse::failure("rate limited");
        response.result = json!(SCENARIO);
        let (results, diag) = ResponseParser::default().parse_with_diagnostics(&response, "Anthropic", "");
        assert!(results.is_empty());
        assert!(diag.attempted.is_empty());
    }

    #[test]
    fn parsing_is_idempotent() {
        let parser = ResponseParser::default();
        for text in [SCENARIO, r#"[{"a":1},{"b":"#, "```json\n{\"k\": 1}\n```", "nothing"] {
            let response = LlmResponse::ok(text);
            assert_eq!(parser.parse(&response, "", ""), parser.parse(&response, "", ""));
        }
    }

    #[test]
    fn shared_across_threads() {
        let parser = ResponseParser::default();
        let response = LlmResponse::ok(SCENARIO);
        let expected = parser.parse(&response, "", "");
        let (parser, response) = (&parser, &response);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(move || parser.parse(response, "", "")))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn openai_tool_calls_auto_detected() {
        let response = LlmResponse::ok(json!({"choices": [{"message": {
            "content": null,
            "tool_calls": [{"function": {"name": "f", "arguments": "{\"x\": [1]}"}}]
        }}]}));
        let (results, diag) = ResponseParser::default().parse_with_diagnostics(&response, "", "");
        assert_eq!(results[0].source(), Source::OpenAiToolCall);
        assert_eq!(diag.provider, ProviderHint::OpenAi);
        assert!(diag.auto_detected);
    }

    #[test]
    fn anthropic_tool_use_auto_detected() {
        let response = LlmResponse::ok(json!({"content": [
            {"type": "text", "text": "ok"},
            {"type": "tool_use", "id": "t1", "name": "f", "input": {"x": 1}}
        ]}));
        let (results, diag) = ResponseParser::default().parse_with_diagnostics(&response, "", "");
        assert_eq!(results[0].source(), Source::AnthropicToolUse);
        assert_eq!(diag.strategy, Some(Strategy::AnthropicToolUse));
    }

    #[test]
    fn xml_inside_chat_content() {
        let response = LlmResponse::ok(json!({"choices": [{"message": {"content": SCENARIO}}]}));
        let results = parse_structured_response(&response, "", "");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].description(), "test");
    }

    #[test]
    fn wrong_hint_falls_back_to_detected_provider() {
        let (results, diag) = ResponseParser::default()
            .parse_with_diagnostics(&LlmResponse::ok("Sure. {\"note\": 60}"), "OpenAI", "");
        assert!(results.is_empty());
        assert_eq!(diag.provider, ProviderHint::OpenAi);

        let response = LlmResponse::ok(json!({"choices": [{"message": {
            "tool_calls": [{"function": {"name": "f", "arguments": "{\"x\": 1}"}}]
        }}]}));
        let (results, diag) = ResponseParser::default().parse_with_diagnostics(&response, "anthropic", "");
        assert_eq!(results[0].source(), Source::OpenAiToolCall);
        assert_eq!(diag.provider, ProviderHint::OpenAi);
        assert!(!diag.auto_detected);
    }

    #[test]
    fn fenced_object_recovered_after_anthropic_chain() {
        let response = LlmResponse::ok("```json\n{\"bpm\": 120}\n```");
        let (results, diag) = ResponseParser::default().parse_with_diagnostics(&response, "Anthropic", "");
        assert_eq!(results[0].source(), Source::MarkdownFenced);
        assert_eq!(diag.provider, ProviderHint::OpenAi);
    }

    #[test]
    fn think_stripping_is_opt_in() {
        let response = LlmResponse::ok("<think>maybe [1, 2]?</think>Final: [3, 4]");
        assert_eq!(parse_structured_response(&response, "", "")[0].data(), &json!([1, 2]));

        let strip = ResponseParser::new(ParserConfig::default().with_think_stripping(true));
        assert!(strip.config().strip_think_tags);
        assert_eq!(strip.parse(&response, "", "")[0].data(), &json!([3, 4]));
    }

    #[test]
    fn think_tag_inside_json_string_survives() {
        let response = LlmResponse::ok(r#"[{"tip": "use <think>x</think> tags"}]"#);
        let expected = json!([{"tip": "use <think>x</think> tags"}]);
        assert_eq!(parse_structured_response(&response, "", "")[0].data(), &expected);

        let strip = ResponseParser::new(ParserConfig::default().with_think_stripping(true));
        assert_eq!(strip.parse(&response, "", "")[0].data(), &expected);
    }

    #[test]
    fn unclosed_think_tag_does_not_drop_data() {
        let response = LlmResponse::ok(r#"Result: [{"tip": "wrap reasoning in <think> tags"}, {"b": 2}]"#);
        let expected = json!([{"tip": "wrap reasoning in <think> tags"}, {"b": 2}]);
        assert_eq!(parse_structured_response(&response, "", "")[0].data(), &expected);

        let strip = ResponseParser::new(ParserConfig::default().with_think_stripping(true));
        assert_eq!(strip.parse(&response, "", "")[0].data(), &expected);
    }

    #[test]
    fn think_tag_inside_parameter_body_survives() {
        let text = "<function_calls>\n<invoke name=\"f\">\n<parameter name=\"p\">say <think> first</parameter>\n</invoke>\n</function_calls>";
        let response = LlmResponse::ok(text);
        let results = parse_structured_response(&response, "Anthropic", "");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].data()["p"], "say <think> first");

        let strip = ResponseParser::new(ParserConfig::default().with_think_stripping(true));
        assert_eq!(strip.parse(&response, "Anthropic", ""), results);
    }

    #[test]
    fn function_name_accepts_all_by_default() {
        let text = "<function_calls>\
            <invoke name=\"a\"><parameter name=\"n\">1</parameter></invoke>\
            <invoke name=\"b\"><parameter name=\"n\">2</parameter></invoke>\
            </function_calls>";
        let response = LlmResponse::ok(text);
        assert_eq!(parse_structured_response(&response, "", "a").len(), 2);

        let filtered = ResponseParser::new(ParserConfig::default().with_function_filter(true));
        let results = filtered.parse(&response, ProviderHint::Anthropic, "a");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].data()["n"], 1);
    }

    #[test]
    fn truncated_array_diagnostics() {
        let (results, diag) = ResponseParser::default()
            .parse_with_diagnostics(&LlmResponse::ok(r#"[{"a":1},{"b":2},{"c":"#), "", "");
        assert_eq!(results[0].data(), &json!([{"a": 1}, {"b": 2}]));
        assert_eq!(diag.salvaged_objects, 2);
        assert_eq!(diag.strategy, Some(Strategy::JsonArrayText));
    }

    #[test]
    fn direct_function_tag_needs_name() {
        let response = LlmResponse::ok("<add_notes>{\"note\": 60}</add_notes>");
        let results = parse_structured_response(&response, "Anthropic", "add_notes");
        assert_eq!(results[0].source(), Source::DirectFunctionTag);
        assert!(parse_structured_response(&response, "Anthropic", "").is_empty());
    }
}
