//! Extraction strategies and the ordered chains that run them.
//!
//! A [`StrategyChain`] tries each [`Strategy`] in turn; the first one that
//! returns a non-empty result sequence wins and the rest are not run.

use std::fmt;

use serde_json::Value;

use crate::response_parser::anthropic::extract_tool_use_blocks;
use crate::response_parser::context::Ctx;
use crate::response_parser::json_array::extract_json_array;
use crate::response_parser::openai::{extract_chat_tool_calls, extract_responses_function_calls};
use crate::response_parser::text::strip_markdown_fences;
use crate::response_parser::xml::{extract_direct_function_tag, extract_function_calls};
use crate::types::{ParsedResult, ProviderHint, Source};

/// One self-contained way of recovering results from a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Messages-API `tool_use` content blocks.
    AnthropicToolUse,
    /// `<function_calls>`/`<invoke>`/`<parameter>` pseudo-XML.
    XmlFunctionCalls,
    /// `<fn_name>JSON</fn_name>`; needs an expected function name.
    DirectFunctionTag,
    /// Chat-Completions `choices[0].message.tool_calls`.
    ChatToolCalls,
    /// Responses-API normalized `function_calls`.
    ResponsesFunctionCalls,
    /// Fenced blocks, then the first balanced array, then salvage.
    JsonArrayText,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::AnthropicToolUse => "anthropic_tool_use",
            Strategy::XmlFunctionCalls => "xml_function_calls",
            Strategy::DirectFunctionTag => "direct_function_tag",
            Strategy::ChatToolCalls => "chat_tool_calls",
            Strategy::ResponsesFunctionCalls => "responses_function_calls",
            Strategy::JsonArrayText => "json_array_text",
        }
    }

    /// Structured strategies read `result`; text strategies read `text`.
    pub(crate) fn run(self, result: &Value, text: &str, ctx: &mut Ctx<'_>) -> Vec<ParsedResult> {
        match self {
            Strategy::AnthropicToolUse => extract_tool_use_blocks(result, ctx),
            Strategy::XmlFunctionCalls => extract_function_calls(text, Source::AnthropicXml, ctx),
            Strategy::DirectFunctionTag => extract_direct_function_tag(text, ctx),
            Strategy::ChatToolCalls => extract_chat_tool_calls(result, ctx),
            Strategy::ResponsesFunctionCalls => extract_responses_function_calls(result, ctx),
            Strategy::JsonArrayText => extract_json_array(text, ctx),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered fallback policy: first non-empty result sequence wins.
///
/// ```
/// use llm_response_parser::{ProviderHint, Strategy, StrategyChain};
///
/// let chain = StrategyChain::for_provider(ProviderHint::OpenAi);
/// assert_eq!(
///     chain.strategies(),
///     &[Strategy::ChatToolCalls, Strategy::ResponsesFunctionCalls, Strategy::JsonArrayText]
/// );
///
/// let custom = StrategyChain::new([Strategy::XmlFunctionCalls]).with_fence_stripping(true);
/// assert!(custom.strips_fences());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyChain {
    strategies: Vec<Strategy>,
    strip_fences: bool,
}

impl StrategyChain {
    pub fn new(strategies: impl IntoIterator<Item = Strategy>) -> Self {
        Self {
            strategies: strategies.into_iter().collect(),
            strip_fences: false,
        }
    }

    /// The built-in chain for a provider. `Unknown` gets the OpenAI chain,
    /// whose last step is the generic JSON path.
    pub fn for_provider(provider: ProviderHint) -> Self {
        match provider {
            ProviderHint::Anthropic => Self::new([
                Strategy::AnthropicToolUse,
                Strategy::XmlFunctionCalls,
                Strategy::DirectFunctionTag,
                Strategy::JsonArrayText,
            ])
            .with_fence_stripping(true),
            ProviderHint::OpenAi | ProviderHint::Unknown => Self::new([
                Strategy::ChatToolCalls,
                Strategy::ResponsesFunctionCalls,
                Strategy::JsonArrayText,
            ]),
        }
    }

    /// Remove markdown fence markers from the text before any strategy runs.
    pub fn with_fence_stripping(mut self, enabled: bool) -> Self {
        self.strip_fences = enabled;
        self
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn strips_fences(&self) -> bool {
        self.strip_fences
    }

    pub(crate) fn run(&self, result: &Value, text: &str, ctx: &mut Ctx<'_>) -> Vec<ParsedResult> {
        let stripped;
        let text = if self.strip_fences {
            stripped = strip_markdown_fences(text);
            stripped.as_str()
        } else {
            text
        };

        for &strategy in &self.strategies {
            ctx.diagnostics.attempted.push(strategy);
            let results = strategy.run(result, text, ctx);
            if !results.is_empty() {
                tracing::debug!(
                    strategy = strategy.name(),
                    results = results.len(),
                    "strategy recovered results"
                );
                ctx.diagnostics.strategy = Some(strategy);
                return results;
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::diagnostics::ParseDiagnostics;
    use serde_json::json;

    fn run(chain: &StrategyChain, result: &Value, text: &str) -> (Vec<ParsedResult>, ParseDiagnostics) {
        let config = ParserConfig::default();
        let mut diag = ParseDiagnostics::default();
        let results = chain.run(result, text, &mut Ctx::new(&config, Some("notes"), &mut diag));
        (results, diag)
    }

    #[test]
    fn anthropic_chain_layout() {
        let chain = StrategyChain::for_provider(ProviderHint::Anthropic);
        assert!(chain.strips_fences());
        assert_eq!(chain.strategies()[0], Strategy::AnthropicToolUse);
        assert_eq!(chain.strategies().last(), Some(&Strategy::JsonArrayText));
    }

    #[test]
    fn unknown_uses_openai_chain() {
        assert_eq!(
            StrategyChain::for_provider(ProviderHint::Unknown),
            StrategyChain::for_provider(ProviderHint::OpenAi)
        );
    }

    #[test]
    fn first_non_empty_wins() {
        let text = "<notes>[1]</notes> and [2]";
        let chain = StrategyChain::for_provider(ProviderHint::Anthropic);
        let (results, diag) = run(&chain, &json!(text), text);
        assert_eq!(results[0].source(), Source::DirectFunctionTag);
        assert_eq!(diag.strategy, Some(Strategy::DirectFunctionTag));
        assert_eq!(
            diag.attempted,
            vec![Strategy::AnthropicToolUse, Strategy::XmlFunctionCalls, Strategy::DirectFunctionTag]
        );
    }

    #[test]
    fn xml_through_chain_is_tagged_anthropic_xml() {
        let text = "<function_calls><invoke name=\"f\"><parameter name=\"x\">1</parameter></invoke></function_calls>";
        let chain = StrategyChain::for_provider(ProviderHint::Anthropic);
        let (results, _) = run(&chain, &json!(text), text);
        assert_eq!(results[0].source(), Source::AnthropicXml);
    }

    #[test]
    fn exhausted_chain_records_every_attempt() {
        let chain = StrategyChain::for_provider(ProviderHint::OpenAi);
        let (results, diag) = run(&chain, &json!("nothing here"), "nothing here");
        assert!(results.is_empty());
        assert_eq!(diag.strategy, None);
        assert_eq!(diag.attempted.len(), 3);
    }

    #[test]
    fn custom_chain() {
        let chain = StrategyChain::new([Strategy::JsonArrayText]);
        let (results, _) = run(&chain, &Value::Null, "x [1, 2] y");
        assert_eq!(results[0].data(), &json!([1, 2]));
    }

    #[test]
    fn names() {
        assert_eq!(Strategy::ChatToolCalls.to_string(), "chat_tool_calls");
        assert_eq!(Strategy::JsonArrayText.name(), "json_array_text");
    }
}
