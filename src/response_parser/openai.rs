//! OpenAI-shaped responses: Chat-Completions `tool_calls` and the
//! Responses-API normalized `function_calls` list.

use serde_json::Value;

use crate::response_parser::context::Ctx;
use crate::response_parser::strategy::StrategyChain;
use crate::response_parser::ResponseParser;
use crate::types::{LlmResponse, ParsedResult, ProviderHint, Source};

/// Run the OpenAI strategy chain over a whole response.
///
/// Tool calls short-circuit: when `choices[0].message.tool_calls` yields
/// results, the message content is not scanned. Otherwise the content (or
/// the serialized result) goes through the JSON-array extractor.
///
/// # Examples
///
/// ```
/// use llm_response_parser::{parse_openai_json_response, LlmResponse};
/// use serde_json::json;
///
/// let response = LlmResponse::ok(json!({
///     "choices": [{"message": {"tool_calls": [
///         {"function": {"name": "add", "arguments": "{\"a\": 1, \"b\": 2}"}}
///     ]}}]
/// }));
/// let results = parse_openai_json_response(&response);
/// assert_eq!(results[0].data(), &json!({"a": 1, "b": 2}));
/// ```
pub fn parse_openai_json_response(response: &LlmResponse) -> Vec<ParsedResult> {
    let chain = StrategyChain::for_provider(ProviderHint::OpenAi);
    ResponseParser::default()
        .parse_with_chain(response, &chain, "")
        .0
}

/// Whether the result carries OpenAI structured calls of either shape.
pub(crate) fn has_function_calls(result: &Value) -> bool {
    let non_empty = |v: Option<&Value>| v.and_then(Value::as_array).is_some_and(|a| !a.is_empty());
    non_empty(result.pointer("/choices/0/message/tool_calls")) || non_empty(result.get("function_calls"))
}

pub(crate) fn extract_chat_tool_calls(result: &Value, ctx: &mut Ctx<'_>) -> Vec<ParsedResult> {
    let Some(calls) = result
        .pointer("/choices/0/message/tool_calls")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    calls
        .iter()
        .filter_map(|call| {
            let function = call.get("function")?;
            call_result(function, Source::OpenAiToolCall, ctx)
        })
        .collect()
}

pub(crate) fn extract_responses_function_calls(
    result: &Value,
    ctx: &mut Ctx<'_>,
) -> Vec<ParsedResult> {
    let Some(calls) = result.get("function_calls").and_then(Value::as_array) else {
        return Vec::new();
    };

    calls
        .iter()
        .filter_map(|call| call_result(call, Source::OpenAiFunctionCall, ctx))
        .collect()
}

/// One result from a `{name, arguments}` object. `arguments` is normally a
/// JSON-encoded string, but already-decoded values are accepted too.
fn call_result(call: &Value, source: Source, ctx: &mut Ctx<'_>) -> Option<ParsedResult> {
    let name = call.get("name").and_then(Value::as_str).unwrap_or_default();
    if !ctx.accepts_function(name) {
        tracing::debug!(tool = name, "skipping tool call rejected by function filter");
        return None;
    }

    let data = match call.get("arguments")? {
        Value::String(raw) => match ctx.parse_candidate(raw) {
            Ok(data) => data,
            Err(err) => {
                ctx.skip(source.as_str(), raw, &err);
                return None;
            }
        },
        Value::Null => return None,
        structured => structured.clone(),
    };

    let description = data
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(ParsedResult::new(description, data, source))
}
