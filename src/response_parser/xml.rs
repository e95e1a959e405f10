//! Anthropic-style pseudo-XML tool calls.
//!
//! Recognizes the emulated function-calling convention:
//!
//! ```text
//! <function_calls>
//!   <invoke name="fn_name">
//!     <parameter name="p1">value_or_json</parameter>
//!   </invoke>
//! </function_calls>
//! ```
//!
//! Tags nest to a fixed depth, so plain non-greedy patterns are enough; the
//! `regex` crate matches them in linear time. Unterminated tags simply do
//! not match.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::config::ParserConfig;
use crate::diagnostics::ParseDiagnostics;
use crate::response_parser::context::Ctx;
use crate::response_parser::json_array::extract_json_array;
use crate::response_parser::scan::find_balanced;
use crate::response_parser::text::strip_markdown_fences;
use crate::types::{ParsedResult, Source};

fn function_calls_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<function_calls>(.*?)</function_calls>")
            .expect("function_calls regex is valid")
    })
}

fn invoke_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<invoke\s+name\s*=\s*["']([^"']+)["']\s*>(.*?)</invoke>"#)
            .expect("invoke regex is valid")
    })
}

fn parameter_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<parameter\s+name\s*=\s*["']([^"']+)["']\s*>(.*?)</parameter>"#)
            .expect("parameter regex is valid")
    })
}

/// Parse pseudo-XML function calls, falling back to bare JSON.
///
/// Each `<invoke>` with at least one parameter becomes one result tagged
/// `xml_function_call`. Parameter values that parse as JSON are stored as
/// JSON; anything else is stored as the trimmed raw string. A parameter
/// named `description` also becomes the result's description.
///
/// When the text holds no function calls at all, the JSON-array extractor
/// runs on the fence-stripped text instead.
///
/// `function_name` does not filter invokes; see
/// [`ParserConfig::with_function_filter`].
///
/// # Examples
///
/// ```
/// use llm_response_parser::parse_anthropic_xml_response;
///
/// let text = r#"<function_calls>
/// <invoke name="set_tempo">
/// <parameter name="bpm">120</parameter>
/// <parameter name="feel">laid back</parameter>
/// </invoke>
/// </function_calls>"#;
///
/// let results = parse_anthropic_xml_response(text, "");
/// assert_eq!(results[0].data()["bpm"], 120);
/// assert_eq!(results[0].data()["feel"], "laid back");
/// ```
pub fn parse_anthropic_xml_response(text: &str, function_name: &str) -> Vec<ParsedResult> {
    let config = ParserConfig::default();
    let mut diagnostics = ParseDiagnostics::default();
    let mut ctx = Ctx::new(&config, Some(function_name), &mut diagnostics);

    let cleaned = strip_markdown_fences(text);
    let results = extract_function_calls(&cleaned, Source::XmlFunctionCall, &mut ctx);
    if !results.is_empty() {
        return results;
    }
    extract_json_array(&cleaned, &mut ctx)
}

/// Every `<invoke>` inside every `<function_calls>` block, in document order.
pub(crate) fn extract_function_calls(
    text: &str,
    source: Source,
    ctx: &mut Ctx<'_>,
) -> Vec<ParsedResult> {
    let mut results = Vec::new();

    for block in function_calls_block().captures_iter(text) {
        let Some(calls) = block.get(1) else {
            continue;
        };

        for invoke in invoke_block().captures_iter(calls.as_str()) {
            let (Some(name), Some(body)) = (invoke.get(1), invoke.get(2)) else {
                continue;
            };
            if !ctx.accepts_function(name.as_str()) {
                tracing::debug!(invoke = name.as_str(), "skipping invoke rejected by function filter");
                continue;
            }
            if let Some(result) = invoke_result(body.as_str(), source, ctx) {
                results.push(result);
            }
        }
    }
    results
}

fn invoke_result(body: &str, source: Source, ctx: &mut Ctx<'_>) -> Option<ParsedResult> {
    let mut data = Map::new();
    let mut description = String::new();

    for param in parameter_block().captures_iter(body) {
        let (Some(name), Some(raw)) = (param.get(1), param.get(2)) else {
            continue;
        };
        let name = name.as_str();
        let value = raw.as_str().trim();

        if name == "description" {
            description = value.to_string();
        }

        let parsed = ctx
            .parse_candidate(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        data.insert(name.to_string(), parsed);
    }

    (!data.is_empty()).then(|| ParsedResult::new(description, Value::Object(data), source))
}

/// Parse `<fn_name>JSON</fn_name>`, the bare tag form some models use
/// instead of the invoke convention.
///
/// Only the first occurrence is used. When the closing tag is missing, the
/// balanced JSON span that follows the opening tag is taken. Requires a
/// non-empty `function_name`; otherwise returns nothing.
///
/// ```
/// use llm_response_parser::parse_direct_function_tags;
///
/// let results = parse_direct_function_tags("<add_notes>[{\"note\": 60}]", "add_notes");
/// assert_eq!(results[0].description(), "Function call: add_notes");
/// assert_eq!(results[0].data()[0]["note"], 60);
/// ```
pub fn parse_direct_function_tags(text: &str, function_name: &str) -> Vec<ParsedResult> {
    let config = ParserConfig::default();
    let mut diagnostics = ParseDiagnostics::default();
    extract_direct_function_tag(text, &mut Ctx::new(&config, Some(function_name), &mut diagnostics))
}

pub(crate) fn extract_direct_function_tag(text: &str, ctx: &mut Ctx<'_>) -> Vec<ParsedResult> {
    let Some(name) = ctx.function_name else {
        return Vec::new();
    };

    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let Some(tag) = text.find(&open) else {
        return Vec::new();
    };
    let rest = &text[tag + open.len()..];

    let body = match rest.find(&close) {
        Some(end) => &rest[..end],
        None => match rest.find(['[', '{']) {
            Some(first) => find_balanced(rest, first).unwrap_or(&rest[first..]),
            None => rest,
        },
    };
    let body = body.trim();

    match ctx.parse_candidate(body) {
        Ok(data) => vec![ParsedResult::new(
            format!("Function call: {name}"),
            data,
            Source::DirectFunctionTag,
        )],
        Err(err) => {
            ctx.skip("direct_function_tag", body, &err);
            Vec::new()
        }
    }
}
