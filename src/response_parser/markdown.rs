//! Markdown-fenced JSON extraction.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::ParserConfig;
use crate::diagnostics::ParseDiagnostics;
use crate::response_parser::context::Ctx;
use crate::response_parser::error::{truncate, ParseError, PREVIEW_LEN};
use crate::response_parser::text::JsonShape;
use crate::types::{ParsedResult, Source};

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?i:json)?\s*(.*?)```").expect("fenced block regex is valid")
    })
}

/// Extract every triple-backtick block (optionally tagged `json`) that
/// holds a JSON object or array.
///
/// Blocks are parsed independently: a malformed block is skipped and the
/// scan continues with the next one. Each valid block yields one result
/// tagged `markdown_fenced` with an empty description.
///
/// # Examples
///
/// ```
/// use llm_response_parser::parse_markdown_fenced_json;
///
/// let text = "Good:\n```json\n{\"a\": 1}\n```\nBad:\n```json\n{\"a\": \n```";
/// let results = parse_markdown_fenced_json(text);
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].data()["a"], 1);
/// ```
pub fn parse_markdown_fenced_json(text: &str) -> Vec<ParsedResult> {
    let config = ParserConfig::default();
    let mut diagnostics = ParseDiagnostics::default();
    extract_fenced_json(text, &mut Ctx::new(&config, None, &mut diagnostics))
}

pub(crate) fn extract_fenced_json(text: &str, ctx: &mut Ctx<'_>) -> Vec<ParsedResult> {
    let mut results = Vec::new();

    for captures in fenced_block().captures_iter(text) {
        let Some(body) = captures.get(1) else {
            continue;
        };
        let body = body.as_str().trim();
        if body.is_empty() {
            continue;
        }

        if !JsonShape::of(body).is_container() {
            let err = ParseError::Unparseable {
                expected_format: "fenced JSON block",
                text: truncate(body, PREVIEW_LEN),
            };
            ctx.skip("markdown_fence", body, &err);
            continue;
        }

        match ctx.parse_container(body) {
            Ok(data) => results.push(ParsedResult::new("", data, Source::MarkdownFenced)),
            Err(err) => ctx.skip("markdown_fence", body, &err),
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_tagged_block() {
        let results = parse_markdown_fenced_json("Here:\n```json\n{\"key\": \"value\"}\n```");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].data(), &json!({"key": "value"}));
        assert_eq!(results[0].source(), Source::MarkdownFenced);
        assert_eq!(results[0].description(), "");
    }

    #[test]
    fn bare_block() {
        let results = parse_markdown_fenced_json("```\n[1, 2, 3]\n```");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].data(), &json!([1, 2, 3]));
    }

    #[test]
    fn multiple_blocks_in_order() {
        let text = "```json\n{\"n\": 1}\n```\ntext\n```json\n{\"n\": 2}\n```";
        let results = parse_markdown_fenced_json(text);
        let ns: Vec<_> = results.iter().map(|r| r.data()["n"].clone()).collect();
        assert_eq!(ns, vec![json!(1), json!(2)]);
    }

    #[test]
    fn malformed_block_does_not_abort_valid_one() {
        let text = "```json\n{\"broken\": [1, 2\n```\nand\n```json\n[{\"ok\": true}]\n```";
        let results = parse_markdown_fenced_json(text);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].data(), &json!([{"ok": true}]));
    }

    #[test]
    fn non_json_block_skipped() {
        let config = ParserConfig::default();
        let mut diag = ParseDiagnostics::default();
        let text = "```python\nprint('hi')\n```";
        let results = extract_fenced_json(text, &mut Ctx::new(&config, None, &mut diag));
        assert!(results.is_empty());
        assert_eq!(diag.skipped_fragments, 1);
    }

    #[test]
    fn unterminated_fence_yields_nothing() {
        assert!(parse_markdown_fenced_json("```json\n{\"a\": 1}").is_empty());
    }

    #[test]
    fn repair_applies_to_fenced_blocks() {
        let config = ParserConfig::default().with_repair(true);
        let mut diag = ParseDiagnostics::default();
        let text = "```json\n{\"a\": 1,}\n```";
        let results = extract_fenced_json(text, &mut Ctx::new(&config, None, &mut diag));
        assert_eq!(results[0].data(), &json!({"a": 1}));
        assert!(diag.repaired);
    }
}
