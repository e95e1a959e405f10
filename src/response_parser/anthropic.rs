//! Native Messages-API `tool_use` content blocks.

use serde_json::Value;

use crate::response_parser::context::Ctx;
use crate::response_parser::text::is_content_block_list;
use crate::types::{ParsedResult, Source};

fn tool_use_blocks(result: &Value) -> impl Iterator<Item = &Value> + '_ {
    result
        .get("content")
        .and_then(Value::as_array)
        .filter(|blocks| is_content_block_list(blocks))
        .into_iter()
        .flatten()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("tool_use"))
}

pub(crate) fn has_tool_use_blocks(result: &Value) -> bool {
    tool_use_blocks(result).next().is_some()
}

/// One result per `tool_use` block; `data` is the block's `input`.
pub(crate) fn extract_tool_use_blocks(result: &Value, ctx: &mut Ctx<'_>) -> Vec<ParsedResult> {
    tool_use_blocks(result)
        .filter_map(|block| {
            let name = block.get("name").and_then(Value::as_str).unwrap_or_default();
            if !ctx.accepts_function(name) {
                tracing::debug!(tool = name, "skipping tool_use block rejected by function filter");
                return None;
            }
            let input = block.get("input")?;
            let description = input
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Some(ParsedResult::new(description, input.clone(), Source::AnthropicToolUse))
        })
        .collect()
}
