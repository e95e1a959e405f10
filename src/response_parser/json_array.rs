//! Bare JSON-array extraction with salvage of truncated output.
//!
//! Strategies (in order):
//! 1. Markdown-fenced blocks (a stronger signal than raw brackets)
//! 2. The balanced span starting at the first `[`
//! 3. Salvage, only when that span never closes: every balanced `{...}`
//!    that parses, rebuilt into one array

use serde_json::Value;

use crate::config::ParserConfig;
use crate::diagnostics::ParseDiagnostics;
use crate::response_parser::context::Ctx;
use crate::response_parser::error::{kind_label, truncate, ParseError, PREVIEW_LEN};
use crate::response_parser::markdown::extract_fenced_json;
use crate::response_parser::scan::{find_balanced, salvage_objects};
use crate::types::{ParsedResult, Source};

/// Recover a JSON array from free text.
///
/// The whole array becomes the `data` of a single `json_array_text` result;
/// it is not split into one result per element. When the array was cut
/// off (e.g. by a token limit), the complete objects before the cut are
/// rebuilt into an array instead.
///
/// A first array that closes but is not valid JSON yields nothing; salvage
/// does not run for it.
///
/// # Examples
///
/// ```
/// use llm_response_parser::parse_json_array_from_text;
/// use serde_json::json;
///
/// let results = parse_json_array_from_text(r#"Notes: [{"note": 60}, {"note": 64}]"#);
/// assert_eq!(results[0].data(), &json!([{"note": 60}, {"note": 64}]));
///
/// let truncated = parse_json_array_from_text(r#"[{"a":1},{"b":2},{"c":"#);
/// assert_eq!(truncated[0].data(), &json!([{"a": 1}, {"b": 2}]));
/// ```
pub fn parse_json_array_from_text(text: &str) -> Vec<ParsedResult> {
    let config = ParserConfig::default();
    let mut diagnostics = ParseDiagnostics::default();
    extract_json_array(text, &mut Ctx::new(&config, None, &mut diagnostics))
}

pub(crate) fn extract_json_array(text: &str, ctx: &mut Ctx<'_>) -> Vec<ParsedResult> {
    let fenced = extract_fenced_json(text, ctx);
    if !fenced.is_empty() {
        return fenced;
    }

    let Some(start) = text.find('[') else {
        tracing::debug!("no JSON array in response text");
        return Vec::new();
    };

    if let Some(span) = find_balanced(text, start) {
        return match ctx.parse_candidate(span) {
            Ok(Value::Array(items)) => {
                vec![ParsedResult::new("", Value::Array(items), Source::JsonArrayText)]
            }
            Ok(other) => {
                let err = ParseError::NotAContainer {
                    found: kind_label(&other),
                };
                ctx.skip("balanced_array", span, &err);
                Vec::new()
            }
            Err(err) => {
                ctx.diagnostics.skipped_fragments += 1;
                tracing::warn!(
                    error = %err,
                    candidate = %truncate(span, PREVIEW_LEN),
                    "JSON parsing error in balanced array"
                );
                Vec::new()
            }
        };
    }

    if !ctx.config.salvage {
        return Vec::new();
    }
    salvage(text, ctx)
}

/// Rebuild an array from every balanced object in `text` that parses on its own.
fn salvage(text: &str, ctx: &mut Ctx<'_>) -> Vec<ParsedResult> {
    let mut items = Vec::new();
    salvage_objects(text, |candidate| match ctx.parse_candidate(candidate) {
        Ok(value) => {
            items.push(value);
            true
        }
        Err(err) => {
            ctx.skip("salvage_object", candidate, &err);
            false
        }
    });

    if items.is_empty() {
        return Vec::new();
    }

    ctx.diagnostics.salvaged_objects += items.len();
    tracing::debug!(objects = items.len(), "salvaged objects from incomplete array");
    vec![ParsedResult::new("", Value::Array(items), Source::JsonArrayText)]
}
