//! Per-call extraction context and the shared candidate-parsing boundary.

use serde_json::Value;

use crate::config::ParserConfig;
use crate::diagnostics::ParseDiagnostics;
use crate::response_parser::error::{kind_label, truncate, ParseError, Result, PREVIEW_LEN};
use crate::response_parser::repair::try_repair_json;

/// Everything an extractor needs besides its input: configuration, the
/// expected function name, and the diagnostics record it reports into.
pub(crate) struct Ctx<'a> {
    pub(crate) config: &'a ParserConfig,
    pub(crate) function_name: Option<&'a str>,
    pub(crate) diagnostics: &'a mut ParseDiagnostics,
}

impl<'a> Ctx<'a> {
    pub(crate) fn new(
        config: &'a ParserConfig,
        function_name: Option<&'a str>,
        diagnostics: &'a mut ParseDiagnostics,
    ) -> Self {
        Self {
            config,
            function_name: function_name.map(str::trim).filter(|n| !n.is_empty()),
            diagnostics,
        }
    }

    /// Parse a candidate span strictly, falling back to the repair pass when enabled.
    pub(crate) fn parse_candidate(&mut self, candidate: &str) -> Result<Value> {
        let err = match serde_json::from_str::<Value>(candidate) {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if self.config.repair {
            if let Some(repaired) = try_repair_json(candidate) {
                if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
                    tracing::debug!(
                        candidate = %truncate(candidate, PREVIEW_LEN),
                        "repaired malformed JSON candidate"
                    );
                    self.diagnostics.repaired = true;
                    return Ok(value);
                }
            }
        }
        Err(err.into())
    }

    /// Like [`parse_candidate`](Self::parse_candidate), but only objects and arrays are accepted.
    pub(crate) fn parse_container(&mut self, candidate: &str) -> Result<Value> {
        let value = self.parse_candidate(candidate)?;
        if value.is_object() || value.is_array() {
            Ok(value)
        } else {
            Err(ParseError::NotAContainer {
                found: kind_label(&value),
            })
        }
    }

    /// Record a dropped fragment.
    pub(crate) fn skip(&mut self, what: &'static str, candidate: &str, err: &ParseError) {
        self.diagnostics.skipped_fragments += 1;
        tracing::debug!(
            fragment = what,
            error = %err,
            candidate = %truncate(candidate, PREVIEW_LEN),
            "skipping unparseable fragment"
        );
    }

    /// Whether an invoke or tool call named `name` passes the function filter.
    pub(crate) fn accepts_function(&self, name: &str) -> bool {
        match (self.config.function_filter, self.function_name) {
            (true, Some(expected)) => name == expected,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_parse_without_repair() {
        let config = ParserConfig::default();
        let mut diag = ParseDiagnostics::default();
        let mut ctx = Ctx::new(&config, None, &mut diag);
        assert!(ctx.parse_candidate("[1, 2,]").is_err());
        assert!(!diag.repaired);
    }

    #[test]
    fn repair_when_enabled() {
        let config = ParserConfig::default().with_repair(true);
        let mut diag = ParseDiagnostics::default();
        let mut ctx = Ctx::new(&config, None, &mut diag);
        let value = ctx.parse_candidate("[1, 2,]").unwrap();
        assert_eq!(value, serde_json::json!([1, 2]));
        assert!(diag.repaired);
    }

    #[test]
    fn container_rejects_scalars() {
        let config = ParserConfig::default();
        let mut diag = ParseDiagnostics::default();
        let mut ctx = Ctx::new(&config, None, &mut diag);
        assert!(matches!(
            ctx.parse_container("\"text\""),
            Err(ParseError::NotAContainer { found: "string" })
        ));
    }

    #[test]
    fn function_filter_only_with_expected_name() {
        let mut diag = ParseDiagnostics::default();
        let off = ParserConfig::default();
        assert!(Ctx::new(&off, Some("f"), &mut diag).accepts_function("g"));

        let on = ParserConfig::default().with_function_filter(true);
        let mut diag = ParseDiagnostics::default();
        let ctx = Ctx::new(&on, Some(" f "), &mut diag);
        assert!(ctx.accepts_function("f"));
        assert!(!ctx.accepts_function("g"));

        let mut diag = ParseDiagnostics::default();
        assert!(Ctx::new(&on, Some(""), &mut diag).accepts_function("g"));
    }
}
