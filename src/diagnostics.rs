//! Parse diagnostics for structured-response extraction.
//!
//! [`ParseDiagnostics`] records what happened during one parse: which
//! provider chain ran, which strategies were tried and which one produced
//! the results, and how much input had to be skipped, salvaged or repaired.

use crate::response_parser::strategy::Strategy;
use crate::types::ProviderHint;

/// Records what happened during one call to
/// [`ResponseParser::parse_with_diagnostics`](crate::ResponseParser::parse_with_diagnostics).
///
/// # Example
///
/// ```
/// use llm_response_parser::{LlmResponse, ResponseParser};
///
/// let parser = ResponseParser::default();
/// let response = LlmResponse::ok("Result: [1, 2, 3]");
/// let (results, diag) = parser.parse_with_diagnostics(&response, "", "");
/// assert_eq!(results.len(), 1);
/// assert!(diag.ok());
/// assert!(diag.auto_detected);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParseDiagnostics {
    /// Provider whose chain produced the outcome (the fallback chain, if one ran).
    pub provider: ProviderHint,

    /// Whether the provider came from auto-detection rather than the caller's hint.
    pub auto_detected: bool,

    /// The strategy that produced the returned results. `None` means nothing was recovered.
    pub strategy: Option<Strategy>,

    /// Every strategy tried, in order.
    pub attempted: Vec<Strategy>,

    /// Objects recovered by the salvage engine.
    pub salvaged_objects: usize,

    /// Candidate fragments that looked like JSON but were dropped.
    pub skipped_fragments: usize,

    /// Whether the repair pass turned at least one candidate into valid JSON.
    pub repaired: bool,
}

impl ParseDiagnostics {
    /// Quick check: did any strategy recover data?
    pub fn ok(&self) -> bool {
        self.strategy.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_ok() {
        let d = ParseDiagnostics::default();
        assert!(!d.ok());
        assert_eq!(d.provider, ProviderHint::Unknown);
        assert!(d.attempted.is_empty());
        assert_eq!(d.salvaged_objects, 0);
        assert_eq!(d.skipped_fragments, 0);
        assert!(!d.repaired);
    }

    #[test]
    fn with_strategy_is_ok() {
        let d = ParseDiagnostics {
            strategy: Some(Strategy::JsonArrayText),
            ..Default::default()
        };
        assert!(d.ok());
    }
}
