//! # LLM Response Parser
//!
//! Recovers structured data from raw LLM output, whatever shape the model
//! chose to emit it in.
//!
//! Models asked for tool calls or JSON answer in many dialects: Anthropic's
//! pseudo-XML `<function_calls>` convention, OpenAI `tool_calls` envelopes,
//! fenced code blocks, or a bare array buried in prose that was cut off by
//! a token limit. This crate turns all of them into an ordered list of
//! [`ParsedResult`]s without making another model call.
//!
//! ## Core Concepts
//!
//! - **[`ResponseParser`]**: the entry point. Routes a response through a
//!   provider's [`StrategyChain`] and never fails; an empty result list is a
//!   soft "nothing recovered".
//! - **[`ProviderHint`]**: `Anthropic`, `OpenAi`, or `Unknown`
//!   (auto-detected from the payload).
//! - **[`StrategyChain`]**: an ordered list of [`Strategy`] values; the
//!   first one that finds something wins.
//! - **[`ParseDiagnostics`]**: what ran, what won, and what was skipped,
//!   salvaged or repaired.
//!
//! ## Quick Start
//!
//! ```
//! use llm_response_parser::{parse_structured_response, LlmResponse, Source};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Note { note: u8, start: f64 }
//!
//! let text = r#"Here is the melody:
//! <function_calls>
//! <invoke name="add_notes">
//! <parameter name="notes">[{"note": 60, "start": 0.0}, {"note": 62, "start": 0.5}]</parameter>
//! <parameter name="description">Opening phrase</parameter>
//! </invoke>
//! </function_calls>"#;
//!
//! let results = parse_structured_response(&LlmResponse::ok(text), "", "add_notes");
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].source(), Source::AnthropicXml);
//! assert_eq!(results[0].description(), "Opening phrase");
//!
//! let notes: Vec<Note> = serde_json::from_value(results[0].data()["notes"].clone()).unwrap();
//! assert_eq!(notes[1].note, 62);
//! ```
//!
//! ## Configuration
//!
//! ```
//! use llm_response_parser::{LlmResponse, ParserConfig, ResponseParser};
//!
//! let parser = ResponseParser::new(ParserConfig::default().with_repair(true));
//! let (results, diag) = parser.parse_with_diagnostics(
//!     &LlmResponse::ok("[{\"note\": 60,},]"),
//!     "openai",
//!     "",
//! );
//! assert_eq!(results.len(), 1);
//! assert!(diag.repaired);
//! ```

pub mod config;
pub mod diagnostics;
pub mod response_parser;
pub mod types;

pub use config::ParserConfig;
pub use diagnostics::ParseDiagnostics;
pub use response_parser::{
    parse_anthropic_xml_response, parse_direct_function_tags, parse_json_array_from_text,
    parse_markdown_fenced_json, parse_openai_json_response, parse_structured_response,
    ParseError, ResponseParser, Strategy, StrategyChain,
};
pub use types::{LlmResponse, LlmUsage, ParsedResult, ProviderHint, Source};
