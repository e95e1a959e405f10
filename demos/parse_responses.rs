use llm_response_parser::{LlmResponse, LlmUsage, ParserConfig, ResponseParser};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("llm_response_parser=debug"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let parser = ResponseParser::new(ParserConfig::default().with_repair(true));
    println!("config: {:?}", parser.config());

    let responses = [
        (
            "Anthropic",
            LlmResponse::ok(
                "I'll add a C major triad.\n\n<function_calls>\n<invoke name=\"add_notes\">\n\
                 <parameter name=\"notes\">[{\"note\": 60}, {\"note\": 64}, {\"note\": 67}]</parameter>\n\
                 <parameter name=\"description\">C major triad</parameter>\n\
                 </invoke>\n</function_calls>",
            )
            .with_response_id("msg_01")
            .with_usage(LlmUsage {
                input_tokens: 412,
                output_tokens: 96,
            }),
        ),
        (
            "OpenAI",
            LlmResponse::ok(json!({
                "choices": [{"message": {"content": null, "tool_calls": [
                    {"id": "call_1", "type": "function",
                     "function": {"name": "set_tempo", "arguments": "{\"bpm\": 96}"}}
                ]}}]
            })),
        ),
        (
            "",
            LlmResponse::ok("Sure! Here are the notes:\n[{\"note\": 48}, {\"note\": 55}, {\"note\""),
        ),
        ("", LlmResponse::ok("```json\n{\"key\": \"D minor\", // relative minor\n}\n```")),
        ("", LlmResponse::failure("HTTP 529: overloaded")),
    ];

    for (hint, response) in &responses {
        let (results, diag) = parser.parse_with_diagnostics(response, *hint, "add_notes");
        println!(
            "hint={:?} id={:?} tokens={} provider={} strategy={} salvaged={} repaired={}",
            hint,
            response.response_id,
            response.usage.total_tokens(),
            diag.provider,
            diag.strategy.map_or("none", |s| s.name()),
            diag.salvaged_objects,
            diag.repaired,
        );
        for result in &results {
            println!("  [{}] {:?}", result.source(), result.description());
            println!("  {}", serde_json::to_string_pretty(result.data())?);
        }
    }

    Ok(())
}
