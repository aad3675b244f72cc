//! Adapter for the OpenAI function-calling wire format.
//!
//! Tool definitions travel function-wrapped, argument payloads are
//! JSON-encoded strings, calls correlate through an explicit call id, and
//! results go back as `role: "tool"` messages.

use athena_common::ProviderId;
use athena_tools::{CompletedToolCall, StandardToolCall, ToolDefinition};
use serde_json::{Value, json};

use crate::stream::ToolStreamFragment;
use crate::{ToolAdapter, encode_result_content};

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiToolAdapter;

impl ToolAdapter for OpenAiToolAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn format_tools(&self, tools: &[ToolDefinition]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters_schema,
                    },
                })
            })
            .collect()
    }

    fn parse_tool_calls(&self, response: &Value) -> Vec<StandardToolCall> {
        let Some(raw_calls) = first_choice(response)
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("tool_calls"))
            .and_then(Value::as_array)
        else {
            // A text-only turn, or a shape this adapter does not recognize.
            return Vec::new();
        };

        raw_calls
            .iter()
            .map(|raw| {
                let id = raw
                    .get("id")
                    .and_then(Value::as_str)
                    .map(ToString::to_string);
                let function = raw.get("function");
                let name = function
                    .and_then(|f| f.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let arguments = function
                    .and_then(|f| f.get("arguments"))
                    .and_then(Value::as_str)
                    .unwrap_or("{}");

                // One malformed argument string must not block sibling
                // calls or fail the turn; substitute an empty object.
                let parameters = serde_json::from_str(arguments).unwrap_or_else(|err| {
                    tracing::warn!(
                        tool_name = name,
                        error = %err,
                        "tool-call arguments are not valid JSON; substituting empty object"
                    );
                    json!({})
                });

                StandardToolCall::new(id, name, parameters)
            })
            .collect()
    }

    fn format_tool_results(&self, results: &[CompletedToolCall]) -> Vec<Value> {
        results
            .iter()
            .map(|result| {
                let tool_call_id = result.tool_call_id.clone().unwrap_or_else(|| {
                    tracing::warn!(
                        tool_name = result.result.tool_name,
                        "tool result has no call id; the provider cannot correlate it"
                    );
                    String::new()
                });

                json!({
                    "role": "tool",
                    "tool_call_id": tool_call_id,
                    "content": encode_result_content(result),
                })
            })
            .collect()
    }

    fn assistant_turn_message(&self, response: &Value) -> Option<Value> {
        first_choice(response)?.get("message").cloned()
    }

    fn parse_stream_event(&self, event: &Value) -> Vec<ToolStreamFragment> {
        // Accept either a full chunk or the bare choice delta.
        let delta = first_choice(event)
            .and_then(|choice| choice.get("delta"))
            .unwrap_or(event);

        let Some(raw_calls) = delta.get("tool_calls").and_then(Value::as_array) else {
            return Vec::new();
        };

        raw_calls
            .iter()
            .map(|raw| {
                let function = raw.get("function");
                // Pass through only the fields actually present.
                ToolStreamFragment::Delta {
                    index: raw
                        .get("index")
                        .and_then(Value::as_u64)
                        .map(|index| index as usize)
                        .unwrap_or(0),
                    id: raw
                        .get("id")
                        .and_then(Value::as_str)
                        .map(ToString::to_string),
                    name: function
                        .and_then(|f| f.get("name"))
                        .and_then(Value::as_str)
                        .map(ToString::to_string),
                    arguments: function
                        .and_then(|f| f.get("arguments"))
                        .and_then(Value::as_str)
                        .map(ToString::to_string),
                }
            })
            .collect()
    }
}

fn first_choice(response: &Value) -> Option<&Value> {
    response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
}

#[cfg(test)]
mod tests {
    use athena_tools::ToolExecutionResult;

    use super::*;

    fn search_tool() -> ToolDefinition {
        ToolDefinition::new(
            "search",
            "Searches the web",
            json!({
                "type": "object",
                "properties": {"q": {"type": "string"}},
                "required": ["q"],
            }),
        )
    }

    #[test]
    fn tools_are_function_wrapped_in_order() {
        let adapter = OpenAiToolAdapter;
        let other = ToolDefinition::new("system", "System ops", json!({"type": "object"}));

        let encoded = adapter.format_tools(&[search_tool(), other]);
        assert_eq!(
            encoded[0],
            json!({
                "type": "function",
                "function": {
                    "name": "search",
                    "description": "Searches the web",
                    "parameters": {
                        "type": "object",
                        "properties": {"q": {"type": "string"}},
                        "required": ["q"],
                    },
                },
            })
        );
        assert_eq!(encoded[1]["function"]["name"], "system");
    }

    #[test]
    fn parse_extracts_id_name_and_decoded_arguments() {
        let adapter = OpenAiToolAdapter;
        let response = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "search", "arguments": "{\"q\":\"cats\"}"},
                    }],
                },
            }],
        });

        let calls = adapter.parse_tool_calls(&response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id.as_deref(), Some("call_1"));
        assert_eq!(calls[0].tool_name, "search");
        assert_eq!(calls[0].parameters, json!({"q": "cats"}));
    }

    #[test]
    fn malformed_arguments_decode_to_an_empty_object() {
        let adapter = OpenAiToolAdapter;
        let response = json!({
            "choices": [{
                "message": {
                    "tool_calls": [
                        {
                            "id": "call_1",
                            "function": {"name": "search", "arguments": "{bad json"},
                        },
                        {
                            "id": "call_2",
                            "function": {"name": "lookup", "arguments": "{\"id\":1}"},
                        },
                    ],
                },
            }],
        });

        let calls = adapter.parse_tool_calls(&response);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].parameters, json!({}));
        assert_eq!(calls[1].parameters, json!({"id": 1}));
    }

    #[test]
    fn text_only_and_malformed_responses_decode_to_no_calls() {
        let adapter = OpenAiToolAdapter;

        let text_only = json!({
            "choices": [{"message": {"content": "hello", "tool_calls": null}}],
        });
        assert!(adapter.parse_tool_calls(&text_only).is_empty());

        assert!(adapter.parse_tool_calls(&json!({})).is_empty());
        assert!(adapter.parse_tool_calls(&json!("garbage")).is_empty());
        assert!(adapter.parse_tool_calls(&json!({"choices": []})).is_empty());
    }

    #[test]
    fn results_become_role_tagged_tool_messages() {
        let adapter = OpenAiToolAdapter;
        let completed = CompletedToolCall::new(
            Some("c1".to_string()),
            ToolExecutionResult::ok("search", json!({"ok": true})),
        );

        let messages = adapter.format_tool_results(&[completed]);
        assert_eq!(
            messages,
            vec![json!({
                "role": "tool",
                "tool_call_id": "c1",
                "content": "{\"ok\":true}",
            })]
        );
    }

    #[test]
    fn missing_call_id_falls_back_to_empty_string() {
        let adapter = OpenAiToolAdapter;
        let completed =
            CompletedToolCall::new(None, ToolExecutionResult::ok("search", json!({})));

        let messages = adapter.format_tool_results(&[completed]);
        assert_eq!(messages[0]["tool_call_id"], "");
    }

    #[test]
    fn failed_results_encode_the_error_for_the_model() {
        let adapter = OpenAiToolAdapter;
        let completed = CompletedToolCall::new(
            Some("c1".to_string()),
            ToolExecutionResult::fail("search", "upstream 500"),
        );

        let messages = adapter.format_tool_results(&[completed]);
        let content = messages[0]["content"].as_str().expect("content string");
        let decoded: Value = serde_json::from_str(content).expect("content parses");
        assert_eq!(decoded, json!({"success": false, "error": "upstream 500"}));
    }

    #[test]
    fn assistant_turn_message_is_the_first_choice_message() {
        let adapter = OpenAiToolAdapter;
        let response = json!({
            "choices": [{"message": {"role": "assistant", "tool_calls": []}}],
        });

        let echoed = adapter.assistant_turn_message(&response);
        assert_eq!(echoed, Some(json!({"role": "assistant", "tool_calls": []})));
        assert_eq!(adapter.assistant_turn_message(&json!({})), None);
    }

    #[test]
    fn stream_deltas_pass_through_only_present_fields() {
        let adapter = OpenAiToolAdapter;
        let chunk = json!({
            "choices": [{
                "delta": {
                    "tool_calls": [
                        {"index": 0, "id": "call_1", "function": {"name": "search"}},
                        {"index": 0, "function": {"arguments": "{\"q\":"}},
                    ],
                },
            }],
        });

        let fragments = adapter.parse_stream_event(&chunk);
        assert_eq!(
            fragments,
            vec![
                ToolStreamFragment::Delta {
                    index: 0,
                    id: Some("call_1".to_string()),
                    name: Some("search".to_string()),
                    arguments: None,
                },
                ToolStreamFragment::Delta {
                    index: 0,
                    id: None,
                    name: None,
                    arguments: Some("{\"q\":".to_string()),
                },
            ]
        );
    }

    #[test]
    fn stream_events_without_tool_calls_decode_to_nothing() {
        let adapter = OpenAiToolAdapter;
        let chunk = json!({"choices": [{"delta": {"content": "hi"}}]});
        assert!(adapter.parse_stream_event(&chunk).is_empty());
        assert!(adapter.parse_stream_event(&json!({})).is_empty());
    }
}
