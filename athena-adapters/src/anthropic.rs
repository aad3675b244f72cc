//! Adapter for the Anthropic Messages tool-use wire format.
//!
//! Tool definitions are top-level objects with an `input_schema`, calls
//! arrive as `tool_use` content blocks carrying structured input, and all
//! results for a turn travel together inside a single user message of
//! `tool_result` blocks.

use athena_common::ProviderId;
use athena_tools::{CompletedToolCall, StandardToolCall, ToolDefinition};
use serde_json::{Value, json};

use crate::stream::ToolStreamFragment;
use crate::{ToolAdapter, encode_result_content};

#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicToolAdapter;

impl AnthropicToolAdapter {
    /// Wraps result blocks into the single user message the Messages API
    /// expects. Callers append this to the transcript after the assistant
    /// message that requested the calls.
    pub fn create_tool_result_message(&self, results: &[CompletedToolCall]) -> Value {
        json!({
            "role": "user",
            "content": self.format_tool_results(results),
        })
    }
}

impl ToolAdapter for AnthropicToolAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn format_tools(&self, tools: &[ToolDefinition]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.parameters_schema,
                })
            })
            .collect()
    }

    fn parse_tool_calls(&self, response: &Value) -> Vec<StandardToolCall> {
        let Some(blocks) = response.get("content").and_then(Value::as_array) else {
            return Vec::new();
        };

        blocks
            .iter()
            .filter(|block| {
                block.get("type").and_then(Value::as_str) == Some("tool_use")
            })
            .map(|block| {
                StandardToolCall::new(
                    block
                        .get("id")
                        .and_then(Value::as_str)
                        .map(ToString::to_string),
                    block.get("name").and_then(Value::as_str).unwrap_or_default(),
                    block.get("input").cloned().unwrap_or_else(|| json!({})),
                )
            })
            .collect()
    }

    fn format_tool_results(&self, results: &[CompletedToolCall]) -> Vec<Value> {
        results
            .iter()
            .map(|result| {
                let tool_use_id = result.tool_call_id.clone().unwrap_or_else(|| {
                    tracing::warn!(
                        tool_name = result.result.tool_name,
                        "tool result has no call id; the provider cannot correlate it"
                    );
                    String::new()
                });

                json!({
                    "type": "tool_result",
                    "tool_use_id": tool_use_id,
                    "content": encode_result_content(result),
                })
            })
            .collect()
    }

    fn tool_result_messages(&self, results: &[CompletedToolCall]) -> Vec<Value> {
        vec![self.create_tool_result_message(results)]
    }

    fn assistant_turn_message(&self, response: &Value) -> Option<Value> {
        let content = response.get("content")?;
        Some(json!({
            "role": "assistant",
            "content": content,
        }))
    }

    fn parse_stream_event(&self, event: &Value) -> Vec<ToolStreamFragment> {
        let index = || {
            event
                .get("index")
                .and_then(Value::as_u64)
                .map(|index| index as usize)
                .unwrap_or(0)
        };

        match event.get("type").and_then(Value::as_str) {
            Some("content_block_start") => {
                let Some(block) = event.get("content_block") else {
                    return Vec::new();
                };
                if block.get("type").and_then(Value::as_str) != Some("tool_use") {
                    // Text and thinking blocks stream separately.
                    return Vec::new();
                }
                vec![ToolStreamFragment::Start {
                    index: index(),
                    id: block
                        .get("id")
                        .and_then(Value::as_str)
                        .map(ToString::to_string),
                    name: block
                        .get("name")
                        .and_then(Value::as_str)
                        .map(ToString::to_string),
                }]
            }
            Some("content_block_delta") => {
                let Some(delta) = event.get("delta") else {
                    return Vec::new();
                };
                if delta.get("type").and_then(Value::as_str) != Some("input_json_delta") {
                    return Vec::new();
                }
                vec![ToolStreamFragment::Delta {
                    index: index(),
                    id: None,
                    name: None,
                    arguments: delta
                        .get("partial_json")
                        .and_then(Value::as_str)
                        .map(ToString::to_string),
                }]
            }
            Some("content_block_stop") => vec![ToolStreamFragment::Stop { index: index() }],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use athena_tools::ToolExecutionResult;

    use super::*;
    use crate::stream::ToolCallAssembler;

    #[test]
    fn tools_carry_a_top_level_input_schema() {
        let adapter = AnthropicToolAdapter;
        let tool = ToolDefinition::new(
            "search",
            "Searches the web",
            json!({"type": "object", "properties": {"q": {"type": "string"}}}),
        );

        let encoded = adapter.format_tools(&[tool]);
        assert_eq!(
            encoded,
            vec![json!({
                "name": "search",
                "description": "Searches the web",
                "input_schema": {
                    "type": "object",
                    "properties": {"q": {"type": "string"}},
                },
            })]
        );
    }

    #[test]
    fn parse_keeps_tool_use_blocks_and_skips_text() {
        let adapter = AnthropicToolAdapter;
        let response = json!({
            "content": [
                {"type": "text", "text": "Let me look that up."},
                {
                    "type": "tool_use",
                    "id": "toolu_1",
                    "name": "search",
                    "input": {"q": "cats"},
                },
            ],
        });

        let calls = adapter.parse_tool_calls(&response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id.as_deref(), Some("toolu_1"));
        assert_eq!(calls[0].tool_name, "search");
        assert_eq!(calls[0].parameters, json!({"q": "cats"}));
    }

    #[test]
    fn missing_content_decodes_to_no_calls() {
        let adapter = AnthropicToolAdapter;
        assert!(adapter.parse_tool_calls(&json!({})).is_empty());
        assert!(adapter.parse_tool_calls(&json!({"content": "plain"})).is_empty());
        assert!(adapter.parse_tool_calls(&json!(null)).is_empty());
    }

    #[test]
    fn results_fold_into_a_single_user_message() {
        let adapter = AnthropicToolAdapter;
        let completed = vec![
            CompletedToolCall::new(
                Some("toolu_1".to_string()),
                ToolExecutionResult::ok("search", json!({"hits": 3})),
            ),
            CompletedToolCall::new(
                Some("toolu_2".to_string()),
                ToolExecutionResult::fail("lookup", "not found"),
            ),
        ];

        let messages = adapter.tool_result_messages(&completed);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");

        let blocks = messages[0]["content"].as_array().expect("content blocks");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["type"], "tool_result");
        assert_eq!(blocks[0]["tool_use_id"], "toolu_1");
        assert_eq!(blocks[0]["content"], "{\"hits\":3}");

        let error_content: Value =
            serde_json::from_str(blocks[1]["content"].as_str().expect("string")).expect("json");
        assert_eq!(error_content, json!({"success": false, "error": "not found"}));
    }

    #[test]
    fn assistant_turn_message_echoes_the_content_blocks() {
        let adapter = AnthropicToolAdapter;
        let response = json!({
            "content": [{"type": "tool_use", "id": "toolu_1", "name": "search", "input": {}}],
            "stop_reason": "tool_use",
        });

        let echoed = adapter.assistant_turn_message(&response).expect("message");
        assert_eq!(echoed["role"], "assistant");
        assert_eq!(echoed["content"], response["content"]);
        assert_eq!(adapter.assistant_turn_message(&json!({})), None);
    }

    #[test]
    fn stream_block_lifecycle_maps_to_fragments() {
        let adapter = AnthropicToolAdapter;

        let start = adapter.parse_stream_event(&json!({
            "type": "content_block_start",
            "index": 1,
            "content_block": {"type": "tool_use", "id": "toolu_1", "name": "search"},
        }));
        assert_eq!(
            start,
            vec![ToolStreamFragment::Start {
                index: 1,
                id: Some("toolu_1".to_string()),
                name: Some("search".to_string()),
            }]
        );

        let delta = adapter.parse_stream_event(&json!({
            "type": "content_block_delta",
            "index": 1,
            "delta": {"type": "input_json_delta", "partial_json": "{\"q\":"},
        }));
        assert_eq!(
            delta,
            vec![ToolStreamFragment::Delta {
                index: 1,
                id: None,
                name: None,
                arguments: Some("{\"q\":".to_string()),
            }]
        );

        let stop = adapter.parse_stream_event(&json!({
            "type": "content_block_stop",
            "index": 1,
        }));
        assert_eq!(stop, vec![ToolStreamFragment::Stop { index: 1 }]);
    }

    #[test]
    fn text_blocks_and_unrelated_events_produce_no_fragments() {
        let adapter = AnthropicToolAdapter;

        let text_start = json!({
            "type": "content_block_start",
            "index": 0,
            "content_block": {"type": "text", "text": ""},
        });
        assert!(adapter.parse_stream_event(&text_start).is_empty());

        let text_delta = json!({
            "type": "content_block_delta",
            "index": 0,
            "delta": {"type": "text_delta", "text": "hello"},
        });
        assert!(adapter.parse_stream_event(&text_delta).is_empty());

        assert!(adapter.parse_stream_event(&json!({"type": "message_stop"})).is_empty());
        assert!(adapter.parse_stream_event(&json!({})).is_empty());
    }

    #[test]
    fn streamed_block_reassembles_through_the_assembler() {
        let adapter = AnthropicToolAdapter;
        let mut assembler = ToolCallAssembler::new();

        let events = [
            json!({
                "type": "content_block_start",
                "index": 0,
                "content_block": {"type": "tool_use", "id": "toolu_1", "name": "search"},
            }),
            json!({
                "type": "content_block_delta",
                "index": 0,
                "delta": {"type": "input_json_delta", "partial_json": "{\"q\":"},
            }),
            json!({
                "type": "content_block_delta",
                "index": 0,
                "delta": {"type": "input_json_delta", "partial_json": "\"cats\"}"},
            }),
            json!({"type": "content_block_stop", "index": 0}),
        ];

        let mut completed = Vec::new();
        for event in &events {
            for fragment in adapter.parse_stream_event(event) {
                if let Some(call) = assembler.apply(fragment).expect("well-formed stream") {
                    completed.push(call);
                }
            }
        }

        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id.as_deref(), Some("toolu_1"));
        assert_eq!(completed[0].tool_name, "search");
        assert_eq!(completed[0].parameters, json!({"q": "cats"}));
    }
}
