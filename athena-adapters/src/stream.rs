//! Streaming tool-call fragments and the per-block assembly state machine.

use std::collections::BTreeMap;

use athena_tools::StandardToolCall;
use serde_json::Value;

use crate::AdapterError;

/// What one streaming event contributed to tool-call assembly.
///
/// OpenAI-style deltas surface as [`ToolStreamFragment::Delta`] carrying
/// only the fields actually present; Anthropic-style block lifecycle events
/// map to `Start`/`Delta`/`Stop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStreamFragment {
    Start {
        index: usize,
        id: Option<String>,
        name: Option<String>,
    },
    Delta {
        index: usize,
        id: Option<String>,
        name: Option<String>,
        arguments: Option<String>,
    },
    Stop {
        index: usize,
    },
}

#[derive(Debug, Default)]
struct PartialCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

impl PartialCall {
    fn finalize(self) -> Result<StandardToolCall, AdapterError> {
        let parameters = if self.arguments.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&self.arguments).map_err(|err| {
                AdapterError::malformed_stream(format!(
                    "accumulated tool-call arguments are not valid JSON: {err}"
                ))
            })?
        };

        Ok(StandardToolCall::new(
            self.id,
            self.name.unwrap_or_default(),
            parameters,
        ))
    }
}

/// Per-session accumulator for streamed tool calls, keyed by block index.
///
/// Each index runs one state machine: started by a `Start` (or, for
/// providers without start events, by the first `Delta`), accumulating
/// argument fragments in arrival order, completed by `Stop`. The
/// concatenation is parsed only at completion; a parse failure there is
/// fatal, since corruption during accumulation has no recovery point.
///
/// On early stream termination, drop the assembler or call
/// [`ToolCallAssembler::into_completed`]: incomplete blocks are discarded,
/// never finalized as if their stop event had arrived.
#[derive(Debug, Default)]
pub struct ToolCallAssembler {
    pending: BTreeMap<usize, PartialCall>,
    completed: Vec<StandardToolCall>,
}

impl ToolCallAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one fragment in arrival order. Returns the finalized call
    /// when the fragment completed a block.
    pub fn apply(
        &mut self,
        fragment: ToolStreamFragment,
    ) -> Result<Option<StandardToolCall>, AdapterError> {
        match fragment {
            ToolStreamFragment::Start { index, id, name } => {
                // A completed block's index may be reused by a new block;
                // each start opens an independent machine.
                self.pending.insert(
                    index,
                    PartialCall {
                        id,
                        name,
                        arguments: String::new(),
                    },
                );
                Ok(None)
            }
            ToolStreamFragment::Delta {
                index,
                id,
                name,
                arguments,
            } => {
                let partial = self.pending.entry(index).or_default();
                if let Some(id) = id {
                    partial.id = Some(id);
                }

                if let Some(name) = name {
                    partial.name = Some(name);
                }

                if let Some(arguments) = arguments {
                    partial.arguments.push_str(&arguments);
                }

                Ok(None)
            }
            ToolStreamFragment::Stop { index } => {
                // A stop for a block that never started is tolerated shape
                // drift, not an error.
                let Some(partial) = self.pending.remove(&index) else {
                    return Ok(None);
                };

                let call = partial.finalize()?;
                self.completed.push(call.clone());
                Ok(Some(call))
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn completed(&self) -> &[StandardToolCall] {
        &self.completed
    }

    /// End-of-turn finalization for providers without per-block stop
    /// events: drains pending blocks in index order, parsing each. Only
    /// call this after the stream ended normally.
    pub fn finish(mut self) -> Result<Vec<StandardToolCall>, AdapterError> {
        for (_, partial) in std::mem::take(&mut self.pending) {
            let call = partial.finalize()?;
            self.completed.push(call);
        }

        Ok(self.completed)
    }

    /// Early-termination path: yields only fully completed calls and
    /// discards incomplete accumulation.
    pub fn into_completed(self) -> Vec<StandardToolCall> {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::AdapterErrorKind;

    fn start(index: usize, id: &str, name: &str) -> ToolStreamFragment {
        ToolStreamFragment::Start {
            index,
            id: Some(id.to_string()),
            name: Some(name.to_string()),
        }
    }

    fn delta(index: usize, arguments: &str) -> ToolStreamFragment {
        ToolStreamFragment::Delta {
            index,
            id: None,
            name: None,
            arguments: Some(arguments.to_string()),
        }
    }

    #[test]
    fn block_lifecycle_reconstructs_the_call() {
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(start(0, "t1", "search")).expect("start");
        assembler.apply(delta(0, "{\"q\":")).expect("first delta");
        assembler.apply(delta(0, "\"cats\"}")).expect("second delta");

        let call = assembler
            .apply(ToolStreamFragment::Stop { index: 0 })
            .expect("stop")
            .expect("call should finalize");

        assert_eq!(call.id.as_deref(), Some("t1"));
        assert_eq!(call.tool_name, "search");
        assert_eq!(call.parameters, json!({"q": "cats"}));
        assert!(!assembler.has_pending());
    }

    #[test]
    fn early_termination_discards_incomplete_blocks() {
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(start(0, "t1", "search")).expect("start");
        assembler.apply(delta(0, "{\"q\":")).expect("delta");

        // Stream ends here with no stop event.
        let completed = assembler.into_completed();
        assert!(completed.is_empty());
    }

    #[test]
    fn corrupt_accumulation_fails_loudly_at_stop() {
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(start(0, "t1", "search")).expect("start");
        assembler.apply(delta(0, "{\"q\": &&&")).expect("delta");

        let error = assembler
            .apply(ToolStreamFragment::Stop { index: 0 })
            .expect_err("corrupt JSON must fail");
        assert_eq!(error.kind, AdapterErrorKind::MalformedStream);
    }

    #[test]
    fn stop_with_empty_accumulation_yields_empty_parameters() {
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(start(2, "t2", "ping")).expect("start");

        let call = assembler
            .apply(ToolStreamFragment::Stop { index: 2 })
            .expect("stop")
            .expect("call should finalize");
        assert_eq!(call.parameters, json!({}));
    }

    #[test]
    fn stop_for_unknown_index_is_ignored() {
        let mut assembler = ToolCallAssembler::new();
        let finalized = assembler
            .apply(ToolStreamFragment::Stop { index: 7 })
            .expect("unknown stop tolerated");
        assert!(finalized.is_none());
    }

    #[test]
    fn interleaved_blocks_assemble_independently() {
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(start(0, "t1", "search")).expect("start 0");
        assembler.apply(start(1, "t2", "lookup")).expect("start 1");
        assembler.apply(delta(1, "{\"id\":1}")).expect("delta 1");
        assembler.apply(delta(0, "{\"q\":\"x\"}")).expect("delta 0");

        let second = assembler
            .apply(ToolStreamFragment::Stop { index: 1 })
            .expect("stop 1")
            .expect("call 1");
        assert_eq!(second.tool_name, "lookup");
        assert!(assembler.has_pending());

        let first = assembler
            .apply(ToolStreamFragment::Stop { index: 0 })
            .expect("stop 0")
            .expect("call 0");
        assert_eq!(first.parameters, json!({"q": "x"}));
        assert_eq!(assembler.completed().len(), 2);
    }

    #[test]
    fn finish_finalizes_indexed_deltas_without_stop_events() {
        let mut assembler = ToolCallAssembler::new();
        assembler
            .apply(ToolStreamFragment::Delta {
                index: 0,
                id: Some("call_1".to_string()),
                name: Some("lookup".to_string()),
                arguments: Some("{\"id\":".to_string()),
            })
            .expect("first delta");
        assembler.apply(delta(0, "1}")).expect("second delta");

        let calls = assembler.finish().expect("finish should parse");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id.as_deref(), Some("call_1"));
        assert_eq!(calls[0].parameters, json!({"id": 1}));
    }

    #[test]
    fn finish_propagates_corrupt_pending_blocks() {
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(delta(0, "{oops")).expect("delta");

        let error = assembler.finish().expect_err("corrupt pending must fail");
        assert_eq!(error.kind, AdapterErrorKind::MalformedStream);
    }
}
