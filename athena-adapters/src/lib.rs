//! Translation between the vendor-neutral tool representation and each
//! provider's wire format.
//!
//! The raw provider response is treated as a semi-structured document:
//! every field access is presence-checked, and an unrecognizable shape
//! decodes to "no tool calls" rather than an error. The one place decoding
//! fails loudly is streaming accumulation, where corrupt JSON at block
//! finalization has no later recovery point.

mod anthropic;
mod error;
mod openai;
mod stream;

use std::sync::Arc;

use athena_common::{OrderedRegistry, ProviderId};
use athena_tools::{CompletedToolCall, StandardToolCall, ToolDefinition};
use serde_json::Value;

pub use anthropic::AnthropicToolAdapter;
pub use error::{AdapterError, AdapterErrorKind};
pub use openai::OpenAiToolAdapter;
pub use stream::{ToolCallAssembler, ToolStreamFragment};

pub mod prelude {
    pub use crate::{
        AdapterError, AdapterErrorKind, AdapterRegistry, AnthropicToolAdapter, OpenAiToolAdapter,
        ToolAdapter, ToolCallAssembler, ToolStreamFragment,
    };
}

/// Per-provider translator between standardized tool calls and one wire
/// format. Adapters are stateless; streaming accumulation state lives in a
/// caller-owned [`ToolCallAssembler`].
pub trait ToolAdapter: Send + Sync {
    fn provider(&self) -> ProviderId;

    /// Encodes the tool catalog into the provider's request fragment,
    /// preserving the given order.
    fn format_tools(&self, tools: &[ToolDefinition]) -> Vec<Value>;

    /// Decodes a completed response into standardized tool-call records.
    /// A response without tool calls (or without a recognizable container)
    /// decodes to an empty vec, never an error.
    fn parse_tool_calls(&self, response: &Value) -> Vec<StandardToolCall>;

    /// Encodes execution results into the provider's result fragments: one
    /// fragment per result.
    fn format_tool_results(&self, results: &[CompletedToolCall]) -> Vec<Value>;

    /// Transcript-ready result encoding. OpenAI wants N independent tool
    /// messages; Anthropic wants one user message containing N content
    /// blocks, so it overrides this to wrap.
    fn tool_result_messages(&self, results: &[CompletedToolCall]) -> Vec<Value> {
        self.format_tool_results(results)
    }

    /// The assistant turn to echo into the transcript before resubmitting
    /// tool results on the next hop.
    fn assistant_turn_message(&self, response: &Value) -> Option<Value>;

    fn supports_streaming(&self) -> bool {
        true
    }

    /// Incrementally decodes one streaming event into fragments describing
    /// what changed. Unrecognized events decode to an empty vec.
    fn parse_stream_event(&self, event: &Value) -> Vec<ToolStreamFragment>;
}

/// Catalog of adapters keyed by provider, so adding a provider is a pure
/// addition.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: OrderedRegistry<ProviderId, Arc<dyn ToolAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the OpenAI and Anthropic adapters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(OpenAiToolAdapter);
        registry.register(AnthropicToolAdapter);
        registry
    }

    pub fn register<A>(&mut self, adapter: A)
    where
        A: ToolAdapter + 'static,
    {
        let provider = adapter.provider();
        // Re-registering a provider replaces its adapter.
        self.adapters.remove(&provider);
        let _ = self.adapters.try_insert(provider, Arc::new(adapter));
    }

    pub fn get(&self, provider: ProviderId) -> Option<Arc<dyn ToolAdapter>> {
        self.adapters.get(&provider).map(Arc::clone)
    }

    pub fn contains(&self, provider: ProviderId) -> bool {
        self.adapters.contains_key(&provider)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// JSON-encodes a result payload for provider-bound content fields.
fn encode_result_content(result: &CompletedToolCall) -> String {
    serde_json::to_string(&result.result.content_payload())
        .unwrap_or_else(|_| "{}".to_string())
}
