//! Chat service slices for non-streaming and streaming turn orchestration.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use athena_adapters::{AdapterRegistry, ToolAdapter, ToolCallAssembler};
use athena_common::ProviderId;
use athena_providers::{
    ChatMessage, ChatRequest, ModelProvider, ProviderRegistry, TokenUsage,
};
use athena_tools::{CompletedToolCall, DefaultToolRuntime, ToolRegistry, ToolRuntime};
use futures_core::Stream;
use futures_util::StreamExt;
use serde_json::Value;

use crate::{ChatError, ChatEvent, ChatEventStream, ChatTurnRequest, ChatTurnResult};

const DEFAULT_MAX_TOOL_HOPS: u32 = 4;

#[derive(Clone)]
pub struct ChatService {
    providers: Arc<ProviderRegistry>,
    adapters: Arc<AdapterRegistry>,
    tools: Arc<ToolRegistry>,
    runtime: Arc<dyn ToolRuntime>,
    max_tool_hops: u32,
}

#[derive(Default)]
pub struct ChatServiceBuilder {
    providers: Option<Arc<ProviderRegistry>>,
    adapters: Option<Arc<AdapterRegistry>>,
    tools: Option<Arc<ToolRegistry>>,
    runtime: Option<Arc<dyn ToolRuntime>>,
    max_tool_hops: Option<u32>,
}

impl ChatServiceBuilder {
    pub fn providers(mut self, providers: Arc<ProviderRegistry>) -> Self {
        self.providers = Some(providers);
        self
    }

    pub fn adapters(mut self, adapters: Arc<AdapterRegistry>) -> Self {
        self.adapters = Some(adapters);
        self
    }

    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn runtime(mut self, runtime: Arc<dyn ToolRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn max_tool_hops(mut self, max_tool_hops: u32) -> Self {
        self.max_tool_hops = Some(max_tool_hops);
        self
    }

    pub fn build(self) -> Result<ChatService, ChatError> {
        let providers = self
            .providers
            .ok_or_else(|| ChatError::invalid_request("a provider registry is required"))?;
        let tools = self.tools.unwrap_or_default();
        let runtime = self
            .runtime
            .unwrap_or_else(|| Arc::new(DefaultToolRuntime::new(Arc::clone(&tools))));

        Ok(ChatService {
            providers,
            adapters: self
                .adapters
                .unwrap_or_else(|| Arc::new(AdapterRegistry::with_defaults())),
            tools,
            runtime,
            max_tool_hops: self.max_tool_hops.unwrap_or(DEFAULT_MAX_TOOL_HOPS),
        })
    }
}

impl ChatService {
    pub fn builder() -> ChatServiceBuilder {
        ChatServiceBuilder::default()
    }

    /// Runs one turn to a final assistant message, resolving tool calls
    /// between provider round trips until the model stops asking.
    pub async fn run_turn(&self, request: ChatTurnRequest) -> Result<ChatTurnResult, ChatError> {
        let turn = self.prepare_turn(request)?;

        let mut tool_messages = Vec::<Value>::new();
        let mut executed = Vec::<CompletedToolCall>::new();
        let mut usage = TokenUsage::default();

        for hop in 0..=self.max_tool_hops {
            let response = turn
                .provider
                .chat(turn.chat_request(&tool_messages, false))
                .await?;

            usage.input_tokens += response.usage.input_tokens;
            usage.output_tokens += response.usage.output_tokens;
            usage.total_tokens += response.usage.total_tokens;

            let tool_calls = turn.adapter.parse_tool_calls(&response.raw);
            if tool_calls.is_empty() {
                return Ok(ChatTurnResult {
                    session_id: turn.request.session.id.clone(),
                    assistant_message: response.content,
                    executed_tools: executed,
                    finish_reason: response.finish_reason,
                    usage,
                    hops: hop + 1,
                });
            }

            tracing::debug!(
                session_id = %turn.request.session.id,
                hop,
                tool_calls = tool_calls.len(),
                "resolving tool calls"
            );

            // The model sees its own request before the results.
            if let Some(assistant) = turn.adapter.assistant_turn_message(&response.raw) {
                tool_messages.push(assistant);
            }

            let mut completed = Vec::with_capacity(tool_calls.len());
            for tool_call in tool_calls {
                completed.push(
                    self.runtime
                        .execute(tool_call, turn.request.context.clone())
                        .await,
                );
            }

            tool_messages.extend(turn.adapter.tool_result_messages(&completed));
            executed.extend(completed);
        }

        Err(ChatError::tooling(format!(
            "turn exceeded {} tool hops without a final answer",
            self.max_tool_hops
        )))
    }

    /// Streams one provider pass, surfacing text deltas as they arrive and
    /// tool calls as they finish assembling. Assembled calls execute after
    /// the provider stream ends; the turn does not loop back to the model.
    pub async fn stream_turn<'a>(
        &'a self,
        request: ChatTurnRequest,
    ) -> Result<ChatEventStream<'a>, ChatError> {
        let turn = self.prepare_turn(request)?;

        let mut provider_stream = turn
            .provider
            .stream(turn.chat_request(&[], true))
            .await?;

        let mut events = Vec::new();
        let mut assistant_text = String::new();
        let mut finish_reason = None::<String>;
        let mut assembler = ToolCallAssembler::new();

        while let Some(chunk) = provider_stream.next().await {
            // An upstream failure ends the turn; partially assembled
            // calls are dropped with it.
            let chunk = chunk.map_err(ChatError::from)?;

            if !chunk.delta.is_empty() {
                assistant_text.push_str(&chunk.delta);
                events.push(Ok(ChatEvent::TextDelta(chunk.delta.clone())));
            }

            if chunk.finish_reason.is_some() {
                finish_reason = chunk.finish_reason.clone();
            }

            for fragment in turn.adapter.parse_stream_event(&chunk.raw) {
                if let Some(tool_call) = assembler.apply(fragment)? {
                    events.push(Ok(ChatEvent::ToolCallReady(tool_call)));
                }
            }
        }

        let already_ready = assembler.completed().len();
        let tool_calls = match turn.request.session.provider {
            // Indexed deltas never see an explicit stop; end of turn is
            // the finalization point.
            ProviderId::OpenAi => assembler.finish()?,
            // Block-framed streams close every call before the turn
            // ends; anything still open did not survive the turn.
            ProviderId::Anthropic => assembler.into_completed(),
        };
        for tool_call in tool_calls.iter().skip(already_ready) {
            events.push(Ok(ChatEvent::ToolCallReady(tool_call.clone())));
        }

        let mut executed = Vec::with_capacity(tool_calls.len());
        for tool_call in tool_calls {
            let completed = self
                .runtime
                .execute(tool_call, turn.request.context.clone())
                .await;
            events.push(Ok(ChatEvent::ToolResult(completed.clone())));
            executed.push(completed);
        }

        events.push(Ok(ChatEvent::TurnComplete(ChatTurnResult {
            session_id: turn.request.session.id.clone(),
            assistant_message: assistant_text,
            executed_tools: executed,
            finish_reason,
            usage: TokenUsage::default(),
            hops: 1,
        })));

        Ok(Box::pin(BufferedChatEventStream::new(events)))
    }

    fn prepare_turn(&self, request: ChatTurnRequest) -> Result<PreparedTurn, ChatError> {
        if request.user_input.trim().is_empty() {
            return Err(ChatError::invalid_request("user_input must not be empty"));
        }

        let provider_id = request.session.provider;
        let provider = self.providers.get(provider_id).ok_or_else(|| {
            ChatError::invalid_request(format!("no provider registered for '{provider_id}'"))
        })?;
        let adapter = self.adapters.get(provider_id).ok_or_else(|| {
            ChatError::invalid_request(format!("no adapter registered for '{provider_id}'"))
        })?;

        let definitions = match &request.tool_names {
            Some(names) => self.tools.schemas_for(names),
            None => self.tools.schemas(),
        };
        let encoded_tools = adapter.format_tools(&definitions);

        let mut messages = Vec::new();
        if let Some(system_prompt) = &request.session.system_prompt {
            messages.push(ChatMessage::system(system_prompt.clone()));
        }
        messages.extend(request.history.iter().cloned());
        messages.push(ChatMessage::user(request.user_input.clone()));

        Ok(PreparedTurn {
            provider,
            adapter,
            messages,
            encoded_tools,
            request,
        })
    }
}

struct PreparedTurn {
    provider: Arc<dyn ModelProvider>,
    adapter: Arc<dyn ToolAdapter>,
    messages: Vec<ChatMessage>,
    encoded_tools: Vec<Value>,
    request: ChatTurnRequest,
}

impl PreparedTurn {
    fn chat_request(&self, tool_messages: &[Value], stream: bool) -> ChatRequest {
        let mut chat_request =
            ChatRequest::new(self.request.session.model.clone(), self.messages.clone())
                .with_tools(self.encoded_tools.clone())
                .with_tool_messages(tool_messages.to_vec());

        if let Some(temperature) = self.request.temperature {
            chat_request = chat_request.with_temperature(temperature);
        }

        if let Some(max_tokens) = self.request.max_tokens {
            chat_request = chat_request.with_max_tokens(max_tokens);
        }

        if stream {
            chat_request = chat_request.enable_streaming();
        }

        chat_request
    }
}

#[derive(Debug)]
struct BufferedChatEventStream {
    events: VecDeque<Result<ChatEvent, ChatError>>,
}

impl BufferedChatEventStream {
    fn new(events: Vec<Result<ChatEvent, ChatError>>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl Stream for BufferedChatEventStream {
    type Item = Result<ChatEvent, ChatError>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.events.pop_front())
    }
}
