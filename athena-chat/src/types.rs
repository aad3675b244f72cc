//! Chat session, turn, and chat event types.

use std::pin::Pin;

use athena_common::{ProviderId, SessionId};
use athena_providers::{ChatMessage, TokenUsage};
use athena_tools::{CompletedToolCall, StandardToolCall, ToolContext};
use futures_core::Stream;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub id: SessionId,
    pub provider: ProviderId,
    pub model: String,
    pub system_prompt: Option<String>,
}

impl ChatSession {
    pub fn new(id: impl Into<SessionId>, provider: ProviderId, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provider,
            model: model.into(),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurnRequest {
    pub session: ChatSession,
    /// Prior turns, oldest first. The system prompt stays on the session.
    pub history: Vec<ChatMessage>,
    pub user_input: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Tools offered to the model this turn. `None` offers every
    /// registered tool; an empty list offers none.
    pub tool_names: Option<Vec<String>>,
    pub context: ToolContext,
}

impl ChatTurnRequest {
    pub fn new(session: ChatSession, user_input: impl Into<String>) -> Self {
        Self {
            session,
            history: Vec::new(),
            user_input: user_input.into(),
            temperature: None,
            max_tokens: None,
            tool_names: None,
            context: ToolContext::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_tool_names(mut self, tool_names: Vec<String>) -> Self {
        self.tool_names = Some(tool_names);
        self
    }

    pub fn with_context(mut self, context: ToolContext) -> Self {
        self.context = context;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurnResult {
    pub session_id: SessionId,
    pub assistant_message: String,
    pub executed_tools: Vec<CompletedToolCall>,
    pub finish_reason: Option<String>,
    pub usage: TokenUsage,
    /// Provider round trips consumed by the turn.
    pub hops: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    TextDelta(String),
    /// A streamed tool call finished assembling and is ready to execute.
    ToolCallReady(StandardToolCall),
    ToolResult(CompletedToolCall),
    TurnComplete(ChatTurnResult),
}

pub type ChatEventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<ChatEvent, crate::ChatError>> + Send + 'a>>;
