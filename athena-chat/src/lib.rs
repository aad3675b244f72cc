//! Turn orchestration over providers, adapters, and the tool runtime.
//!
//! [`ChatService::run_turn`] drives a turn to its final assistant message,
//! resolving tool calls between provider round trips. [`ChatService::stream_turn`]
//! surfaces a single streamed pass as incremental [`ChatEvent`]s.

mod error;
mod service;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatEvent, ChatEventStream, ChatService, ChatServiceBuilder,
        ChatSession, ChatTurnRequest, ChatTurnResult,
    };
    pub use athena_common::{MetadataMap, ProviderId, SessionId};
    pub use athena_tools::{
        CompletedToolCall, DefaultToolRuntime, StandardToolCall, Tool, ToolContext, ToolError,
        ToolErrorKind, ToolExecutionResult, ToolRegistry, ToolRuntime,
    };
}

pub use error::{ChatError, ChatErrorKind};
pub use service::{ChatService, ChatServiceBuilder};
pub use types::{ChatEvent, ChatEventStream, ChatSession, ChatTurnRequest, ChatTurnResult};
