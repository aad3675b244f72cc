//! Chat completion providers.
//!
//! A [`ModelProvider`] owns one upstream chat API: it serializes a
//! [`ChatRequest`] into that provider's wire shape, performs the HTTP round
//! trip, and returns either a [`ChatResponse`] or a [`ChunkStream`] of
//! incremental events. Responses keep the provider's raw JSON document so
//! translation layers above this crate can read provider-specific structure
//! without this crate knowing about it.

mod error;
mod model;
mod provider;
mod registry;

#[cfg(feature = "provider-anthropic")]
pub mod anthropic;
#[cfg(feature = "provider-openai")]
pub mod openai;

pub use error::{ProviderError, ProviderErrorKind};
pub use model::{ChatMessage, ChatRequest, ChatResponse, Role, StreamChunk, TokenUsage};
pub use provider::{ChunkStream, ModelProvider, ProviderFuture};
pub use registry::ProviderRegistry;

/// Common `athena-providers` imports for downstream crates.
pub mod prelude {
    #[cfg(feature = "provider-anthropic")]
    pub use crate::anthropic::AnthropicChatProvider;
    #[cfg(feature = "provider-openai")]
    pub use crate::openai::OpenAiChatProvider;
    pub use crate::{
        ChatMessage, ChatRequest, ChatResponse, ChunkStream, ModelProvider, ProviderError,
        ProviderErrorKind, ProviderRegistry, Role, StreamChunk, TokenUsage,
    };
    pub use athena_common::ProviderId;
}
