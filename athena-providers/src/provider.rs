use std::future::Future;
use std::pin::Pin;

use athena_common::ProviderId;
use futures_core::Stream;

use crate::{ChatRequest, ChatResponse, ProviderError, StreamChunk};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Stream of provider events.
///
/// Invariants for consumers:
/// - Chunks are emitted in source order.
/// - Once the stream yields an `Err`, no further items follow.
/// - Once the stream yields `None`, it must not yield additional items.
pub type ChunkStream<'a> = Pin<Box<dyn Stream<Item = Result<StreamChunk, ProviderError>> + Send + 'a>>;

pub trait ModelProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Models this provider can serve, preferred first.
    fn models(&self) -> Vec<String>;

    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChunkStream<'a>, ProviderError>>;
}
