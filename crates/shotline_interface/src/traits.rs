//! Trait definitions for language-model backends.

use crate::StreamChunk;
use async_trait::async_trait;
use futures_util::stream::Stream;
use shotline_core::{GenerateRequest, GenerateResponse};
use shotline_error::ShotlineResult;
use std::pin::Pin;

/// Core trait every language-model backend implements.
///
/// The engine is indifferent to which provider or model produced the text;
/// it only needs a request in and a reply out.
#[async_trait]
pub trait ShotlineDriver: Send + Sync {
    /// Generate model output for a request.
    async fn generate(&self, req: &GenerateRequest) -> ShotlineResult<GenerateResponse>;

    /// Provider name (e.g., "anthropic", "openai", "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// Trait for backends that can stream their reply.
#[async_trait]
pub trait Streaming: ShotlineDriver {
    /// Generate a streaming response.
    ///
    /// The stream yields chunks as they arrive; the last chunk has
    /// `is_final == true`.
    async fn generate_stream(
        &self,
        req: &GenerateRequest,
    ) -> ShotlineResult<Pin<Box<dyn Stream<Item = ShotlineResult<StreamChunk>> + Send>>>;
}
