//! Helpers over the driver traits.

use crate::{ShotlineDriver, StreamChunk};
use futures_util::{Stream, StreamExt};
use shotline_core::GenerateRequest;
use shotline_error::{BackendError, ShotlineResult};

/// Send one prompt with optional context and return the reply text.
///
/// Transport failures propagate unchanged.
#[tracing::instrument(skip_all, fields(provider = driver.provider_name(), model = driver.model_name()))]
pub async fn submit<D: ShotlineDriver + ?Sized>(
    driver: &D,
    prompt: &str,
    context: &str,
) -> ShotlineResult<String> {
    let request = GenerateRequest::from_prompt(prompt, context);
    let response = driver.generate(&request).await?;
    let text = response.text();
    tracing::debug!(reply_length = text.len(), "Received reply");
    Ok(text)
}

/// Concatenate a chunk stream until its completion marker.
///
/// A stream that ends without a final chunk is treated as a truncated reply
/// and reported as a backend error; nothing downstream should act on half a
/// reply.
pub async fn collect_stream<S>(stream: S) -> ShotlineResult<String>
where
    S: Stream<Item = ShotlineResult<StreamChunk>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        text.push_str(&chunk.content);
        if chunk.is_final {
            tracing::debug!(
                reply_length = text.len(),
                finish_reason = ?chunk.finish_reason,
                "Stream completed"
            );
            return Ok(text);
        }
    }
    tracing::warn!(partial_length = text.len(), "Stream ended without completion marker");
    Err(BackendError::new(format!(
        "Stream ended before completion ({} characters received)",
        text.len()
    ))
    .into())
}
