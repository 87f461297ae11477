//! Tests for the driver helpers.

use async_trait::async_trait;
use futures_util::stream;
use shotline_core::{GenerateRequest, GenerateResponse, Output, Role};
use shotline_error::{BackendError, ShotlineResult};
use shotline_interface::{FinishReason, ShotlineDriver, StreamChunk, collect_stream, submit};
use std::sync::Mutex;

struct EchoDriver {
    seen: Mutex<Vec<GenerateRequest>>,
}

#[async_trait]
impl ShotlineDriver for EchoDriver {
    async fn generate(&self, req: &GenerateRequest) -> ShotlineResult<GenerateResponse> {
        self.seen.lock().unwrap().push(req.clone());
        Ok(GenerateResponse {
            outputs: vec![Output::Text("```json\n[]\n```".to_string())],
        })
    }

    fn provider_name(&self) -> &'static str {
        "echo"
    }

    fn model_name(&self) -> &str {
        "echo-1"
    }
}

struct FailingDriver;

#[async_trait]
impl ShotlineDriver for FailingDriver {
    async fn generate(&self, _req: &GenerateRequest) -> ShotlineResult<GenerateResponse> {
        Err(BackendError::new("provider unavailable").into())
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }

    fn model_name(&self) -> &str {
        "none"
    }
}

#[tokio::test]
async fn submit_sends_context_as_system_message() {
    let driver = EchoDriver {
        seen: Mutex::new(Vec::new()),
    };
    let reply = submit(&driver, "Draft episode 1", "Project synopsis").await.unwrap();
    assert_eq!(reply, "```json\n[]\n```");

    let seen = driver.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].messages[0].role, Role::System);
    assert_eq!(seen[0].messages[1].content, "Draft episode 1");
}

#[tokio::test]
async fn submit_propagates_transport_failure() {
    let result = submit(&FailingDriver, "Draft", "").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn collect_stream_stops_at_completion_marker() {
    let chunks = vec![
        Ok(StreamChunk::text("{\"entries\":")),
        Ok(StreamChunk::text("[]}")),
        Ok(StreamChunk::done(FinishReason::Stop)),
        Ok(StreamChunk::text("ignored")),
    ];
    let text = collect_stream(stream::iter(chunks)).await.unwrap();
    assert_eq!(text, "{\"entries\":[]}");
}

#[tokio::test]
async fn collect_stream_rejects_truncated_stream() {
    let chunks = vec![Ok(StreamChunk::text("{\"entries\":"))];
    assert!(collect_stream(stream::iter(chunks)).await.is_err());
}
