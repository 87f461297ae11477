//! Tests for the batch pipeline controller against in-memory stores.

use async_trait::async_trait;
use futures::stream::{self, Stream};
use shotline_core::{EpisodeId, GenerateRequest, GenerateResponse, Output, Role, Scene};
use shotline_error::{BackendError, PipelineErrorKind, ShotlineErrorKind, ShotlineResult};
use shotline_interface::{FinishReason, ShotlineDriver, StreamChunk, Streaming, WorkspaceRepository};
use shotline_pipeline::{
    BatchController, BatchPhase, Confirmation, PipelineConfig, ShotlineConfig, Stage,
};
use shotline_storage::{InMemorySceneSource, InMemoryWorkspaceStore};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Mutex;

const CONTEXT_REPLY: &str = "Here is the distilled context.\n\
    [PROJECT SUMMARY]\nA rooftop heist in Lisbon.\n\
    [CHARACTER SUMMARY]\nMara, a safecracker with vertigo.\n\
    [EPISODE OVERVIEW]\n1. The plan. 2. The job.";

const BOARD_1: &str = r#"```json
{"scenes":[{"sceneId":"s1","sceneTitle":"Rooftop","shots":[
  {"shotNumber":1,"shotScale":"wide","visual":"City at night"},
  {"visual":"Mara at the edge"}
]}]}
```"#;

const BOARD_2: &str = r#"{"scenes":[{"sceneId":"s2","shots":[{"visual":"Alley door"}]}]}"#;

const PROMPTS_1: &str = r#"{"prompts":[
  {"shotNumber":1,"prompt":"Neon Lisbon skyline, rain"},
  {"shotNumber":2,"prompt":"Woman on a ledge, vertigo angle"}
]}"#;

const PROMPTS_2: &str = "Shot 1: Rusted alley door under a sodium lamp";

/// Replies in order; `None` simulates a transport failure.
struct ScriptedDriver {
    replies: Mutex<VecDeque<Option<String>>>,
    seen: Mutex<Vec<GenerateRequest>>,
    truncate_streams: bool,
}

impl ScriptedDriver {
    fn new(replies: &[Option<&str>]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.map(str::to_string)).collect()),
            seen: Mutex::new(Vec::new()),
            truncate_streams: false,
        }
    }

    fn next_reply(&self, req: &GenerateRequest) -> ShotlineResult<String> {
        self.seen.lock().unwrap().push(req.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Some(text)) => Ok(text),
            _ => Err(BackendError::new("connection reset").into()),
        }
    }
}

#[async_trait]
impl ShotlineDriver for ScriptedDriver {
    async fn generate(&self, req: &GenerateRequest) -> ShotlineResult<GenerateResponse> {
        let text = self.next_reply(req)?;
        Ok(GenerateResponse {
            outputs: vec![Output::Text(text)],
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }
}

#[async_trait]
impl Streaming for ScriptedDriver {
    async fn generate_stream(
        &self,
        req: &GenerateRequest,
    ) -> ShotlineResult<Pin<Box<dyn Stream<Item = ShotlineResult<StreamChunk>> + Send>>> {
        let text = self.next_reply(req)?;
        let middle = text.len() / 2;
        let mut chunks = vec![
            Ok(StreamChunk::text(&text[..middle])),
            Ok(StreamChunk::text(&text[middle..])),
        ];
        if !self.truncate_streams {
            chunks.push(Ok(StreamChunk::done(FinishReason::Stop)));
        }
        Ok(Box::pin(stream::iter(chunks)))
    }
}

type Controller = BatchController<ScriptedDriver, InMemoryWorkspaceStore, InMemorySceneSource>;

fn scene(id: &str, order: i64, title: &str) -> Scene {
    Scene::builder()
        .id(id)
        .order(order)
        .title(title)
        .body(format!("INT. {} - NIGHT", title.to_uppercase()))
        .build()
        .unwrap()
}

fn ep(id: &str) -> EpisodeId {
    EpisodeId::new(id)
}

async fn controller(driver: ScriptedDriver, episodes: &[&str]) -> Controller {
    let scenes = InMemorySceneSource::new();
    scenes
        .set_scenes(&ep("ep1"), vec![scene("s1", 1, "Rooftop")])
        .await;
    scenes
        .set_scenes(&ep("ep2"), vec![scene("s2", 1, "Alley")])
        .await;
    let config = ShotlineConfig::default().with_pipeline(
        PipelineConfig::default().with_model(Some("storyboard-model".to_string())),
    );

    let mut controller = BatchController::new(
        driver,
        InMemoryWorkspaceStore::new(),
        scenes,
        episodes.iter().map(|e| ep(e)).collect(),
        "Mara plans one last job.",
        &config,
    )
    .unwrap();
    controller
        .submit_guidance("Moody, handheld, lots of negative space")
        .unwrap();
    controller
}

async fn confirm_context(controller: &mut Controller) {
    controller.generate_current().await.unwrap();
    assert_eq!(
        controller.confirm().await.unwrap(),
        Confirmation::Context
    );
}

fn pipeline_error(err: &shotline_error::ShotlineError) -> &PipelineErrorKind {
    match err.kind() {
        ShotlineErrorKind::Pipeline(e) => &e.kind,
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_cancel_after_first_episode_keeps_confirmed_work() {
    let driver = ScriptedDriver::new(&[Some(CONTEXT_REPLY), Some(BOARD_1), Some(BOARD_2)]);
    let mut controller = controller(driver, &["ep1", "ep2"]).await;
    confirm_context(&mut controller).await;

    controller.generate_current().await.unwrap();
    match controller.confirm().await.unwrap() {
        Confirmation::Storyboard { episode, outcome } => {
            assert_eq!(episode, ep("ep1"));
            assert_eq!(outcome.touched.len(), 2);
        }
        other => panic!("unexpected confirmation: {:?}", other),
    }

    controller.generate_current().await.unwrap();
    assert!(controller.state().draft(&ep("ep2"), Stage::Storyboard).is_some());
    controller.cancel().unwrap();

    assert_eq!(*controller.state().phase(), BatchPhase::Cancelled);
    assert!(controller.state().draft(&ep("ep2"), Stage::Storyboard).is_none());

    let repository = controller.repository();
    let ep1 = repository.load_entries(&ep("ep1")).await.unwrap();
    assert_eq!(ep1.len(), 2);
    assert_eq!(ep1[1].shot.shot_number, 2);
    assert!(repository.load_entries(&ep("ep2")).await.unwrap().is_empty());
    assert_eq!(repository.entry_writes().await, 1);
}

#[tokio::test]
async fn test_full_run_writes_prompts_without_new_revisions() {
    let driver = ScriptedDriver::new(&[
        Some(CONTEXT_REPLY),
        Some(BOARD_1),
        Some(BOARD_2),
        Some(PROMPTS_1),
        Some(PROMPTS_2),
    ]);
    let mut controller = controller(driver, &["ep1", "ep2"]).await;
    confirm_context(&mut controller).await;

    for _ in 0..2 {
        controller.generate_current().await.unwrap();
        controller.confirm().await.unwrap();
    }
    assert_eq!(*controller.state().phase(), BatchPhase::PromptAuthoring);
    assert_eq!(*controller.state().cursor(), 0);

    controller.generate_current().await.unwrap();
    assert_eq!(
        controller.confirm().await.unwrap(),
        Confirmation::Prompts {
            episode: ep("ep1"),
            written: 2
        }
    );
    controller.generate_current().await.unwrap();
    controller.confirm().await.unwrap();
    assert_eq!(*controller.state().phase(), BatchPhase::Completed);

    let ep1 = controller.repository().load_entries(&ep("ep1")).await.unwrap();
    assert_eq!(ep1[0].shot.prompt, "Neon Lisbon skyline, rain");
    assert_eq!(ep1[1].shot.prompt, "Woman on a ledge, vertigo angle");
    assert!(ep1.iter().all(|e| e.version == 1 && e.revisions.len() == 1));

    let ep2 = controller.repository().load_entries(&ep("ep2")).await.unwrap();
    assert_eq!(ep2[0].shot.prompt, "Rusted alley door under a sodium lamp");

    // Storyboard confirmations are logged as assistant turns
    let turns = controller.repository().load_turns(&ep("ep1")).await.unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role, Role::Assistant);
    assert_eq!(ep1[0].source_turn, Some(turns[0].id));
}

#[tokio::test]
async fn test_requests_carry_accumulated_context_and_config() {
    let driver = ScriptedDriver::new(&[Some(CONTEXT_REPLY), Some(BOARD_1)]);
    let mut controller = controller(driver, &["ep1"]).await;
    confirm_context(&mut controller).await;

    let (_, request) = controller.begin_generation().await.unwrap();
    assert_eq!(request.model.as_deref(), Some("storyboard-model"));
    assert_eq!(request.temperature, Some(0.7));
    assert_eq!(request.messages[0].role, Role::System);
    assert!(request.messages[0].content.contains("A rooftop heist in Lisbon."));
    assert!(request.messages[1].content.contains("id: s1"));
    assert!(request.messages[1].content.contains("INT. ROOFTOP - NIGHT"));
}

#[tokio::test]
async fn test_single_request_in_flight() {
    let mut controller = controller(ScriptedDriver::new(&[]), &["ep1"]).await;

    controller.begin_generation().await.unwrap();
    let err = controller.begin_generation().await.unwrap_err();
    assert!(matches!(
        pipeline_error(&err),
        PipelineErrorKind::RequestInFlight(_)
    ));
}

#[tokio::test]
async fn test_reply_after_cancel_is_ignored() {
    let mut controller = controller(ScriptedDriver::new(&[]), &["ep1"]).await;

    let (request_id, _) = controller.begin_generation().await.unwrap();
    controller.cancel().unwrap();
    controller
        .complete_generation(request_id, Ok(CONTEXT_REPLY.to_string()))
        .unwrap();

    assert_eq!(*controller.state().phase(), BatchPhase::Cancelled);
    assert!(!controller.state().context().is_complete());
}

#[tokio::test]
async fn test_transport_failure_propagates_and_allows_retry() {
    let driver = ScriptedDriver::new(&[None, Some(CONTEXT_REPLY)]);
    let mut controller = controller(driver, &["ep1"]).await;

    let err = controller.generate_current().await.unwrap_err();
    assert!(matches!(err.kind(), ShotlineErrorKind::Backend(_)));
    assert!(controller.state().pending().is_none());
    assert!(controller.state().last_error().is_some());

    controller.generate_current().await.unwrap();
    assert!(controller.state().context().is_complete());
    assert!(controller.state().last_error().is_none());
}

#[tokio::test]
async fn test_episode_without_scenes_aborts_storyboard_write() {
    let driver = ScriptedDriver::new(&[Some(CONTEXT_REPLY), Some(BOARD_1)]);
    let mut controller = controller(driver, &["ep3"]).await;
    confirm_context(&mut controller).await;
    controller.generate_current().await.unwrap();

    let err = controller.confirm().await.unwrap_err();
    assert_eq!(
        pipeline_error(&err),
        &PipelineErrorKind::NoScenes("ep3".to_string())
    );

    // Nothing written, nothing advanced, draft kept for a retry
    assert_eq!(
        *controller.state().phase(),
        BatchPhase::StoryboardGeneration
    );
    assert!(controller.state().current_draft().is_some());
    assert_eq!(controller.repository().entry_writes().await, 0);
}

#[tokio::test]
async fn test_prompt_reply_without_prompts_is_rejected() {
    let driver = ScriptedDriver::new(&[
        Some(CONTEXT_REPLY),
        Some(BOARD_1),
        Some("I'm not sure what you mean."),
        Some(PROMPTS_1),
    ]);
    let mut controller = controller(driver, &["ep1"]).await;
    confirm_context(&mut controller).await;
    controller.generate_current().await.unwrap();
    controller.confirm().await.unwrap();

    controller.generate_current().await.unwrap();
    let err = controller.confirm().await.unwrap_err();
    assert!(matches!(
        pipeline_error(&err),
        PipelineErrorKind::EmptyPromptMap(_)
    ));
    assert_eq!(*controller.state().phase(), BatchPhase::PromptAuthoring);

    controller.regenerate().await.unwrap();
    controller.confirm().await.unwrap();
    assert_eq!(*controller.state().phase(), BatchPhase::Completed);
}

#[tokio::test]
async fn test_context_confirm_requires_every_section() {
    let driver = ScriptedDriver::new(&[Some("[PROJECT SUMMARY]\nJust this.")]);
    let mut controller = controller(driver, &["ep1"]).await;
    controller.generate_current().await.unwrap();

    let err = controller.confirm().await.unwrap_err();
    assert!(matches!(
        pipeline_error(&err),
        PipelineErrorKind::IncompleteContext(_)
    ));
}

#[tokio::test]
async fn test_streamed_generation() {
    let driver = ScriptedDriver::new(&[Some(CONTEXT_REPLY)]);
    let mut controller = controller(driver, &["ep1"]).await;

    controller.generate_current_streaming().await.unwrap();
    assert!(controller.state().context().is_complete());
}

#[tokio::test]
async fn test_truncated_stream_counts_as_failure() {
    let mut driver = ScriptedDriver::new(&[Some(CONTEXT_REPLY)]);
    driver.truncate_streams = true;
    let mut controller = controller(driver, &["ep1"]).await;

    let err = controller.generate_current_streaming().await.unwrap_err();
    assert!(matches!(err.kind(), ShotlineErrorKind::Backend(_)));
    assert!(!controller.state().context().is_complete());
    assert!(controller.state().pending().is_none());
}
