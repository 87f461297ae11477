//! Drives the batch state machine against a driver and the stores.

use crate::{
    BatchEvent, BatchPhase, BatchState, ContextSections, PipelineConfig, RequestId,
    ShotlineConfig, accumulated_context, apply_prompts, context_prompt, parse_prompt_map,
    prompt_authoring_prompt, storyboard_prompt,
};
use shotline_core::{DialogueTurn, EpisodeId, GenerateRequest, Role};
use shotline_error::{PipelineError, PipelineErrorKind, ShotlineResult};
use shotline_interface::{
    SceneSource, ShotlineDriver, Streaming, WorkspaceRepository, collect_stream,
};
use shotline_reconcile::{ApplyOptions, ApplyOutcome, apply_reply_strict};

/// What a confirmation committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// Context sections accepted; storyboards come next
    Context,
    /// A storyboard was written into the episode's entries
    Storyboard {
        /// Episode written
        episode: EpisodeId,
        /// Result of applying the storyboard
        outcome: ApplyOutcome,
    },
    /// Prompts were written into the episode's entries
    Prompts {
        /// Episode written
        episode: EpisodeId,
        /// Entries that received a prompt
        written: usize,
    },
}

/// Batch pipeline controller.
///
/// Network calls and writes happen here, outside the pure transitions. A
/// failed call or write leaves the state exactly as it was.
pub struct BatchController<D, R, S> {
    driver: D,
    repository: R,
    scenes: S,
    state: BatchState,
    pipeline: PipelineConfig,
    default_shot_number: u32,
}

impl<D, R, S> BatchController<D, R, S>
where
    D: ShotlineDriver,
    R: WorkspaceRepository,
    S: SceneSource,
{
    /// Start a pipeline over `episodes`, in the order given.
    ///
    /// # Errors
    ///
    /// Fails when `episodes` is empty.
    pub fn new(
        driver: D,
        repository: R,
        scenes: S,
        episodes: Vec<EpisodeId>,
        synopsis: impl Into<String>,
        config: &ShotlineConfig,
    ) -> ShotlineResult<Self> {
        let state = BatchState::new(episodes, synopsis, config.pipeline().markers().clone())?;
        Ok(Self {
            driver,
            repository,
            scenes,
            state,
            pipeline: config.pipeline().clone(),
            default_shot_number: *config.reconcile().default_shot_number(),
        })
    }

    /// Current state.
    pub fn state(&self) -> &BatchState {
        &self.state
    }

    /// Underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Record the operator's storyboard guidance.
    pub fn submit_guidance(&mut self, guidance: impl Into<String>) -> ShotlineResult<()> {
        self.transition(BatchEvent::GuidanceSubmitted {
            guidance: guidance.into(),
        })
    }

    /// Replace the context sections with an operator edit.
    pub fn edit_context(&mut self, sections: ContextSections) -> ShotlineResult<()> {
        self.transition(BatchEvent::ContextEdited(sections))
    }

    /// Build the request for the current step and mark it in flight.
    ///
    /// # Errors
    ///
    /// Fails when a request is already in flight, the phase takes no
    /// requests, or the prompt phase runs ahead of a confirmed storyboard.
    #[tracing::instrument(skip(self), fields(phase = %self.state.phase()))]
    pub async fn begin_generation(&mut self) -> ShotlineResult<(RequestId, GenerateRequest)> {
        let markers = self.pipeline.markers();
        let (prompt, context) = match (self.state.phase(), self.state.current_episode()) {
            (BatchPhase::ContextGathering, _) => (
                context_prompt(self.state.guidance(), self.state.synopsis(), markers),
                String::new(),
            ),
            (BatchPhase::StoryboardGeneration, Some(episode)) => {
                let scenes = self.scenes.scenes(episode).await?;
                (
                    storyboard_prompt(episode, &scenes),
                    accumulated_context(
                        self.state.context(),
                        markers,
                        self.state.previous_storyboard(),
                    ),
                )
            }
            (BatchPhase::PromptAuthoring, Some(episode)) => {
                let storyboard = self.state.confirmed_storyboard(episode).ok_or_else(|| {
                    PipelineError::new(PipelineErrorKind::StoryboardNotConfirmed(
                        episode.to_string(),
                    ))
                })?;
                (
                    prompt_authoring_prompt(episode, storyboard),
                    accumulated_context(self.state.context(), markers, None),
                )
            }
            _ => (String::new(), String::new()),
        };

        let request_id = self.state.next_request_id();
        self.transition(BatchEvent::RequestIssued { request_id })?;

        let request = GenerateRequest {
            model: self.pipeline.model().clone(),
            temperature: *self.pipeline.temperature(),
            max_tokens: *self.pipeline.max_tokens(),
            ..GenerateRequest::from_prompt(prompt, context)
        };
        Ok((request_id, request))
    }

    /// Feed the result of a request back into the state.
    ///
    /// Results for stale requests are dropped. Transport failures are
    /// recorded and then returned unchanged.
    pub fn complete_generation(
        &mut self,
        request_id: RequestId,
        result: ShotlineResult<String>,
    ) -> ShotlineResult<()> {
        match result {
            Ok(text) => self.transition(BatchEvent::ReplyReceived { request_id, text }),
            Err(e) => {
                tracing::warn!(request = %request_id, error = %e, "Generation failed");
                self.transition(BatchEvent::RequestFailed {
                    request_id,
                    message: e.to_string(),
                })?;
                Err(e)
            }
        }
    }

    /// Generate the draft for the current step.
    #[tracing::instrument(skip(self), fields(phase = %self.state.phase(), provider = self.driver.provider_name()))]
    pub async fn generate_current(&mut self) -> ShotlineResult<()> {
        let (request_id, request) = self.begin_generation().await?;
        let result = self.driver.generate(&request).await.map(|r| r.text());
        self.complete_generation(request_id, result)
    }

    /// Discard the current draft and generate a new one.
    pub async fn regenerate(&mut self) -> ShotlineResult<()> {
        self.transition(BatchEvent::Regenerate)?;
        self.generate_current().await
    }

    /// Accept the current draft.
    ///
    /// Storyboards are applied to their episode only and prompts are written
    /// by shot number. The state advances only after the write succeeds.
    ///
    /// # Errors
    ///
    /// Fails when the phase has nothing to confirm, the episode has no
    /// scenes, the prompt reply holds no prompts, or storage fails.
    #[tracing::instrument(skip(self), fields(phase = %self.state.phase()))]
    pub async fn confirm(&mut self) -> ShotlineResult<Confirmation> {
        let next = self.state.apply(BatchEvent::Confirm)?;

        let confirmation = match (self.state.current_episode(), self.state.current_draft()) {
            (Some(episode), Some(draft)) if *self.state.phase() == BatchPhase::StoryboardGeneration => {
                let outcome = self.write_storyboard(episode, draft).await?;
                Confirmation::Storyboard {
                    episode: episode.clone(),
                    outcome,
                }
            }
            (Some(episode), Some(draft)) => {
                let written = self.write_prompts(episode, draft).await?;
                Confirmation::Prompts {
                    episode: episode.clone(),
                    written,
                }
            }
            _ => Confirmation::Context,
        };

        self.state = next;
        Ok(confirmation)
    }

    /// Stop the pipeline. Confirmed work stays written.
    pub fn cancel(&mut self) -> ShotlineResult<()> {
        self.transition(BatchEvent::Cancel)
    }

    async fn write_storyboard(
        &self,
        episode: &EpisodeId,
        draft: &str,
    ) -> ShotlineResult<ApplyOutcome> {
        let entries = self.repository.load_entries(episode).await?;
        let scenes = self.scenes.scenes(episode).await?;
        let turn = DialogueTurn::new(Role::Assistant, draft);
        let options = ApplyOptions::new(self.default_shot_number, None, Some(turn.id));
        let outcome = apply_reply_strict(episode, draft, &entries, &scenes, &options)?;

        self.repository.append_turn(episode, &turn).await?;
        if outcome.has_changes() {
            self.repository.save_entries(episode, &outcome.entries).await?;
        }
        match &outcome.warning {
            Some(warning) => tracing::warn!(episode = %episode, %warning, "Storyboard applied with warning"),
            None => tracing::info!(episode = %episode, touched = outcome.touched.len(), "Storyboard applied"),
        }
        Ok(outcome)
    }

    async fn write_prompts(&self, episode: &EpisodeId, draft: &str) -> ShotlineResult<usize> {
        let prompts = parse_prompt_map(draft);
        if prompts.is_empty() {
            return Err(
                PipelineError::new(PipelineErrorKind::EmptyPromptMap(episode.to_string())).into(),
            );
        }

        let mut entries = self.repository.load_entries(episode).await?;
        let written = apply_prompts(&mut entries, &prompts);
        if written > 0 {
            self.repository.save_entries(episode, &entries).await?;
        }
        tracing::info!(episode = %episode, prompts = prompts.len(), written, "Prompts written");
        Ok(written)
    }

    fn transition(&mut self, event: BatchEvent) -> ShotlineResult<()> {
        self.state = self.state.apply(event)?;
        Ok(())
    }
}

impl<D, R, S> BatchController<D, R, S>
where
    D: Streaming,
    R: WorkspaceRepository,
    S: SceneSource,
{
    /// [`generate_current`](Self::generate_current) over a streamed reply.
    ///
    /// A stream that ends without its completion marker counts as a failed
    /// request.
    #[tracing::instrument(skip(self), fields(phase = %self.state.phase(), provider = self.driver.provider_name()))]
    pub async fn generate_current_streaming(&mut self) -> ShotlineResult<()> {
        let (request_id, request) = self.begin_generation().await?;
        let result = match self.driver.generate_stream(&request).await {
            Ok(stream) => collect_stream(stream).await,
            Err(e) => Err(e),
        };
        self.complete_generation(request_id, result)
    }
}
