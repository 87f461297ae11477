//! The batch pipeline as a pure state machine.
//!
//! Transitions never touch the network or storage. The controller issues
//! requests and writes around them, and only commits the next state once
//! its side effects succeed.

use crate::{ContextSections, PipelineResult, SectionMarkers};
use serde::{Deserialize, Serialize};
use shotline_core::EpisodeId;
use shotline_error::{PipelineError, PipelineErrorKind};
use std::collections::HashMap;

/// Phases of the batch pipeline.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    /// Distilling the operator's guidance into context sections
    #[display("gathering context")]
    ContextGathering,
    /// Drafting and confirming one storyboard per episode
    #[display("generating storyboards")]
    StoryboardGeneration,
    /// Drafting and confirming shot prompts per episode
    #[display("authoring prompts")]
    PromptAuthoring,
    /// Every episode went through both stages
    #[display("completed")]
    Completed,
    /// Stopped by the operator
    #[display("cancelled")]
    Cancelled,
}

impl BatchPhase {
    /// Whether no further events are accepted.
    pub fn is_terminal(self) -> bool {
        matches!(self, BatchPhase::Completed | BatchPhase::Cancelled)
    }
}

/// Per-episode stages that hold drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Stage {
    /// Storyboard reply awaiting confirmation
    #[display("storyboard")]
    Storyboard,
    /// Prompt reply awaiting confirmation
    #[display("prompts")]
    Prompts,
}

/// Identity of one issued generation request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{}", _0)]
pub struct RequestId(pub u64);

/// The one request allowed in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("request {} while {}", id, phase)]
pub struct PendingRequest {
    /// Request identity
    pub id: RequestId,
    /// Phase the request was issued in
    pub phase: BatchPhase,
    /// Episode the request is for; none while gathering context
    pub episode: Option<EpisodeId>,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum BatchEvent {
    /// Operator supplied the storyboard guidance document
    #[display("submit guidance")]
    GuidanceSubmitted {
        /// Free-text guidance
        guidance: String,
    },
    /// Operator edited the context sections by hand
    #[display("edit context")]
    ContextEdited(ContextSections),
    /// A generation request was sent for the current step
    #[display("issue a request")]
    RequestIssued {
        /// Identity of the new request
        request_id: RequestId,
    },
    /// A reply arrived
    #[display("receive a reply")]
    ReplyReceived {
        /// Request it answers
        request_id: RequestId,
        /// Full reply text
        text: String,
    },
    /// A request failed in transport
    #[display("record a failed request")]
    RequestFailed {
        /// Request that failed
        request_id: RequestId,
        /// Failure description for the operator
        message: String,
    },
    /// Operator discarded the current draft
    #[display("regenerate")]
    Regenerate,
    /// Operator accepted the current draft
    #[display("confirm")]
    Confirm,
    /// Operator stopped the pipeline
    #[display("cancel")]
    Cancel,
}

/// Full pipeline state.
///
/// Confirmation is the only durable commit point: cancelling discards drafts
/// but never what was already confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct BatchState {
    /// Current phase
    phase: BatchPhase,
    /// Episodes in their natural order
    episodes: Vec<EpisodeId>,
    /// Index of the current episode in the per-episode phases
    cursor: usize,
    /// Operator's storyboard guidance
    guidance: String,
    /// Project synopsis the context is distilled from
    synopsis: String,
    /// Markers the context reply is split at
    markers: SectionMarkers,
    /// Context sections, drafted then confirmed
    context: ContextSections,
    /// Unconfirmed replies per episode and stage
    drafts: HashMap<EpisodeId, HashMap<Stage, String>>,
    /// Storyboard text confirmed per episode
    confirmed_storyboards: HashMap<EpisodeId, String>,
    /// Episodes whose prompts were confirmed, in order
    prompted: Vec<EpisodeId>,
    /// Request in flight, if any
    pending: Option<PendingRequest>,
    /// Highest request id issued so far
    issued: u64,
    /// Last transport failure, cleared by the next request
    last_error: Option<String>,
}

impl BatchState {
    /// Start a pipeline over `episodes`.
    ///
    /// # Errors
    ///
    /// Fails when `episodes` is empty.
    pub fn new(
        episodes: Vec<EpisodeId>,
        synopsis: impl Into<String>,
        markers: SectionMarkers,
    ) -> PipelineResult<Self> {
        if episodes.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::NoEpisodes));
        }
        Ok(Self {
            phase: BatchPhase::ContextGathering,
            episodes,
            cursor: 0,
            guidance: String::new(),
            synopsis: synopsis.into(),
            markers,
            context: ContextSections::default(),
            drafts: HashMap::new(),
            confirmed_storyboards: HashMap::new(),
            prompted: Vec::new(),
            pending: None,
            issued: 0,
            last_error: None,
        })
    }

    /// Episode the per-episode phases are working on.
    pub fn current_episode(&self) -> Option<&EpisodeId> {
        match self.phase {
            BatchPhase::StoryboardGeneration | BatchPhase::PromptAuthoring => {
                self.episodes.get(self.cursor)
            }
            _ => None,
        }
    }

    /// Stage the current phase drafts into.
    pub fn current_stage(&self) -> Option<Stage> {
        match self.phase {
            BatchPhase::StoryboardGeneration => Some(Stage::Storyboard),
            BatchPhase::PromptAuthoring => Some(Stage::Prompts),
            _ => None,
        }
    }

    /// Unconfirmed reply for the current episode and stage.
    pub fn current_draft(&self) -> Option<&str> {
        self.draft(self.current_episode()?, self.current_stage()?)
    }

    /// Unconfirmed reply for an episode and stage.
    pub fn draft(&self, episode: &EpisodeId, stage: Stage) -> Option<&str> {
        self.drafts
            .get(episode)
            .and_then(|stages| stages.get(&stage))
            .map(String::as_str)
    }

    /// Storyboard confirmed for an episode.
    pub fn confirmed_storyboard(&self, episode: &EpisodeId) -> Option<&str> {
        self.confirmed_storyboards.get(episode).map(String::as_str)
    }

    /// Storyboard confirmed for the episode before the current one.
    pub fn previous_storyboard(&self) -> Option<&str> {
        let previous = self.cursor.checked_sub(1)?;
        self.confirmed_storyboard(self.episodes.get(previous)?)
    }

    /// Identity for the next request.
    pub fn next_request_id(&self) -> RequestId {
        RequestId(self.issued + 1)
    }

    /// Apply one event, returning the next state.
    ///
    /// Replies and failures for anything but the pending request are stale
    /// (cancelled, regenerated or already answered) and leave the state as is.
    ///
    /// # Errors
    ///
    /// Fails when the event is not allowed in the current phase or its
    /// preconditions do not hold; `self` is never modified.
    pub fn apply(&self, event: BatchEvent) -> PipelineResult<Self> {
        let mut next = self.clone();
        match event {
            BatchEvent::GuidanceSubmitted { guidance } => {
                self.require(&[BatchPhase::ContextGathering], "submit guidance")?;
                next.guidance = guidance;
            }
            BatchEvent::ContextEdited(sections) => {
                self.require_active("edit context")?;
                next.context = sections;
            }
            BatchEvent::RequestIssued { request_id } => {
                self.require_active("issue a request")?;
                if let Some(pending) = &self.pending {
                    return Err(PipelineError::new(PipelineErrorKind::RequestInFlight(
                        pending.to_string(),
                    )));
                }
                let episode = self.current_episode().cloned();
                if let (BatchPhase::PromptAuthoring, Some(episode)) = (self.phase, &episode) {
                    if !self.confirmed_storyboards.contains_key(episode) {
                        return Err(PipelineError::new(
                            PipelineErrorKind::StoryboardNotConfirmed(episode.to_string()),
                        ));
                    }
                }
                tracing::debug!(request = %request_id, phase = %self.phase, "Request issued");
                next.pending = Some(PendingRequest {
                    id: request_id,
                    phase: self.phase,
                    episode,
                });
                next.issued = self.issued.max(request_id.0);
                next.last_error = None;
            }
            BatchEvent::ReplyReceived { request_id, text } => {
                if !self.is_pending(request_id) {
                    tracing::debug!(request = %request_id, "Ignoring stale reply");
                    return Ok(next);
                }
                next.pending = None;
                match (self.current_episode(), self.current_stage()) {
                    (Some(episode), Some(stage)) => {
                        next.drafts
                            .entry(episode.clone())
                            .or_default()
                            .insert(stage, text);
                    }
                    _ => next.context = ContextSections::split(&text, &self.markers),
                }
            }
            BatchEvent::RequestFailed {
                request_id,
                message,
            } => {
                if !self.is_pending(request_id) {
                    tracing::debug!(request = %request_id, "Ignoring stale failure");
                    return Ok(next);
                }
                next.pending = None;
                next.last_error = Some(message);
            }
            BatchEvent::Regenerate => {
                self.require_active("regenerate")?;
                next.pending = None;
                match (self.current_episode(), self.current_stage()) {
                    (Some(episode), Some(stage)) => {
                        if let Some(stages) = next.drafts.get_mut(episode) {
                            stages.remove(&stage);
                        }
                    }
                    _ => next.context = ContextSections::default(),
                }
            }
            BatchEvent::Confirm => {
                self.require_active("confirm")?;
                if let Some(pending) = &self.pending {
                    return Err(PipelineError::new(PipelineErrorKind::RequestInFlight(
                        pending.to_string(),
                    )));
                }
                next.confirm()?;
            }
            BatchEvent::Cancel => {
                self.require_active("cancel")?;
                tracing::info!(phase = %self.phase, "Batch pipeline cancelled");
                next.phase = BatchPhase::Cancelled;
                next.pending = None;
                next.drafts.clear();
            }
        }
        Ok(next)
    }

    fn confirm(&mut self) -> PipelineResult<()> {
        match self.phase {
            BatchPhase::ContextGathering => {
                let missing = self.context.missing();
                if !missing.is_empty() {
                    return Err(PipelineError::new(PipelineErrorKind::IncompleteContext(
                        missing.join(", "),
                    )));
                }
                self.phase = BatchPhase::StoryboardGeneration;
                self.cursor = 0;
            }
            BatchPhase::StoryboardGeneration | BatchPhase::PromptAuthoring => {
                let (episode, stage) = match (self.current_episode(), self.current_stage()) {
                    (Some(episode), Some(stage)) => (episode.clone(), stage),
                    _ => return Err(self.invalid("confirm")),
                };
                let draft = self
                    .drafts
                    .get_mut(&episode)
                    .and_then(|stages| stages.remove(&stage))
                    .ok_or_else(|| {
                        PipelineError::new(PipelineErrorKind::NoDraft(format!(
                            "the {} of episode '{}'",
                            stage, episode
                        )))
                    })?;
                match stage {
                    Stage::Storyboard => {
                        self.confirmed_storyboards.insert(episode.clone(), draft);
                    }
                    Stage::Prompts => self.prompted.push(episode.clone()),
                }
                tracing::info!(episode = %episode, %stage, "Confirmed");
                self.advance();
            }
            BatchPhase::Completed | BatchPhase::Cancelled => return Err(self.invalid("confirm")),
        }
        Ok(())
    }

    fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor < self.episodes.len() {
            return;
        }
        self.cursor = 0;
        self.phase = match self.phase {
            BatchPhase::StoryboardGeneration => BatchPhase::PromptAuthoring,
            _ => BatchPhase::Completed,
        };
        tracing::info!(phase = %self.phase, "Batch pipeline advanced");
    }

    fn is_pending(&self, request_id: RequestId) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.id == request_id)
    }

    fn require(&self, phases: &[BatchPhase], event: &str) -> PipelineResult<()> {
        if phases.contains(&self.phase) {
            Ok(())
        } else {
            Err(self.invalid(event))
        }
    }

    fn require_active(&self, event: &str) -> PipelineResult<()> {
        if self.phase.is_terminal() {
            Err(self.invalid(event))
        } else {
            Ok(())
        }
    }

    #[track_caller]
    fn invalid(&self, event: &str) -> PipelineError {
        PipelineError::new(PipelineErrorKind::InvalidTransition {
            phase: self.phase.to_string(),
            event: event.to_string(),
        })
    }
}
