//! Multi-episode batch storyboard pipeline for Shotline.
//!
//! The pipeline walks every episode through two generation stages with a
//! human confirmation gate on each step:
//!
//! ```text
//! ContextGathering ──► StoryboardGeneration ──► PromptAuthoring ──► Completed
//!        │            (one episode at a time)  (one episode at a time)
//!        └───────────────────── Cancel ─────────────────────────► Cancelled
//! ```
//!
//! [`BatchState`] is a pure state machine; [`BatchController`] issues the
//! model requests and storage writes around it. Confirmation is the only
//! durable commit point.
//!
//! Configuration ([`ShotlineConfig`]) also lives here, since the pipeline is
//! its main consumer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod controller;
mod prompt_map;
mod prompts;
mod state;

pub use config::{PipelineConfig, ReconcileConfig, ShotlineConfig, StorageConfig};
pub use context::{ContextSections, SectionMarkers};
pub use controller::{BatchController, Confirmation};
pub use prompt_map::{PromptMap, apply_prompts, parse_prompt_map};
pub use prompts::{
    accumulated_context, context_prompt, prompt_authoring_prompt, storyboard_prompt,
};
pub use state::{BatchEvent, BatchPhase, BatchState, PendingRequest, RequestId, Stage};

/// Result type for pure pipeline transitions.
pub type PipelineResult<T> = std::result::Result<T, shotline_error::PipelineError>;
