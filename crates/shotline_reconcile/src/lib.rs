//! Tolerant parsing and versioned reconciliation of model-written storyboards.
//!
//! A reply flows through five stages:
//!
//! 1. [`extract_json_span`] finds the JSON payload inside prose or fences
//! 2. [`normalize_shots`] decodes any accepted envelope into [`ParsedShot`]s
//! 3. [`resolve_scene`] binds each shot to a scene of the episode
//! 4. [`ShotSequencer`] fills in missing shot numbers
//! 5. [`reconcile`] merges the shots into the versioned entry collection
//!
//! [`apply_reply`] runs all five as one pure function; [`EpisodeService`]
//! wraps it with persistence for the interactive editor.
//!
//! # Example
//!
//! ```
//! use shotline_core::{Scene, ShotStatus};
//! use shotline_reconcile::{apply_reply, ApplyOptions};
//!
//! let scenes = vec![Scene::builder().id("s1").order(1).build().unwrap()];
//! let reply = r#"{"entries":[{"shotNumber":1,"shotScale":"close","dialogue":"Hello"}]}"#;
//!
//! let first = apply_reply(reply, &[], &scenes, &ApplyOptions::default());
//! let second = apply_reply(reply, &first.entries, &scenes, &ApplyOptions::default());
//!
//! assert_eq!(second.entries.len(), 1);
//! assert_eq!(second.entries[0].version, 2);
//! assert_eq!(second.entries[0].status, ShotStatus::PendingReview);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod apply;
mod extraction;
mod normalizer;
mod reconciler;
mod resolver;
mod scene_links;
mod sequencer;
mod service;

pub use apply::{
    ApplyOptions, ApplyOptionsBuilder, ApplyOutcome, ApplyWarning, apply_reply,
    apply_reply_strict,
};
pub use extraction::extract_json_span;
pub use normalizer::{ParsedShot, SceneHint, normalize_shots};
pub use reconciler::{BoundShot, ReconcileContext, Reconciliation, reconcile, sort_entries};
pub use resolver::{lowest_order, resolve_scene};
pub use scene_links::reconcile_scene_links;
pub use sequencer::ShotSequencer;
pub use service::{ApplyRequest, ApplyRequestBuilder, EpisodeService};
