//! Core data types for the Shotline storyboard reconciliation engine.
//!
//! This crate provides the data model shared by every Shotline crate: the
//! canonical [`Shot`], the persisted and versioned [`StoredShotEntry`] with its
//! append-only [`Revision`] log, the externally owned [`Scene`], the
//! per-episode [`EpisodeWorkspace`], and the request/response types handed to
//! language-model drivers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod entry;
mod ids;
mod message;
mod request;
mod role;
mod scene;
mod shot;
mod workspace;

pub use entry::{Revision, ShotStatus, StoredShotEntry};
pub use ids::{EntryId, EpisodeId, SceneId, TurnId};
pub use message::Message;
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse, Output};
pub use role::Role;
pub use scene::Scene;
pub use shot::{Shot, ShotField};
pub use workspace::{DialogueTurn, EpisodeWorkspace};
