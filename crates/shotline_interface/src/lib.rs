//! Collaborator trait definitions for the Shotline reconciliation engine.
//!
//! The engine owns no network protocol and no storage format. It talks to
//! its collaborators through the traits in this crate:
//!
//! - [`ShotlineDriver`] / [`Streaming`]: the language-model transport
//! - [`WorkspaceRepository`]: whole-collection persistence per episode
//! - [`SceneSource`]: read-only access to the script editor's scenes

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod repository;
mod stream;
mod traits;
mod types;

pub use repository::{SceneSource, WorkspaceRepository};
pub use stream::{collect_stream, submit};
pub use traits::{ShotlineDriver, Streaming};
pub use types::{FinishReason, StreamChunk};
