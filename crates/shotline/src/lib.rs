//! Shotline - storyboard shots that stay in step with the script
//!
//! Shotline keeps an episode's storyboard as a collection of versioned shot
//! entries attached to the scenes of a screenplay. Language-model replies are
//! parsed tolerantly and merged into that collection without ever losing an
//! earlier version, and a batch pipeline walks every episode of a project
//! through storyboard and prompt generation with a confirmation gate on each
//! step.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use shotline::{
//!     ApplyRequest, EpisodeId, EpisodeService, FileSystemSceneSource, FileSystemWorkspaceStore,
//! };
//!
//! # async fn run() -> shotline::ShotlineResult<()> {
//! let store = FileSystemWorkspaceStore::new("./workspaces")?;
//! let scenes = FileSystemSceneSource::new("./workspaces");
//! let service = EpisodeService::new(store, scenes);
//!
//! let reply = r#"{"entries":[{"sceneId":"s1","shotNumber":1,"visual":"Wide rooftop"}]}"#;
//! let request = ApplyRequest::builder().reply(reply).build().unwrap();
//! let outcome = service.apply_reply(&EpisodeId::new("ep-1"), request).await?;
//! println!("{} entries touched", outcome.touched.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `shotline_error` - Error types
//! - `shotline_core` - Shots, entries, scenes and requests
//! - `shotline_interface` - Driver, repository and scene-source traits
//! - `shotline_storage` - File-system and in-memory workspace stores
//! - `shotline_reconcile` - Reply parsing, scene resolution, versioned merge
//! - `shotline_pipeline` - Batch pipeline state machine and configuration
//!
//! This crate re-exports everything and ships the `shotline` binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod logging;
mod report;

pub use logging::{LoggingConfig, init_logging};
pub use report::{entries_report, history_report, outcome_report};

pub use shotline_core::*;
pub use shotline_error::*;
pub use shotline_interface::*;
pub use shotline_pipeline::*;
pub use shotline_reconcile::*;
pub use shotline_storage::*;
