//! Error types for the Shotline workspace.
//!
//! This crate provides the foundation error types used by every Shotline crate.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Recoverable reconciliation outcomes (an unparseable reply, a reply whose
//! shots match no scene) are *not* errors; they travel as warnings on the
//! apply outcome. The types here cover failures the caller must handle.
//!
//! # Examples
//!
//! ```
//! use shotline_error::{BackendError, ShotlineResult};
//!
//! fn submit() -> ShotlineResult<String> {
//!     Err(BackendError::new("Connection refused"))?
//! }
//!
//! assert!(submit().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod error;
mod json;
mod pipeline;
mod storage;
mod workspace;

pub use backend::BackendError;
pub use config::ConfigError;
pub use error::{ShotlineError, ShotlineErrorKind, ShotlineResult};
pub use json::JsonError;
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use workspace::{WorkspaceError, WorkspaceErrorKind};
