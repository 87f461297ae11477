//! Episode workspace persistence backends for Shotline.
//!
//! This crate provides implementations of the
//! [`WorkspaceRepository`](shotline_interface::WorkspaceRepository) and
//! [`SceneSource`](shotline_interface::SceneSource) collaborator traits.
//!
//! # Features
//!
//! - **Whole-document writes**: an episode's workspace is one JSON document,
//!   replaced atomically (temp file + rename) on every save
//! - **In-memory backends**: for tests and embedding hosts that own persistence
//!
//! # Example
//!
//! ```rust
//! use shotline_interface::WorkspaceRepository;
//! use shotline_storage::FileSystemWorkspaceStore;
//! use shotline_core::EpisodeId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileSystemWorkspaceStore::new("/tmp/shotline")?;
//! let entries = store.load_entries(&EpisodeId::new("ep-1")).await?;
//! assert!(entries.is_empty());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod memory;
mod scenes;

pub use filesystem::FileSystemWorkspaceStore;
pub use memory::InMemoryWorkspaceStore;
pub use scenes::{FileSystemSceneSource, InMemorySceneSource};
