//! Persistence and scene-source collaborator traits.

use async_trait::async_trait;
use shotline_core::{DialogueTurn, EpisodeId, Scene, StoredShotEntry};
use shotline_error::ShotlineResult;

/// Whole-collection persistence for episode workspaces.
///
/// Entries are always saved as a complete replacement; there is no partial
/// update API. A save is all-or-nothing so a crash can lose the write in
/// progress but never leave a half-merged collection behind.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Load the stored shot entries of an episode (empty if none yet).
    async fn load_entries(&self, episode: &EpisodeId) -> ShotlineResult<Vec<StoredShotEntry>>;

    /// Replace the stored shot entries of an episode.
    async fn save_entries(
        &self,
        episode: &EpisodeId,
        entries: &[StoredShotEntry],
    ) -> ShotlineResult<()>;

    /// Load the dialogue log of an episode, oldest first.
    async fn load_turns(&self, episode: &EpisodeId) -> ShotlineResult<Vec<DialogueTurn>>;

    /// Append one turn to the dialogue log.
    async fn append_turn(&self, episode: &EpisodeId, turn: &DialogueTurn) -> ShotlineResult<()>;
}

/// Read-only access to the scenes of an episode.
#[async_trait]
pub trait SceneSource: Send + Sync {
    /// Scenes of the episode ordered by their order index.
    async fn scenes(&self, episode: &EpisodeId) -> ShotlineResult<Vec<Scene>>;
}
