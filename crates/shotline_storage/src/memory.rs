//! In-memory implementation of WorkspaceRepository.
//!
//! Stores workspaces in a HashMap protected by an RwLock. All data is lost
//! when the store is dropped. Useful for tests and for hosts that persist
//! workspaces themselves.

use async_trait::async_trait;
use shotline_core::{DialogueTurn, EpisodeId, EpisodeWorkspace, StoredShotEntry};
use shotline_error::ShotlineResult;
use shotline_interface::WorkspaceRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory workspace store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkspaceStore {
    workspaces: Arc<RwLock<HashMap<EpisodeId, EpisodeWorkspace>>>,
    entry_writes: Arc<RwLock<usize>>,
}

impl InMemoryWorkspaceStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save_entries` calls served so far (for testing).
    pub async fn entry_writes(&self) -> usize {
        *self.entry_writes.read().await
    }

    /// Snapshot of an episode's workspace, if one was ever written.
    pub async fn workspace(&self, episode: &EpisodeId) -> Option<EpisodeWorkspace> {
        self.workspaces.read().await.get(episode).cloned()
    }
}

#[async_trait]
impl WorkspaceRepository for InMemoryWorkspaceStore {
    async fn load_entries(&self, episode: &EpisodeId) -> ShotlineResult<Vec<StoredShotEntry>> {
        Ok(self
            .workspaces
            .read()
            .await
            .get(episode)
            .map(|workspace| workspace.entries.clone())
            .unwrap_or_default())
    }

    async fn save_entries(
        &self,
        episode: &EpisodeId,
        entries: &[StoredShotEntry],
    ) -> ShotlineResult<()> {
        let mut workspaces = self.workspaces.write().await;
        workspaces
            .entry(episode.clone())
            .or_insert_with(|| EpisodeWorkspace::new(episode.clone()))
            .entries = entries.to_vec();
        drop(workspaces);

        *self.entry_writes.write().await += 1;
        Ok(())
    }

    async fn load_turns(&self, episode: &EpisodeId) -> ShotlineResult<Vec<DialogueTurn>> {
        Ok(self
            .workspaces
            .read()
            .await
            .get(episode)
            .map(|workspace| workspace.turns.clone())
            .unwrap_or_default())
    }

    async fn append_turn(&self, episode: &EpisodeId, turn: &DialogueTurn) -> ShotlineResult<()> {
        self.workspaces
            .write()
            .await
            .entry(episode.clone())
            .or_insert_with(|| EpisodeWorkspace::new(episode.clone()))
            .turns
            .push(turn.clone());
        Ok(())
    }
}
