//! Scene sources.
//!
//! Scenes are owned by the script editor; these sources only read them.

use crate::FileSystemWorkspaceStore;
use async_trait::async_trait;
use shotline_core::{EpisodeId, Scene};
use shotline_error::{ShotlineResult, StorageError, StorageErrorKind};
use shotline_interface::SceneSource;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

const SCENES_FILE: &str = "scenes.json";

fn ordered(mut scenes: Vec<Scene>) -> Vec<Scene> {
    scenes.sort_by_key(|scene| *scene.order());
    scenes
}

/// Scenes held in memory, keyed by episode.
#[derive(Debug, Clone, Default)]
pub struct InMemorySceneSource {
    scenes: Arc<RwLock<HashMap<EpisodeId, Vec<Scene>>>>,
}

impl InMemorySceneSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the scenes of an episode, as the script editor would.
    pub async fn set_scenes(&self, episode: &EpisodeId, scenes: Vec<Scene>) {
        self.scenes.write().await.insert(episode.clone(), scenes);
    }
}

#[async_trait]
impl SceneSource for InMemorySceneSource {
    async fn scenes(&self, episode: &EpisodeId) -> ShotlineResult<Vec<Scene>> {
        let scenes = self
            .scenes
            .read()
            .await
            .get(episode)
            .cloned()
            .unwrap_or_default();
        Ok(ordered(scenes))
    }
}

/// Scenes read from `{base_path}/{episode}/scenes.json`.
///
/// A missing file means the episode has no scenes yet.
#[derive(Debug, Clone)]
pub struct FileSystemSceneSource {
    base_path: PathBuf,
}

impl FileSystemSceneSource {
    /// Create a source rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

#[async_trait]
impl SceneSource for FileSystemSceneSource {
    #[tracing::instrument(skip(self), fields(episode = %episode))]
    async fn scenes(&self, episode: &EpisodeId) -> ShotlineResult<Vec<Scene>> {
        let path = FileSystemWorkspaceStore::episode_dir(&self.base_path, episode)?.join(SCENES_FILE);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "No scenes file");
            return Ok(Vec::new());
        }

        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        let scenes: Vec<Scene> = serde_json::from_str(&raw).map_err(|e| {
            StorageError::new(StorageErrorKind::Corrupt(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        Ok(ordered(scenes))
    }
}
