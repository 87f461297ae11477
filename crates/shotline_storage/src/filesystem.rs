//! Filesystem-based workspace storage.
//!
//! Each episode lives in its own directory under the base path:
//!
//! ```text
//! {base_path}/
//! ├── ep-1/
//! │   ├── workspace.json   (entries + dialogue log)
//! │   └── scenes.json      (read by FileSystemSceneSource)
//! └── ep-2/
//!     └── workspace.json
//! ```

use async_trait::async_trait;
use shotline_core::{DialogueTurn, EpisodeId, EpisodeWorkspace, StoredShotEntry};
use shotline_error::{ShotlineResult, StorageError, StorageErrorKind};
use shotline_interface::WorkspaceRepository;
use std::path::{Path, PathBuf};

const WORKSPACE_FILE: &str = "workspace.json";

/// Filesystem storage backend, one JSON document per episode.
#[derive(Debug, Clone)]
pub struct FileSystemWorkspaceStore {
    base_path: PathBuf,
}

impl FileSystemWorkspaceStore {
    /// Create a new filesystem store rooted at `base_path`.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> ShotlineResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Opened workspace store");
        Ok(Self { base_path })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Directory holding one episode's files.
    pub(crate) fn episode_dir(base: &Path, episode: &EpisodeId) -> ShotlineResult<PathBuf> {
        let raw = episode.as_str();
        // Leading dots cover "." and ".." as well as hidden names
        if raw.is_empty() || raw.starts_with('.') || raw.contains(['/', '\\']) {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(format!(
                "episode id '{}' cannot be used as a directory name",
                raw
            )))
            .into());
        }
        Ok(base.join(raw))
    }

    fn workspace_path(&self, episode: &EpisodeId) -> ShotlineResult<PathBuf> {
        Ok(Self::episode_dir(&self.base_path, episode)?.join(WORKSPACE_FILE))
    }

    /// Read the full workspace document, or an empty one if none exists yet.
    #[tracing::instrument(skip(self), fields(episode = %episode))]
    pub async fn load_workspace(&self, episode: &EpisodeId) -> ShotlineResult<EpisodeWorkspace> {
        let path = self.workspace_path(episode)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "No workspace yet, starting empty");
            return Ok(EpisodeWorkspace::new(episode.clone()));
        }

        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        let workspace: EpisodeWorkspace = serde_json::from_str(&raw).map_err(|e| {
            StorageError::new(StorageErrorKind::Corrupt(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;

        tracing::debug!(
            entries = workspace.entries.len(),
            turns = workspace.turns.len(),
            "Loaded workspace"
        );
        Ok(workspace)
    }

    /// Replace the workspace document atomically.
    #[tracing::instrument(skip(self, workspace), fields(episode = %workspace.episode_id, entries = workspace.entries.len()))]
    pub async fn write_workspace(&self, workspace: &EpisodeWorkspace) -> ShotlineResult<()> {
        let path = self.workspace_path(&workspace.episode_id)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let contents = serde_json::to_string_pretty(workspace).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "failed to serialize workspace: {}",
                e
            )))
        })?;

        // Temp file + rename keeps the previous document intact on failure
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, contents).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %path.display(), "Wrote workspace");
        Ok(())
    }
}

#[async_trait]
impl WorkspaceRepository for FileSystemWorkspaceStore {
    async fn load_entries(&self, episode: &EpisodeId) -> ShotlineResult<Vec<StoredShotEntry>> {
        Ok(self.load_workspace(episode).await?.entries)
    }

    async fn save_entries(
        &self,
        episode: &EpisodeId,
        entries: &[StoredShotEntry],
    ) -> ShotlineResult<()> {
        let mut workspace = self.load_workspace(episode).await?;
        workspace.entries = entries.to_vec();
        self.write_workspace(&workspace).await
    }

    async fn load_turns(&self, episode: &EpisodeId) -> ShotlineResult<Vec<DialogueTurn>> {
        Ok(self.load_workspace(episode).await?.turns)
    }

    async fn append_turn(&self, episode: &EpisodeId, turn: &DialogueTurn) -> ShotlineResult<()> {
        let mut workspace = self.load_workspace(episode).await?;
        workspace.turns.push(turn.clone());
        self.write_workspace(&workspace).await
    }
}
