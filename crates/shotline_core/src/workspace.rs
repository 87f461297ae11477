//! The per-episode persistence unit.

use crate::{EpisodeId, Role, StoredShotEntry, TurnId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message in the episode's conversation with the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTurn {
    /// Stable identity; referenced by revisions it produced
    pub id: TurnId,
    /// Speaker
    pub role: Role,
    /// Message text as sent or received
    pub text: String,
    /// When the turn was logged
    pub created_at: DateTime<Utc>,
}

impl DialogueTurn {
    /// Create a turn stamped now.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Everything persisted for one episode: its shot entries and dialogue log.
///
/// `entries` is always stored sorted by shot number with no duplicate
/// `(scene, shot number)` pair; writers replace it as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeWorkspace {
    /// Episode this workspace belongs to
    pub episode_id: EpisodeId,
    /// Stored shot entries
    #[serde(default)]
    pub entries: Vec<StoredShotEntry>,
    /// Dialogue log, oldest first
    #[serde(default)]
    pub turns: Vec<DialogueTurn>,
}

impl EpisodeWorkspace {
    /// Empty workspace for an episode.
    pub fn new(episode_id: EpisodeId) -> Self {
        Self {
            episode_id,
            entries: Vec::new(),
            turns: Vec::new(),
        }
    }
}
