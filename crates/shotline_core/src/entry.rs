//! Stored shot entries and their append-only revision history.

use crate::{EntryId, Role, SceneId, Shot, TurnId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review lifecycle of a stored shot entry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ShotStatus {
    /// Edited by hand, not yet submitted for review
    #[display("draft")]
    Draft,
    /// Written or rewritten by the engine, awaiting a human look
    #[default]
    #[display("pending review")]
    PendingReview,
    /// Signed off by a reviewer
    #[display("approved")]
    Approved,
}

/// Immutable snapshot of a shot at one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Version this revision created
    pub version: u32,
    /// Who made the change
    pub author: Role,
    /// Human-readable account of what changed
    pub summary: String,
    /// Full shot state at this version
    pub snapshot: Shot,
    /// Dialogue turn that produced the change, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_turn: Option<TurnId>,
    /// When the revision was recorded
    pub created_at: DateTime<Utc>,
}

/// Persisted, versioned record wrapping a [`Shot`].
///
/// The entry is created once for a `(scene, shot number)` pair and mutated in
/// place afterwards. Each mutation that touches shot content bumps `version`
/// and appends exactly one [`Revision`]; revisions are never edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredShotEntry {
    /// Stable identity, never reused
    pub id: EntryId,
    /// Owning scene
    pub scene_id: SceneId,
    /// Scene title, kept in sync with the scene on each rebuild
    #[serde(default)]
    pub scene_title: String,
    /// Scene summary, kept in sync with the scene on each rebuild
    #[serde(default)]
    pub scene_summary: String,
    /// Current shot content
    pub shot: Shot,
    /// Review status
    #[serde(default)]
    pub status: ShotStatus,
    /// Current version, starting at 1
    pub version: u32,
    /// Audit trail, oldest first
    #[serde(default)]
    pub revisions: Vec<Revision>,
    /// Dialogue turn behind the latest change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_turn: Option<TurnId>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl StoredShotEntry {
    /// Create an entry at version 1 with its seed revision.
    pub fn new(
        scene_id: SceneId,
        shot: Shot,
        author: Role,
        summary: impl Into<String>,
        source_turn: Option<TurnId>,
        now: DateTime<Utc>,
    ) -> Self {
        let seed = Revision {
            version: 1,
            author,
            summary: summary.into(),
            snapshot: shot.clone(),
            source_turn,
            created_at: now,
        };
        Self {
            id: EntryId::new(),
            scene_id,
            scene_title: String::new(),
            scene_summary: String::new(),
            shot,
            status: ShotStatus::PendingReview,
            version: 1,
            revisions: vec![seed],
            source_turn,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the shot content and record the change as a new revision.
    ///
    /// Always bumps the version, even when `shot` equals the current content:
    /// every touch is part of the audit trail.
    pub fn record_revision(
        &mut self,
        shot: Shot,
        author: Role,
        summary: impl Into<String>,
        source_turn: Option<TurnId>,
        now: DateTime<Utc>,
    ) -> &Revision {
        self.version += 1;
        self.shot = shot;
        self.source_turn = source_turn;
        self.updated_at = now;
        self.revisions.push(Revision {
            version: self.version,
            author,
            summary: summary.into(),
            snapshot: self.shot.clone(),
            source_turn,
            created_at: now,
        });
        &self.revisions[self.revisions.len() - 1]
    }

    /// Most recent revision.
    pub fn latest_revision(&self) -> Option<&Revision> {
        self.revisions.last()
    }

    /// Revision recorded for a given version.
    pub fn revision(&self, version: u32) -> Option<&Revision> {
        self.revisions.iter().find(|rev| rev.version == version)
    }

    /// Compound identity used by reconciliation.
    pub fn key(&self) -> (&SceneId, u32) {
        (&self.scene_id, self.shot.shot_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_starts_at_version_one_with_seed_revision() {
        let now = Utc::now();
        let entry = StoredShotEntry::new(
            SceneId::new("s1"),
            Shot::numbered(1),
            Role::Assistant,
            "created",
            None,
            now,
        );
        assert_eq!(entry.version, 1);
        assert_eq!(entry.revisions.len(), 1);
        assert_eq!(entry.revisions[0].version, 1);
        assert_eq!(entry.status, ShotStatus::PendingReview);
    }

    #[test]
    fn record_revision_bumps_even_without_changes() {
        let now = Utc::now();
        let mut entry = StoredShotEntry::new(
            SceneId::new("s1"),
            Shot::numbered(1),
            Role::Assistant,
            "created",
            None,
            now,
        );
        let same = entry.shot.clone();
        entry.record_revision(same, Role::Assistant, "again", None, now);
        assert_eq!(entry.version, 2);
        assert_eq!(entry.revisions.len(), 2);
        assert_eq!(entry.latest_revision().map(|rev| rev.version), Some(2));
        assert!(entry.revision(1).is_some());
        assert!(entry.revision(3).is_none());
    }
}
