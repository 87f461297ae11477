//! Merging bound shots into the stored entry collection.

use chrono::{DateTime, Utc};
use shotline_core::{
    EntryId, Role, Scene, SceneId, Shot, ShotField, ShotStatus, StoredShotEntry, TurnId,
};
use std::collections::HashMap;

/// A shot whose scene and number are final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundShot {
    /// Resolved owning scene
    pub scene_id: SceneId,
    /// Canonical fields with the sequenced shot number
    pub shot: Shot,
}

/// Provenance stamped onto every entry a reconciliation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileContext {
    /// Dialogue turn the shots came from
    pub source_turn: Option<TurnId>,
    /// Timestamp for revisions and `updated_at`
    pub now: DateTime<Utc>,
}

impl ReconcileContext {
    /// Context stamped now.
    pub fn now(source_turn: Option<TurnId>) -> Self {
        Self {
            source_turn,
            now: Utc::now(),
        }
    }
}

/// Result of merging a batch of shots.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Full replacement collection, sorted by shot number
    pub entries: Vec<StoredShotEntry>,
    /// Entries created or updated, in input order without repeats
    pub touched: Vec<EntryId>,
}

/// Merge bound shots into `entries`, keyed by `(scene, shot number)`.
///
/// A matching entry is overwritten: version + 1, prompt blanked, status reset
/// to pending review, and one assistant revision naming the changed fields.
/// The bump happens even when nothing changed. Unmatched shots become new
/// entries at version 1. Entries are never removed. The result is sorted by
/// shot number, ties by creation time.
pub fn reconcile(
    entries: Vec<StoredShotEntry>,
    shots: Vec<BoundShot>,
    scenes: &[Scene],
    context: &ReconcileContext,
) -> Reconciliation {
    let mut entries = entries;
    if shots.is_empty() {
        return Reconciliation {
            entries,
            touched: Vec::new(),
        };
    }

    let mut index: HashMap<(SceneId, u32), usize> = entries
        .iter()
        .enumerate()
        .map(|(position, entry)| ((entry.scene_id.clone(), entry.shot.shot_number), position))
        .collect();
    let scene_by_id: HashMap<&SceneId, &Scene> =
        scenes.iter().map(|scene| (scene.id(), scene)).collect();
    let mut touched = Vec::new();

    for BoundShot { scene_id, mut shot } in shots {
        shot.prompt.clear();
        let key = (scene_id.clone(), shot.shot_number);

        let position = match index.get(&key) {
            Some(&position) => {
                let entry = &mut entries[position];
                let summary = update_summary(&entry.shot.changed_fields(&shot));
                entry.record_revision(
                    shot,
                    Role::Assistant,
                    summary,
                    context.source_turn,
                    context.now,
                );
                entry.status = ShotStatus::PendingReview;
                tracing::debug!(
                    entry = %entry.id,
                    scene = %entry.scene_id,
                    shot_number = entry.shot.shot_number,
                    version = entry.version,
                    "Updated shot entry"
                );
                position
            }
            None => {
                let entry = StoredShotEntry::new(
                    scene_id,
                    shot,
                    Role::Assistant,
                    "Created from assistant reply",
                    context.source_turn,
                    context.now,
                );
                tracing::debug!(
                    entry = %entry.id,
                    scene = %entry.scene_id,
                    shot_number = entry.shot.shot_number,
                    "Created shot entry"
                );
                entries.push(entry);
                index.insert(key, entries.len() - 1);
                entries.len() - 1
            }
        };

        let entry = &mut entries[position];
        if let Some(scene) = scene_by_id.get(&entry.scene_id) {
            entry.scene_title = scene.title().clone();
            entry.scene_summary = scene.summary().clone();
        }
        if !touched.contains(&entry.id) {
            touched.push(entry.id);
        }
    }

    sort_entries(&mut entries);
    Reconciliation { entries, touched }
}

/// Stable sort by shot number, ties by creation time.
pub fn sort_entries(entries: &mut [StoredShotEntry]) {
    entries.sort_by(|a, b| {
        a.shot
            .shot_number
            .cmp(&b.shot.shot_number)
            .then(a.created_at.cmp(&b.created_at))
    });
}

fn update_summary(changed: &[ShotField]) -> String {
    let changed: Vec<String> = changed
        .iter()
        .filter(|field| **field != ShotField::Prompt)
        .map(ToString::to_string)
        .collect();
    if changed.is_empty() {
        "Assistant reapplied the shot unchanged".to_string()
    } else {
        format!("Assistant updated {}", changed.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(id: &str, title: &str) -> Scene {
        Scene::builder()
            .id(id)
            .order(1)
            .title(title)
            .summary(format!("{} summary", title))
            .build()
            .unwrap()
    }

    fn bound(scene: &str, number: u32, dialogue: &str) -> BoundShot {
        BoundShot {
            scene_id: SceneId::new(scene),
            shot: Shot {
                dialogue: dialogue.to_string(),
                ..Shot::numbered(number)
            },
        }
    }

    #[test]
    fn test_creates_new_entries() {
        let scenes = vec![scene("s1", "Rooftop")];
        let result = reconcile(
            Vec::new(),
            vec![bound("s1", 1, "Hello")],
            &scenes,
            &ReconcileContext::now(None),
        );
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.touched.len(), 1);
        let entry = &result.entries[0];
        assert_eq!(entry.version, 1);
        assert_eq!(entry.scene_title, "Rooftop");
        assert_eq!(entry.scene_summary, "Rooftop summary");
    }

    #[test]
    fn test_update_names_changed_fields_and_blanks_prompt() {
        let scenes = vec![scene("s1", "Rooftop")];
        let first = reconcile(
            Vec::new(),
            vec![bound("s1", 1, "Hello")],
            &scenes,
            &ReconcileContext::now(None),
        );
        let mut entries = first.entries;
        entries[0].shot.prompt = "a neon skyline".to_string();
        entries[0].status = ShotStatus::Approved;

        let turn = TurnId::new();
        let second = reconcile(
            entries,
            vec![bound("s1", 1, "Goodbye")],
            &scenes,
            &ReconcileContext::now(Some(turn)),
        );
        let entry = &second.entries[0];
        assert_eq!(entry.version, 2);
        assert_eq!(entry.status, ShotStatus::PendingReview);
        assert!(entry.shot.prompt.is_empty());
        assert_eq!(entry.source_turn, Some(turn));
        let latest = entry.latest_revision().unwrap();
        assert_eq!(latest.summary, "Assistant updated dialogue");
        assert_eq!(latest.snapshot, entry.shot);
    }

    #[test]
    fn test_same_key_twice_touches_once() {
        let scenes = vec![scene("s1", "Rooftop")];
        let result = reconcile(
            Vec::new(),
            vec![bound("s1", 1, "a"), bound("s1", 1, "b")],
            &scenes,
            &ReconcileContext::now(None),
        );
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.touched.len(), 1);
        assert_eq!(result.entries[0].shot.dialogue, "b");
    }

    #[test]
    fn test_sorted_by_shot_number() {
        let scenes = vec![scene("s1", "A"), scene("s2", "B")];
        let result = reconcile(
            Vec::new(),
            vec![bound("s1", 3, ""), bound("s2", 1, ""), bound("s1", 2, "")],
            &scenes,
            &ReconcileContext::now(None),
        );
        let numbers: Vec<u32> = result.entries.iter().map(|e| e.shot.shot_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_input_changes_nothing() {
        let scenes = vec![scene("s1", "Rooftop")];
        let first = reconcile(
            Vec::new(),
            vec![bound("s1", 1, "Hello")],
            &scenes,
            &ReconcileContext::now(None),
        );
        let before = first.entries.clone();
        let result = reconcile(
            first.entries,
            Vec::new(),
            &scenes,
            &ReconcileContext::now(None),
        );
        assert_eq!(result.entries, before);
        assert!(result.touched.is_empty());
    }
}
