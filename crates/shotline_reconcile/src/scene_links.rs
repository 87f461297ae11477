//! Repairing entries whose scene reference went stale.
//!
//! Scenes are edited elsewhere; an entry can outlive the scene it pointed
//! at. Misfiling a shot is preferred over dropping it, so stale entries are
//! moved to the best remaining scene instead of failing the read.

use crate::{lowest_order, sort_entries};
use chrono::{DateTime, Utc};
use shotline_core::{Role, Scene, SceneId, Shot, StoredShotEntry};
use std::collections::{HashMap, HashSet};

/// Bring scene links and denormalized scene fields up to date.
///
/// * Entries pointing at an existing scene get its current title/summary.
/// * Entries pointing at a missing scene are relinked by their stored title,
///   or else to the lowest-order scene.
/// * A relinked entry whose number is already used in its new scene moves to
///   the next free number, recorded as a system revision.
///
/// Returns the entries and whether anything changed. With no scenes the
/// entries come back untouched.
pub fn reconcile_scene_links(
    entries: Vec<StoredShotEntry>,
    scenes: &[Scene],
    now: DateTime<Utc>,
) -> (Vec<StoredShotEntry>, bool) {
    let Some(fallback) = lowest_order(scenes) else {
        return (entries, false);
    };

    let mut entries = entries;
    let by_id: HashMap<&SceneId, &Scene> = scenes.iter().map(|scene| (scene.id(), scene)).collect();
    let mut taken: HashSet<(SceneId, u32)> = entries
        .iter()
        .filter(|entry| by_id.contains_key(&entry.scene_id))
        .map(|entry| (entry.scene_id.clone(), entry.shot.shot_number))
        .collect();
    let mut changed = false;
    let mut renumbered = false;

    for entry in entries.iter_mut() {
        let scene = match by_id.get(&entry.scene_id) {
            Some(scene) => *scene,
            None => {
                let wanted = Scene::normalize_title(&entry.scene_title);
                let target = scenes
                    .iter()
                    .find(|scene| !wanted.is_empty() && scene.match_title() == wanted)
                    .unwrap_or(fallback);
                tracing::info!(
                    entry = %entry.id,
                    stale_scene = %entry.scene_id,
                    scene = %target.id(),
                    "Relinked shot entry to existing scene"
                );
                relink(entry, target, &mut taken, now, &mut renumbered);
                changed = true;
                target
            }
        };

        if entry.scene_title != *scene.title() || entry.scene_summary != *scene.summary() {
            entry.scene_title = scene.title().clone();
            entry.scene_summary = scene.summary().clone();
            changed = true;
        }
    }

    if renumbered {
        sort_entries(&mut entries);
    }
    (entries, changed)
}

fn relink(
    entry: &mut StoredShotEntry,
    target: &Scene,
    taken: &mut HashSet<(SceneId, u32)>,
    now: DateTime<Utc>,
    renumbered: &mut bool,
) {
    entry.scene_id = target.id().clone();
    let original = entry.shot.shot_number;
    let number = match free_number(taken, &entry.scene_id, original.max(1)) {
        Some(number) => number,
        None => {
            tracing::warn!(entry = %entry.id, scene = %target.id(), "No free shot number in scene");
            original
        }
    };
    taken.insert((entry.scene_id.clone(), number));

    if number != original {
        let shot = Shot {
            shot_number: number,
            ..entry.shot.clone()
        };
        entry.record_revision(
            shot,
            Role::System,
            format!(
                "Renumbered from {} to {} after moving to scene '{}'",
                original,
                number,
                target.title()
            ),
            None,
            now,
        );
        *renumbered = true;
    }
}

/// First number at or above `start` not taken in `scene`, wrapping to the
/// low end once the top of the range is reached.
fn free_number(taken: &HashSet<(SceneId, u32)>, scene: &SceneId, start: u32) -> Option<u32> {
    (start..=u32::MAX)
        .chain(1..start)
        .find(|number| !taken.contains(&(scene.clone(), *number)))
}
