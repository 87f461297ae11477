//! Shot-number assignment within scenes.

use shotline_core::{SceneId, StoredShotEntry};
use std::collections::{HashMap, HashSet};

/// Assigns shot numbers per scene for one reply.
///
/// Each scene's counter is seeded one past the largest number already stored
/// for it. Numbers written explicitly by the model are reserved up front, so
/// an assigned number never lands on one of them, on a stored number, or on
/// a number assigned earlier in the same reply.
#[derive(Debug, Clone, Default)]
pub struct ShotSequencer {
    next_free: HashMap<SceneId, u32>,
    taken: HashSet<(SceneId, u32)>,
    explicit_seen: HashSet<(SceneId, u32)>,
}

impl ShotSequencer {
    /// Seed counters from stored entries and reserve the reply's explicit
    /// numbers.
    pub fn new<'a>(
        existing: &[StoredShotEntry],
        explicit: impl IntoIterator<Item = (&'a SceneId, u32)>,
    ) -> Self {
        let mut sequencer = Self::default();
        for entry in existing {
            let (scene, number) = entry.key();
            sequencer.taken.insert((scene.clone(), number));
            let next = sequencer.next_free.entry(scene.clone()).or_insert(1);
            *next = (*next).max(number.saturating_add(1));
        }
        for (scene, number) in explicit {
            sequencer.taken.insert((scene.clone(), number));
        }
        sequencer
    }

    /// Final number for a shot in `scene`.
    ///
    /// An explicit number is kept the first time it appears for a scene. A
    /// missing or repeated one is replaced by `max(counter, positional)`,
    /// moved past every taken number; the counter then advances past it.
    /// Returns `None` when no number above the counter is left, in which
    /// case the shot is not placed.
    pub fn assign(
        &mut self,
        scene: &SceneId,
        explicit: Option<u32>,
        positional: u32,
    ) -> Option<u32> {
        if let Some(number) = explicit {
            if self.explicit_seen.insert((scene.clone(), number)) {
                return Some(number);
            }
        }

        let counter = self.next_free.get(scene).copied().unwrap_or(1);
        let mut candidate = counter.max(positional).max(1);
        while self.taken.contains(&(scene.clone(), candidate)) {
            let Some(next) = candidate.checked_add(1) else {
                tracing::warn!(scene = %scene, "No shot number left above the scene's last shot");
                return None;
            };
            candidate = next;
        }

        self.taken.insert((scene.clone(), candidate));
        self.next_free
            .insert(scene.clone(), candidate.saturating_add(1));
        if let Some(number) = explicit {
            tracing::debug!(
                scene = %scene,
                repeated = number,
                assigned = candidate,
                "Renumbered repeated shot number"
            );
        }
        Some(candidate)
    }
}
