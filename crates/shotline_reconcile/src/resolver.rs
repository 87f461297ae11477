//! Binding parsed shots to the episode's scenes.

use crate::SceneHint;
use shotline_core::{Scene, SceneId};

/// Find the scene a parsed shot belongs to.
///
/// Resolution order:
/// 1. exact match on the hinted scene id
/// 2. trimmed, case-insensitive match on the hinted title
/// 3. when the shot carries no hint at all: `focus` if it names a scene of
///    the episode, otherwise the lowest-order scene
///
/// A hint that matches nothing stays unresolved rather than falling back,
/// and an episode without scenes resolves nothing. Scenes are never created.
///
/// # Examples
///
/// ```
/// use shotline_core::Scene;
/// use shotline_reconcile::{resolve_scene, SceneHint};
///
/// let scenes = vec![
///     Scene::builder().id("s2").order(2).title("Alley").build().unwrap(),
///     Scene::builder().id("s1").order(1).title("Rooftop").build().unwrap(),
/// ];
///
/// let by_title = SceneHint { title: Some(" alley ".into()), ..SceneHint::default() };
/// assert_eq!(resolve_scene(&by_title, &scenes, None).map(|s| s.id().as_str()), Some("s2"));
///
/// let fallback = resolve_scene(&SceneHint::default(), &scenes, None);
/// assert_eq!(fallback.map(|s| s.id().as_str()), Some("s1"));
/// ```
pub fn resolve_scene<'a>(
    hint: &SceneHint,
    scenes: &'a [Scene],
    focus: Option<&SceneId>,
) -> Option<&'a Scene> {
    if let Some(id) = hint.id.as_deref() {
        let id = id.trim();
        if let Some(scene) = scenes.iter().find(|scene| scene.id().as_str() == id) {
            return Some(scene);
        }
    }

    if let Some(title) = hint.title.as_deref() {
        let wanted = Scene::normalize_title(title);
        if let Some(scene) = scenes.iter().find(|scene| scene.match_title() == wanted) {
            return Some(scene);
        }
    }

    if !hint.is_empty() {
        tracing::debug!(
            hinted_id = ?hint.id,
            hinted_title = ?hint.title,
            "Scene hint matches no scene"
        );
        return None;
    }

    focus
        .and_then(|focus| scenes.iter().find(|scene| scene.id() == focus))
        .or_else(|| lowest_order(scenes))
}

/// Scene with the smallest order index; ties go to the earlier one listed.
pub fn lowest_order(scenes: &[Scene]) -> Option<&Scene> {
    scenes.iter().min_by_key(|scene| *scene.order())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenes() -> Vec<Scene> {
        vec![
            Scene::builder()
                .id("s1")
                .order(1)
                .title("Rooftop")
                .build()
                .unwrap(),
            Scene::builder()
                .id("s2")
                .order(2)
                .title("Back Alley")
                .build()
                .unwrap(),
        ]
    }

    fn hint(id: Option<&str>, title: Option<&str>) -> SceneHint {
        SceneHint {
            id: id.map(str::to_string),
            title: title.map(str::to_string),
            summary: None,
        }
    }

    #[test]
    fn test_id_beats_title() {
        let scenes = scenes();
        let resolved = resolve_scene(&hint(Some("s2"), Some("Rooftop")), &scenes, None);
        assert_eq!(resolved.map(|s| s.id().as_str()), Some("s2"));
    }

    #[test]
    fn test_unknown_id_falls_through_to_title() {
        let scenes = scenes();
        let resolved = resolve_scene(&hint(Some("gone"), Some("  BACK alley")), &scenes, None);
        assert_eq!(resolved.map(|s| s.id().as_str()), Some("s2"));
    }

    #[test]
    fn test_unmatched_hint_is_unresolved() {
        let scenes = scenes();
        assert!(resolve_scene(&hint(None, Some("Desert")), &scenes, None).is_none());
        assert!(resolve_scene(&hint(Some("s9"), None), &scenes, None).is_none());
    }

    #[test]
    fn test_focus_scene_used_without_hint() {
        let scenes = scenes();
        let focus = SceneId::new("s2");
        let resolved = resolve_scene(&SceneHint::default(), &scenes, Some(&focus));
        assert_eq!(resolved.map(|s| s.id().as_str()), Some("s2"));

        // A focus outside the episode falls back to the first scene
        let stale = SceneId::new("s9");
        let resolved = resolve_scene(&SceneHint::default(), &scenes, Some(&stale));
        assert_eq!(resolved.map(|s| s.id().as_str()), Some("s1"));
    }

    #[test]
    fn test_no_scenes_resolves_nothing() {
        assert!(resolve_scene(&SceneHint::default(), &[], None).is_none());
    }
}
