//! The extract → normalize → resolve → sequence → reconcile pipeline.

use crate::{
    BoundShot, ReconcileContext, ShotSequencer, extract_json_span, normalize_shots, reconcile,
    resolve_scene,
};
use serde::{Deserialize, Serialize};
use shotline_core::{EntryId, EpisodeId, Scene, SceneId, StoredShotEntry, TurnId};
use shotline_error::{PipelineError, PipelineErrorKind, ShotlineResult};

/// Caller choices for one application of a reply.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct ApplyOptions {
    /// First positional shot number
    #[builder(default = "1")]
    default_shot_number: u32,
    /// Scene that unhinted shots belong to, for per-scene edits
    #[builder(default)]
    focus_scene: Option<SceneId>,
    /// Dialogue turn recorded on every touched entry
    #[builder(default)]
    source_turn: Option<TurnId>,
}

impl ApplyOptions {
    /// Options with every field given.
    pub fn new(
        default_shot_number: u32,
        focus_scene: Option<SceneId>,
        source_turn: Option<TurnId>,
    ) -> Self {
        Self {
            default_shot_number,
            focus_scene,
            source_turn,
        }
    }

    /// Creates a new options builder.
    pub fn builder() -> ApplyOptionsBuilder {
        ApplyOptionsBuilder::default()
    }
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self::new(1, None, None)
    }
}

/// Recoverable outcomes surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum ApplyWarning {
    /// The reply held no recognizable shots
    #[display("No shots could be read from the reply; nothing was saved.")]
    NoShots,
    /// The episode has no scenes to attach shots to
    #[display(
        "This episode has no scenes yet, so none of the {} shots could be placed; add scenes to the script first.",
        parsed
    )]
    NoScenes {
        /// Shots read from the reply
        parsed: usize,
    },
    /// No shot named a scene of the episode
    #[display("None of the {} shots matched a scene in this episode; nothing was saved.", parsed)]
    NoSceneMatched {
        /// Shots read from the reply
        parsed: usize,
    },
    /// Some shots were saved, the rest matched no scene or ran out of numbers
    #[display(
        "Saved {} of {} shots; {} could not be placed in a scene.",
        saved,
        parsed,
        dropped
    )]
    Partial {
        /// Distinct entries written
        saved: usize,
        /// Shots read from the reply
        parsed: usize,
        /// Shots dropped for lack of a scene or a free number
        dropped: usize,
    },
}

/// Everything one application produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    /// Full replacement collection
    pub entries: Vec<StoredShotEntry>,
    /// Entries created or updated
    pub touched: Vec<EntryId>,
    /// Shots read from the reply
    pub parsed: usize,
    /// Shots dropped because no scene matched or no number was free
    pub dropped: usize,
    /// Operator-facing note, if anything was off
    pub warning: Option<ApplyWarning>,
}

impl ApplyOutcome {
    fn unchanged(entries: &[StoredShotEntry], parsed: usize, warning: ApplyWarning) -> Self {
        Self {
            entries: entries.to_vec(),
            touched: Vec::new(),
            parsed,
            dropped: parsed,
            warning: Some(warning),
        }
    }

    /// Whether the collection needs to be written back.
    pub fn has_changes(&self) -> bool {
        !self.touched.is_empty()
    }
}

/// Apply a model reply to an episode's entries.
///
/// Pure: the caller persists `entries` when [`ApplyOutcome::has_changes`].
/// Unreadable replies and unplaceable shots are reported as warnings with
/// the collection returned unchanged; shots that can be placed are saved
/// even when others can't.
///
/// # Examples
///
/// ```
/// use shotline_core::Scene;
/// use shotline_reconcile::{apply_reply, ApplyOptions};
///
/// let scenes = vec![Scene::builder().id("s1").order(1).title("Rooftop").build().unwrap()];
/// let reply = r#"```json
/// {"entries":[{"shotNumber":1,"shotScale":"close","dialogue":"Hello"}]}
/// ```"#;
///
/// let outcome = apply_reply(reply, &[], &scenes, &ApplyOptions::default());
/// assert_eq!(outcome.touched.len(), 1);
/// assert_eq!(outcome.entries[0].shot.shot_scale, "close");
/// assert!(outcome.warning.is_none());
/// ```
#[tracing::instrument(skip_all, fields(reply_length = reply.len(), existing = entries.len(), scenes = scenes.len()))]
pub fn apply_reply(
    reply: &str,
    entries: &[StoredShotEntry],
    scenes: &[Scene],
    options: &ApplyOptions,
) -> ApplyOutcome {
    let parsed = extract_json_span(reply)
        .map(|json| normalize_shots(json, options.default_shot_number))
        .unwrap_or_default();
    if parsed.is_empty() {
        tracing::warn!("Reply contained no readable shots");
        return ApplyOutcome::unchanged(entries, 0, ApplyWarning::NoShots);
    }

    let total = parsed.len();
    if scenes.is_empty() {
        tracing::warn!(parsed = total, "Episode has no scenes");
        return ApplyOutcome::unchanged(entries, total, ApplyWarning::NoScenes { parsed: total });
    }

    let resolved: Vec<_> = parsed
        .into_iter()
        .filter_map(|shot| {
            resolve_scene(&shot.hint, scenes, options.focus_scene.as_ref())
                .map(|scene| (scene.id().clone(), shot))
        })
        .collect();
    if resolved.is_empty() {
        tracing::warn!(parsed = total, "No shot matched a scene");
        return ApplyOutcome::unchanged(
            entries,
            total,
            ApplyWarning::NoSceneMatched { parsed: total },
        );
    }

    let mut sequencer = ShotSequencer::new(
        entries,
        resolved
            .iter()
            .filter_map(|(scene, shot)| shot.explicit_number.map(|number| (scene, number))),
    );
    let bound: Vec<BoundShot> = resolved
        .into_iter()
        .filter_map(|(scene_id, parsed)| {
            let number =
                sequencer.assign(&scene_id, parsed.explicit_number, parsed.positional_number)?;
            let mut shot = parsed.shot;
            shot.shot_number = number;
            Some(BoundShot { scene_id, shot })
        })
        .collect();
    let dropped = total - bound.len();

    let result = reconcile(
        entries.to_vec(),
        bound,
        scenes,
        &ReconcileContext::now(options.source_turn),
    );

    let warning = (dropped > 0).then(|| ApplyWarning::Partial {
        saved: result.touched.len(),
        parsed: total,
        dropped,
    });
    if let Some(warning) = &warning {
        tracing::warn!(%warning, "Reply applied partially");
    } else {
        tracing::info!(touched = result.touched.len(), "Reply applied");
    }

    ApplyOutcome {
        entries: result.entries,
        touched: result.touched,
        parsed: total,
        dropped,
        warning,
    }
}

/// [`apply_reply`] for the batch pipeline, which refuses to run against an
/// episode without scenes.
///
/// # Errors
///
/// Returns [`PipelineErrorKind::NoScenes`] when `scenes` is empty.
pub fn apply_reply_strict(
    episode: &EpisodeId,
    reply: &str,
    entries: &[StoredShotEntry],
    scenes: &[Scene],
    options: &ApplyOptions,
) -> ShotlineResult<ApplyOutcome> {
    if scenes.is_empty() {
        tracing::error!(episode = %episode, "Refusing to apply storyboard to an episode without scenes");
        return Err(PipelineError::new(PipelineErrorKind::NoScenes(episode.to_string())).into());
    }
    Ok(apply_reply(reply, entries, scenes, options))
}
