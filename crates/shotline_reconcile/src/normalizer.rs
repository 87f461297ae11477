//! Decoding model-written JSON into canonical shots.
//!
//! Replies have arrived in several envelope shapes over time, and each shot
//! field under several historical names. Envelopes are tried in a fixed
//! priority order and each canonical field is looked up through an ordered
//! alias list, so new aliases are a one-line change.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shotline_core::Shot;

type Object = Map<String, Value>;

const SHOT_NUMBER: &[&str] = &["shotNumber", "shot", "number", "index", "shot_number"];
const SHOT_SCALE: &[&str] = &["shotScale", "scale", "shotSize", "shot_scale", "size"];
const CAMERA_MOVEMENT: &[&str] = &[
    "cameraMovement",
    "movement",
    "camera",
    "cameraMove",
    "camera_movement",
];
const DURATION: &[&str] = &["duration", "length", "time", "durationSeconds"];
const DIALOGUE: &[&str] = &["dialogueOrOS", "dialogue", "dialog", "os", "narration"];
const VISUAL_SUMMARY: &[&str] = &["visualSummary", "visual", "description", "content", "action"];
const SOUND_DESIGN: &[&str] = &["soundDesign", "sound", "audio", "sfx", "music"];

const GROUP_SCENE_ID: &[&str] = &["sceneId", "scene_id", "id"];
const GROUP_SCENE_TITLE: &[&str] = &["sceneTitle", "scene", "title", "scene_title"];
const GROUP_SCENE_SUMMARY: &[&str] = &["sceneSummary", "summary", "overview", "scene_summary"];
const GROUP_SHOTS: &[&str] = &["shots", "entries"];

const FLAT_SCENE_ID: &[&str] = &["sceneId", "scene_id"];
const FLAT_SCENE_TITLE: &[&str] = &["sceneTitle", "scene_title"];
const FLAT_SCENE_SUMMARY: &[&str] = &["sceneSummary", "scene_summary"];
const FLAT_SHOTS: &[&str] = &["entries", "shots"];

/// Scene grouping expressed by the reply, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneHint {
    /// Scene identity as written by the model
    pub id: Option<String>,
    /// Scene title as written by the model
    pub title: Option<String>,
    /// Scene summary as written by the model; informational only
    pub summary: Option<String>,
}

impl SceneHint {
    /// Whether the hint names a scene at all.
    ///
    /// A summary alone cannot identify a scene.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.title.is_none()
    }

    fn from_object(object: &Object, id: &[&str], title: &[&str], summary: &[&str]) -> Self {
        Self {
            id: non_empty(text_field(object, id)),
            title: non_empty(text_field(object, title)),
            summary: non_empty(text_field(object, summary)),
        }
    }

    /// Fill missing parts from an enclosing hint.
    fn or(self, outer: &SceneHint) -> Self {
        Self {
            id: self.id.or_else(|| outer.id.clone()),
            title: self.title.or_else(|| outer.title.clone()),
            summary: self.summary.or_else(|| outer.summary.clone()),
        }
    }
}

/// One shot decoded from a reply, before scene resolution and sequencing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedShot {
    /// Canonical fields; `shot_number` holds the positional number and
    /// `prompt` is always empty
    pub shot: Shot,
    /// Positive shot number written by the model, if any
    pub explicit_number: Option<u32>,
    /// Number implied by position in the reply
    pub positional_number: u32,
    /// Scene the model grouped this shot under
    pub hint: SceneHint,
}

/// Accepted outer shapes, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
enum Envelope {
    /// `{"scenes": [{sceneId, sceneTitle, shots: [...]}]}`
    #[display("scene-grouped")]
    SceneGrouped,
    /// `{"entries": [...]}` or `{"shots": [...]}`
    #[display("flat entries")]
    FlatEntries,
    /// `[...]`
    #[display("bare array")]
    BareArray,
}

const ENVELOPES: [Envelope; 3] = [
    Envelope::SceneGrouped,
    Envelope::FlatEntries,
    Envelope::BareArray,
];

/// Shots sharing one scene grouping.
struct ShotGroup<'a> {
    hint: SceneHint,
    shots: Vec<&'a Object>,
}

impl Envelope {
    fn decode<'a>(&self, value: &'a Value) -> Option<Vec<ShotGroup<'a>>> {
        match self {
            Envelope::SceneGrouped => {
                let scenes = value.as_object()?.get("scenes")?.as_array()?;
                let groups: Vec<ShotGroup<'a>> = objects(scenes)
                    .map(|scene| ShotGroup {
                        hint: SceneHint::from_object(
                            scene,
                            GROUP_SCENE_ID,
                            GROUP_SCENE_TITLE,
                            GROUP_SCENE_SUMMARY,
                        ),
                        shots: first_present(scene, GROUP_SHOTS)
                            .and_then(Value::as_array)
                            .map(|shots| objects(shots).collect())
                            .unwrap_or_default(),
                    })
                    .collect();
                // Groups without shots leave room for a sibling flat list
                groups
                    .iter()
                    .any(|group| !group.shots.is_empty())
                    .then_some(groups)
            }
            Envelope::FlatEntries => {
                let object = value.as_object()?;
                let shots = FLAT_SHOTS
                    .iter()
                    .find_map(|key| object.get(*key).and_then(Value::as_array))?;
                Some(vec![ShotGroup {
                    hint: SceneHint::default(),
                    shots: objects(shots).collect(),
                }])
            }
            Envelope::BareArray => Some(vec![ShotGroup {
                hint: SceneHint::default(),
                shots: objects(value.as_array()?).collect(),
            }]),
        }
    }
}

/// Decode a JSON text into canonical shots.
///
/// Never fails: text that is not JSON, or JSON in no accepted shape, yields
/// an empty list. Positional numbering starts at `default_shot_number`; each
/// shot takes its explicit number or the running default, and the default
/// then moves one past it. Each later scene group starts one past the
/// largest number of the group before it.
///
/// # Examples
///
/// ```
/// use shotline_reconcile::normalize_shots;
///
/// let shots = normalize_shots(r#"[{"shot": 4, "dialog": "Run!"}, {"visual": "Feet"}]"#, 1);
/// assert_eq!(shots.len(), 2);
/// assert_eq!(shots[0].explicit_number, Some(4));
/// assert_eq!(shots[0].shot.dialogue, "Run!");
/// assert_eq!(shots[1].explicit_number, None);
/// assert_eq!(shots[1].positional_number, 5);
/// ```
pub fn normalize_shots(json: &str, default_shot_number: u32) -> Vec<ParsedShot> {
    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Reply payload is not valid JSON");
            return Vec::new();
        }
    };

    let Some((envelope, groups)) = ENVELOPES
        .iter()
        .find_map(|envelope| envelope.decode(&value).map(|groups| (*envelope, groups)))
    else {
        tracing::debug!("Reply payload matches no known envelope");
        return Vec::new();
    };

    let mut next = default_shot_number.max(1);
    let mut parsed = Vec::new();
    for group in groups {
        let mut group_max = None;
        for object in group.shots {
            let explicit_number = first_present(object, SHOT_NUMBER).and_then(shot_number);
            let positional_number = explicit_number.unwrap_or(next);
            next = positional_number.saturating_add(1);
            group_max = group_max.max(Some(positional_number));

            let hint = SceneHint::from_object(
                object,
                FLAT_SCENE_ID,
                FLAT_SCENE_TITLE,
                FLAT_SCENE_SUMMARY,
            )
            .or(&group.hint);

            parsed.push(ParsedShot {
                shot: canonical_shot(object, positional_number),
                explicit_number,
                positional_number,
                hint,
            });
        }
        if let Some(max) = group_max {
            next = max.saturating_add(1);
        }
    }

    tracing::debug!(%envelope, shots = parsed.len(), "Normalized reply");
    parsed
}

fn canonical_shot(object: &Object, shot_number: u32) -> Shot {
    Shot {
        shot_number,
        shot_scale: text_field(object, SHOT_SCALE),
        camera_movement: text_field(object, CAMERA_MOVEMENT),
        duration: text_field(object, DURATION),
        dialogue: text_field(object, DIALOGUE),
        visual_summary: text_field(object, VISUAL_SUMMARY),
        sound_design: text_field(object, SOUND_DESIGN),
        prompt: String::new(),
    }
}

fn objects(values: &[Value]) -> impl Iterator<Item = &Object> {
    values.iter().filter_map(Value::as_object)
}

/// First alias present with a non-null value.
fn first_present<'a>(object: &'a Object, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn text_field(object: &Object, aliases: &[&str]) -> String {
    first_present(object, aliases)
        .map(value_text)
        .unwrap_or_default()
}

/// Render a JSON value as shot text.
///
/// Objects and nulls render empty; arrays join their scalar items with
/// newlines.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_array() && !item.is_object())
            .map(value_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null | Value::Object(_) => String::new(),
    }
}

/// Shot number from an integer, float (truncated) or string (first run of
/// digits). Anything outside `1..=Shot::MAX_NUMBER` counts as absent.
fn shot_number(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(number) => match number.as_u64() {
            Some(n) => u32::try_from(n).ok(),
            None => number
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 1.0 && *f <= f64::from(u32::MAX))
                .map(|f| f.trunc() as u32),
        },
        Value::String(text) => text
            .split(|c: char| !c.is_ascii_digit())
            .find(|run| !run.is_empty())
            .and_then(|run| run.parse().ok()),
        _ => None,
    };
    number.filter(|n| (1..=Shot::MAX_NUMBER).contains(n))
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}
