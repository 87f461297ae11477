//! The canonical shot record.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// One framed camera setup within a scene.
///
/// Every descriptive field is plain text; an absent value is the empty
/// string, never null, so downstream rendering never has to branch.
///
/// # Examples
///
/// ```
/// use shotline_core::Shot;
///
/// let shot: Shot = serde_json::from_str(r#"{"shot_number": 3, "dialogue": "Hello"}"#).unwrap();
/// assert_eq!(shot.shot_number, 3);
/// assert_eq!(shot.dialogue, "Hello");
/// assert!(shot.prompt.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Shot {
    /// Sequence number, unique within its scene once sequenced
    pub shot_number: u32,
    /// Shot-scale label (close-up, wide, ...)
    pub shot_scale: String,
    /// Camera-movement label (pan, dolly, static, ...)
    pub camera_movement: String,
    /// Duration label as written by the author
    pub duration: String,
    /// Dialogue or narration
    pub dialogue: String,
    /// What the frame shows
    pub visual_summary: String,
    /// Sound design notes
    pub sound_design: String,
    /// Image/video generation prompt, written only by the prompt-authoring phase
    pub prompt: String,
}

/// Names of the fields of a [`Shot`], used in revision summaries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
pub enum ShotField {
    /// Sequence number
    #[display("shot number")]
    ShotNumber,
    /// Shot scale
    #[display("shot scale")]
    ShotScale,
    /// Camera movement
    #[display("camera movement")]
    CameraMovement,
    /// Duration
    #[display("duration")]
    Duration,
    /// Dialogue or narration
    #[display("dialogue")]
    Dialogue,
    /// Visual summary
    #[display("visual summary")]
    VisualSummary,
    /// Sound design
    #[display("sound design")]
    SoundDesign,
    /// Generation prompt
    #[display("prompt")]
    Prompt,
}

impl Shot {
    /// Largest shot number accepted from a reply or an edit.
    pub const MAX_NUMBER: u32 = 99_999;

    /// Create an empty shot with the given number.
    pub fn numbered(shot_number: u32) -> Self {
        Self {
            shot_number,
            ..Self::default()
        }
    }

    /// Text value of a field; the shot number is rendered in decimal.
    pub fn field(&self, field: ShotField) -> String {
        match field {
            ShotField::ShotNumber => self.shot_number.to_string(),
            ShotField::ShotScale => self.shot_scale.clone(),
            ShotField::CameraMovement => self.camera_movement.clone(),
            ShotField::Duration => self.duration.clone(),
            ShotField::Dialogue => self.dialogue.clone(),
            ShotField::VisualSummary => self.visual_summary.clone(),
            ShotField::SoundDesign => self.sound_design.clone(),
            ShotField::Prompt => self.prompt.clone(),
        }
    }

    /// Fields whose values differ between `self` and `other`, in declaration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use shotline_core::{Shot, ShotField};
    ///
    /// let before = Shot { dialogue: "Hi".into(), ..Shot::numbered(1) };
    /// let after = Shot { dialogue: "Hello".into(), ..Shot::numbered(1) };
    /// assert_eq!(before.changed_fields(&after), vec![ShotField::Dialogue]);
    /// ```
    pub fn changed_fields(&self, other: &Shot) -> Vec<ShotField> {
        ShotField::iter()
            .filter(|field| self.field(*field) != other.field(*field))
            .collect()
    }

    /// Whether every descriptive field is empty.
    pub fn is_blank(&self) -> bool {
        ShotField::iter()
            .filter(|field| *field != ShotField::ShotNumber)
            .all(|field| self.field(field).is_empty())
    }
}
