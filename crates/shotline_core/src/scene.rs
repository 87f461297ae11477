//! Scenes as read from the script editor.

use crate::SceneId;
use serde::{Deserialize, Serialize};

/// A script-owned narrative unit; the authoritative title/summary source.
///
/// The reconciliation engine never creates, renames or deletes scenes.
///
/// # Examples
///
/// ```
/// use shotline_core::Scene;
///
/// let scene = Scene::builder()
///     .id("s1")
///     .order(1)
///     .title("Rooftop")
///     .build()
///     .unwrap();
/// assert_eq!(scene.title(), "Rooftop");
/// assert!(scene.summary().is_empty());
/// ```
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
pub struct Scene {
    /// Stable identity
    id: SceneId,
    /// Position within the episode
    order: i64,
    /// Scene heading
    #[builder(default)]
    #[serde(default)]
    title: String,
    /// Short synopsis
    #[builder(default)]
    #[serde(default)]
    summary: String,
    /// Full script text of the scene
    #[builder(default)]
    #[serde(default)]
    body: String,
}

impl Scene {
    /// Creates a new scene builder.
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    /// Title normalised for matching: trimmed and lowercased.
    pub fn match_title(&self) -> String {
        Self::normalize_title(&self.title)
    }

    /// Normalise a title for case-insensitive, whitespace-trimmed comparison.
    pub fn normalize_title(title: &str) -> String {
        title.trim().to_lowercase()
    }
}
