//! The three context sections distilled from the operator's guidance.

use serde::{Deserialize, Serialize};

/// Textual markers that open each context section in a model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct SectionMarkers {
    /// Opens the project summary
    project: String,
    /// Opens the character summary
    character: String,
    /// Opens the episode overview
    episode: String,
}

impl SectionMarkers {
    /// Markers with custom text.
    pub fn new(
        project: impl Into<String>,
        character: impl Into<String>,
        episode: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            character: character.into(),
            episode: episode.into(),
        }
    }
}

impl Default for SectionMarkers {
    fn default() -> Self {
        Self::new("[PROJECT SUMMARY]", "[CHARACTER SUMMARY]", "[EPISODE OVERVIEW]")
    }
}

/// Accumulated narrative context carried into every later request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSections {
    /// What the project is about
    pub project_summary: String,
    /// Who the characters are
    pub character_summary: String,
    /// What happens in each episode
    pub episode_overview: String,
}

impl ContextSections {
    /// Split a reply into sections at the markers.
    ///
    /// Markers may appear in any order; a section runs until the next marker
    /// or the end of the text. Missing markers leave their section empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use shotline_pipeline::{ContextSections, SectionMarkers};
    ///
    /// let reply = "[PROJECT SUMMARY]\nA heist.\n[EPISODE OVERVIEW]\nEp 1: the plan.";
    /// let sections = ContextSections::split(reply, &SectionMarkers::default());
    /// assert_eq!(sections.project_summary, "A heist.");
    /// assert_eq!(sections.episode_overview, "Ep 1: the plan.");
    /// assert_eq!(sections.missing(), vec!["character summary"]);
    /// ```
    pub fn split(text: &str, markers: &SectionMarkers) -> Self {
        let mut found: Vec<(usize, usize, usize)> = [
            markers.project(),
            markers.character(),
            markers.episode(),
        ]
        .iter()
        .enumerate()
        .filter(|(_, marker)| !marker.is_empty())
        .filter_map(|(slot, marker)| text.find(marker.as_str()).map(|at| (at, at + marker.len(), slot)))
        .collect();
        found.sort();

        let mut sections = [String::new(), String::new(), String::new()];
        for (position, (_, body_start, slot)) in found.iter().enumerate() {
            let body_end = found
                .get(position + 1)
                .map(|(next_start, _, _)| *next_start)
                .unwrap_or(text.len())
                .max(*body_start);
            sections[*slot] = text[*body_start..body_end].trim().to_string();
        }

        let [project_summary, character_summary, episode_overview] = sections;
        Self {
            project_summary,
            character_summary,
            episode_overview,
        }
    }

    /// Names of the sections still empty.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("project summary", &self.project_summary),
            ("character summary", &self.character_summary),
            ("episode overview", &self.episode_overview),
        ]
        .into_iter()
        .filter(|(_, body)| body.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Whether all three sections have content.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Sections joined back under their markers, for request context.
    pub fn render(&self, markers: &SectionMarkers) -> String {
        format!(
            "{}\n{}\n\n{}\n{}\n\n{}\n{}",
            markers.project(),
            self.project_summary,
            markers.character(),
            self.character_summary,
            markers.episode(),
            self.episode_overview
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_all_sections_in_any_order() {
        let reply = "Sure, here you go.\n\
            [CHARACTER SUMMARY]\nMara, a safecracker.\n\
            [PROJECT SUMMARY]\nA heist thriller.\n\
            [EPISODE OVERVIEW]\n1. The plan\n2. The job";
        let sections = ContextSections::split(reply, &SectionMarkers::default());
        assert_eq!(sections.project_summary, "A heist thriller.");
        assert_eq!(sections.character_summary, "Mara, a safecracker.");
        assert_eq!(sections.episode_overview, "1. The plan\n2. The job");
        assert!(sections.is_complete());
    }

    #[test]
    fn test_custom_markers() {
        let markers = SectionMarkers::new("## P", "## C", "## E");
        let sections = ContextSections::split("## P\np\n## C\nc\n## E\ne", &markers);
        assert!(sections.is_complete());
        assert_eq!(sections.character_summary, "c");
    }

    #[test]
    fn test_no_markers_means_nothing_found() {
        let sections = ContextSections::split("just prose", &SectionMarkers::default());
        assert_eq!(sections.missing().len(), 3);
    }

    #[test]
    fn test_render_round_trips() {
        let markers = SectionMarkers::default();
        let sections = ContextSections {
            project_summary: "p".into(),
            character_summary: "c".into(),
            episode_overview: "e".into(),
        };
        assert_eq!(ContextSections::split(&sections.render(&markers), &markers), sections);
    }
}
