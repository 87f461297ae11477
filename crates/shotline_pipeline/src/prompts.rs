//! Prompt text for each pipeline phase.

use crate::{ContextSections, SectionMarkers};
use shotline_core::{EpisodeId, Scene};

/// Ask the model to distill guidance and synopsis into marked sections.
pub fn context_prompt(guidance: &str, synopsis: &str, markers: &SectionMarkers) -> String {
    format!(
        "Distill the storyboard guidance and project synopsis below into three sections.\n\
         Open each section with its marker on a line of its own, exactly as written:\n\
         {project}\n{character}\n{episode}\n\n\
         The episode overview should cover every episode in order.\n\n\
         Storyboard guidance:\n{guidance}\n\n\
         Project synopsis:\n{synopsis}",
        project = markers.project(),
        character = markers.character(),
        episode = markers.episode(),
        guidance = guidance.trim(),
        synopsis = synopsis.trim(),
    )
}

/// Request context for the storyboard and prompt phases.
///
/// Carries the confirmed sections plus the storyboard confirmed for the
/// previous episode, if any.
pub fn accumulated_context(
    sections: &ContextSections,
    markers: &SectionMarkers,
    previous_storyboard: Option<&str>,
) -> String {
    let mut context = sections.render(markers);
    if let Some(previous) = previous_storyboard {
        context.push_str("\n\nStoryboard of the previous episode:\n");
        context.push_str(previous.trim());
    }
    context
}

/// Ask for one episode's storyboard as scene-grouped JSON.
pub fn storyboard_prompt(episode: &EpisodeId, scenes: &[Scene]) -> String {
    let mut prompt = format!(
        "Write the shot-by-shot storyboard for episode {episode}.\n\
         Reply with JSON only, in this shape, using the scene ids given below:\n\
         {{\"scenes\": [{{\"sceneId\": \"...\", \"sceneTitle\": \"...\", \"shots\": [\
         {{\"shotNumber\": 1, \"shotScale\": \"\", \"cameraMovement\": \"\", \"duration\": \"\", \
         \"dialogueOrOS\": \"\", \"visualSummary\": \"\", \"soundDesign\": \"\"}}]}}]}}\n\n\
         Script:\n"
    );
    for scene in scenes {
        prompt.push_str(&format!(
            "\n## Scene {} (id: {}): {}\n",
            scene.order(),
            scene.id(),
            scene.title()
        ));
        if !scene.summary().trim().is_empty() {
            prompt.push_str(&format!("Summary: {}\n", scene.summary().trim()));
        }
        if !scene.body().trim().is_empty() {
            prompt.push_str(scene.body().trim());
            prompt.push('\n');
        }
    }
    prompt
}

/// Ask for one image-generation prompt per shot of a confirmed storyboard.
pub fn prompt_authoring_prompt(episode: &EpisodeId, storyboard: &str) -> String {
    format!(
        "Write one image-generation prompt for every shot in the confirmed storyboard of \
         episode {episode} below.\n\
         Reply with JSON only: {{\"prompts\": [{{\"shotNumber\": 1, \"prompt\": \"...\"}}]}}\n\n\
         Storyboard:\n{}",
        storyboard.trim()
    )
}
