//! Reading per-shot generation prompts from a model reply.

use chrono::Utc;
use regex::Regex;
use serde_json::{Map, Value};
use shotline_core::StoredShotEntry;
use shotline_reconcile::extract_json_span;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const NUMBER_KEYS: &[&str] = &["shotNumber", "shot", "number", "index", "shot_number"];
const PROMPT_KEYS: &[&str] = &["prompt", "text", "imagePrompt", "image_prompt", "description"];

/// Shot number to prompt text.
pub type PromptMap = BTreeMap<u32, String>;

/// `Shot 3: ...`, `- **Shot 3** — ...`, `shot #3) ...`
fn shot_line() -> Option<&'static Regex> {
    static SHOT_LINE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    SHOT_LINE
        .get_or_init(|| {
            Regex::new(r"(?im)^[\s>*\-]*(?:\*\*)?shot\s*#?\s*(\d+)(?:\*\*)?\s*[:.)\-–—]\s*(.+?)\s*$")
        })
        .as_ref()
        .ok()
}

/// Parse a prompt-authoring reply.
///
/// Accepted shapes, first non-empty wins:
/// * `{"prompts": [{"shotNumber": 1, "prompt": "..."}]}`
/// * a bare array of the same objects
/// * an object map `{"1": "...", "Shot 2": "..."}`
/// * plain lines `Shot 1: ...`
///
/// Blank prompts and non-positive numbers are skipped. A later prompt for
/// the same number replaces an earlier one.
///
/// # Examples
///
/// ```
/// use shotline_pipeline::parse_prompt_map;
///
/// let map = parse_prompt_map(r#"{"prompts": [{"shot": 2, "prompt": "Neon rain"}]}"#);
/// assert_eq!(map.get(&2).map(String::as_str), Some("Neon rain"));
///
/// let lines = parse_prompt_map("Shot 1: Wide desert\nShot 2: Close on eyes");
/// assert_eq!(lines.len(), 2);
/// ```
pub fn parse_prompt_map(reply: &str) -> PromptMap {
    let from_json = extract_json_span(reply)
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .map(|value| from_value(&value))
        .unwrap_or_default();
    if !from_json.is_empty() {
        return from_json;
    }

    let Some(pattern) = shot_line() else {
        tracing::error!("Shot line pattern failed to compile");
        return PromptMap::new();
    };
    pattern
        .captures_iter(reply)
        .filter_map(|captures| {
            let number: u32 = captures.get(1)?.as_str().parse().ok()?;
            let prompt = captures.get(2)?.as_str().trim();
            (number > 0 && !prompt.is_empty()).then(|| (number, prompt.to_string()))
        })
        .collect()
}

fn from_value(value: &Value) -> PromptMap {
    match value {
        Value::Object(object) => match object.get("prompts") {
            Some(Value::Array(items)) => from_items(items),
            Some(Value::Object(map)) => from_object_map(map),
            _ => from_object_map(object),
        },
        Value::Array(items) => from_items(items),
        _ => PromptMap::new(),
    }
}

fn from_items(items: &[Value]) -> PromptMap {
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let number = first(item, NUMBER_KEYS).and_then(number_of)?;
            let prompt = first(item, PROMPT_KEYS)?.as_str()?.trim();
            (!prompt.is_empty()).then(|| (number, prompt.to_string()))
        })
        .collect()
}

fn from_object_map(object: &Map<String, Value>) -> PromptMap {
    object
        .iter()
        .filter_map(|(key, value)| {
            let number = digits(key)?;
            let prompt = value.as_str()?.trim();
            (!prompt.is_empty()).then(|| (number, prompt.to_string()))
        })
        .collect()
}

fn first<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn number_of(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => digits(text),
        _ => None,
    };
    number.filter(|n| *n > 0)
}

fn digits(text: &str) -> Option<u32> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|run| !run.is_empty())?
        .parse()
        .ok()
        .filter(|n| *n > 0)
}

/// Write prompts into every entry with a matching shot number.
///
/// Only the prompt field changes: no version bump, no revision. Returns how
/// many entries were written.
pub fn apply_prompts(entries: &mut [StoredShotEntry], prompts: &PromptMap) -> usize {
    let now = Utc::now();
    let mut written = 0;
    for entry in entries.iter_mut() {
        if let Some(prompt) = prompts.get(&entry.shot.shot_number) {
            entry.shot.prompt = prompt.clone();
            entry.updated_at = now;
            written += 1;
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotline_core::{Role, SceneId, Shot};

    #[test]
    fn test_prompts_envelope_in_fence() {
        let reply = "Here are the prompts:\n```json\n{\"prompts\": [\
            {\"shotNumber\": 1, \"prompt\": \" Wide shot of a desert \"},\
            {\"shotNumber\": \"2\", \"text\": \"Close on her eyes\"},\
            {\"shotNumber\": 0, \"prompt\": \"ignored\"},\
            {\"shotNumber\": 3, \"prompt\": \"\"}]}\n```";
        let map = parse_prompt_map(reply);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1], "Wide shot of a desert");
        assert_eq!(map[&2], "Close on her eyes");
    }

    #[test]
    fn test_bare_array() {
        let map = parse_prompt_map(r#"[{"shot": 4, "prompt": "Rain on glass"}]"#);
        assert_eq!(map[&4], "Rain on glass");
    }

    #[test]
    fn test_object_map() {
        let map = parse_prompt_map(r#"{"1": "Dawn", "Shot 2": "Dusk", "notes": 5}"#);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&2], "Dusk");
    }

    #[test]
    fn test_shot_lines() {
        let reply = "Prompts below.\n\
            Shot 1: A lone figure on a dune\n\
            - **Shot 2** — Macro of sand grains\n\
            shot #3) Sunset silhouette\n\
            Thanks!";
        let map = parse_prompt_map(reply);
        assert_eq!(map.len(), 3);
        assert_eq!(map[&1], "A lone figure on a dune");
        assert_eq!(map[&2], "Macro of sand grains");
        assert_eq!(map[&3], "Sunset silhouette");
    }

    #[test]
    fn test_nothing_recognizable() {
        assert!(parse_prompt_map("I could not write prompts.").is_empty());
    }

    #[test]
    fn test_apply_prompts_leaves_history_alone() {
        let mut entries: Vec<StoredShotEntry> = [1, 2]
            .into_iter()
            .map(|n| {
                StoredShotEntry::new(
                    SceneId::new("s1"),
                    Shot::numbered(n),
                    Role::Assistant,
                    "seed",
                    None,
                    Utc::now(),
                )
            })
            .collect();
        let prompts = PromptMap::from([(2, "Neon alley".to_string()), (9, "orphan".to_string())]);

        assert_eq!(apply_prompts(&mut entries, &prompts), 1);
        assert_eq!(entries[1].shot.prompt, "Neon alley");
        assert_eq!(entries[1].version, 1);
        assert_eq!(entries[1].revisions.len(), 1);
        assert!(entries[0].shot.prompt.is_empty());
    }
}
