//! Plain-text rendering of entries, histories and apply outcomes.

use shotline_core::{Revision, StoredShotEntry};
use shotline_reconcile::ApplyOutcome;

/// Entries grouped under their scene headings, in collection order.
pub fn entries_report(entries: &[StoredShotEntry]) -> String {
    if entries.is_empty() {
        return "No shots stored for this episode.\n".to_string();
    }

    let mut ordered: Vec<&StoredShotEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| {
        (a.scene_id.as_str(), a.shot.shot_number).cmp(&(b.scene_id.as_str(), b.shot.shot_number))
    });

    let mut out = String::new();
    let mut current_scene = None;
    for entry in ordered {
        if current_scene != Some(&entry.scene_id) {
            let title = if entry.scene_title.is_empty() {
                "(untitled)"
            } else {
                entry.scene_title.as_str()
            };
            out.push_str(&format!("Scene {}: {}\n", entry.scene_id, title));
            current_scene = Some(&entry.scene_id);
        }
        let framing = [entry.shot.shot_scale.as_str(), entry.shot.camera_movement.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" / ");
        out.push_str(&format!(
            "  #{:<3} v{:<2} {:<15} {:<20} {}\n",
            entry.shot.shot_number,
            entry.version,
            entry.status.to_string(),
            framing,
            entry.shot.visual_summary
        ));
        out.push_str(&format!("       id {}\n", entry.id));
    }
    out.push_str(&format!("Total: {} shots\n", entries.len()));
    out
}

/// One line per revision, oldest first.
pub fn history_report(revisions: &[Revision]) -> String {
    revisions
        .iter()
        .map(|revision| {
            format!(
                "v{:<3} {} {:<9} {}\n",
                revision.version,
                revision.created_at.format("%Y-%m-%d %H:%M:%S"),
                revision.author.to_string(),
                revision.summary
            )
        })
        .collect()
}

/// Summary line for one applied reply, followed by its warning if any.
pub fn outcome_report(outcome: &ApplyOutcome) -> String {
    let mut out = format!(
        "Read {} shots, saved {} entries.\n",
        outcome.parsed,
        outcome.touched.len()
    );
    if let Some(warning) = &outcome.warning {
        out.push_str(&format!("Warning: {}\n", warning));
    }
    out
}
