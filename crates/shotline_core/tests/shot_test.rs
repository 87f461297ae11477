use shotline_core::{Scene, Shot, ShotField, ShotStatus};

#[test]
fn missing_fields_deserialize_as_empty_strings() {
    let shot: Shot = serde_json::from_str(r#"{"shot_number": 4}"#).unwrap();
    assert_eq!(shot.shot_number, 4);
    assert_eq!(shot.shot_scale, "");
    assert_eq!(shot.sound_design, "");
    assert!(shot.is_blank());
}

#[test]
fn changed_fields_lists_every_difference() {
    let before = Shot {
        shot_scale: "wide".to_string(),
        duration: "3s".to_string(),
        ..Shot::numbered(2)
    };
    let after = Shot {
        shot_scale: "close".to_string(),
        duration: "3s".to_string(),
        prompt: "neon alley".to_string(),
        ..Shot::numbered(2)
    };
    assert_eq!(
        before.changed_fields(&after),
        vec![ShotField::ShotScale, ShotField::Prompt]
    );
    assert!(before.changed_fields(&before).is_empty());
}

#[test]
fn status_serializes_snake_case() {
    let json = serde_json::to_string(&ShotStatus::PendingReview).unwrap();
    assert_eq!(json, "\"pending_review\"");
    assert_eq!(ShotStatus::default(), ShotStatus::PendingReview);
}

#[test]
fn scene_title_matching_ignores_case_and_padding() {
    let scene = Scene::builder()
        .id("s1")
        .order(1)
        .title("  The Rooftop ")
        .build()
        .unwrap();
    assert_eq!(scene.match_title(), Scene::normalize_title("the ROOFTOP"));
}
