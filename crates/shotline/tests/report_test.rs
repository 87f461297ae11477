//! Tests for the text reports printed by the binary.

use shotline::{
    ApplyRequest, EpisodeId, EpisodeService, InMemorySceneSource, InMemoryWorkspaceStore, Scene,
    entries_report, history_report, outcome_report,
};

const REPLY: &str = r#"{"scenes":[
  {"sceneId":"s1","shots":[
    {"shotNumber":1,"shotScale":"wide","cameraMovement":"static","visual":"City at night"},
    {"shotNumber":2,"visual":"Mara at the edge"}
  ]},
  {"sceneId":"s9","shots":[{"visual":"Nowhere"}]}
]}"#;

async fn service() -> EpisodeService<InMemoryWorkspaceStore, InMemorySceneSource> {
    let scenes = InMemorySceneSource::new();
    scenes
        .set_scenes(
            &EpisodeId::new("ep-1"),
            vec![
                Scene::builder()
                    .id("s1")
                    .order(1)
                    .title("Rooftop")
                    .build()
                    .unwrap(),
            ],
        )
        .await;
    EpisodeService::new(InMemoryWorkspaceStore::new(), scenes)
}

#[tokio::test]
async fn test_reports_after_partial_apply() {
    let service = service().await;
    let episode = EpisodeId::new("ep-1");
    let request = ApplyRequest::builder().reply(REPLY).build().unwrap();

    let outcome = service.apply_reply(&episode, request).await.unwrap();
    let summary = outcome_report(&outcome);
    assert!(summary.starts_with("Read 3 shots, saved 2 entries."));
    assert!(summary.contains("Warning: Saved 2 of 3 shots; 1 could not be placed in a scene."));

    let entries = service.entries(&episode).await.unwrap();
    let listing = entries_report(&entries);
    assert!(listing.starts_with("Scene s1: Rooftop\n"));
    assert!(listing.contains("wide / static"));
    assert!(listing.contains("City at night"));
    assert!(listing.contains(&entries[1].id.to_string()));
    assert!(listing.ends_with("Total: 2 shots\n"));

    let history = service.revisions(&episode, &entries[0].id).await.unwrap();
    let lines = history_report(&history);
    assert_eq!(lines.lines().count(), 1);
    assert!(lines.starts_with("v1 "));
    assert!(lines.contains("Created from assistant reply"));
}

#[test]
fn test_empty_episode_report() {
    assert_eq!(entries_report(&[]), "No shots stored for this episode.\n");
}
