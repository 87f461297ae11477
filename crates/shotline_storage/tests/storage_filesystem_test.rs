//! Tests for the filesystem and in-memory workspace backends.

use chrono::Utc;
use shotline_core::{DialogueTurn, EpisodeId, Role, Scene, SceneId, Shot, StoredShotEntry};
use shotline_error::{ShotlineErrorKind, StorageErrorKind};
use shotline_interface::{SceneSource, WorkspaceRepository};
use shotline_storage::{
    FileSystemSceneSource, FileSystemWorkspaceStore, InMemorySceneSource, InMemoryWorkspaceStore,
};
use tempfile::TempDir;

fn entry(scene: &str, number: u32) -> StoredShotEntry {
    StoredShotEntry::new(
        SceneId::new(scene),
        Shot {
            visual_summary: format!("shot {}", number),
            ..Shot::numbered(number)
        },
        Role::Assistant,
        "created",
        None,
        Utc::now(),
    )
}

#[tokio::test]
async fn test_missing_episode_loads_empty() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemWorkspaceStore::new(temp_dir.path()).unwrap();

    let episode = EpisodeId::new("ep-1");
    assert!(store.load_entries(&episode).await.unwrap().is_empty());
    assert!(store.load_turns(&episode).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_and_load_entries() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemWorkspaceStore::new(temp_dir.path()).unwrap();
    let episode = EpisodeId::new("ep-1");

    let entries = vec![entry("s1", 1), entry("s1", 2)];
    store.save_entries(&episode, &entries).await.unwrap();

    let loaded = store.load_entries(&episode).await.unwrap();
    assert_eq!(loaded, entries);

    // No temp file left behind after the rename
    let dir = temp_dir.path().join("ep-1");
    assert!(dir.join("workspace.json").exists());
    assert!(!dir.join("workspace.json.tmp").exists());
}

#[tokio::test]
async fn test_save_replaces_whole_collection() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemWorkspaceStore::new(temp_dir.path()).unwrap();
    let episode = EpisodeId::new("ep-1");

    store
        .save_entries(&episode, &[entry("s1", 1), entry("s1", 2)])
        .await
        .unwrap();
    store.save_entries(&episode, &[entry("s2", 7)]).await.unwrap();

    let loaded = store.load_entries(&episode).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].shot.shot_number, 7);
}

#[tokio::test]
async fn test_turns_survive_entry_saves() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemWorkspaceStore::new(temp_dir.path()).unwrap();
    let episode = EpisodeId::new("ep-1");

    let turn = DialogueTurn::new(Role::User, "Give me three shots");
    store.append_turn(&episode, &turn).await.unwrap();
    store.save_entries(&episode, &[entry("s1", 1)]).await.unwrap();

    let turns = store.load_turns(&episode).await.unwrap();
    assert_eq!(turns, vec![turn]);
}

#[tokio::test]
async fn test_episodes_are_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemWorkspaceStore::new(temp_dir.path()).unwrap();

    store
        .save_entries(&EpisodeId::new("ep-1"), &[entry("s1", 1)])
        .await
        .unwrap();

    assert!(
        store
            .load_entries(&EpisodeId::new("ep-2"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_rejects_path_like_episode_ids() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemWorkspaceStore::new(temp_dir.path()).unwrap();

    let err = store
        .load_entries(&EpisodeId::new("../escape"))
        .await
        .unwrap_err();
    match err.kind() {
        ShotlineErrorKind::Storage(e) => {
            assert!(matches!(e.kind, StorageErrorKind::InvalidPath(_)))
        }
        other => panic!("unexpected error: {}", other),
    }

    for bad in ["", ".", "..", ".hidden", "a/b", "a\\b"] {
        assert!(
            store.load_entries(&EpisodeId::new(bad)).await.is_err(),
            "episode id {:?} should be rejected",
            bad
        );
    }
    assert!(store.load_entries(&EpisodeId::new("ep.1")).await.is_ok());
}

#[tokio::test]
async fn test_corrupt_document_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemWorkspaceStore::new(temp_dir.path()).unwrap();
    std::fs::create_dir_all(temp_dir.path().join("ep-1")).unwrap();
    std::fs::write(temp_dir.path().join("ep-1/workspace.json"), "{not json").unwrap();

    let err = store
        .load_entries(&EpisodeId::new("ep-1"))
        .await
        .unwrap_err();
    match err.kind() {
        ShotlineErrorKind::Storage(e) => assert!(matches!(e.kind, StorageErrorKind::Corrupt(_))),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_filesystem_scenes_sorted_by_order() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join("ep-1")).unwrap();
    std::fs::write(
        temp_dir.path().join("ep-1/scenes.json"),
        r#"[
            {"id": "s2", "order": 2, "title": "Alley"},
            {"id": "s1", "order": 1, "title": "Rooftop", "summary": "Night"}
        ]"#,
    )
    .unwrap();

    let source = FileSystemSceneSource::new(temp_dir.path());
    let scenes = source.scenes(&EpisodeId::new("ep-1")).await.unwrap();
    let ids: Vec<&str> = scenes.iter().map(|s| s.id().as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
    assert_eq!(scenes[0].summary(), "Night");

    assert!(
        source
            .scenes(&EpisodeId::new("ep-2"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_in_memory_store_counts_entry_writes() {
    let store = InMemoryWorkspaceStore::new();
    let episode = EpisodeId::new("ep-1");

    assert_eq!(store.entry_writes().await, 0);
    store.save_entries(&episode, &[entry("s1", 1)]).await.unwrap();
    store
        .append_turn(&episode, &DialogueTurn::new(Role::Assistant, "[]"))
        .await
        .unwrap();

    assert_eq!(store.entry_writes().await, 1);
    assert_eq!(store.load_entries(&episode).await.unwrap().len(), 1);
    assert_eq!(store.load_turns(&episode).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_in_memory_scenes_sorted_by_order() {
    let source = InMemorySceneSource::new();
    let episode = EpisodeId::new("ep-1");
    source
        .set_scenes(
            &episode,
            vec![
                Scene::builder().id("b").order(5).build().unwrap(),
                Scene::builder().id("a").order(-1).build().unwrap(),
            ],
        )
        .await;

    let scenes = source.scenes(&episode).await.unwrap();
    assert_eq!(scenes[0].id().as_str(), "a");
}
