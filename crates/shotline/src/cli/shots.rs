//! Handlers for the episode workspace commands.

use super::commands::{Commands, OutputFormat};
use shotline::{
    ApplyRequest, EpisodeId, EpisodeService, FileSystemSceneSource, FileSystemWorkspaceStore,
    JsonError, PipelineError, PipelineErrorKind, SceneId, ShotStatus, ShotlineConfig,
    ShotlineResult, StorageError, StorageErrorKind, entries_report, history_report,
    outcome_report,
};

type Service = EpisodeService<FileSystemWorkspaceStore, FileSystemSceneSource>;

/// Run one workspace command against the configured storage directory.
pub async fn handle_command(command: Commands, config: &ShotlineConfig) -> ShotlineResult<()> {
    let base = config.storage().resolved_path();
    tracing::debug!(storage = %base.display(), "Opening workspace store");
    let service = EpisodeService::new(
        FileSystemWorkspaceStore::new(&base)?,
        FileSystemSceneSource::new(&base),
    );

    match command {
        Commands::Apply {
            episode,
            reply,
            scene,
            start,
            message,
        } => {
            let text = tokio::fs::read_to_string(&reply).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    reply.display(),
                    e
                )))
            })?;
            let request = ApplyRequest::builder()
                .reply(text)
                .user_message(message)
                .default_shot_number(start.unwrap_or(*config.reconcile().default_shot_number()))
                .focus_scene(scene.map(SceneId::new))
                .build()
                .map_err(|e| PipelineError::new(PipelineErrorKind::RequestBuild(e.to_string())))?;
            apply(&service, &EpisodeId::new(episode), request).await
        }

        Commands::Entries { episode, format } => {
            let entries = service.entries(&EpisodeId::new(episode)).await?;
            match format {
                OutputFormat::Json => println!("{}", to_json(&entries)?),
                OutputFormat::Human => print!("{}", entries_report(&entries)),
            }
            Ok(())
        }

        Commands::History {
            episode,
            entry,
            format,
        } => {
            let revisions = service.revisions(&EpisodeId::new(episode), &entry).await?;
            match format {
                OutputFormat::Json => println!("{}", to_json(&revisions)?),
                OutputFormat::Human => print!("{}", history_report(&revisions)),
            }
            Ok(())
        }

        Commands::Approve { episode, entry } => {
            let updated = service
                .set_status(&EpisodeId::new(episode), &entry, ShotStatus::Approved)
                .await?;
            println!(
                "Shot {} in scene {} is now {} (v{})",
                updated.shot.shot_number, updated.scene_id, updated.status, updated.version
            );
            Ok(())
        }

        Commands::Restore {
            episode,
            entry,
            version,
        } => {
            let updated = service
                .restore_revision(&EpisodeId::new(episode), &entry, version)
                .await?;
            println!(
                "Restored shot {} to v{} as v{}",
                updated.shot.shot_number, version, updated.version
            );
            Ok(())
        }
    }
}

#[tracing::instrument(skip(service, request), fields(episode = %episode))]
async fn apply(service: &Service, episode: &EpisodeId, request: ApplyRequest) -> ShotlineResult<()> {
    let outcome = service.apply_reply(episode, request).await?;
    if let Some(warning) = &outcome.warning {
        tracing::warn!(%warning, "Reply applied with warning");
    }
    print!("{}", outcome_report(&outcome));
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> ShotlineResult<String> {
    Ok(serde_json::to_string_pretty(value).map_err(|e| JsonError::new(e.to_string()))?)
}
