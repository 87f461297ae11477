//! Interactive operations on one episode's workspace.

use crate::{ApplyOptions, ApplyOutcome, apply_reply, reconcile_scene_links, sort_entries};
use chrono::Utc;
use shotline_core::{
    DialogueTurn, EntryId, EpisodeId, Revision, Role, SceneId, Shot, ShotStatus, StoredShotEntry,
};
use shotline_error::{ShotlineResult, WorkspaceError, WorkspaceErrorKind};
use shotline_interface::{SceneSource, WorkspaceRepository};

/// One "apply this reply" request from the interactive editor.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ApplyRequest {
    /// Raw model reply
    reply: String,
    /// Operator message that prompted the reply, logged before it
    #[builder(default)]
    user_message: Option<String>,
    /// First positional shot number
    #[builder(default = "1")]
    default_shot_number: u32,
    /// Scene being edited, if the request came from a per-scene view
    #[builder(default)]
    focus_scene: Option<SceneId>,
}

impl ApplyRequest {
    /// Creates a new request builder.
    pub fn builder() -> ApplyRequestBuilder {
        ApplyRequestBuilder::default()
    }
}

/// Interactive episode workspace service.
///
/// Owns no state beyond its collaborators; every call loads, transforms and
/// replaces the episode's collection as a whole.
#[derive(Debug, Clone)]
pub struct EpisodeService<R, S> {
    repository: R,
    scenes: S,
}

impl<R, S> EpisodeService<R, S>
where
    R: WorkspaceRepository,
    S: SceneSource,
{
    /// Create a service over a repository and a scene source.
    pub fn new(repository: R, scenes: S) -> Self {
        Self { repository, scenes }
    }

    /// Underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Log the exchange and merge the reply into the episode.
    ///
    /// The assistant turn becomes the source of every touched entry. Entries
    /// are written only when something was touched.
    #[tracing::instrument(skip(self, request), fields(episode = %episode))]
    pub async fn apply_reply(
        &self,
        episode: &EpisodeId,
        request: ApplyRequest,
    ) -> ShotlineResult<ApplyOutcome> {
        if let Some(message) = &request.user_message {
            self.repository
                .append_turn(episode, &DialogueTurn::new(Role::User, message.clone()))
                .await?;
        }
        let turn = DialogueTurn::new(Role::Assistant, request.reply.clone());
        self.repository.append_turn(episode, &turn).await?;

        let entries = self.repository.load_entries(episode).await?;
        let scenes = self.scenes.scenes(episode).await?;
        let options = ApplyOptions::new(
            request.default_shot_number,
            request.focus_scene,
            Some(turn.id),
        );

        let outcome = apply_reply(&request.reply, &entries, &scenes, &options);
        if outcome.has_changes() {
            self.repository.save_entries(episode, &outcome.entries).await?;
        }
        Ok(outcome)
    }

    /// Entries for display, with stale scene links repaired first.
    #[tracing::instrument(skip(self), fields(episode = %episode))]
    pub async fn entries(&self, episode: &EpisodeId) -> ShotlineResult<Vec<StoredShotEntry>> {
        let entries = self.repository.load_entries(episode).await?;
        let scenes = self.scenes.scenes(episode).await?;
        let (entries, changed) = reconcile_scene_links(entries, &scenes, Utc::now());
        if changed {
            tracing::info!("Saving repaired scene links");
            self.repository.save_entries(episode, &entries).await?;
        }
        Ok(entries)
    }

    /// Replace an entry's shot with an operator edit.
    ///
    /// Records a user revision and moves the entry back to draft. The shot
    /// number may change but must stay positive and unused in the scene.
    ///
    /// # Errors
    ///
    /// Fails when the entry is unknown or the number is invalid or taken.
    #[tracing::instrument(skip(self, shot, summary), fields(episode = %episode, entry = %entry_id))]
    pub async fn edit_shot(
        &self,
        episode: &EpisodeId,
        entry_id: &EntryId,
        shot: Shot,
        summary: impl Into<String> + Send,
    ) -> ShotlineResult<StoredShotEntry> {
        let summary = summary.into();
        self.revise(episode, entry_id, |entries, position| {
            check_number(entries, position, shot.shot_number)?;
            let entry = &mut entries[position];
            entry.record_revision(shot, Role::User, summary, None, Utc::now());
            entry.status = ShotStatus::Draft;
            Ok(())
        })
        .await
    }

    /// Move an entry through the review lifecycle. No revision is recorded.
    #[tracing::instrument(skip(self), fields(episode = %episode, entry = %entry_id))]
    pub async fn set_status(
        &self,
        episode: &EpisodeId,
        entry_id: &EntryId,
        status: ShotStatus,
    ) -> ShotlineResult<StoredShotEntry> {
        self.revise(episode, entry_id, |entries, position| {
            let entry = &mut entries[position];
            tracing::debug!(from = %entry.status, to = %status, "Status change");
            entry.status = status;
            entry.updated_at = Utc::now();
            Ok(())
        })
        .await
    }

    /// Bring back the shot of an earlier version.
    ///
    /// History is never rewritten: the restore is a new user revision whose
    /// snapshot equals the old one.
    #[tracing::instrument(skip(self), fields(episode = %episode, entry = %entry_id))]
    pub async fn restore_revision(
        &self,
        episode: &EpisodeId,
        entry_id: &EntryId,
        version: u32,
    ) -> ShotlineResult<StoredShotEntry> {
        self.revise(episode, entry_id, |entries, position| {
            let snapshot = entries[position]
                .revision(version)
                .map(|revision| revision.snapshot.clone())
                .ok_or_else(|| {
                    WorkspaceError::new(WorkspaceErrorKind::RevisionNotFound {
                        entry: entry_id.to_string(),
                        version,
                    })
                })?;
            check_number(entries, position, snapshot.shot_number)?;
            let entry = &mut entries[position];
            entry.record_revision(
                snapshot,
                Role::User,
                format!("Restored version {}", version),
                None,
                Utc::now(),
            );
            entry.status = ShotStatus::Draft;
            Ok(())
        })
        .await
    }

    /// Revision history of an entry, oldest first.
    pub async fn revisions(
        &self,
        episode: &EpisodeId,
        entry_id: &EntryId,
    ) -> ShotlineResult<Vec<Revision>> {
        let entries = self.repository.load_entries(episode).await?;
        let position = find(&entries, episode, entry_id)?;
        Ok(entries[position].revisions.clone())
    }

    /// Load, mutate one entry, re-sort and save.
    async fn revise<F>(
        &self,
        episode: &EpisodeId,
        entry_id: &EntryId,
        change: F,
    ) -> ShotlineResult<StoredShotEntry>
    where
        F: FnOnce(&mut Vec<StoredShotEntry>, usize) -> ShotlineResult<()>,
    {
        let mut entries = self.repository.load_entries(episode).await?;
        let position = find(&entries, episode, entry_id)?;
        change(&mut entries, position)?;
        sort_entries(&mut entries);
        self.repository.save_entries(episode, &entries).await?;

        entries
            .into_iter()
            .find(|entry| entry.id == *entry_id)
            .ok_or_else(|| not_found(episode, entry_id))
    }
}

fn find(entries: &[StoredShotEntry], episode: &EpisodeId, entry_id: &EntryId) -> ShotlineResult<usize> {
    entries
        .iter()
        .position(|entry| entry.id == *entry_id)
        .ok_or_else(|| not_found(episode, entry_id))
}

fn not_found(episode: &EpisodeId, entry_id: &EntryId) -> shotline_error::ShotlineError {
    WorkspaceError::new(WorkspaceErrorKind::EntryNotFound {
        entry: entry_id.to_string(),
        episode: episode.to_string(),
    })
    .into()
}

/// A shot number must be positive and free within the entry's scene.
fn check_number(entries: &[StoredShotEntry], position: usize, number: u32) -> ShotlineResult<()> {
    if number == 0 || number > Shot::MAX_NUMBER {
        return Err(WorkspaceError::new(WorkspaceErrorKind::InvalidShotNumber).into());
    }
    let scene = &entries[position].scene_id;
    let clash = entries.iter().enumerate().any(|(other, entry)| {
        other != position && entry.scene_id == *scene && entry.shot.shot_number == number
    });
    if clash {
        return Err(WorkspaceError::new(WorkspaceErrorKind::DuplicateShotNumber {
            scene: scene.to_string(),
            shot_number: number,
        })
        .into());
    }
    Ok(())
}
