//! File date correction.

use chrono::{DateTime, Utc};
use std::path::Path;

use super::traits::{DownloadIdentifier, EpisodeFile, IdentifierContext};
use crate::action::{
    Action, ArtifactCategory, EpisodeRef, FileOperation, TimestampCorrection,
};

/// Sets each episode file's modification time to its air time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampFixer;

impl TimestampFixer {
    fn correction(
        ctx: &mut IdentifierContext<'_>,
        path: &Path,
        time: DateTime<Utc>,
        episode: EpisodeRef,
    ) -> Vec<Action> {
        if !ctx.mark_queued(path) {
            return Vec::new();
        }
        vec![Action::timestamp(TimestampCorrection {
            path: path.to_path_buf(),
            time,
            episode: Some(episode),
        })]
    }
}

impl DownloadIdentifier for TimestampFixer {
    fn name(&self) -> &'static str {
        "timestamp_fixer"
    }

    fn category(&self) -> ArtifactCategory {
        ArtifactCategory::Timestamp
    }

    fn on_episode(&self, ctx: &mut IdentifierContext<'_>, file: &EpisodeFile<'_>) -> Vec<Action> {
        let episode = EpisodeRef::new(file.show, file.episode);
        let Some(time) = episode.aired_at else {
            return Vec::new();
        };
        let already_correct = file
            .modified
            .is_some_and(|m| (m - time).num_seconds().abs() < 1);
        if already_correct && !ctx.is_forced() {
            return Vec::new();
        }
        Self::correction(ctx, file.video, time, episode)
    }

    fn on_operation_completed(
        &self,
        ctx: &mut IdentifierContext<'_>,
        operation: &FileOperation,
    ) -> Vec<Action> {
        let Some(episode) = &operation.episode else {
            return Vec::new();
        };
        let Some(time) = episode.aired_at else {
            return Vec::new();
        };
        Self::correction(ctx, &operation.target, time, episode.clone())
    }
}
