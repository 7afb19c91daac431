//! Metadata sidecars for media players.

use std::path::{Path, PathBuf};

use super::traits::{DownloadIdentifier, EpisodeFile, IdentifierContext};
use crate::action::{
    Action, ArtifactCategory, ArtifactKind, ArtifactSource, DownloadArtifact, EpisodeRef,
    FileOperation,
};
use crate::episode::Show;

fn show_sidecar(kind: ArtifactKind, target: PathBuf, show: &Show) -> Action {
    Action::artifact(DownloadArtifact {
        kind,
        target,
        source: ArtifactSource::Show {
            series_id: show.id(),
        },
    })
}

fn episode_sidecar(kind: ArtifactKind, target: PathBuf, episode: EpisodeRef) -> Action {
    Action::artifact(DownloadArtifact {
        kind,
        target,
        source: ArtifactSource::Episode { episode },
    })
}

/// Replaces the video's extension with `extension`.
fn beside(video: &Path, extension: &str) -> PathBuf {
    video.with_extension(extension)
}

/// Kodi `tvshow.nfo` and `<video>.nfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KodiNfo;

impl DownloadIdentifier for KodiNfo {
    fn name(&self) -> &'static str {
        "kodi_nfo"
    }

    fn category(&self) -> ArtifactCategory {
        ArtifactCategory::Metadata
    }

    fn on_show(&self, ctx: &mut IdentifierContext<'_>, show: &Show) -> Vec<Action> {
        let target = show.folder().join("tvshow.nfo");
        if !ctx.claim(&target) {
            return Vec::new();
        }
        vec![show_sidecar(ArtifactKind::KodiShowNfo, target, show)]
    }

    fn on_episode(&self, ctx: &mut IdentifierContext<'_>, file: &EpisodeFile<'_>) -> Vec<Action> {
        if file.episode.is_placeholder() {
            return Vec::new();
        }
        let target = beside(file.video, "nfo");
        if !ctx.claim(&target) {
            return Vec::new();
        }
        vec![episode_sidecar(
            ArtifactKind::KodiEpisodeNfo,
            target,
            EpisodeRef::new(file.show, file.episode),
        )]
    }

    /// Writes the `.nfo` for a video that just landed, unless one is already queued.
    fn on_operation_completed(
        &self,
        ctx: &mut IdentifierContext<'_>,
        operation: &FileOperation,
    ) -> Vec<Action> {
        let Some(episode) = &operation.episode else {
            return Vec::new();
        };
        let target = beside(&operation.target, "nfo");
        if !ctx.claim(&target) {
            return Vec::new();
        }
        vec![episode_sidecar(
            ArtifactKind::KodiEpisodeNfo,
            target,
            episode.clone(),
        )]
    }
}

/// Mede8er `series.xml` and `<video>.xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mede8erXml;

impl DownloadIdentifier for Mede8erXml {
    fn name(&self) -> &'static str {
        "mede8er_xml"
    }

    fn category(&self) -> ArtifactCategory {
        ArtifactCategory::Metadata
    }

    fn on_show(&self, ctx: &mut IdentifierContext<'_>, show: &Show) -> Vec<Action> {
        let target = show.folder().join("series.xml");
        if !ctx.claim(&target) {
            return Vec::new();
        }
        vec![show_sidecar(ArtifactKind::Mede8erSeriesXml, target, show)]
    }

    fn on_episode(&self, ctx: &mut IdentifierContext<'_>, file: &EpisodeFile<'_>) -> Vec<Action> {
        if file.episode.is_placeholder() {
            return Vec::new();
        }
        let target = beside(file.video, "xml");
        if !ctx.claim(&target) {
            return Vec::new();
        }
        vec![episode_sidecar(
            ArtifactKind::Mede8erEpisodeXml,
            target,
            EpisodeRef::new(file.show, file.episode),
        )]
    }
}

/// pyTivo `<video file name>.txt` metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct PyTivoMeta;

impl DownloadIdentifier for PyTivoMeta {
    fn name(&self) -> &'static str {
        "pytivo_meta"
    }

    fn category(&self) -> ArtifactCategory {
        ArtifactCategory::Metadata
    }

    fn on_episode(&self, ctx: &mut IdentifierContext<'_>, file: &EpisodeFile<'_>) -> Vec<Action> {
        if file.episode.is_placeholder() {
            return Vec::new();
        }
        let Some(name) = file.video.file_name() else {
            return Vec::new();
        };
        let target = file
            .video
            .with_file_name(format!("{}.txt", name.to_string_lossy()));
        if !ctx.claim(&target) {
            return Vec::new();
        }
        vec![episode_sidecar(
            ArtifactKind::PyTivoMeta,
            target,
            EpisodeRef::new(file.show, file.episode),
        )]
    }
}
