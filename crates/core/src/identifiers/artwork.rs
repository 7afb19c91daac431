//! Image artifacts: posters, fanart and episode thumbnails.

use std::path::{Path, PathBuf};

use super::traits::{DownloadIdentifier, EpisodeFile, IdentifierContext};
use crate::action::{Action, ArtifactCategory, ArtifactKind, ArtifactSource, DownloadArtifact};
use crate::episode::Show;

fn image(kind: ArtifactKind, target: PathBuf, url: String) -> Action {
    Action::artifact(DownloadArtifact {
        kind,
        target,
        source: ArtifactSource::Url { url },
    })
}

/// `folder.jpg` posters in show and season folders.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderJpg;

impl DownloadIdentifier for FolderJpg {
    fn name(&self) -> &'static str {
        "folder_jpg"
    }

    fn category(&self) -> ArtifactCategory {
        ArtifactCategory::Image
    }

    fn on_show(&self, ctx: &mut IdentifierContext<'_>, show: &Show) -> Vec<Action> {
        let Some(url) = ctx.catalog().series_poster_url(show.id()) else {
            return Vec::new();
        };
        let target = show.folder().join("folder.jpg");
        if !ctx.claim(&target) {
            return Vec::new();
        }
        vec![image(ArtifactKind::ShowPoster, target, url)]
    }

    fn on_season(
        &self,
        ctx: &mut IdentifierContext<'_>,
        show: &Show,
        season: u32,
        folder: &Path,
    ) -> Vec<Action> {
        let Some(url) = ctx.catalog().season_poster_url(show.id(), season) else {
            return Vec::new();
        };
        let target = folder.join("folder.jpg");
        if !ctx.claim(&target) {
            return Vec::new();
        }
        vec![image(ArtifactKind::SeasonPoster, target, url)]
    }
}

/// `fanart.jpg` backdrop in the show folder.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanartJpg;

impl DownloadIdentifier for FanartJpg {
    fn name(&self) -> &'static str {
        "fanart_jpg"
    }

    fn category(&self) -> ArtifactCategory {
        ArtifactCategory::Image
    }

    fn on_show(&self, ctx: &mut IdentifierContext<'_>, show: &Show) -> Vec<Action> {
        let Some(url) = ctx.catalog().series_fanart_url(show.id()) else {
            return Vec::new();
        };
        let target = show.folder().join("fanart.jpg");
        if !ctx.claim(&target) {
            return Vec::new();
        }
        vec![image(ArtifactKind::Fanart, target, url)]
    }
}

/// `<video>-thumb.jpg` stills next to each episode.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodeThumbnail;

impl DownloadIdentifier for EpisodeThumbnail {
    fn name(&self) -> &'static str {
        "episode_thumbnail"
    }

    fn category(&self) -> ArtifactCategory {
        ArtifactCategory::Image
    }

    fn on_episode(&self, ctx: &mut IdentifierContext<'_>, file: &EpisodeFile<'_>) -> Vec<Action> {
        let Some(representative) = file.episode.representative() else {
            return Vec::new();
        };
        let Some(url) = ctx
            .catalog()
            .episode_image_url(file.show.id(), representative.episode_id)
        else {
            return Vec::new();
        };
        let Some(stem) = file.video.file_stem() else {
            return Vec::new();
        };
        let target = file
            .video
            .with_file_name(format!("{}-thumb.jpg", stem.to_string_lossy()));
        if !ctx.claim(&target) {
            return Vec::new();
        }
        vec![image(ArtifactKind::EpisodeThumbnail, target, url)]
    }
}
