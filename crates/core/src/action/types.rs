//! Action types: the output of a scan, consumed by an external executor.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::{EpisodeId, SeriesId};
use crate::episode::{ProcessedEpisode, Show};

/// Summary of the episode an action concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub series_id: SeriesId,
    pub season: u32,
    pub number: u32,
    pub number_end: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub episode_ids: Vec<EpisodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<NaiveDate>,
    /// Air instant under the show's schedule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aired_at: Option<DateTime<Utc>>,
}

impl EpisodeRef {
    pub fn new(show: &Show, episode: &ProcessedEpisode) -> Self {
        let air_date = episode.air_date();
        Self {
            series_id: episode.series_id,
            season: episode.season,
            number: episode.number,
            number_end: episode.number_end,
            name: episode.name.clone(),
            episode_ids: episode.episode_ids(),
            air_date,
            aired_at: air_date.map(|d| show.schedule().aired_at(d)),
        }
    }
}

/// An aired episode with no file in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingEpisode {
    pub episode: EpisodeRef,
    pub show_name: String,
    /// Folder the episode belongs in.
    pub target_folder: PathBuf,
    /// Canonical filename without extension.
    pub target_stem: String,
}

impl MissingEpisode {
    /// Target path without extension.
    pub fn expected_path(&self) -> PathBuf {
        self.target_folder.join(&self.target_stem)
    }
}

/// Kind of file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOpKind {
    Copy,
    Move,
    Rename,
}

/// What to clean up after a file operation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// The source came from a search folder; tidy its siblings once moved.
    TidySourceFolder,
}

/// Copy, move or rename of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOperation {
    pub operation: FileOpKind,
    pub source: PathBuf,
    pub target: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupPolicy>,
    /// The missing episode this operation fills, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolves: Option<MissingEpisode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<EpisodeRef>,
}

impl FileOperation {
    pub fn new(operation: FileOpKind, source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            operation,
            source: source.into(),
            target: target.into(),
            cleanup: None,
            resolves: None,
            episode: None,
        }
    }
}

/// Kind of auxiliary artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    ShowPoster,
    SeasonPoster,
    Fanart,
    EpisodeThumbnail,
    KodiShowNfo,
    KodiEpisodeNfo,
    Mede8erSeriesXml,
    Mede8erEpisodeXml,
    PyTivoMeta,
}

/// Coarse grouping of artifacts, used to filter forced refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    Image,
    Metadata,
    Timestamp,
}

/// Where an artifact's content comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum ArtifactSource {
    /// Download from a URL.
    Url { url: String },
    /// Render from show metadata.
    Show { series_id: SeriesId },
    /// Render from episode metadata.
    Episode { episode: EpisodeRef },
}

/// Download or write one artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadArtifact {
    pub kind: ArtifactKind,
    pub target: PathBuf,
    pub source: ArtifactSource,
}

impl DownloadArtifact {
    pub fn category(&self) -> ArtifactCategory {
        match self.kind {
            ArtifactKind::ShowPoster
            | ArtifactKind::SeasonPoster
            | ArtifactKind::Fanart
            | ArtifactKind::EpisodeThumbnail => ArtifactCategory::Image,
            ArtifactKind::KodiShowNfo
            | ArtifactKind::KodiEpisodeNfo
            | ArtifactKind::Mede8erSeriesXml
            | ArtifactKind::Mede8erEpisodeXml
            | ArtifactKind::PyTivoMeta => ArtifactCategory::Metadata,
        }
    }
}

/// Set a file's modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampCorrection {
    pub path: PathBuf,
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<EpisodeRef>,
}

/// Kind of external download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    Torrent,
    Feed,
}

/// Hand a missing episode to an external downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalFetch {
    pub kind: FetchKind,
    pub url: String,
    /// Where the downloader should place its result.
    pub destination: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<EpisodeRef>,
}

/// What an action does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    MissingEpisode(MissingEpisode),
    FileOperation(FileOperation),
    DeleteFile { path: PathBuf },
    DeleteDirectory { path: PathBuf, only_if_empty: bool },
    DownloadArtifact(DownloadArtifact),
    TimestampCorrection(TimestampCorrection),
    ExternalFetch(ExternalFetch),
}

/// Execution state, filled in by the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionState {
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Category tag of an action. Deduplication is keyed on category plus produced path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Missing,
    File,
    Image,
    Metadata,
    Timestamp,
    Fetch,
    Delete,
}

/// Grouping used to present plans, one per action kind and operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionGroup {
    Missing,
    Copy,
    Move,
    Rename,
    Download,
    WriteMetadata,
    Timestamp,
    Fetch,
    Delete,
}

/// One entry of an action plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,
    #[serde(default)]
    pub state: ActionState,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            state: ActionState::default(),
        }
    }

    pub fn missing(missing: MissingEpisode) -> Self {
        Self::new(ActionKind::MissingEpisode(missing))
    }

    pub fn file(operation: FileOperation) -> Self {
        Self::new(ActionKind::FileOperation(operation))
    }

    pub fn artifact(artifact: DownloadArtifact) -> Self {
        Self::new(ActionKind::DownloadArtifact(artifact))
    }

    pub fn timestamp(correction: TimestampCorrection) -> Self {
        Self::new(ActionKind::TimestampCorrection(correction))
    }

    pub fn delete_file(path: impl Into<PathBuf>) -> Self {
        Self::new(ActionKind::DeleteFile { path: path.into() })
    }

    pub fn delete_directory(path: impl Into<PathBuf>) -> Self {
        Self::new(ActionKind::DeleteDirectory {
            path: path.into(),
            only_if_empty: true,
        })
    }

    pub fn category(&self) -> ActionCategory {
        match &self.kind {
            ActionKind::MissingEpisode(_) => ActionCategory::Missing,
            ActionKind::FileOperation(_) => ActionCategory::File,
            ActionKind::DeleteFile { .. } | ActionKind::DeleteDirectory { .. } => {
                ActionCategory::Delete
            }
            ActionKind::DownloadArtifact(a) => match a.category() {
                ArtifactCategory::Image => ActionCategory::Image,
                _ => ActionCategory::Metadata,
            },
            ActionKind::TimestampCorrection(_) => ActionCategory::Timestamp,
            ActionKind::ExternalFetch(_) => ActionCategory::Fetch,
        }
    }

    pub fn group(&self) -> ActionGroup {
        match &self.kind {
            ActionKind::MissingEpisode(_) => ActionGroup::Missing,
            ActionKind::FileOperation(op) => match op.operation {
                FileOpKind::Copy => ActionGroup::Copy,
                FileOpKind::Move => ActionGroup::Move,
                FileOpKind::Rename => ActionGroup::Rename,
            },
            ActionKind::DeleteFile { .. } | ActionKind::DeleteDirectory { .. } => {
                ActionGroup::Delete
            }
            ActionKind::DownloadArtifact(a) => match a.category() {
                ArtifactCategory::Image => ActionGroup::Download,
                _ => ActionGroup::WriteMetadata,
            },
            ActionKind::TimestampCorrection(_) => ActionGroup::Timestamp,
            ActionKind::ExternalFetch(_) => ActionGroup::Fetch,
        }
    }

    /// The path this action creates, changes or removes.
    pub fn produces(&self) -> PathBuf {
        match &self.kind {
            ActionKind::MissingEpisode(m) => m.expected_path(),
            ActionKind::FileOperation(op) => op.target.clone(),
            ActionKind::DeleteFile { path } | ActionKind::DeleteDirectory { path, .. } => {
                path.clone()
            }
            ActionKind::DownloadArtifact(a) => a.target.clone(),
            ActionKind::TimestampCorrection(t) => t.path.clone(),
            ActionKind::ExternalFetch(f) => f.destination.clone(),
        }
    }

    pub fn as_file_operation(&self) -> Option<&FileOperation> {
        match &self.kind {
            ActionKind::FileOperation(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_file_operation_mut(&mut self) -> Option<&mut FileOperation> {
        match &mut self.kind {
            ActionKind::FileOperation(op) => Some(op),
            _ => None,
        }
    }

    /// Source path of a file operation.
    pub fn source(&self) -> Option<&Path> {
        self.as_file_operation().map(|op| op.source.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_action_category_group_produces() {
        let action = Action::file(FileOperation::new(
            FileOpKind::Move,
            "/dl/a.mkv",
            "/lib/a.mkv",
        ));
        assert_eq!(action.category(), ActionCategory::File);
        assert_eq!(action.group(), ActionGroup::Move);
        assert_eq!(action.produces(), PathBuf::from("/lib/a.mkv"));
        assert_eq!(action.source(), Some(Path::new("/dl/a.mkv")));
    }

    #[test]
    fn test_artifact_categories() {
        let image = Action::artifact(DownloadArtifact {
            kind: ArtifactKind::ShowPoster,
            target: PathBuf::from("/lib/Foo/folder.jpg"),
            source: ArtifactSource::Url {
                url: "http://x/p.jpg".to_string(),
            },
        });
        assert_eq!(image.category(), ActionCategory::Image);
        assert_eq!(image.group(), ActionGroup::Download);

        let nfo = Action::artifact(DownloadArtifact {
            kind: ArtifactKind::KodiShowNfo,
            target: PathBuf::from("/lib/Foo/tvshow.nfo"),
            source: ArtifactSource::Show { series_id: 1 },
        });
        assert_eq!(nfo.category(), ActionCategory::Metadata);
        assert_eq!(nfo.group(), ActionGroup::WriteMetadata);
    }

    #[test]
    fn test_action_serializes_with_type_tag() {
        let action = Action::delete_file("/dl/a.nfo");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "delete_file");
        assert_eq!(json["path"], "/dl/a.nfo");
        assert_eq!(json["state"]["done"], false);

        let parsed: Action = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, action);
    }

    #[test]
    fn test_missing_expected_path() {
        let missing = MissingEpisode {
            episode: EpisodeRef {
                series_id: 1,
                season: 2,
                number: 5,
                number_end: 5,
                name: String::new(),
                episode_ids: vec![],
                air_date: None,
                aired_at: None,
            },
            show_name: "Foo".to_string(),
            target_folder: PathBuf::from("/lib/Foo/Season 02"),
            target_stem: "Foo - S02E05".to_string(),
        };
        assert_eq!(
            Action::missing(missing).produces(),
            PathBuf::from("/lib/Foo/Season 02/Foo - S02E05")
        );
    }
}
