//! The download identifier trait and the context handed to each hook.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::action::{Action, ArtifactCategory, FileOperation};
use crate::catalog::ShowCatalog;
use crate::episode::{ProcessedEpisode, Show};
use crate::snapshot::DirectorySnapshot;

/// An episode file present (or about to be present) in the library.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeFile<'a> {
    pub show: &'a Show,
    pub episode: &'a ProcessedEpisode,
    /// Library path of the video, after any planned rename or move.
    pub video: &'a Path,
    /// Modification time of the file on disk, when it already exists.
    pub modified: Option<DateTime<Utc>>,
}

/// Per-hook view of the scan: catalog, library snapshot and the strategy's
/// own record of paths already queued in this pass.
pub struct IdentifierContext<'a> {
    catalog: &'a dyn ShowCatalog,
    library: &'a DirectorySnapshot,
    queued: &'a mut HashSet<PathBuf>,
    force: bool,
}

impl<'a> IdentifierContext<'a> {
    pub fn new(
        catalog: &'a dyn ShowCatalog,
        library: &'a DirectorySnapshot,
        queued: &'a mut HashSet<PathBuf>,
        force: bool,
    ) -> Self {
        Self {
            catalog,
            library,
            queued,
            force,
        }
    }

    pub fn catalog(&self) -> &dyn ShowCatalog {
        self.catalog
    }

    /// True during a forced refresh, when existing artifacts are regenerated.
    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// Whether `path` exists in the library snapshot.
    pub fn exists(&self, path: &Path) -> bool {
        self.library.contains(path)
    }

    /// Records `path` as queued. False when it was already queued this pass.
    pub fn mark_queued(&mut self, path: &Path) -> bool {
        self.queued.insert(path.to_path_buf())
    }

    /// Whether an artifact at `path` should be produced now.
    ///
    /// True when it is missing from the library (or the refresh is forced)
    /// and was not already queued this pass. Queues it when true.
    pub fn claim(&mut self, path: &Path) -> bool {
        if self.exists(path) && !self.force {
            return false;
        }
        self.mark_queued(path)
    }
}

/// A strategy that proposes auxiliary artifacts for the library.
///
/// Hooks fire for each show, each season and each episode file during a scan,
/// and once more whenever the executor reports a completed file operation.
/// Every hook defaults to proposing nothing.
pub trait DownloadIdentifier: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Category used to filter forced refreshes.
    fn category(&self) -> ArtifactCategory;

    fn on_show(&self, _ctx: &mut IdentifierContext<'_>, _show: &Show) -> Vec<Action> {
        Vec::new()
    }

    fn on_season(
        &self,
        _ctx: &mut IdentifierContext<'_>,
        _show: &Show,
        _season: u32,
        _folder: &Path,
    ) -> Vec<Action> {
        Vec::new()
    }

    fn on_episode(&self, _ctx: &mut IdentifierContext<'_>, _file: &EpisodeFile<'_>) -> Vec<Action> {
        Vec::new()
    }

    fn on_operation_completed(
        &self,
        _ctx: &mut IdentifierContext<'_>,
        _operation: &FileOperation,
    ) -> Vec<Action> {
        Vec::new()
    }
}
