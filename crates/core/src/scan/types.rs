//! Types for the scan runner.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::action::{ActionPlan, EpisodeRef};
use crate::catalog::SeriesId;
use crate::control::Cancelled;
use crate::identifiers::ArtifactPass;
use crate::matcher::{AmbiguityKind, MergeProposal};
use crate::naming::NamingError;
use crate::snapshot::{DirectorySnapshot, SnapshotError};

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan's cancel flag was raised.
    #[error("scan cancelled")]
    Cancelled,

    /// No show of a non-empty library could be loaded from the catalog.
    #[error("catalog unreachable for all {shows} shows")]
    CatalogUnreachable { shows: usize },
}

impl From<Cancelled> for ScanError {
    fn from(_: Cancelled) -> Self {
        ScanError::Cancelled
    }
}

/// A non-fatal problem found during a scan. The scan continued past it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanWarning {
    /// Part of a folder tree could not be enumerated.
    #[error(transparent)]
    Enumeration(#[from] SnapshotError),

    /// A show could not be loaded from the catalog and was skipped.
    #[error("catalog unavailable for series {series_id}: {reason}")]
    CatalogUnavailable { series_id: SeriesId, reason: String },

    /// Several files (or one file shared by several episodes) matched; the
    /// episode was left missing.
    #[error("ambiguous match for S{:02}E{:02} ({} candidates)", .episode.season, .episode.number, .candidates.len())]
    AmbiguousMatch {
        episode: EpisodeRef,
        ambiguity: AmbiguityKind,
        candidates: Vec<PathBuf>,
    },

    /// A target name could not be produced; that candidate was skipped.
    #[error(transparent)]
    Naming(#[from] NamingError),
}

/// Counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Shows loaded from the catalog.
    pub shows: usize,
    /// Files enumerated in search locations.
    pub search_files: usize,
    /// Files enumerated in show folders.
    pub library_files: usize,
    /// Episodes found in the library.
    pub present: usize,
    /// Episodes still missing after matching.
    pub missing: usize,
    /// Missing episodes resolved by a search-folder file.
    pub resolved: usize,
    pub ambiguous: usize,
}

/// Everything one scan pass produced.
#[derive(Debug)]
pub struct ScanReport {
    pub plan: ActionPlan,
    pub warnings: Vec<ScanWarning>,
    /// Merge rules added to shows by auto-merge, in the order they were applied.
    pub synthesized_rules: Vec<MergeProposal>,
    pub stats: ScanStats,
    /// Artifact dedupe state; completed operations are reported into it.
    pub(crate) pass: ArtifactPass,
    /// Show-folder snapshot the pass was checked against.
    pub(crate) library: DirectorySnapshot,
}

impl ScanReport {
    pub fn library(&self) -> &DirectorySnapshot {
        &self.library
    }
}
