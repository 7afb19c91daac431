//! Types for matching snapshot files against missing episodes.

use std::path::PathBuf;

use super::normalize::simplify;
use crate::action::MissingEpisode;
use crate::catalog::SeriesId;
use crate::config::MatchingConfig;
use crate::episode::{SeasonRule, Show};
use crate::snapshot::DirectoryCacheItem;

/// A missing episode offered to the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTarget {
    pub missing: MissingEpisode,
    /// Position across the show, for sequential matching.
    pub overall_number: Option<u32>,
}

impl MatchTarget {
    pub fn series_id(&self) -> SeriesId {
        self.missing.episode.series_id
    }
}

/// What the matcher needs to know about a show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowMatchInfo {
    pub series_id: SeriesId,
    /// Names as written (catalog, custom, aliases).
    pub names: Vec<String>,
    /// The same names, simplified.
    pub simplified: Vec<String>,
    /// Sequential matching is enabled both globally and for the show.
    pub sequential: bool,
    /// Auto-merge is enabled both globally and for the show.
    pub auto_merge: bool,
}

impl ShowMatchInfo {
    pub fn from_show(show: &Show, config: &MatchingConfig) -> Self {
        let names: Vec<String> = show
            .candidate_names()
            .into_iter()
            .map(String::from)
            .collect();
        let simplified = names
            .iter()
            .map(|n| simplify(n))
            .filter(|n| !n.is_empty())
            .collect();
        Self {
            series_id: show.id(),
            names,
            simplified,
            sequential: config.sequential_matching && show.config().sequential_matching,
            auto_merge: config.auto_merge && show.config().auto_merge,
        }
    }
}

/// A missing episode with exactly one uncontested file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMatch {
    /// Index into the targets passed to the matcher.
    pub target: usize,
    pub file: DirectoryCacheItem,
}

/// Why a missing episode with candidates was left unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityKind {
    /// More than one file matched the episode.
    SeveralFiles,
    /// The only matching file also matched another missing episode.
    SharedFile,
}

/// A missing episode whose candidates could not be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub target: usize,
    pub kind: AmbiguityKind,
    pub candidates: Vec<PathBuf>,
}

/// Result of matching a snapshot against missing episodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub resolved: Vec<ResolvedMatch>,
    /// Targets that remain missing (no candidate or ambiguous), in input order.
    pub unresolved: Vec<usize>,
    pub ambiguities: Vec<Ambiguity>,
}

/// A merge rule synthesized from a multi-episode file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeProposal {
    pub series_id: SeriesId,
    pub season: u32,
    pub rule: SeasonRule,
    /// File that triggered the proposal.
    pub evidence: PathBuf,
}
