//! Matching of snapshot files to missing episodes.

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use super::normalize::contains_words;
use super::numbers::{explicit_numbers, sequential_number, EpisodeNumbers};
use super::types::{
    Ambiguity, AmbiguityKind, MatchOutcome, MatchTarget, MergeProposal, ResolvedMatch,
    ShowMatchInfo,
};
use crate::catalog::SeriesId;
use crate::config::MatchingConfig;
use crate::control::{Cancelled, ScanControl, ScanPhase};
use crate::episode::{SeasonRule, Show};
use crate::metrics;
use crate::snapshot::{DirectoryCacheItem, DirectorySnapshot};

/// Finds files for missing episodes.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    config: MatchingConfig,
}

impl FileMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Whether a file can be an episode at all.
    ///
    /// Skips non-video extensions, small "sample" files, files below the
    /// minimum size and names too short to carry a show name.
    pub fn is_eligible(&self, item: &DirectoryCacheItem) -> bool {
        let extension = item.extension();
        if !self
            .config
            .video_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&extension))
        {
            return false;
        }
        if item.length < self.config.min_file_bytes {
            return false;
        }
        if item.length < self.config.sample_max_bytes
            && item.simplified_name.split(' ').any(|w| w == "sample")
        {
            return false;
        }
        item.simplified_name.chars().count() >= 2
    }

    /// Whether the file name contains any of the show's names as whole words.
    pub fn names_show(&self, item: &DirectoryCacheItem, show: &ShowMatchInfo) -> bool {
        show.simplified
            .iter()
            .any(|name| contains_words(&item.simplified_name, name))
    }

    /// Whether a file with the given numbers satisfies `target`.
    fn satisfies(
        &self,
        item: &DirectoryCacheItem,
        explicit: Option<EpisodeNumbers>,
        show: &ShowMatchInfo,
        target: &MatchTarget,
    ) -> bool {
        let episode = &target.missing.episode;
        if let Some(numbers) = explicit {
            return numbers.fills(episode.season, episode.number, episode.number_end);
        }
        if !show.sequential {
            return false;
        }
        match (target.overall_number, sequential_number(&item.stem(), &show.names)) {
            (Some(expected), Some(found)) => expected == found,
            _ => false,
        }
    }

    /// Matches every eligible snapshot file against `targets`.
    ///
    /// A target is resolved only when exactly one file matches it and that
    /// file matches no other target. Everything else stays missing.
    pub fn find_matches(
        &self,
        targets: &[MatchTarget],
        shows: &BTreeMap<SeriesId, ShowMatchInfo>,
        snapshot: &DirectorySnapshot,
        control: &mut ScanControl<'_>,
    ) -> Result<MatchOutcome, Cancelled> {
        let mut by_show: BTreeMap<SeriesId, Vec<usize>> = BTreeMap::new();
        for (index, target) in targets.iter().enumerate() {
            by_show.entry(target.series_id()).or_default().push(index);
        }

        let mut candidates: Vec<Vec<usize>> = vec![Vec::new(); targets.len()];
        let mut claims: Vec<usize> = vec![0; snapshot.len()];
        let files = snapshot.items();

        for (file_index, item) in files.iter().enumerate() {
            control.check()?;
            control.report(ScanPhase::Matching, file_index, files.len());

            if by_show.is_empty() || !self.is_eligible(item) {
                continue;
            }
            let explicit = explicit_numbers(&item.stem());

            for (series_id, indices) in &by_show {
                let Some(show) = shows.get(series_id) else {
                    continue;
                };
                if !self.names_show(item, show) {
                    continue;
                }
                for &target_index in indices {
                    if self.satisfies(item, explicit, show, &targets[target_index]) {
                        candidates[target_index].push(file_index);
                        claims[file_index] += 1;
                    }
                }
            }
        }
        control.report(ScanPhase::Matching, files.len(), files.len());

        let mut outcome = MatchOutcome::default();
        for (target_index, found) in candidates.iter().enumerate() {
            match found.as_slice() {
                [] => outcome.unresolved.push(target_index),
                [only] if claims[*only] == 1 => outcome.resolved.push(ResolvedMatch {
                    target: target_index,
                    file: files[*only].clone(),
                }),
                _ => {
                    let kind = if found.len() > 1 {
                        AmbiguityKind::SeveralFiles
                    } else {
                        AmbiguityKind::SharedFile
                    };
                    debug!(
                        target = %targets[target_index].missing.expected_path().display(),
                        candidates = found.len(),
                        "Ambiguous match, leaving episode missing"
                    );
                    outcome.unresolved.push(target_index);
                    outcome.ambiguities.push(Ambiguity {
                        target: target_index,
                        kind,
                        candidates: found.iter().map(|&i| files[i].path.clone()).collect(),
                    });
                }
            }
        }

        metrics::MATCH_OUTCOMES
            .with_label_values(&["resolved"])
            .inc_by(outcome.resolved.len() as u64);
        metrics::MATCH_OUTCOMES
            .with_label_values(&["ambiguous"])
            .inc_by(outcome.ambiguities.len() as u64);
        metrics::MATCH_OUTCOMES
            .with_label_values(&["unmatched"])
            .inc_by((outcome.unresolved.len() - outcome.ambiguities.len()) as u64);

        info!(
            targets = targets.len(),
            resolved = outcome.resolved.len(),
            ambiguous = outcome.ambiguities.len(),
            "Matching complete"
        );
        Ok(outcome)
    }

    /// Proposes merge rules for multi-episode files that cover missing episodes.
    ///
    /// Only shows with auto-merge enabled are considered. A proposal is made
    /// when the file's range spans separate slots of a season and at least
    /// one of them is missing. Each (show, season, range) is proposed once.
    pub fn propose_merges(
        &self,
        targets: &[MatchTarget],
        shows: &[Show],
        snapshot: &DirectorySnapshot,
    ) -> Vec<MergeProposal> {
        let infos: Vec<ShowMatchInfo> = shows
            .iter()
            .map(|s| ShowMatchInfo::from_show(s, &self.config))
            .filter(|info| info.auto_merge)
            .collect();
        if infos.is_empty() {
            return Vec::new();
        }

        let mut seen: HashSet<(SeriesId, u32, u32, u32)> = HashSet::new();
        let mut proposals = Vec::new();

        for item in snapshot.items().iter().filter(|i| self.is_eligible(i)) {
            let Some(numbers) = explicit_numbers(&item.stem()).filter(EpisodeNumbers::is_multi)
            else {
                continue;
            };

            for info in infos.iter().filter(|info| self.names_show(item, info)) {
                let Some(show) = shows.iter().find(|s| s.id() == info.series_id) else {
                    continue;
                };
                let episodes = show.episodes(numbers.season);
                let first = episodes.iter().find(|e| e.covers(numbers.first));
                let last = episodes.iter().find(|e| e.covers(numbers.last));
                let (Some(first), Some(last)) = (first, last) else {
                    continue;
                };
                if first.number == last.number {
                    continue;
                }
                let (Some(first_origin), Some(last_origin)) = (first.origin, last.origin) else {
                    continue;
                };

                let covers_missing = targets.iter().any(|t| {
                    let ep = &t.missing.episode;
                    ep.series_id == info.series_id
                        && ep.season == numbers.season
                        && ep.number >= first.number
                        && ep.number <= last.number_end
                });
                if !covers_missing {
                    continue;
                }

                if seen.insert((info.series_id, numbers.season, first_origin, last_origin)) {
                    debug!(
                        series_id = info.series_id,
                        season = numbers.season,
                        first = first_origin,
                        last = last_origin,
                        file = %item.path.display(),
                        "Proposing merge from multi-episode file"
                    );
                    proposals.push(MergeProposal {
                        series_id: info.series_id,
                        season: numbers.season,
                        rule: SeasonRule::merge(first_origin, last_origin),
                        evidence: item.path.clone(),
                    });
                }
            }
        }
        proposals
    }
}
