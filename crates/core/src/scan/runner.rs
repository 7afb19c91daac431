//! Scan runner.
//!
//! One pass, strictly downstream:
//! - Enumerate search locations and show folders into snapshots
//! - Derive episodes per show, synthesizing merge rules from multi-episode files
//! - Check each season folder for present, misnamed and missing episodes
//! - Match missing episodes against search-folder files
//! - Ask the identifier chain for artifacts, then canonicalize everything into a plan

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::action::{
    Action, ActionPlan, ArtifactCategory, CleanupPolicy, EpisodeRef, FileOpKind, FileOperation,
    MissingEpisode,
};
use crate::catalog::{SeriesId, ShowCatalog};
use crate::config::Config;
use crate::control::{Cancelled, ScanControl, ScanPhase};
use crate::episode::{AirStatus, Library, ProcessedEpisode, Show};
use crate::identifiers::{ArtifactEnv, DownloadIdentifierChain, EpisodeFile};
use crate::matcher::{explicit_numbers, FileMatcher, MatchTarget, MergeProposal, ShowMatchInfo};
use crate::metrics;
use crate::naming::{EpisodeNamer, NamingError};
use crate::snapshot::{
    build_snapshot, DirectoryCacheItem, DirectorySnapshot, SnapshotError, SnapshotOptions,
};

use super::types::{ScanError, ScanReport, ScanStats, ScanWarning};

/// One season folder checked against the derived episode list.
struct SeasonCheck<'s> {
    folder: PathBuf,
    /// Episodes with a file in the folder whose numbering starts at the episode.
    present: Vec<(&'s ProcessedEpisode, &'s DirectoryCacheItem)>,
    missing: Vec<MatchTarget>,
}

/// Runs reconciliation passes over a library.
pub struct Scanner<'a> {
    config: &'a Config,
    catalog: &'a dyn ShowCatalog,
    chain: DownloadIdentifierChain,
    matcher: FileMatcher,
    namer: EpisodeNamer,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner with the identifier chain enabled in `config`.
    pub fn new(config: &'a Config, catalog: &'a dyn ShowCatalog) -> Self {
        Self {
            config,
            catalog,
            chain: DownloadIdentifierChain::from_config(&config.artifacts),
            matcher: FileMatcher::new(config.matching.clone()),
            namer: EpisodeNamer::new(config.naming.clone()),
        }
    }

    /// Replaces the identifier chain.
    pub fn with_chain(mut self, chain: DownloadIdentifierChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn chain(&self) -> &DownloadIdentifierChain {
        &self.chain
    }

    /// Runs one full pass and returns the canonical plan.
    ///
    /// Only cancellation and a catalog that fails for every show abort the
    /// pass; everything else is reported in [`ScanReport::warnings`].
    pub fn run(
        &self,
        library: &Library,
        now: DateTime<Utc>,
        control: &mut ScanControl<'_>,
    ) -> Result<ScanReport, ScanError> {
        let started = Instant::now();
        control.check()?;
        info!(shows = library.shows.len(), "Starting scan");

        let mut warnings = Vec::new();
        let mut shows = self.load_shows(library, &mut warnings)?;

        let search = build_snapshot(
            &self.config.scan.search_locations,
            &self.snapshot_options(),
            control,
        )?;
        warnings.extend(search.errors.into_iter().map(ScanWarning::from));
        let search = search.snapshot;
        let library_snapshot = self.library_snapshot(&shows, control, &mut warnings)?;

        let synthesized_rules = self.apply_auto_merges(&mut shows, &library_snapshot, &search, now);

        let mut stats = ScanStats {
            shows: shows.len(),
            search_files: search.len(),
            library_files: library_snapshot.len(),
            ..ScanStats::default()
        };
        let mut pass = self.chain.begin_pass();
        let env = ArtifactEnv {
            catalog: self.catalog,
            library: &library_snapshot,
        };
        let mut actions = Vec::new();
        let mut targets = Vec::new();

        for (index, show) in shows.iter().enumerate() {
            control.check()?;
            control.report(ScanPhase::CheckingLibrary, index, shows.len());

            actions.extend(self.chain.on_show(&mut pass, env, show));
            for season in show.season_numbers() {
                control.check()?;
                let check = self.check_season(show, season, &library_snapshot, now);
                if !check.present.is_empty() || season_has_aired(show, season, now) {
                    actions.extend(self.chain.on_season(&mut pass, env, show, season, &check.folder));
                }

                stats.present += check.present.len();
                for &(episode, item) in &check.present {
                    control.check()?;
                    let video = self.rename_check(
                        show,
                        episode,
                        item,
                        &library_snapshot,
                        &mut actions,
                        &mut warnings,
                    );
                    let file = EpisodeFile {
                        show,
                        episode,
                        video: &video,
                        modified: item.modified,
                    };
                    actions.extend(self.chain.on_episode(&mut pass, env, &file));
                }
                targets.extend(check.missing);
            }
        }
        control.report(ScanPhase::CheckingLibrary, shows.len(), shows.len());

        let infos: BTreeMap<SeriesId, ShowMatchInfo> = shows
            .iter()
            .map(|show| (show.id(), ShowMatchInfo::from_show(show, &self.config.matching)))
            .collect();
        let outcome = self
            .matcher
            .find_matches(&targets, &infos, &search, control)?;

        let mut still_missing = outcome.unresolved.clone();
        for resolved in &outcome.resolved {
            control.check()?;
            let target = &targets[resolved.target];
            let operation = match self.resolve(target, &resolved.file) {
                Ok(operation) => operation,
                Err(e) => {
                    warn!(error = %e, file = %resolved.file.path.display(), "Skipping match");
                    warnings.push(e.into());
                    still_missing.push(resolved.target);
                    continue;
                }
            };

            let mut artifacts = Vec::new();
            if let Some((show, episode)) = find_episode(&shows, &target.missing.episode) {
                let file = EpisodeFile {
                    show,
                    episode,
                    video: &operation.target,
                    modified: None,
                };
                artifacts = self.chain.on_episode(&mut pass, env, &file);
            }
            actions.push(Action::file(operation));
            actions.extend(artifacts);
            stats.resolved += 1;
        }

        for ambiguity in &outcome.ambiguities {
            let episode = targets[ambiguity.target].missing.episode.clone();
            warn!(
                series_id = episode.series_id,
                season = episode.season,
                number = episode.number,
                candidates = ambiguity.candidates.len(),
                "Ambiguous match, episode left missing"
            );
            warnings.push(ScanWarning::AmbiguousMatch {
                episode,
                ambiguity: ambiguity.kind,
                candidates: ambiguity.candidates.clone(),
            });
        }
        stats.ambiguous = outcome.ambiguities.len();

        still_missing.sort_unstable();
        for index in still_missing {
            actions.push(Action::missing(targets[index].missing.clone()));
            stats.missing += 1;
        }

        control.check()?;
        control.report(ScanPhase::Planning, 0, 1);
        let plan = ActionPlan::build(
            actions,
            &self.config.plan,
            &[&search, &library_snapshot],
            &self.config.scan.search_locations,
        );
        control.report(ScanPhase::Planning, 1, 1);

        let elapsed = started.elapsed();
        metrics::SCAN_DURATION.observe(elapsed.as_secs_f64());
        info!(
            actions = plan.len(),
            missing = stats.missing,
            resolved = stats.resolved,
            warnings = warnings.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Scan complete"
        );

        Ok(ScanReport {
            plan,
            warnings,
            synthesized_rules,
            stats,
            pass,
            library: library_snapshot,
        })
    }

    /// Forwards a completed file operation to the chain, within the report's pass.
    ///
    /// Returns the follow-up artifacts (for example the `.nfo` of a video that
    /// just landed). Paths already queued during the scan are not proposed again.
    pub fn operation_completed(
        &self,
        report: &mut ScanReport,
        operation: &FileOperation,
    ) -> Vec<Action> {
        let env = ArtifactEnv {
            catalog: self.catalog,
            library: &report.library,
        };
        let actions = self
            .chain
            .on_operation_completed(&mut report.pass, env, operation);
        debug!(
            target = %operation.target.display(),
            proposed = actions.len(),
            "Operation completed"
        );
        actions
    }

    /// Regenerates artifacts for every episode already in the library.
    ///
    /// Existence and freshness checks are bypassed; `only` limits the refresh
    /// to one artifact category. No file operations or missing episodes are
    /// produced.
    pub fn force_refresh(
        &self,
        library: &Library,
        only: Option<ArtifactCategory>,
        now: DateTime<Utc>,
        control: &mut ScanControl<'_>,
    ) -> Result<ScanReport, ScanError> {
        control.check()?;
        info!(shows = library.shows.len(), only = ?only, "Starting forced refresh");

        let mut warnings = Vec::new();
        let shows = self.load_shows(library, &mut warnings)?;
        let library_snapshot = self.library_snapshot(&shows, control, &mut warnings)?;

        let mut stats = ScanStats {
            shows: shows.len(),
            library_files: library_snapshot.len(),
            ..ScanStats::default()
        };
        let mut pass = self.chain.begin_forced_pass(only);
        let env = ArtifactEnv {
            catalog: self.catalog,
            library: &library_snapshot,
        };
        let mut actions = Vec::new();

        for (index, show) in shows.iter().enumerate() {
            control.check()?;
            control.report(ScanPhase::CheckingLibrary, index, shows.len());

            actions.extend(self.chain.on_show(&mut pass, env, show));
            for season in show.season_numbers() {
                let check = self.check_season(show, season, &library_snapshot, now);
                if !check.present.is_empty() || season_has_aired(show, season, now) {
                    actions.extend(self.chain.on_season(&mut pass, env, show, season, &check.folder));
                }
                stats.present += check.present.len();
                for &(episode, item) in &check.present {
                    control.check()?;
                    let file = EpisodeFile {
                        show,
                        episode,
                        video: &item.path,
                        modified: item.modified,
                    };
                    actions.extend(self.chain.on_episode(&mut pass, env, &file));
                }
            }
        }
        control.report(ScanPhase::CheckingLibrary, shows.len(), shows.len());

        let plan = ActionPlan::build(
            actions,
            &self.config.plan,
            &[&library_snapshot],
            &self.config.scan.search_locations,
        );
        info!(actions = plan.len(), "Forced refresh complete");

        Ok(ScanReport {
            plan,
            warnings,
            synthesized_rules: Vec::new(),
            stats,
            pass,
            library: library_snapshot,
        })
    }

    fn snapshot_options(&self) -> SnapshotOptions {
        SnapshotOptions {
            follow_links: self.config.scan.follow_links,
            max_depth: self.config.scan.max_depth,
        }
    }

    fn load_shows(
        &self,
        library: &Library,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<Vec<Show>, ScanError> {
        let mut shows = Vec::with_capacity(library.shows.len());
        for config in &library.shows {
            match self.catalog.get_show(config.series_id) {
                Ok(catalog) => shows.push(Show::new(config.clone(), catalog)),
                Err(e) => {
                    warn!(series_id = config.series_id, error = %e, "Skipping show");
                    warnings.push(ScanWarning::CatalogUnavailable {
                        series_id: config.series_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        if shows.is_empty() && !library.shows.is_empty() {
            return Err(ScanError::CatalogUnreachable {
                shows: library.shows.len(),
            });
        }
        Ok(shows)
    }

    /// Snapshot of every show folder plus season folders that live elsewhere.
    fn library_snapshot(
        &self,
        shows: &[Show],
        control: &mut ScanControl<'_>,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<DirectorySnapshot, Cancelled> {
        let mut roots = BTreeSet::new();
        for show in shows {
            roots.insert(show.folder().to_path_buf());
            for &season in show.config().season_folders.keys() {
                let folder = self.namer.season_folder(show, season);
                if !folder.starts_with(show.folder()) {
                    roots.insert(folder);
                }
            }
        }
        let roots: Vec<PathBuf> = roots.into_iter().collect();

        let build = build_snapshot(&roots, &self.snapshot_options(), control)?;
        for error in build.errors {
            match error {
                // A show without files yet has no folder.
                SnapshotError::RootNotFound { path } => {
                    debug!(path = %path.display(), "Show folder does not exist")
                }
                other => warnings.push(other.into()),
            }
        }
        Ok(build.snapshot)
    }

    /// Adds a merge rule for every multi-episode search file that covers a
    /// missing episode, re-deriving the affected seasons.
    fn apply_auto_merges(
        &self,
        shows: &mut [Show],
        library: &DirectorySnapshot,
        search: &DirectorySnapshot,
        now: DateTime<Utc>,
    ) -> Vec<MergeProposal> {
        if !self.config.matching.auto_merge {
            return Vec::new();
        }

        let mut targets = Vec::new();
        for show in shows.iter() {
            for season in show.season_numbers() {
                targets.extend(self.check_season(show, season, library, now).missing);
            }
        }

        let proposals = self.matcher.propose_merges(&targets, shows, search);
        for proposal in &proposals {
            let Some(show) = shows.iter_mut().find(|s| s.id() == proposal.series_id) else {
                continue;
            };
            info!(
                series_id = proposal.series_id,
                season = proposal.season,
                rule = ?proposal.rule,
                evidence = %proposal.evidence.display(),
                "Auto-merge rule added"
            );
            show.add_rule(proposal.season, proposal.rule.clone());
            metrics::AUTO_MERGES.inc();
        }
        proposals
    }

    fn check_season<'s>(
        &self,
        show: &'s Show,
        season: u32,
        library: &'s DirectorySnapshot,
        now: DateTime<Utc>,
    ) -> SeasonCheck<'s> {
        let folder = self.namer.season_folder(show, season);
        let files: Vec<_> = library
            .files_in(&folder)
            .filter(|item| self.matcher.is_eligible(item))
            .filter_map(|item| explicit_numbers(&item.stem()).map(|numbers| (numbers, item)))
            .filter(|(numbers, _)| numbers.season == season)
            .collect();

        let skip_missing = !show.config().missing_check || show.is_season_ignored(season);
        let schedule = show.schedule();
        let mut present = Vec::new();
        let mut missing = Vec::new();

        for episode in show.episodes(season) {
            let (number, number_end) = (episode.number, episode.number_end);
            if let Some((_, item)) = files
                .iter()
                .find(|(n, _)| n.fills(season, number, number_end))
            {
                present.push((episode, *item));
                continue;
            }
            // Covered by another episode's multi-episode file.
            if files.iter().any(|(n, _)| n.spans(number, number_end)) {
                continue;
            }
            if skip_missing {
                continue;
            }

            let report = match schedule.has_aired(episode.air_date(), now) {
                Some(true) => true,
                Some(false) => self.config.matching.include_unaired,
                None => self.config.matching.include_undated,
            };
            if !report {
                continue;
            }

            missing.push(MatchTarget {
                missing: MissingEpisode {
                    episode: EpisodeRef::new(show, episode),
                    show_name: show.name().to_string(),
                    target_folder: folder.clone(),
                    target_stem: self.namer.file_stem(show, episode),
                },
                overall_number: episode.overall_number,
            });
        }

        SeasonCheck {
            folder,
            present,
            missing,
        }
    }

    /// Queues a rename when a library file's name differs from the canonical
    /// one. Returns the path the video will have after the plan runs.
    fn rename_check(
        &self,
        show: &Show,
        episode: &ProcessedEpisode,
        item: &DirectoryCacheItem,
        library: &DirectorySnapshot,
        actions: &mut Vec<Action>,
        warnings: &mut Vec<ScanWarning>,
    ) -> PathBuf {
        if !self.config.matching.rename_check || !show.config().rename_check {
            return item.path.clone();
        }
        let target = match self
            .namer
            .target_path(show, episode, &raw_extension(&item.path))
        {
            Ok(target) => target,
            Err(e) => {
                warn!(error = %e, file = %item.path.display(), "Skipping rename");
                warnings.push(e.into());
                return item.path.clone();
            }
        };
        if target == item.path {
            return target;
        }
        if library.contains(&target) {
            debug!(
                source = %item.path.display(),
                target = %target.display(),
                "Rename target already exists, keeping name"
            );
            return item.path.clone();
        }

        debug!(source = %item.path.display(), target = %target.display(), "Queueing rename");
        let mut operation = FileOperation::new(FileOpKind::Rename, item.path.clone(), target.clone());
        operation.episode = Some(EpisodeRef::new(show, episode));
        actions.push(Action::file(operation));
        target
    }

    /// Copy of a matched search file to the missing episode's canonical path.
    fn resolve(
        &self,
        target: &MatchTarget,
        file: &DirectoryCacheItem,
    ) -> Result<FileOperation, NamingError> {
        let extension = raw_extension(&file.path);
        let name = if extension.is_empty() {
            target.missing.target_stem.clone()
        } else {
            format!("{}.{}", target.missing.target_stem, extension)
        };
        let path = target.missing.target_folder.join(name);
        self.namer.check_length(&path)?;

        let mut operation = FileOperation::new(FileOpKind::Copy, file.path.clone(), path);
        operation.cleanup = Some(CleanupPolicy::TidySourceFolder);
        operation.resolves = Some(target.missing.clone());
        operation.episode = Some(target.missing.episode.clone());
        Ok(operation)
    }
}

impl std::fmt::Debug for Scanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("identifiers", &self.chain.names())
            .finish()
    }
}

fn season_has_aired(show: &Show, season: u32, now: DateTime<Utc>) -> bool {
    show.season(season).is_some_and(|s| {
        matches!(
            s.air_status(&show.schedule(), now),
            AirStatus::PartiallyAired | AirStatus::FullyAired
        )
    })
}

fn find_episode<'s>(
    shows: &'s [Show],
    episode: &EpisodeRef,
) -> Option<(&'s Show, &'s ProcessedEpisode)> {
    let show = shows.iter().find(|s| s.id() == episode.series_id)?;
    let found = show
        .episodes(episode.season)
        .iter()
        .find(|e| e.number == episode.number)?;
    Some((show, found))
}

/// Extension as written on disk, without the dot.
fn raw_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, ArtifactKind};
    use crate::catalog::{CatalogShow, MemoryCatalog, RawEpisode};
    use crate::control::CancelFlag;
    use crate::episode::ShowConfig;
    use chrono::{NaiveDate, TimeZone};
    use std::fs;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn catalog(episodes: u32) -> MemoryCatalog {
        let mut show = CatalogShow::new(1, "Foo");
        for n in 1..=episodes {
            show = show.with_episode(
                RawEpisode::new(1, 100 + n as u64, 1, n)
                    .with_name(format!("Ep {}", n))
                    .with_air_date(NaiveDate::from_ymd_opt(2020, 1, n).unwrap()),
            );
        }
        let mut catalog = MemoryCatalog::new();
        catalog.insert(show);
        catalog
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"video").unwrap();
    }

    struct Fixture {
        _dir: TempDir,
        lib: PathBuf,
        downloads: PathBuf,
        config: Config,
        library: Library,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let lib = dir.path().join("lib");
        let downloads = dir.path().join("downloads");
        fs::create_dir_all(&downloads).unwrap();
        let mut config = Config::default();
        config.scan.search_locations = vec![downloads.clone()];
        let library = Library {
            shows: vec![ShowConfig::new(1, lib.join("Foo"))],
        };
        Fixture {
            _dir: dir,
            lib,
            downloads,
            config,
            library,
        }
    }

    fn file_ops(plan: &ActionPlan) -> Vec<&FileOperation> {
        plan.iter().filter_map(Action::as_file_operation).collect()
    }

    #[test]
    fn test_run_matches_missing_and_reports_rest() {
        let fx = fixture();
        touch(&fx.lib.join("Foo/Season 01/Foo - S01E01.mkv"));
        touch(&fx.downloads.join("foo.s01e02.720p.mkv"));
        let catalog = catalog(3);

        let scanner = Scanner::new(&fx.config, &catalog);
        let report = scanner
            .run(&fx.library, now(), &mut ScanControl::unbounded())
            .unwrap();

        let ops = file_ops(&report.plan);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operation, FileOpKind::Move);
        assert_eq!(ops[0].source, fx.downloads.join("foo.s01e02.720p.mkv"));
        assert_eq!(ops[0].target, fx.lib.join("Foo/Season 01/Foo - S01E02.mkv"));

        let missing: Vec<u32> = report.plan.missing().map(|m| m.episode.number).collect();
        assert_eq!(missing, vec![3]);
        assert_eq!(report.stats.present, 1);
        assert_eq!(report.stats.resolved, 1);
        assert_eq!(report.stats.missing, 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_run_unaired_episodes_not_missing() {
        let fx = fixture();
        let mut show = CatalogShow::new(1, "Foo").with_episode(
            RawEpisode::new(1, 101, 1, 1).with_air_date(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()),
        );
        show = show.with_episode(RawEpisode::new(1, 102, 1, 2));
        let mut catalog = MemoryCatalog::new();
        catalog.insert(show);

        let scanner = Scanner::new(&fx.config, &catalog);
        let report = scanner
            .run(&fx.library, now(), &mut ScanControl::unbounded())
            .unwrap();
        assert!(report.plan.is_empty());

        let mut config = fx.config.clone();
        config.matching.include_unaired = true;
        config.matching.include_undated = true;
        let scanner = Scanner::new(&config, &catalog);
        let report = scanner
            .run(&fx.library, now(), &mut ScanControl::unbounded())
            .unwrap();
        assert_eq!(report.plan.missing().count(), 2);
    }

    #[test]
    fn test_run_renames_misnamed_library_file() {
        let fx = fixture();
        touch(&fx.lib.join("Foo/Season 01/foo 1x01.mkv"));
        let catalog = catalog(1);

        let scanner = Scanner::new(&fx.config, &catalog);
        let report = scanner
            .run(&fx.library, now(), &mut ScanControl::unbounded())
            .unwrap();

        let ops = file_ops(&report.plan);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operation, FileOpKind::Rename);
        assert_eq!(ops[0].target, fx.lib.join("Foo/Season 01/Foo - S01E01.mkv"));
        assert_eq!(report.plan.missing().count(), 0);
    }

    #[test]
    fn test_run_ambiguous_match_left_missing() {
        let fx = fixture();
        touch(&fx.downloads.join("foo.s01e01.mkv"));
        touch(&fx.downloads.join("foo 1x01 proper.mkv"));
        let catalog = catalog(1);

        let scanner = Scanner::new(&fx.config, &catalog);
        let report = scanner
            .run(&fx.library, now(), &mut ScanControl::unbounded())
            .unwrap();

        assert!(file_ops(&report.plan).is_empty());
        assert_eq!(report.plan.missing().count(), 1);
        assert!(matches!(
            report.warnings.as_slice(),
            [ScanWarning::AmbiguousMatch { candidates, .. }] if candidates.len() == 2
        ));
    }

    #[test]
    fn test_run_auto_merge_synthesizes_rule() {
        let mut fx = fixture();
        fx.library.shows[0].auto_merge = true;
        touch(&fx.downloads.join("Foo.S01E02E03.mkv"));
        let catalog = catalog(3);

        let scanner = Scanner::new(&fx.config, &catalog);
        let report = scanner
            .run(&fx.library, now(), &mut ScanControl::unbounded())
            .unwrap();

        assert_eq!(report.synthesized_rules.len(), 1);
        let ops = file_ops(&report.plan);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].target, fx.lib.join("Foo/Season 01/Foo - S01E02-E03.mkv"));
        let missing: Vec<u32> = report.plan.missing().map(|m| m.episode.number).collect();
        assert_eq!(missing, vec![1]);
    }

    #[test]
    fn test_run_cancelled() {
        let fx = fixture();
        let catalog = catalog(1);
        let flag = CancelFlag::new();
        flag.cancel();

        let scanner = Scanner::new(&fx.config, &catalog);
        let result = scanner.run(&fx.library, now(), &mut ScanControl::new(flag));
        assert!(matches!(result, Err(ScanError::Cancelled)));
    }

    #[test]
    fn test_run_catalog_unreachable_for_every_show() {
        let fx = fixture();
        let catalog = MemoryCatalog::new();
        let scanner = Scanner::new(&fx.config, &catalog);
        let result = scanner.run(&fx.library, now(), &mut ScanControl::unbounded());
        assert!(matches!(
            result,
            Err(ScanError::CatalogUnreachable { shows: 1 })
        ));
    }

    #[test]
    fn test_operation_completed_within_pass() {
        let mut fx = fixture();
        fx.config.artifacts.kodi_nfo = true;
        touch(&fx.downloads.join("foo.s01e01.mkv"));
        let catalog = catalog(1);

        let scanner = Scanner::new(&fx.config, &catalog);
        let mut report = scanner
            .run(&fx.library, now(), &mut ScanControl::unbounded())
            .unwrap();
        let operation = file_ops(&report.plan)[0].clone();

        // The episode nfo for the incoming file was already queued by the scan.
        assert!(scanner.operation_completed(&mut report, &operation).is_empty());

        let mut other = operation.clone();
        other.target = fx.lib.join("Foo/Season 01/elsewhere.mkv");
        let follow_up = scanner.operation_completed(&mut report, &other);
        assert_eq!(follow_up.len(), 1);
        assert!(matches!(
            &follow_up[0].kind,
            ActionKind::DownloadArtifact(a) if a.kind == ArtifactKind::KodiEpisodeNfo
        ));
    }

    #[test]
    fn test_force_refresh_regenerates_existing() {
        let mut fx = fixture();
        fx.config.artifacts.kodi_nfo = true;
        touch(&fx.lib.join("Foo/Season 01/Foo - S01E01.mkv"));
        touch(&fx.lib.join("Foo/Season 01/Foo - S01E01.nfo"));
        touch(&fx.lib.join("Foo/tvshow.nfo"));
        let catalog = catalog(1);

        let scanner = Scanner::new(&fx.config, &catalog);
        let report = scanner
            .run(&fx.library, now(), &mut ScanControl::unbounded())
            .unwrap();
        assert!(report.plan.is_empty());

        let refreshed = scanner
            .force_refresh(
                &fx.library,
                Some(ArtifactCategory::Metadata),
                now(),
                &mut ScanControl::unbounded(),
            )
            .unwrap();
        assert_eq!(refreshed.plan.len(), 2);

        let images = scanner
            .force_refresh(
                &fx.library,
                Some(ArtifactCategory::Image),
                now(),
                &mut ScanControl::unbounded(),
            )
            .unwrap();
        assert!(images.plan.is_empty());
    }
}
