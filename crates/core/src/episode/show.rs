//! Library shows and their derived episode lists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::rules::derive_season;
use super::season::{AirSchedule, Season};
use super::types::{ProcessedEpisode, SeasonRule};
use crate::catalog::{CatalogShow, SeriesId};

/// A show as declared in the user's library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowConfig {
    /// Catalog id.
    pub series_id: SeriesId,
    /// Root folder of the show in the library.
    pub folder: PathBuf,
    /// Name used instead of the catalog name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    /// Extra names files may use for the show.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub dvd_order: bool,
    /// Match files by a bare overall episode number.
    #[serde(default)]
    pub sequential_matching: bool,
    /// Synthesize merge rules from multi-episode files.
    #[serde(default)]
    pub auto_merge: bool,
    /// Offset of the show's time zone from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Per-season folder overrides, relative to `folder` unless absolute.
    #[serde(default)]
    pub season_folders: BTreeMap<u32, PathBuf>,
    /// Rules per season, applied in order.
    #[serde(default)]
    pub rules: BTreeMap<u32, Vec<SeasonRule>>,
    /// Seasons skipped by the missing check.
    #[serde(default)]
    pub ignore_seasons: Vec<u32>,
    #[serde(default = "default_true")]
    pub missing_check: bool,
    #[serde(default = "default_true")]
    pub rename_check: bool,
}

fn default_true() -> bool {
    true
}

impl ShowConfig {
    /// Creates a show with default settings.
    pub fn new(series_id: SeriesId, folder: impl Into<PathBuf>) -> Self {
        Self {
            series_id,
            folder: folder.into(),
            custom_name: None,
            aliases: Vec::new(),
            dvd_order: false,
            sequential_matching: false,
            auto_merge: false,
            utc_offset_minutes: 0,
            season_folders: BTreeMap::new(),
            rules: BTreeMap::new(),
            ignore_seasons: Vec::new(),
            missing_check: true,
            rename_check: true,
        }
    }
}

/// Errors loading a library description.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The library file could not be read.
    #[error("Failed to read library {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The library file is not valid.
    #[error("Failed to parse library: {0}")]
    Parse(String),
}

/// The user's library: every show to reconcile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub shows: Vec<ShowConfig>,
}

impl Library {
    pub fn from_json(json: &str) -> Result<Self, LibraryError> {
        serde_json::from_str(json).map_err(|e| LibraryError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, LibraryError> {
        let text = std::fs::read_to_string(path).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

/// A library show joined with its catalog data and derived episodes.
#[derive(Debug, Clone)]
pub struct Show {
    config: ShowConfig,
    catalog: CatalogShow,
    seasons: BTreeMap<u32, Season>,
    episodes: BTreeMap<u32, Vec<ProcessedEpisode>>,
}

impl Show {
    /// Groups the catalog episodes into seasons and applies every rule.
    pub fn new(config: ShowConfig, catalog: CatalogShow) -> Self {
        let seasons = Season::group(&catalog.episodes, config.dvd_order);
        let mut show = Self {
            config,
            catalog,
            seasons,
            episodes: BTreeMap::new(),
        };
        let numbers: Vec<u32> = show.seasons.keys().copied().collect();
        for number in numbers {
            show.derive(number);
        }
        show.assign_overall_numbers();
        show
    }

    pub fn id(&self) -> SeriesId {
        self.config.series_id
    }

    /// Display name: the custom name when set, else the catalog name.
    pub fn name(&self) -> &str {
        self.config
            .custom_name
            .as_deref()
            .unwrap_or(&self.catalog.name)
    }

    pub fn config(&self) -> &ShowConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogShow {
        &self.catalog
    }

    pub fn folder(&self) -> &Path {
        &self.config.folder
    }

    pub fn schedule(&self) -> AirSchedule {
        AirSchedule {
            airs_time: self.catalog.airs_time,
            utc_offset_minutes: self.config.utc_offset_minutes,
        }
    }

    /// Every name a file may use for the show: catalog name, custom name, aliases.
    pub fn candidate_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = vec![self.catalog.name.as_str()];
        names.extend(self.config.custom_name.as_deref());
        names.extend(self.config.aliases.iter().map(String::as_str));
        let mut unique = Vec::with_capacity(names.len());
        for name in names {
            if !name.trim().is_empty() && !unique.contains(&name) {
                unique.push(name);
            }
        }
        unique
    }

    pub fn season_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.seasons.keys().copied()
    }

    pub fn season(&self, number: u32) -> Option<&Season> {
        self.seasons.get(&number)
    }

    /// Processed episodes of a season, ordered by number.
    pub fn episodes(&self, season: u32) -> &[ProcessedEpisode] {
        self.episodes.get(&season).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rules(&self, season: u32) -> &[SeasonRule] {
        self.config
            .rules
            .get(&season)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the missing check skips `season`.
    pub fn is_season_ignored(&self, season: u32) -> bool {
        self.config.ignore_seasons.contains(&season)
    }

    /// Appends a rule to a season and re-derives it.
    ///
    /// Overall numbers are recomputed for the whole show since later seasons
    /// shift when a season's slot count changes.
    pub fn add_rule(&mut self, season: u32, rule: SeasonRule) -> &[ProcessedEpisode] {
        debug!(series_id = self.id(), season, rule = ?rule, "Adding season rule");
        self.config.rules.entry(season).or_default().push(rule);
        self.derive(season);
        self.assign_overall_numbers();
        self.episodes(season)
    }

    fn derive(&mut self, season: u32) {
        let Some(raw) = self.seasons.get(&season) else {
            return;
        };
        let episodes = derive_season(
            self.config.series_id,
            season,
            &raw.episodes,
            self.config.dvd_order,
            self.rules(season),
        );
        self.episodes.insert(season, episodes);
    }

    /// Numbers regular-season slots consecutively across the show.
    fn assign_overall_numbers(&mut self) {
        let mut next = 1u32;
        for (season, episodes) in self.episodes.iter_mut() {
            for episode in episodes.iter_mut() {
                if *season == 0 {
                    episode.overall_number = None;
                    continue;
                }
                episode.overall_number = Some(next);
                next += episode.number_end - episode.number + 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RawEpisode;
    use crate::episode::EpisodeKind;

    fn catalog() -> CatalogShow {
        let mut show = CatalogShow::new(5, "Foo");
        for n in 1..=3 {
            show = show.with_episode(RawEpisode::new(5, 10 + u64::from(n), 1, n));
        }
        for n in 1..=2 {
            show = show.with_episode(RawEpisode::new(5, 20 + u64::from(n), 2, n));
        }
        show.with_episode(RawEpisode::new(5, 99, 0, 1))
    }

    #[test]
    fn test_show_derives_all_seasons() {
        let show = Show::new(ShowConfig::new(5, "/lib/Foo"), catalog());
        assert_eq!(show.season_numbers().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(show.episodes(1).len(), 3);
        assert_eq!(show.episodes(7).len(), 0);
        assert_eq!(show.name(), "Foo");
    }

    #[test]
    fn test_overall_numbers_skip_specials() {
        let show = Show::new(ShowConfig::new(5, "/lib/Foo"), catalog());
        assert_eq!(show.episodes(0)[0].overall_number, None);
        assert_eq!(show.episodes(1)[0].overall_number, Some(1));
        assert_eq!(show.episodes(2)[0].overall_number, Some(4));
    }

    #[test]
    fn test_add_rule_rederives_season() {
        let mut show = Show::new(ShowConfig::new(5, "/lib/Foo"), catalog());
        let season = show.add_rule(1, SeasonRule::merge(2, 3));
        assert_eq!(season.len(), 2);
        assert_eq!(season[1].kind, EpisodeKind::Merged);
        assert_eq!(show.rules(1).len(), 1);
        assert_eq!(show.episodes(2)[0].overall_number, Some(4));
    }

    #[test]
    fn test_candidate_names_deduplicated() {
        let mut config = ShowConfig::new(5, "/lib/Foo");
        config.custom_name = Some("Foo".to_string());
        config.aliases = vec!["Foo US".to_string(), "".to_string()];
        let show = Show::new(config, catalog());
        assert_eq!(show.candidate_names(), vec!["Foo", "Foo US"]);
    }

    #[test]
    fn test_library_from_json() {
        let json = r#"{"shows":[{"series_id":5,"folder":"/lib/Foo","aliases":["Foo US"],
            "rules":{"1":[{"action":"merge","first":2,"second":3}]}}]}"#;
        let library = Library::from_json(json).unwrap();
        assert_eq!(library.shows.len(), 1);
        let show = &library.shows[0];
        assert!(show.missing_check);
        assert_eq!(show.rules[&1], vec![SeasonRule::merge(2, 3)]);
    }

    #[test]
    fn test_library_from_json_invalid() {
        assert!(matches!(
            Library::from_json("[1,2"),
            Err(LibraryError::Parse(_))
        ));
    }
}
