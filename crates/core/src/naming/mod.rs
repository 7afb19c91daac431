//! Canonical library names for season folders and episode files.

mod template;

pub use template::{pad, render, sanitize, TokenSource};

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::NamingConfig;
use crate::episode::{ProcessedEpisode, Show};

/// Naming errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// The rendered target exceeds the configured maximum path length.
    #[error("Target path too long ({length} > {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        length: usize,
        max: usize,
    },

    /// The template rendered to an empty name.
    #[error("Template produced an empty filename for {show} S{season:02}E{number:02}")]
    EmptyName {
        show: String,
        season: u32,
        number: u32,
    },
}

struct EpisodeTokens<'a> {
    show: &'a Show,
    episode: &'a ProcessedEpisode,
}

impl TokenSource for EpisodeTokens<'_> {
    fn token(&self, token: &str, width: Option<usize>) -> Option<String> {
        let ep = self.episode;
        let value = match token {
            "ShowName" => self.show.name().to_string(),
            "Season" => pad(ep.season, width.or(Some(1))),
            "Episode" => pad(ep.number, width.or(Some(2))),
            "Episode2" => pad(ep.number_end, width.or(Some(2))),
            "EpisodeName" => ep.name.clone(),
            "AirDate" => ep
                .air_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            "Year" => self
                .show
                .catalog()
                .year()
                .map(|y| y.to_string())
                .unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }

    fn is_multi(&self) -> bool {
        self.episode.is_multi()
    }
}

struct SeasonTokens<'a> {
    show: &'a Show,
    season: u32,
}

impl TokenSource for SeasonTokens<'_> {
    fn token(&self, token: &str, width: Option<usize>) -> Option<String> {
        match token {
            "ShowName" => Some(self.show.name().to_string()),
            "Season" => Some(pad(self.season, width)),
            _ => None,
        }
    }

    fn is_multi(&self) -> bool {
        false
    }
}

/// Renders canonical names from the naming configuration.
#[derive(Debug, Clone)]
pub struct EpisodeNamer {
    config: NamingConfig,
}

impl EpisodeNamer {
    pub fn new(config: NamingConfig) -> Self {
        Self { config }
    }

    /// Canonical filename for `episode`, without extension.
    pub fn file_stem(&self, show: &Show, episode: &ProcessedEpisode) -> String {
        let tokens = EpisodeTokens { show, episode };
        sanitize(&render(&self.config.filename_template, &tokens))
    }

    /// Folder holding `season` of `show`.
    ///
    /// A per-show override wins (relative overrides sit below the show
    /// folder); season 0 uses the specials folder name.
    pub fn season_folder(&self, show: &Show, season: u32) -> PathBuf {
        if let Some(custom) = show.config().season_folders.get(&season) {
            return show.folder().join(custom);
        }
        let name = if season == 0 {
            self.config.specials_folder.clone()
        } else {
            render(
                &self.config.season_folder_template,
                &SeasonTokens { show, season },
            )
        };
        show.folder().join(sanitize(&name))
    }

    /// Full target path for `episode` with `extension` (no dot).
    pub fn target_path(
        &self,
        show: &Show,
        episode: &ProcessedEpisode,
        extension: &str,
    ) -> Result<PathBuf, NamingError> {
        let stem = self.file_stem(show, episode);
        if stem.is_empty() {
            return Err(NamingError::EmptyName {
                show: show.name().to_string(),
                season: episode.season,
                number: episode.number,
            });
        }
        let file_name = if extension.is_empty() {
            stem
        } else {
            format!("{}.{}", stem, extension)
        };
        let path = self.season_folder(show, episode.season).join(file_name);
        self.check_length(&path)?;
        Ok(path)
    }

    /// Rejects paths longer than the configured maximum.
    pub fn check_length(&self, path: &Path) -> Result<(), NamingError> {
        let length = path.as_os_str().to_string_lossy().chars().count();
        if length > self.config.max_path_length {
            return Err(NamingError::PathTooLong {
                path: path.to_path_buf(),
                length,
                max: self.config.max_path_length,
            });
        }
        Ok(())
    }
}
