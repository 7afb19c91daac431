//! Types for the show catalog (episode metadata fetched from a remote source).

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Catalog identifier of a series.
pub type SeriesId = u64;

/// Catalog identifier of an episode.
pub type EpisodeId = u64;

/// An episode exactly as the catalog reports it.
///
/// Immutable once fetched; a refresh replaces the whole show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEpisode {
    /// Owning series.
    pub series_id: SeriesId,
    /// Catalog episode id.
    pub episode_id: EpisodeId,
    /// Season number in aired order.
    pub aired_season: u32,
    /// Episode number in aired order.
    pub aired_number: u32,
    /// Season number in DVD order, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dvd_season: Option<u32>,
    /// Episode number in DVD order, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dvd_number: Option<u32>,
    /// First air date (in the show's local time zone).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<NaiveDate>,
    /// Episode title.
    #[serde(default)]
    pub name: String,
    /// Free-form metadata (overview, rating, director, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl RawEpisode {
    /// Creates an aired-order episode with no air date.
    pub fn new(series_id: SeriesId, episode_id: EpisodeId, season: u32, number: u32) -> Self {
        Self {
            series_id,
            episode_id,
            aired_season: season,
            aired_number: number,
            dvd_season: None,
            dvd_number: None,
            air_date: None,
            name: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Sets the episode title.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the air date.
    pub fn with_air_date(mut self, date: NaiveDate) -> Self {
        self.air_date = Some(date);
        self
    }

    /// Sets the DVD-order position.
    pub fn with_dvd_order(mut self, season: u32, number: u32) -> Self {
        self.dvd_season = Some(season);
        self.dvd_number = Some(number);
        self
    }

    /// Season and number for the requested ordering.
    ///
    /// Returns `None` in DVD order when the catalog has no DVD position.
    pub fn position(&self, dvd_order: bool) -> Option<(u32, u32)> {
        if dvd_order {
            match (self.dvd_season, self.dvd_number) {
                (Some(season), Some(number)) => Some((season, number)),
                _ => None,
            }
        } else {
            Some((self.aired_season, self.aired_number))
        }
    }
}

/// A show as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogShow {
    /// Catalog series id.
    pub id: SeriesId,
    /// Primary show name.
    pub name: String,
    /// Airing status ("Continuing", "Ended", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Local time of day new episodes air.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airs_time: Option<NaiveTime>,
    /// First air date of the show.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_aired: Option<NaiveDate>,
    /// Every known episode, any order.
    #[serde(default)]
    pub episodes: Vec<RawEpisode>,
}

impl CatalogShow {
    /// Creates a show with no episodes.
    pub fn new(id: SeriesId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: None,
            genres: Vec::new(),
            airs_time: None,
            first_aired: None,
            episodes: Vec::new(),
        }
    }

    /// Adds an episode.
    pub fn with_episode(mut self, episode: RawEpisode) -> Self {
        self.episodes.push(episode);
        self
    }

    /// Year the show first aired, if known.
    pub fn year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.first_aired.map(|d| d.year())
    }
}

/// Artwork locations the catalog knows for a show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowArtwork {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fanart: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub season_posters: BTreeMap<u32, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub episode_images: BTreeMap<EpisodeId, String>,
}

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Show not found: {0}")]
    NotFound(SeriesId),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to parse catalog data: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_aired_and_dvd() {
        let ep = RawEpisode::new(1, 10, 2, 5).with_dvd_order(1, 7);
        assert_eq!(ep.position(false), Some((2, 5)));
        assert_eq!(ep.position(true), Some((1, 7)));

        let no_dvd = RawEpisode::new(1, 11, 2, 6);
        assert_eq!(no_dvd.position(true), None);
    }

    #[test]
    fn test_show_year() {
        let mut show = CatalogShow::new(1, "Foo");
        assert_eq!(show.year(), None);
        show.first_aired = NaiveDate::from_ymd_opt(2009, 3, 1);
        assert_eq!(show.year(), Some(2009));
    }

    #[test]
    fn test_raw_episode_deserialize_minimal() {
        let json = r#"{"series_id":1,"episode_id":2,"aired_season":1,"aired_number":3}"#;
        let ep: RawEpisode = serde_json::from_str(json).unwrap();
        assert_eq!(ep.aired_number, 3);
        assert!(ep.air_date.is_none());
        assert!(ep.metadata.is_empty());
    }
}
