//! In-memory catalog backed by a JSON dump.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{CatalogError, CatalogShow, EpisodeId, SeriesId, ShowArtwork};
use super::ShowCatalog;

/// One show plus its artwork, as stored in a catalog dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub show: CatalogShow,
    #[serde(default)]
    pub artwork: ShowArtwork,
}

#[derive(Debug, Deserialize)]
struct CatalogDump {
    #[serde(default)]
    shows: Vec<CatalogEntry>,
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    entries: BTreeMap<SeriesId, CatalogEntry>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a dump of the form `{"shows": [{"show": {...}, "artwork": {...}}]}`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let dump: CatalogDump =
            serde_json::from_str(json).map_err(|e| CatalogError::ParseError(e.to_string()))?;

        let mut catalog = Self::new();
        for entry in dump.shows {
            catalog.entries.insert(entry.show.id, entry);
        }
        Ok(catalog)
    }

    /// Adds or replaces a show without artwork.
    pub fn insert(&mut self, show: CatalogShow) {
        self.insert_with_artwork(show, ShowArtwork::default());
    }

    /// Adds or replaces a show together with its artwork.
    pub fn insert_with_artwork(&mut self, show: CatalogShow, artwork: ShowArtwork) {
        self.entries.insert(show.id, CatalogEntry { show, artwork });
    }

    /// Number of shows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no show is loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn artwork(&self, id: SeriesId) -> Option<&ShowArtwork> {
        self.entries.get(&id).map(|e| &e.artwork)
    }
}

impl ShowCatalog for MemoryCatalog {
    fn get_show(&self, id: SeriesId) -> Result<CatalogShow, CatalogError> {
        self.entries
            .get(&id)
            .map(|e| e.show.clone())
            .ok_or(CatalogError::NotFound(id))
    }

    fn series_poster_url(&self, id: SeriesId) -> Option<String> {
        self.artwork(id).and_then(|a| a.poster.clone())
    }

    fn series_fanart_url(&self, id: SeriesId) -> Option<String> {
        self.artwork(id).and_then(|a| a.fanart.clone())
    }

    fn season_poster_url(&self, id: SeriesId, season: u32) -> Option<String> {
        self.artwork(id)
            .and_then(|a| a.season_posters.get(&season).cloned())
    }

    fn episode_image_url(&self, id: SeriesId, episode: EpisodeId) -> Option<String> {
        self.artwork(id)
            .and_then(|a| a.episode_images.get(&episode).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_show_not_found() {
        let catalog = MemoryCatalog::new();
        let err = catalog.get_show(42).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(42)));
    }

    #[test]
    fn test_from_json_with_artwork() {
        let json = r#"{
            "shows": [{
                "show": {"id": 7, "name": "Foo", "episodes": [
                    {"series_id": 7, "episode_id": 70, "aired_season": 1, "aired_number": 1}
                ]},
                "artwork": {"poster": "http://img/poster.jpg", "season_posters": {"1": "http://img/s1.jpg"}}
            }]
        }"#;
        let catalog = MemoryCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);

        let show = catalog.get_show(7).unwrap();
        assert_eq!(show.name, "Foo");
        assert_eq!(show.episodes.len(), 1);
        assert_eq!(
            catalog.series_poster_url(7).as_deref(),
            Some("http://img/poster.jpg")
        );
        assert_eq!(
            catalog.season_poster_url(7, 1).as_deref(),
            Some("http://img/s1.jpg")
        );
        assert_eq!(catalog.season_poster_url(7, 2), None);
        assert_eq!(catalog.series_fanart_url(7), None);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = MemoryCatalog::from_json("{not json").unwrap_err();
        assert!(matches!(err, CatalogError::ParseError(_)));
    }
}
