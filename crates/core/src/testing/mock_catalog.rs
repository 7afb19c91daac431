//! Mock show catalog for testing.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::catalog::{
    CatalogError, CatalogShow, EpisodeId, MemoryCatalog, SeriesId, ShowArtwork, ShowCatalog,
};

/// Mock implementation of the ShowCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Serve shows and artwork from memory
/// - Track show lookups for assertions
/// - Simulate an unreachable catalog per show
///
/// # Example
///
/// ```rust,ignore
/// use reconciler_core::testing::{fixtures, MockCatalog};
///
/// let catalog = MockCatalog::new()
///     .with_show(fixtures::catalog_show(1, "Foo", 1, 3))
///     .with_unavailable(2);
///
/// assert!(catalog.get_show(1).is_ok());
/// assert!(catalog.get_show(2).is_err());
/// assert_eq!(catalog.lookups(), vec![1, 2]);
/// ```
#[derive(Debug, Default)]
pub struct MockCatalog {
    inner: MemoryCatalog,
    /// Series whose lookups fail with `CatalogError::Unavailable`.
    unavailable: HashSet<SeriesId>,
    /// Recorded `get_show` calls.
    lookups: Mutex<Vec<SeriesId>>,
}

impl MockCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a show without artwork.
    pub fn with_show(mut self, show: CatalogShow) -> Self {
        self.inner.insert(show);
        self
    }

    /// Add a show with artwork.
    pub fn with_show_and_artwork(mut self, show: CatalogShow, artwork: ShowArtwork) -> Self {
        self.inner.insert_with_artwork(show, artwork);
        self
    }

    /// Make lookups of `id` fail as if the catalog were down.
    pub fn with_unavailable(mut self, id: SeriesId) -> Self {
        self.unavailable.insert(id);
        self
    }

    /// Series ids passed to `get_show`, in call order.
    pub fn lookups(&self) -> Vec<SeriesId> {
        self.lookups
            .lock()
            .map(|l| l.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl ShowCatalog for MockCatalog {
    fn get_show(&self, id: SeriesId) -> Result<CatalogShow, CatalogError> {
        match self.lookups.lock() {
            Ok(mut lookups) => lookups.push(id),
            Err(poisoned) => poisoned.into_inner().push(id),
        }
        if self.unavailable.contains(&id) {
            return Err(CatalogError::Unavailable(format!(
                "mock catalog: series {} unavailable",
                id
            )));
        }
        self.inner.get_show(id)
    }

    fn series_poster_url(&self, id: SeriesId) -> Option<String> {
        self.inner.series_poster_url(id)
    }

    fn series_fanart_url(&self, id: SeriesId) -> Option<String> {
        self.inner.series_fanart_url(id)
    }

    fn season_poster_url(&self, id: SeriesId, season: u32) -> Option<String> {
        self.inner.season_poster_url(id, season)
    }

    fn episode_image_url(&self, id: SeriesId, episode: EpisodeId) -> Option<String> {
        self.inner.episode_image_url(id, episode)
    }
}
