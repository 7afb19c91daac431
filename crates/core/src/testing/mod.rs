//! Testing utilities and mock implementations for integration tests.
//!
//! This module provides a mock catalog and fixture builders, allowing scans
//! to be exercised against real temporary folders without a remote catalog.
//!
//! # Example
//!
//! ```rust,ignore
//! use reconciler_core::testing::{fixtures, MockCatalog};
//!
//! let catalog = MockCatalog::new().with_show(fixtures::catalog_show(1, "Foo", 2, 10));
//! let library = Library { shows: vec![fixtures::show_config(1, "/lib/Foo")] };
//!
//! // Create some files...
//! fixtures::touch(&downloads.join("foo.s01e02.mkv"), 1024)?;
//! ```

mod mock_catalog;

pub use mock_catalog::MockCatalog;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, Days, NaiveDate, Utc};
    use std::io;
    use std::path::{Path, PathBuf};

    use crate::catalog::{CatalogShow, RawEpisode, SeriesId};
    use crate::episode::ShowConfig;
    use crate::snapshot::DirectoryCacheItem;

    /// 2024-01-01T00:00:00Z. Every fixture episode has aired by then.
    pub fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default()
    }

    /// Create a raw episode aired in 2020, named "Episode N".
    ///
    /// Episode ids are `series * 10000 + season * 100 + number`.
    pub fn episode(series_id: SeriesId, season: u32, number: u32) -> RawEpisode {
        let id = series_id * 10_000 + season as u64 * 100 + number as u64;
        let mut episode = RawEpisode::new(series_id, id, season, number)
            .with_name(format!("Episode {}", number));
        episode.air_date = NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.checked_add_days(Days::new((season * 40 + number) as u64)));
        episode
    }

    /// Create a catalog show with `seasons` seasons of `episodes` episodes each.
    pub fn catalog_show(id: SeriesId, name: &str, seasons: u32, episodes: u32) -> CatalogShow {
        let mut show = CatalogShow::new(id, name);
        show.first_aired = NaiveDate::from_ymd_opt(2020, 1, 1);
        for season in 1..=seasons {
            for number in 1..=episodes {
                show = show.with_episode(episode(id, season, number));
            }
        }
        show
    }

    /// Create a library entry with default settings.
    pub fn show_config(id: SeriesId, folder: impl Into<PathBuf>) -> ShowConfig {
        ShowConfig::new(id, folder)
    }

    /// Create a snapshot item without modification time.
    pub fn file_item(path: impl Into<PathBuf>, length: u64) -> DirectoryCacheItem {
        DirectoryCacheItem::new(path, length, None)
    }

    /// Create a file of `length` bytes, creating parent folders.
    pub fn touch(path: &Path, length: usize) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, vec![b'x'; length])
    }
}
