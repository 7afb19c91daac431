//! Show catalog boundary.
//!
//! The remote catalog client (and its caching/retry) lives outside this crate.
//! The planner only needs synchronous, side-effect free lookups, expressed by
//! the [`ShowCatalog`] trait. [`MemoryCatalog`] is an in-memory implementation
//! fed from a JSON dump.

mod memory;
mod types;

pub use memory::MemoryCatalog;
pub use types::*;

/// Trait for show catalog lookups.
pub trait ShowCatalog: Send + Sync {
    /// Get a show and all its episodes.
    fn get_show(&self, id: SeriesId) -> Result<CatalogShow, CatalogError>;

    /// Poster image URL for the whole series.
    fn series_poster_url(&self, _id: SeriesId) -> Option<String> {
        None
    }

    /// Fanart (backdrop) image URL for the series.
    fn series_fanart_url(&self, _id: SeriesId) -> Option<String> {
        None
    }

    /// Poster image URL for one season.
    fn season_poster_url(&self, _id: SeriesId, _season: u32) -> Option<String> {
        None
    }

    /// Still image URL for one episode.
    fn episode_image_url(&self, _id: SeriesId, _episode: EpisodeId) -> Option<String> {
        None
    }
}
