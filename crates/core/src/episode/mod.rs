//! Episode model and season rule engine.
//!
//! Catalog episodes ([`RawEpisode`](crate::catalog::RawEpisode)) are grouped
//! into [`Season`]s under the show's ordering, then each season's
//! [`SeasonRule`]s are applied to produce the [`ProcessedEpisode`]s that file
//! matching and naming work with.

mod rules;
mod season;
mod show;
mod types;

pub use rules::derive_season;
pub use season::{AirSchedule, Season};
pub use show::{Library, LibraryError, Show, ShowConfig};
pub use types::{AirStatus, EpisodeKind, ProcessedEpisode, RuleAction, SeasonRule};
