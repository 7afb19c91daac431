//! Seasons and air-time evaluation.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::AirStatus;
use crate::catalog::RawEpisode;

/// When a show's episodes air, in its local time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirSchedule {
    /// Local time of day. Midnight when unknown.
    pub airs_time: Option<NaiveTime>,
    /// Offset of the show's time zone from UTC, in minutes.
    pub utc_offset_minutes: i32,
}

impl AirSchedule {
    /// Absolute instant an episode dated `date` airs.
    pub fn aired_at(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(self.airs_time.unwrap_or(NaiveTime::MIN));
        let Some(offset) = FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)) else {
            return Utc.from_utc_datetime(&local);
        };
        match offset.from_local_datetime(&local).single() {
            Some(dt) => dt.with_timezone(&Utc),
            None => Utc.from_utc_datetime(&local),
        }
    }

    /// Whether an episode dated `date` has aired by `now`. `None` when undated.
    pub fn has_aired(&self, date: Option<NaiveDate>, now: DateTime<Utc>) -> Option<bool> {
        date.map(|d| self.aired_at(d) <= now)
    }
}

/// One season's catalog episodes under the show's ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    pub number: u32,
    pub episodes: Vec<RawEpisode>,
}

impl Season {
    /// Groups catalog episodes into seasons.
    ///
    /// In DVD order, episodes without a DVD position are left out.
    pub fn group(episodes: &[RawEpisode], dvd_order: bool) -> BTreeMap<u32, Season> {
        let mut seasons: BTreeMap<u32, Season> = BTreeMap::new();
        for episode in episodes {
            let Some((season, _)) = episode.position(dvd_order) else {
                continue;
            };
            seasons
                .entry(season)
                .or_insert_with(|| Season {
                    number: season,
                    episodes: Vec::new(),
                })
                .episodes
                .push(episode.clone());
        }
        seasons
    }

    /// How much of the season has aired by `now`. Undated episodes count as not aired.
    pub fn air_status(&self, schedule: &AirSchedule, now: DateTime<Utc>) -> AirStatus {
        if self.episodes.is_empty() {
            return AirStatus::NoEpisodes;
        }
        let aired = self
            .episodes
            .iter()
            .filter(|e| schedule.has_aired(e.air_date, now) == Some(true))
            .count();
        if aired == 0 {
            AirStatus::NoneAired
        } else if aired == self.episodes.len() {
            AirStatus::FullyAired
        } else {
            AirStatus::PartiallyAired
        }
    }
}
