//! Types for processed episodes and per-season rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{EpisodeId, RawEpisode, SeriesId};

/// How a processed episode relates to the catalog episodes behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeKind {
    /// One catalog episode, or several collapsed into one number.
    Single,
    /// One part of a catalog episode that was split.
    Split,
    /// Several catalog episodes presented as one unit covering a number range.
    Merged,
}

/// An episode after season rules have been applied.
///
/// This is the unit that file matching and naming operate on. Produced sets
/// are immutable; applying another rule re-derives the whole season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedEpisode {
    pub series_id: SeriesId,
    /// Season number under the show's ordering.
    pub season: u32,
    /// Episode number under the show's ordering, after rules.
    pub number: u32,
    /// Last number covered. Equal to `number` unless merged.
    pub number_end: u32,
    pub kind: EpisodeKind,
    /// Display name (after any rename rule).
    pub name: String,
    /// Catalog number rules use to address this slot. `None` for inserted placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<u32>,
    /// Position counted across all regular seasons, used by sequential matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_number: Option<u32>,
    /// Catalog episodes behind this slot. The first one is representative.
    #[serde(default)]
    pub sources: Vec<RawEpisode>,
}

impl ProcessedEpisode {
    /// The catalog episode whose metadata stands for the slot.
    pub fn representative(&self) -> Option<&RawEpisode> {
        self.sources.first()
    }

    /// True for slots inserted by a rule with no catalog episode behind them.
    pub fn is_placeholder(&self) -> bool {
        self.sources.is_empty()
    }

    /// True when the slot spans more than one episode number.
    pub fn is_multi(&self) -> bool {
        self.number_end > self.number
    }

    /// Air date of the representative episode.
    pub fn air_date(&self) -> Option<NaiveDate> {
        self.representative().and_then(|e| e.air_date)
    }

    /// Catalog ids of every source episode.
    pub fn episode_ids(&self) -> Vec<EpisodeId> {
        self.sources.iter().map(|e| e.episode_id).collect()
    }

    /// Whether the slot covers `number`.
    pub fn covers(&self, number: u32) -> bool {
        (self.number..=self.number_end).contains(&number)
    }
}

/// Operation performed by a season rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Drop episodes in a range, leaving a gap in the numbering.
    Ignore,
    /// Drop episodes in a range and close the gap.
    Remove,
    /// Fold a range into one number, keeping every source.
    Collapse,
    /// Exchange the positions of two episodes.
    Swap,
    /// Present a range as one multi-number unit.
    Merge,
    /// Break one episode into several parts.
    Split,
    /// Add a placeholder slot before an episode.
    Insert,
    /// Override an episode's display name.
    Rename,
}

/// A user-authored transformation applied to one season's episode list.
///
/// Numbers address slots by their catalog number, so a rule keeps targeting
/// the same episode after earlier rules have renumbered the season.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonRule {
    pub action: RuleAction,
    pub first: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SeasonRule {
    fn new(action: RuleAction, first: u32, second: Option<u32>, text: Option<String>) -> Self {
        Self {
            action,
            first,
            second,
            text,
        }
    }

    pub fn ignore(first: u32, last: u32) -> Self {
        Self::new(RuleAction::Ignore, first, Some(last), None)
    }

    pub fn remove(first: u32, last: u32) -> Self {
        Self::new(RuleAction::Remove, first, Some(last), None)
    }

    pub fn collapse(first: u32, last: u32) -> Self {
        Self::new(RuleAction::Collapse, first, Some(last), None)
    }

    pub fn swap(a: u32, b: u32) -> Self {
        Self::new(RuleAction::Swap, a, Some(b), None)
    }

    pub fn merge(first: u32, last: u32) -> Self {
        Self::new(RuleAction::Merge, first, Some(last), None)
    }

    /// Split episode `number` into `parts` parts (at least two).
    pub fn split(number: u32, parts: u32) -> Self {
        Self::new(RuleAction::Split, number, Some(parts), None)
    }

    /// Insert a placeholder named `name` before episode `before`.
    pub fn insert(before: u32, name: impl Into<String>) -> Self {
        Self::new(RuleAction::Insert, before, None, Some(name.into()))
    }

    pub fn rename(number: u32, name: impl Into<String>) -> Self {
        Self::new(RuleAction::Rename, number, None, Some(name.into()))
    }

    /// Inclusive range addressed by range rules, normalized so `lo <= hi`.
    pub fn range(&self) -> (u32, u32) {
        let second = self.second.unwrap_or(self.first);
        (self.first.min(second), self.first.max(second))
    }
}

/// How much of a season has aired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirStatus {
    NoEpisodes,
    NoneAired,
    PartiallyAired,
    FullyAired,
}
