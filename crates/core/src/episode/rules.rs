//! Season rule engine.
//!
//! Turns one season's catalog episodes plus its rules into the ordered list of
//! [`ProcessedEpisode`]s. Rules run in order against a working list of slots.
//! Each slot remembers the catalog number it started from (its origin), and
//! rules address slots by origin. A rule naming a slot that no longer exists
//! is a no-op.

use tracing::debug;

use super::types::{EpisodeKind, ProcessedEpisode, RuleAction, SeasonRule};
use crate::catalog::{RawEpisode, SeriesId};

#[derive(Debug, Clone)]
struct Slot {
    origin: Option<u32>,
    number: u32,
    number_end: u32,
    kind: EpisodeKind,
    name: String,
    sources: Vec<RawEpisode>,
}

impl Slot {
    fn span(&self) -> u32 {
        self.number_end - self.number + 1
    }

    fn is_multi(&self) -> bool {
        self.number_end > self.number
    }
}

/// Derives the processed episodes of one season.
///
/// `episodes` are the catalog episodes already assigned to `season` under the
/// show's ordering (`dvd_order` selects which number each one carries).
pub fn derive_season(
    series_id: SeriesId,
    season: u32,
    episodes: &[RawEpisode],
    dvd_order: bool,
    rules: &[SeasonRule],
) -> Vec<ProcessedEpisode> {
    let mut numbered: Vec<(u32, &RawEpisode)> = episodes
        .iter()
        .filter_map(|e| e.position(dvd_order).map(|(_, n)| (n, e)))
        .collect();
    numbered.sort_by_key(|(n, e)| (*n, e.episode_id));

    let mut slots: Vec<Slot> = numbered
        .into_iter()
        .map(|(number, ep)| Slot {
            origin: Some(number),
            number,
            number_end: number,
            kind: EpisodeKind::Single,
            name: ep.name.clone(),
            sources: vec![ep.clone()],
        })
        .collect();

    for rule in rules {
        let applied = apply_rule(&mut slots, rule);
        if !applied {
            debug!(
                series_id,
                season,
                action = ?rule.action,
                first = rule.first,
                "Season rule matched nothing, skipping"
            );
        }
    }

    slots.sort_by_key(|s| s.number);
    slots
        .into_iter()
        .map(|slot| ProcessedEpisode {
            series_id,
            season,
            number: slot.number,
            number_end: slot.number_end,
            kind: slot.kind,
            name: slot.name,
            origin: slot.origin,
            overall_number: None,
            sources: slot.sources,
        })
        .collect()
}

/// Applies one rule. Returns false when the rule addressed nothing.
fn apply_rule(slots: &mut Vec<Slot>, rule: &SeasonRule) -> bool {
    match rule.action {
        RuleAction::Ignore => drop_range(slots, rule.range(), false),
        RuleAction::Remove => drop_range(slots, rule.range(), true),
        RuleAction::Collapse => combine_range(slots, rule.range(), false),
        RuleAction::Merge => combine_range(slots, rule.range(), true),
        RuleAction::Swap => swap(slots, rule.first, rule.second.unwrap_or(rule.first)),
        RuleAction::Split => split(slots, rule.first, rule.second.unwrap_or(2)),
        RuleAction::Insert => insert(slots, rule.first, rule.text.as_deref().unwrap_or_default()),
        RuleAction::Rename => match rule.text.as_deref() {
            Some(name) => rename(slots, rule.first, name),
            None => false,
        },
    }
}

fn find(slots: &[Slot], origin: u32) -> Option<usize> {
    slots.iter().position(|s| s.origin == Some(origin))
}

fn in_range(slot: &Slot, (lo, hi): (u32, u32)) -> bool {
    slot.origin.is_some_and(|o| (lo..=hi).contains(&o))
}

/// Shifts every slot numbered above `after` by `delta`.
fn shift_after(slots: &mut [Slot], after: u32, delta: i64) {
    for slot in slots.iter_mut().filter(|s| s.number > after) {
        slot.number = (i64::from(slot.number) + delta).max(0) as u32;
        slot.number_end = (i64::from(slot.number_end) + delta).max(0) as u32;
    }
}

fn drop_range(slots: &mut Vec<Slot>, range: (u32, u32), close_gap: bool) -> bool {
    let mut dropped: Vec<Slot> = Vec::new();
    slots.retain(|s| {
        if in_range(s, range) {
            dropped.push(s.clone());
            false
        } else {
            true
        }
    });
    if dropped.is_empty() {
        return false;
    }

    if close_gap {
        dropped.sort_by_key(|s| std::cmp::Reverse(s.number));
        for gone in &dropped {
            shift_after(slots, gone.number_end, -i64::from(gone.span()));
        }
    }
    true
}

/// Collapse (one number, later slots close up) or merge (number range kept).
fn combine_range(slots: &mut Vec<Slot>, range: (u32, u32), keep_range: bool) -> bool {
    let members: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, s)| in_range(s, range))
        .map(|(i, _)| i)
        .collect();
    if members.len() < 2 {
        return false;
    }

    let first_index = members[0];
    let mut parts: Vec<Slot> = Vec::with_capacity(members.len());
    for &i in members.iter().rev() {
        parts.push(slots.remove(i));
    }
    parts.reverse();

    let number = parts.iter().map(|s| s.number).min().unwrap_or_default();
    let last = parts.iter().map(|s| s.number_end).max().unwrap_or(number);
    let name = join_names(parts.iter().map(|s| s.name.as_str()));

    let combined = Slot {
        origin: parts[0].origin,
        number,
        number_end: if keep_range { last } else { number },
        kind: if keep_range {
            EpisodeKind::Merged
        } else {
            EpisodeKind::Single
        },
        name,
        sources: parts.into_iter().flat_map(|s| s.sources).collect(),
    };

    if !keep_range {
        shift_after(slots, last, -i64::from(last - number));
    }
    slots.insert(first_index.min(slots.len()), combined);
    true
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut unique: Vec<&str> = Vec::new();
    for name in names.filter(|n| !n.is_empty()) {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique.join(" + ")
}

fn swap(slots: &mut [Slot], a: u32, b: u32) -> bool {
    let (Some(i), Some(j)) = (find(slots, a), find(slots, b)) else {
        return false;
    };
    if i == j {
        return false;
    }
    let (ni, nj) = (slots[i].number, slots[j].number);
    let (si, sj) = (slots[i].span(), slots[j].span());
    slots[i].number = nj;
    slots[i].number_end = nj + si - 1;
    slots[j].number = ni;
    slots[j].number_end = ni + sj - 1;
    slots.sort_by_key(|s| s.number);
    true
}

fn split(slots: &mut Vec<Slot>, origin: u32, parts: u32) -> bool {
    let Some(index) = find(slots, origin) else {
        return false;
    };
    let parts = parts.max(2);
    if slots[index].kind != EpisodeKind::Single || slots[index].is_multi() {
        return false;
    }

    let original = slots.remove(index);
    shift_after(slots, original.number_end, i64::from(parts - 1));
    for part in (0..parts).rev() {
        slots.insert(
            index,
            Slot {
                origin: original.origin,
                number: original.number + part,
                number_end: original.number + part,
                kind: EpisodeKind::Split,
                name: format!("{} ({})", original.name, part + 1),
                sources: original.sources.clone(),
            },
        );
    }
    true
}

fn insert(slots: &mut Vec<Slot>, before: u32, name: &str) -> bool {
    let placeholder = |number: u32| Slot {
        origin: None,
        number,
        number_end: number,
        kind: EpisodeKind::Single,
        name: name.to_string(),
        sources: Vec::new(),
    };

    if let Some(index) = find(slots, before) {
        let number = slots[index].number;
        for slot in slots.iter_mut().filter(|s| s.number >= number) {
            slot.number += 1;
            slot.number_end += 1;
        }
        slots.insert(index, placeholder(number));
        return true;
    }

    let next = slots.iter().map(|s| s.number_end).max().unwrap_or(0) + 1;
    if before == next {
        slots.push(placeholder(next));
        return true;
    }
    false
}

fn rename(slots: &mut [Slot], origin: u32, name: &str) -> bool {
    match find(slots, origin) {
        Some(index) => {
            slots[index].name = name.to_string();
            true
        }
        None => false,
    }
}
