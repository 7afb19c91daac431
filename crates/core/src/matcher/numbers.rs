//! Season and episode number extraction from filenames.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::normalize::{remove_words, simplify};

/// Season and episode range embedded in a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeNumbers {
    pub season: u32,
    pub first: u32,
    /// Last episode of a multi-episode file. Equal to `first` otherwise.
    pub last: u32,
}

impl EpisodeNumbers {
    pub fn is_multi(&self) -> bool {
        self.last > self.first
    }

    /// Whether the file fills the slot `season`, `number..=number_end`.
    ///
    /// A merged slot needs a file covering exactly its range; a single slot
    /// only needs the first number to agree.
    pub fn fills(&self, season: u32, number: u32, number_end: u32) -> bool {
        if self.season != season || self.first != number {
            return false;
        }
        number_end <= number || self.last == number_end
    }

    /// Whether the file's range spans the whole slot `number..=number_end`.
    pub fn spans(&self, number: u32, number_end: u32) -> bool {
        self.first <= number && number_end.max(number) <= self.last
    }
}

// "s01e02", "s1 e2", followed by "e03", "-e03" or "-03" continuations.
static SEASON_EPISODE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\bs(\d{1,3}) ?e(\d{1,4})").ok());
static SEASON_EPISODE_NEXT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(?:-e|e|-| e)(\d{1,4})\b").ok());

// "1x02", followed by "x03" or "-03" continuations.
static CROSS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\b(\d{1,2})x(\d{1,3})\b").ok());
static CROSS_NEXT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^(?:-|x|-x)(\d{1,3})\b").ok());

// "season 1 episode 2", "season 1 - episode 2".
static WORDS: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\bseason ?(\d{1,3})\D{0,8}?episode ?(\d{1,4})\b").ok());

/// Extracts an explicit season/episode position from a file stem.
///
/// Recognizes `S01E02`, `S01E02E03`, `S01E02-E03`, `S01E02-03`, `1x02`,
/// `1x02-03` and `Season 1 Episode 2`. The first pattern that matches wins.
pub fn explicit_numbers(stem: &str) -> Option<EpisodeNumbers> {
    let text = stem.to_lowercase().replace(['.', '_'], " ");

    pattern_with_range(&text, &SEASON_EPISODE, &SEASON_EPISODE_NEXT)
        .or_else(|| pattern_with_range(&text, &CROSS, &CROSS_NEXT))
        .or_else(|| {
            let caps = WORDS.as_ref()?.captures(&text)?;
            let season = caps.get(1)?.as_str().parse().ok()?;
            let first = caps.get(2)?.as_str().parse().ok()?;
            Some(EpisodeNumbers {
                season,
                first,
                last: first,
            })
        })
}

fn pattern_with_range(
    text: &str,
    head: &Lazy<Option<Regex>>,
    next: &Lazy<Option<Regex>>,
) -> Option<EpisodeNumbers> {
    let head = head.as_ref()?;
    let caps = head.captures(text)?;
    let season = caps.get(1)?.as_str().parse().ok()?;
    let first: u32 = caps.get(2)?.as_str().parse().ok()?;
    let mut last = first;

    let mut rest = &text[caps.get(0)?.end()..];
    if let Some(next) = next.as_ref() {
        while let Some(more) = next.captures(rest) {
            let Some(number) = more.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
                break;
            };
            if number <= last {
                break;
            }
            last = number;
            rest = &rest[more.get(0).map(|m| m.end()).unwrap_or(rest.len())..];
        }
    }

    Some(EpisodeNumbers {
        season,
        first,
        last,
    })
}

/// Extracts a bare sequential episode number from a file stem.
///
/// The show's names are removed first. Years (1900-2099) and common
/// resolutions are not taken as episode numbers. Accepts `05`, `e05`,
/// `ep05` and `episode 5`.
pub fn sequential_number(stem: &str, show_names: &[String]) -> Option<u32> {
    let mut text = simplify(stem);
    for name in show_names {
        let name = simplify(name);
        let stripped = remove_words(&text, &name);
        if stripped != text {
            text = stripped;
            break;
        }
    }

    let mut words = text.split(' ').peekable();
    while let Some(word) = words.next() {
        let digits = if word == "episode" || word == "ep" {
            match words.peek() {
                Some(next) if is_number(next) => *next,
                _ => continue,
            }
        } else if let Some(rest) = word.strip_prefix("ep").filter(|r| is_number(r)) {
            rest
        } else if let Some(rest) = word.strip_prefix('e').filter(|r| is_number(r)) {
            rest
        } else if is_number(word) {
            word
        } else {
            continue;
        };

        let Ok(number) = digits.parse::<u32>() else {
            continue;
        };
        if is_year(digits, number) || is_resolution(number) {
            continue;
        }
        return Some(number);
    }
    None
}

fn is_number(word: &str) -> bool {
    !word.is_empty() && word.len() <= 4 && word.bytes().all(|b| b.is_ascii_digit())
}

fn is_year(digits: &str, number: u32) -> bool {
    digits.len() == 4 && (1900..2100).contains(&number)
}

fn is_resolution(number: u32) -> bool {
    matches!(number, 480 | 576 | 720 | 1080 | 2160)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(season: u32, first: u32, last: u32) -> Option<EpisodeNumbers> {
        Some(EpisodeNumbers {
            season,
            first,
            last,
        })
    }

    #[test]
    fn test_explicit_sxxexx() {
        assert_eq!(explicit_numbers("Foo.S02E05.720p"), nums(2, 5, 5));
        assert_eq!(explicit_numbers("foo s1e3"), nums(1, 3, 3));
        assert_eq!(explicit_numbers("Foo S01 E07 Title"), nums(1, 7, 7));
    }

    #[test]
    fn test_explicit_multi_episode_forms() {
        assert_eq!(explicit_numbers("Foo.S01E02E03"), nums(1, 2, 3));
        assert_eq!(explicit_numbers("Foo.S01E02-E03.mkv"), nums(1, 2, 3));
        assert_eq!(explicit_numbers("Foo - S01E02-03 - Title"), nums(1, 2, 3));
        assert_eq!(explicit_numbers("Foo.S01E02-720p"), nums(1, 2, 2));
    }

    #[test]
    fn test_merged_slot_needs_exact_range() {
        let single = EpisodeNumbers { season: 1, first: 2, last: 2 };
        let double = EpisodeNumbers { season: 1, first: 2, last: 3 };
        assert!(single.fills(1, 2, 2));
        assert!(!single.fills(1, 2, 3));
        assert!(double.fills(1, 2, 3));
        assert!(double.fills(1, 2, 2));
        assert!(!double.fills(2, 2, 3));

        assert!(double.spans(3, 3));
        assert!(!single.spans(2, 3));
    }

    #[test]
    fn test_explicit_cross_form() {
        assert_eq!(explicit_numbers("Foo 1x02"), nums(1, 2, 2));
        assert_eq!(explicit_numbers("Foo 3x10-11"), nums(3, 10, 11));
        assert_eq!(explicit_numbers("Foo 1920x1080"), None);
    }

    #[test]
    fn test_explicit_words_form() {
        assert_eq!(explicit_numbers("Foo Season 2 Episode 4"), nums(2, 4, 4));
        assert_eq!(explicit_numbers("Foo Season 2 - Episode 4"), nums(2, 4, 4));
    }

    #[test]
    fn test_explicit_none() {
        assert_eq!(explicit_numbers("Foo 05"), None);
        assert_eq!(explicit_numbers("holiday photos"), None);
    }

    #[test]
    fn test_sequential_number() {
        let names = vec!["One Piece".to_string()];
        assert_eq!(sequential_number("One.Piece.0452.720p", &names), Some(452));
        assert_eq!(sequential_number("One Piece - Ep12", &names), Some(12));
        assert_eq!(sequential_number("One Piece Episode 7", &names), Some(7));
        assert_eq!(sequential_number("One Piece 2004 - 13", &names), Some(13));
        assert_eq!(sequential_number("One Piece 1080", &names), None);
    }

    #[test]
    fn test_sequential_number_ignores_digits_in_show_name() {
        let names = vec!["24".to_string()];
        assert_eq!(sequential_number("24 - 05", &names), Some(5));
    }
}
