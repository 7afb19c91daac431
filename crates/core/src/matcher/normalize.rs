//! Name simplification used for comparing show names against filenames.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Words dropped from simplified names.
const STOP_WORDS: &[&str] = &["the", "and"];

/// Simplifies a name for comparison.
///
/// Lower-cases, strips diacritics, drops apostrophes and `!`, turns every
/// other non-alphanumeric character into a space, removes stop words and
/// collapses whitespace. `"The Office (U.S.)!"` becomes `"office u s"`.
pub fn simplify(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            '\'' | '\u{2019}' | '!' => {}
            c if c.is_alphanumeric() => cleaned.extend(c.to_lowercase()),
            _ => cleaned.push(' '),
        }
    }

    cleaned
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when every word of `needle` appears, in order and contiguously, in `haystack`.
///
/// Both arguments must already be simplified. An empty needle never matches.
pub fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let padded_haystack = format!(" {} ", haystack);
    let padded_needle = format!(" {} ", needle);
    padded_haystack.contains(&padded_needle)
}

/// Removes the first whole-word occurrence of `needle` from `haystack`.
pub fn remove_words(haystack: &str, needle: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    let padded = format!(" {} ", haystack);
    let padded_needle = format!(" {} ", needle);
    padded
        .replacen(&padded_needle, " ", 1)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplify_strips_punctuation_and_case() {
        assert_eq!(simplify("Foo.Bar_Baz-S01E02"), "foo bar baz s01e02");
        assert_eq!(simplify("  Spaced   Out  "), "spaced out");
    }

    #[test]
    fn test_simplify_removes_apostrophes_and_stop_words() {
        assert_eq!(simplify("The King's Speech!"), "kings speech");
        assert_eq!(simplify("Law & Order"), "law order");
        assert_eq!(simplify("Law and Order"), "law order");
    }

    #[test]
    fn test_simplify_strips_diacritics() {
        assert_eq!(simplify("Pokémon Café"), "pokemon cafe");
    }

    #[test]
    fn test_contains_words_requires_whole_words() {
        assert!(contains_words("foo us s02e05", "foo"));
        assert!(contains_words("foo us s02e05", "foo us"));
        assert!(!contains_words("foobar s02e05", "foo"));
        assert!(!contains_words("foo s02e05", ""));
    }

    #[test]
    fn test_remove_words() {
        assert_eq!(remove_words("foo us 05 720p", "foo us"), "05 720p");
        assert_eq!(remove_words("foo 05", "bar"), "foo 05");
    }
}
