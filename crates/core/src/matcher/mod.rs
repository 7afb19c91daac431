//! File matching.
//!
//! Maps files found in search folders onto missing episodes by show name and
//! embedded season/episode numbers, and proposes merge rules for
//! multi-episode files.

mod file_matcher;
pub mod normalize;
mod numbers;
mod types;

pub use file_matcher::FileMatcher;
pub use normalize::{contains_words, simplify};
pub use numbers::{explicit_numbers, sequential_number, EpisodeNumbers};
pub use types::{
    Ambiguity, AmbiguityKind, MatchOutcome, MatchTarget, MergeProposal, ResolvedMatch,
    ShowMatchInfo,
};
