//! Before/after sampling from a commit's diff of the erosion source.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::text::truncate_chars;

/// How many lines after a removal are searched for its replacement.
pub const LOOKAHEAD: usize = 4;

/// Both sides of a pair must be longer than this to be kept.
pub const MIN_CHANGE_CHARS: usize = 10;

/// Each side is cut to this many characters.
pub const SIDE_LIMIT: usize = 100;

/// A removed line and the line that replaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSample {
    pub removed: String,
    pub added: String,
}

impl fmt::Display for DiffSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "was:\n{}\n\nnow:\n{}", self.removed, self.added)
    }
}

fn is_removal(line: &str) -> bool {
    line.starts_with('-') && !line.starts_with("---")
}

fn is_addition(line: &str) -> bool {
    line.starts_with('+') && !line.starts_with("+++")
}

/// Collects every qualifying `(removed, added)` pair in diff order.
///
/// Each removal is paired with the first addition within [`LOOKAHEAD`] lines;
/// the pair is kept only when both sides exceed [`MIN_CHANGE_CHARS`].
pub fn changed_pairs(diff_text: &str) -> Vec<(&str, &str)> {
    let lines: Vec<&str> = diff_text.lines().collect();
    let mut pairs = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if !is_removal(line) {
            continue;
        }
        let removed = &line[1..];
        let window_end = (i + 1 + LOOKAHEAD).min(lines.len());
        if let Some(next) = lines[i + 1..window_end].iter().find(|l| is_addition(l)) {
            let added = &next[1..];
            if removed.chars().count() > MIN_CHANGE_CHARS && added.chars().count() > MIN_CHANGE_CHARS
            {
                pairs.push((removed, added));
            }
        }
    }

    pairs
}

/// Picks one changed pair uniformly at random.
///
/// Returns `None` when the diff has no qualifying pair.
pub fn sample_diff<R: Rng + ?Sized>(diff_text: &str, rng: &mut R) -> Option<DiffSample> {
    let pairs = changed_pairs(diff_text);
    let (removed, added) = pairs.choose(rng)?;
    Some(DiffSample {
        removed: truncate_chars(removed, SIDE_LIMIT),
        added: truncate_chars(added, SIDE_LIMIT),
    })
}
