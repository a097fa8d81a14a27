//! Corrupted-line extraction from the erosion source file.
//!
//! A line is a *corruption candidate* when it visibly shows decay. Detection is
//! a small set of independent line predicates rather than one big expression:
//!
//! - a marker character (`#`, `*`, `~`, backtick, tab) together with one of the
//!   [`STRUCTURAL_PATTERNS`], or
//! - one of the known [`broken_syntax`] fragments, marker or not.
//!
//! When no line qualifies, a random non-empty line stands in.

use std::sync::LazyLock;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use crate::text::{truncate_chars, PLATFORM_LIMIT};

/// Characters that betray a mutated line.
pub const MARKER_CHARS: [char; 5] = ['#', '*', '~', '`', '\t'];

/// Chance of prepending the preceding line as context.
pub const CONTEXT_PROBABILITY: f64 = 0.3;

static FUSED_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z][*#][a-z]").expect("valid fused marker regex"));
static STRAY_DOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\.").expect("valid stray dot regex"));
static NUMBERED_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*\d{4}").expect("valid numbered comment regex"));
static BROKEN_SYNTAX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"el\*e:|with#|def\s+\w+#|chars\s+i\]").expect("valid broken syntax regex")
});

/// A named line predicate.
pub type LinePattern = (&'static str, fn(&str) -> bool);

/// Structural patterns that only count on lines carrying a marker character.
pub const STRUCTURAL_PATTERNS: [LinePattern; 3] = [
    ("fused_marker", fused_marker),
    ("stray_dot", stray_dot),
    ("numbered_comment", numbered_comment),
];

/// Returns `true` if the line contains any of [`MARKER_CHARS`].
pub fn has_marker(line: &str) -> bool {
    line.contains(&MARKER_CHARS[..])
}

/// A lowercase letter on both sides of `*` or `#`, as in `el*e` or `i#port`.
pub fn fused_marker(line: &str) -> bool {
    FUSED_MARKER_RE.is_match(line)
}

/// A line whose first non-blank character is a stray `.`.
pub fn stray_dot(line: &str) -> bool {
    STRAY_DOT_RE.is_match(line)
}

/// A comment starting with a four-digit token, e.g. `# 1984`.
pub fn numbered_comment(line: &str) -> bool {
    NUMBERED_COMMENT_RE.is_match(line)
}

/// Python fragments that only appear once the source has been mangled:
/// a keyword fused with a marker (`el*e:`, `with#`), a `def` whose name runs
/// into a marker instead of its parameter list, or a broken comprehension.
pub fn broken_syntax(line: &str) -> bool {
    BROKEN_SYNTAX_RE.is_match(line)
}

/// Classifies a single line.
pub fn is_corruption_candidate(line: &str) -> bool {
    if broken_syntax(line) {
        return true;
    }
    has_marker(line)
        && !line.trim().is_empty()
        && STRUCTURAL_PATTERNS.iter().any(|(_, matches)| matches(line))
}

/// Picks a snippet from the source text.
///
/// Candidates are chosen uniformly. With probability [`CONTEXT_PROBABILITY`]
/// the preceding line is prepended (never for the first line). The result is
/// capped at [`PLATFORM_LIMIT`] characters on every path.
///
/// # Returns
///
/// - `Some(snippet)`: a corrupted line, or a random non-empty line as fallback
/// - `None`: if the text has no non-empty lines
pub fn extract_snippet<R: Rng + ?Sized>(file_text: &str, rng: &mut R) -> Option<String> {
    let lines: Vec<&str> = file_text.lines().collect();

    let candidates: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_corruption_candidate(line))
        .map(|(index, _)| index)
        .collect();

    if candidates.is_empty() {
        debug!("No corrupted lines found, falling back to a random non-empty line");
        let non_empty: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|line| !line.trim().is_empty())
            .collect();
        return non_empty
            .choose(rng)
            .map(|line| truncate_chars(line, PLATFORM_LIMIT));
    }

    debug!("Found {} corruption candidates", candidates.len());
    let &index = candidates.choose(rng)?;
    let chosen = lines[index];

    if rng.gen_bool(CONTEXT_PROBABILITY) && index > 0 {
        let with_context = format!("{}\n{}", lines[index - 1], chosen);
        return Some(truncate_chars(&with_context, PLATFORM_LIMIT));
    }

    Some(truncate_chars(chosen, PLATFORM_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Always picks the first option and always takes probabilistic branches.
    fn eager_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    #[test]
    fn test_structural_patterns() {
        assert!(fused_marker("    el*e: pass"));
        assert!(fused_marker("i#port os"));
        assert!(!fused_marker("x = a * b"));

        assert!(stray_dot("   .append(x)"));
        assert!(!stray_dot("foo.bar()"));

        assert!(numbered_comment("# 1984 was here"));
        assert!(numbered_comment("    #2024"));
        assert!(!numbered_comment("# 12 monkeys"));
    }

    #[test]
    fn test_broken_syntax_fragments() {
        assert!(broken_syntax("    el*e:"));
        assert!(broken_syntax("with#open(path) as f:"));
        assert!(broken_syntax("def corrupt# (text):"));
        assert!(broken_syntax("[c for c in chars i]"));
        assert!(!broken_syntax("def corrupt(text):"));
    }

    #[test]
    fn test_candidate_requires_marker_for_structural_patterns() {
        // Stray dot with no marker character anywhere.
        assert!(!is_corruption_candidate("    .strip()"));
        // Same line with a tab marker qualifies.
        assert!(is_corruption_candidate("\t.strip()"));
        // Marker without any structural pattern.
        assert!(!is_corruption_candidate("# a regular comment"));
        // Broken syntax counts on its own.
        assert!(is_corruption_candidate("def mutate# ("));
        assert!(!is_corruption_candidate(""));
    }

    #[test]
    fn test_extract_picks_corrupted_line() {
        let source = "import random\n\ndef erode(text):\n    el*e: return text\n";
        let snippet = extract_snippet(source, &mut StdRng::seed_from_u64(7)).unwrap();
        assert!(snippet.ends_with("    el*e: return text"));
    }

    #[test]
    fn test_extract_prepends_context_line() {
        let source = "def erode(text):\n    el*e: return text";
        let snippet = extract_snippet(source, &mut eager_rng()).unwrap();
        assert_eq!(snippet, "def erode(text):\n    el*e: return text");
    }

    #[test]
    fn test_extract_never_prepends_context_to_first_line() {
        let source = "i#port random\nprint('ok')";
        let snippet = extract_snippet(source, &mut eager_rng()).unwrap();
        assert_eq!(snippet, "i#port random");
    }

    #[test]
    fn test_extract_falls_back_to_non_empty_line() {
        let source = "\n\n   \nclean_line = 1\n";
        let snippet = extract_snippet(source, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(snippet, "clean_line = 1");
    }

    #[test]
    fn test_extract_returns_none_for_blank_text() {
        assert_eq!(extract_snippet("", &mut eager_rng()), None);
        assert_eq!(extract_snippet("\n  \n\t\n", &mut eager_rng()), None);
    }

    #[test]
    fn test_extract_caps_length() {
        let long_line = format!("a*b{}", "x".repeat(500));
        let source = format!("{}\n{}", "y".repeat(200), long_line);
        for seed in 0..20 {
            let snippet = extract_snippet(&source, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(snippet.chars().count() <= PLATFORM_LIMIT);
        }
    }
}
