//! Post composition.
//!
//! Turns a commit and an optional corrupted snippet into the final post text.
//! Restoration events get a fixed template; every other commit is rendered in
//! one of four [`Style`]s, picked uniformly per run with no memory of earlier
//! runs. Whether hashtags are attached is decided separately by
//! [`should_include_hashtags`].

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::commit::{is_milestone, Commit};
use crate::text::{fit_to_limit, truncate_chars};

/// Hashtag carried by every non-restoration post that has hashtags at all.
pub const BASE_HASHTAG: &str = "#DigitalErosion";

/// Hashtags closing every restoration post.
pub const RESTORATION_HASHTAGS: &str = "#DigitalErosion #ConceptualArt";

/// Chance of attaching hashtags to an unremarkable post.
pub const HASHTAG_PROBABILITY: f64 = 0.3;

/// Characters the abstract style keeps when turning a snippet into a visual.
const ABSTRACT_MARKERS: [char; 4] = ['*', '#', '~', '`'];
const ABSTRACT_KEEP: [char; 7] = ['*', '#', '~', '`', '.', ' ', '\t'];

/// Bar length cap for the abstract style.
const MAX_BAR: usize = 20;

const VERBOSE_INTROS: [&str; 4] = [
    "The code continues to forget itself.",
    "Hour {iteration}: progressive deterioration.",
    "Syntax dissolves into memory.",
    "The program dreams of its own entropy.",
];

/// The rendering styles for non-restoration posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Minimal,
    Verbose,
    Abstract,
    Diagnostic,
}

impl Style {
    pub const ALL: [Style; 4] = [
        Style::Minimal,
        Style::Verbose,
        Style::Abstract,
        Style::Diagnostic,
    ];

    /// Picks a style uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Style::Minimal => "minimal",
            Style::Verbose => "verbose",
            Style::Abstract => "abstract",
            Style::Diagnostic => "diagnostic",
        }
    }

    /// The hashtag line this style appends when hashtags are included.
    pub fn hashtags(&self) -> &'static str {
        match self {
            Style::Minimal => BASE_HASHTAG,
            Style::Verbose => "#DigitalErosion #GenerativeArt",
            Style::Abstract => "#DigitalErosion #CodePoetry",
            Style::Diagnostic => "#DigitalErosion #SoftwareArt",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Final post text, guaranteed to fit the platform limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedText(String);

impl ComposedText {
    /// Wraps `text`, cutting it down to the platform limit if needed.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(fit_to_limit(text.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ComposedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Glyph used for the abstract decay bar.
pub fn decay_glyph(decay_level: &str) -> char {
    match decay_level {
        "minimal" => '░',
        "slight" => '▒',
        "moderate" => '▓',
        "severe" => '█',
        "critical" => '▪',
        _ => '·',
    }
}

/// Number of glyphs in the abstract decay bar.
///
/// Grows with the iteration and wraps every 20; an unknown iteration draws a full bar.
pub fn bar_length(iteration: Option<u64>) -> usize {
    match iteration {
        Some(n) => ((n % MAX_BAR as u64) as usize + 1).min(MAX_BAR),
        None => MAX_BAR,
    }
}

/// Decides whether a non-restoration post carries hashtags.
///
/// Milestone iterations, multiples of 100 and severe or critical decay always
/// get hashtags; anything else gets them with probability [`HASHTAG_PROBABILITY`].
pub fn should_include_hashtags<R: Rng + ?Sized>(
    iteration: Option<u64>,
    decay_level: &str,
    rng: &mut R,
) -> bool {
    if let Some(n) = iteration {
        if is_milestone(n) || n % 100 == 0 {
            return true;
        }
    }
    if decay_level == "severe" || decay_level == "critical" {
        return true;
    }
    rng.gen_bool(HASHTAG_PROBABILITY)
}

/// Renders the restoration event template.
pub fn compose_restoration(iteration_label: &str) -> ComposedText {
    ComposedText::new(format!(
        "☽ RESTORATION EVENT ☾\n\niteration {}\n\nthe code remembers itself\nimperfectly\n\n{}",
        iteration_label, RESTORATION_HASHTAGS
    ))
}

/// Renders a non-restoration post for `commit` in the given style.
///
/// # Parameters
///
/// - `style`: The template to render
/// - `commit`: Source of the iteration label, decay level and mutation count
/// - `snippet`: Corrupted source fragment, if one could be extracted
/// - `include_hashtags`: Whether to append the style's hashtag line
/// - `rng`: Randomness for the verbose intro line
pub fn compose<R: Rng + ?Sized>(
    style: Style,
    commit: &Commit,
    snippet: Option<&str>,
    include_hashtags: bool,
    rng: &mut R,
) -> ComposedText {
    let iteration = commit.iteration_label();
    let decay = commit.decay_level();
    let snippet = snippet.filter(|s| !s.is_empty());

    let (body, separator) = match style {
        Style::Minimal => (minimal_body(&iteration, &decay, snippet), "\n\n"),
        Style::Verbose => (verbose_body(&iteration, &decay, snippet, rng), "\n"),
        Style::Abstract => (
            abstract_body(&iteration, commit.iteration(), &decay, snippet),
            "\n",
        ),
        Style::Diagnostic => (
            diagnostic_body(&iteration, &decay, commit.mutations(), snippet),
            "\n\n",
        ),
    };

    if include_hashtags {
        ComposedText::new(format!("{}{}{}", body, separator, style.hashtags()))
    } else {
        ComposedText::new(body)
    }
}

fn minimal_body(iteration: &str, decay: &str, snippet: Option<&str>) -> String {
    match snippet {
        Some(s) => format!("iteration {}\n\n{}", iteration, truncate_chars(s.trim(), 100)),
        None => format!("iteration {}: {} decay", iteration, decay),
    }
}

fn verbose_body<R: Rng + ?Sized>(
    iteration: &str,
    decay: &str,
    snippet: Option<&str>,
    rng: &mut R,
) -> String {
    let intro = VERBOSE_INTROS
        .choose(rng)
        .copied()
        .unwrap_or(VERBOSE_INTROS[0])
        .replace("{iteration}", iteration);

    match snippet {
        Some(s) => format!(
            "{}\n\n{}\n\nIteration {} | {} erosion",
            intro,
            truncate_chars(s.trim(), 120),
            iteration,
            decay
        ),
        None => format!("{}\n\nIteration {}: {} erosion", intro, iteration, decay),
    }
}

/// Keeps only marker, dot and whitespace characters of the first 50 characters.
///
/// Returns `None` unless the snippet carries a marker and something visible survives.
pub fn abstract_visual(snippet: &str) -> Option<String> {
    if !snippet.contains(&ABSTRACT_MARKERS[..]) {
        return None;
    }
    let visual: String = snippet
        .chars()
        .take(50)
        .filter(|c| ABSTRACT_KEEP.contains(c))
        .collect();
    if visual.trim().is_empty() {
        None
    } else {
        Some(visual)
    }
}

fn abstract_body(
    iteration_label: &str,
    iteration: Option<u64>,
    decay: &str,
    snippet: Option<&str>,
) -> String {
    if let Some(visual) = snippet.and_then(abstract_visual) {
        return format!("{}\n\niteration {}", visual, iteration_label);
    }

    let bar: String = std::iter::repeat(decay_glyph(decay))
        .take(bar_length(iteration))
        .collect();
    format!("{}\n\niteration {}: {}", bar, iteration_label, decay)
}

fn diagnostic_body(
    iteration: &str,
    decay: &str,
    mutations: Option<u64>,
    snippet: Option<&str>,
) -> String {
    let mutations = mutations
        .map(|m| m.to_string())
        .unwrap_or_else(|| "?".to_string());

    let mut body = format!(
        "[EROSION LOG]\nIteration: {}\nDecay: {}\nMutations: {}",
        iteration, decay, mutations
    );

    if let Some(s) = snippet {
        if s.chars().count() < 100 {
            body.push_str("\n\nCorruption sample:\n");
            body.push_str(&truncate_chars(s, 80));
        }
    }

    body
}
