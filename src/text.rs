//! Character-count helpers shared by the extractor, composer and publisher.
//!
//! Lengths are counted in `char`s, which is how the platform counts the
//! glyph-heavy texts this bot produces.

/// Hard character cap of a single post.
pub const PLATFORM_LIMIT: usize = 280;

/// Suffix appended when a post has to be cut down to [`PLATFORM_LIMIT`].
pub const ELLIPSIS: &str = "...";

/// Returns the first `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Fits `text` into the platform limit, replacing the tail with `...` when it overflows.
pub fn fit_to_limit(text: &str) -> String {
    if text.chars().count() <= PLATFORM_LIMIT {
        return text.to_string();
    }
    let keep = PLATFORM_LIMIT - ELLIPSIS.chars().count();
    format!("{}{}", truncate_chars(text, keep), ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("▓▓▓▓", 2), "▓▓");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_fit_to_limit() {
        let short = "iteration 12";
        assert_eq!(fit_to_limit(short), short);

        let exact = "x".repeat(PLATFORM_LIMIT);
        assert_eq!(fit_to_limit(&exact), exact);

        let long = "█".repeat(400);
        let fitted = fit_to_limit(&long);
        assert_eq!(fitted.chars().count(), PLATFORM_LIMIT);
        assert!(fitted.ends_with("..."));
        assert!(fitted.starts_with(&"█".repeat(277)));
    }
}
