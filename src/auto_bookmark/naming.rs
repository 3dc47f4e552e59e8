//! Deterministic bookmark names for unbookmarked changes

use super::AUTO_BOOKMARK_PREFIX;
use regex::Regex;
use std::sync::LazyLock;

/// Longest slug kept in a generated name
pub const MAX_SLUG_LEN: usize = 30;

const CHANGE_ID_LEN: usize = 6;
const EMPTY_SLUG: &str = "change";

static CONVENTIONAL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]+(?:\([^)]*\))?!?:\s*").expect("conventional commit pattern is valid")
});

/// Reduce a description line to a lowercase, hyphenated slug
///
/// The conventional-commit prefix (`feat(api)!: `) is dropped and the result
/// is cut to [`MAX_SLUG_LEN`] characters without a trailing hyphen.
pub fn slugify(description: &str) -> String {
    let first_line = description.lines().next().unwrap_or_default();
    let stripped = CONVENTIONAL_PREFIX.replace(first_line.trim(), "");

    let spaced: String = stripped
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let slug = spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_ascii_lowercase();

    let truncated: String = slug.chars().take(MAX_SLUG_LEN).collect();
    truncated.trim_end_matches('-').to_string()
}

/// `auto/jjsp-<slug>-<first 6 of change id>`
pub fn generate_bookmark_name(description: &str, change_id: &str) -> String {
    let slug = slugify(description);
    let slug = if slug.is_empty() { EMPTY_SLUG } else { &slug };
    let short_id: String = change_id.chars().take(CHANGE_ID_LEN).collect();
    format!("{AUTO_BOOKMARK_PREFIX}{slug}-{short_id}")
}
