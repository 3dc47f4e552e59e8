//! Trunk bookmark detection

use crate::repo::JjRepo;
use tracing::debug;

/// Base branch names in order of preference
pub const PREFERRED_BASE_BRANCHES: &[&str] = &["main", "master", "trunk", "develop", "development"];

/// Pick a base branch from the bookmark tokens on the trunk change
///
/// Remote-tracking tokens are ignored and jj's status suffixes (`*`, `?`)
/// stripped. Returns `None` when no local bookmark is left.
pub fn select_base_branch(trunk_output: &str) -> Option<String> {
    let local: Vec<&str> = trunk_output
        .split_whitespace()
        .filter(|t| !t.contains('@'))
        .map(|t| t.trim_end_matches(['*', '?']))
        .filter(|t| !t.is_empty())
        .collect();

    PREFERRED_BASE_BRANCHES
        .iter()
        .find(|preferred| local.contains(preferred))
        .map(|s| (*s).to_string())
        .or_else(|| local.first().map(|s| (*s).to_string()))
}

/// Detect the base branch from jj's `trunk()` revset
///
/// Never fails: a failed query is reported as "nothing found".
pub async fn detect_base_branch(repo: &JjRepo) -> Option<String> {
    match repo.trunk_bookmarks().await {
        Ok(output) => {
            let base = select_base_branch(&output);
            debug!(?base, "detected base branch");
            base
        }
        Err(e) => {
            debug!(error = %e, "trunk query failed");
            None
        }
    }
}
