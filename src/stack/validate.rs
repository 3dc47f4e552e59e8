//! Linearity and conflict pre-flight checks
//!
//! The merge check runs first; divergence is only evaluated for stacks
//! without merges. Conflicts are checked independently. Any failure is
//! fatal for the run: the stack is reported, never repaired.

use crate::error::{Error, NonLinearReason, Result};
use crate::repo::JjRepo;
use crate::types::{ConflictedCommit, LinearityCheckResult};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static SHORT_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{8}$").expect("short hash pattern is valid"));

static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}:[0-9]{2}$").expect("time pattern is valid"));

const CONFLICT_MARKERS: &[&str] = &["conflict", "(conflict)"];
const EMPTY_MARKER: &str = "(empty)";

/// Changes with more than one parent, as `<id> (<n> parents)`
///
/// Input lines are `<change-id> <parent count>`.
pub fn find_merge_commits(parent_count_output: &str) -> Vec<String> {
    parent_count_output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let id = parts.next()?;
            let count: usize = parts.next()?.parse().ok()?;
            (count > 1).then(|| format!("{id} ({count} parents)"))
        })
        .collect()
}

/// Change ids listed in the first column of the parent-count output
pub fn stack_change_ids(parent_count_output: &str) -> Vec<String> {
    parent_count_output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(String::from)
        .collect()
}

/// Stack changes with more than one child, as `<id> (<n> children)`
///
/// `children_output` lines are `<child-id> <parent-id>...`. Results follow
/// the order of `stack_ids`.
pub fn find_divergent_commits(children_output: &str, stack_ids: &[String]) -> Vec<String> {
    let mut tally: HashMap<&str, Vec<&str>> = HashMap::new();
    for line in children_output.lines() {
        let mut parts = line.split_whitespace();
        let Some(child) = parts.next() else {
            continue;
        };
        for parent in parts {
            let children = tally.entry(parent).or_default();
            if !children.contains(&child) {
                children.push(child);
            }
        }
    }

    stack_ids
        .iter()
        .filter_map(|id| {
            let count = tally.get(id.as_str()).map_or(0, Vec::len);
            (count > 1).then(|| format!("{id} ({count} children)"))
        })
        .collect()
}

fn parse_conflict_line(line: &str) -> Option<ConflictedCommit> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    // Index 0 is the change id and never the hash anchor
    let hash_idx = tokens
        .iter()
        .skip(1)
        .position(|t| SHORT_HASH.is_match(t))
        .map(|i| i + 1)?;

    let marker = tokens.get(hash_idx + 1)?;
    if !CONFLICT_MARKERS.contains(marker) {
        return None;
    }

    let bookmark = tokens[..hash_idx]
        .iter()
        .position(|t| TIME.is_match(t))
        .and_then(|time_idx| tokens[time_idx + 1..hash_idx].first())
        .map(|b| b.trim_end_matches(['*', '?']).to_string())
        .filter(|b| !b.is_empty());

    let description = tokens[hash_idx + 1..]
        .iter()
        .skip_while(|t| CONFLICT_MARKERS.contains(*t) || **t == EMPTY_MARKER)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    Some(ConflictedCommit {
        change_id: tokens[0].to_string(),
        bookmark,
        description,
    })
}

/// Conflicted changes in `builtin_log_oneline` output
pub fn parse_conflicts(oneline_output: &str) -> Vec<ConflictedCommit> {
    oneline_output.lines().filter_map(parse_conflict_line).collect()
}

/// Check the stack for merge commits, then for divergent changes
pub async fn check_linearity(repo: &JjRepo) -> Result<LinearityCheckResult> {
    let parent_counts = repo.parent_counts().await?;

    let merges = find_merge_commits(&parent_counts);
    if !merges.is_empty() {
        debug!(?merges, "merge commits in stack");
        return Ok(LinearityCheckResult {
            is_linear: false,
            reason: Some(NonLinearReason::Merge),
            problematic_commits: merges,
        });
    }

    let stack_ids = stack_change_ids(&parent_counts);
    if stack_ids.is_empty() {
        return Ok(LinearityCheckResult::linear());
    }

    let children = repo.stack_children().await?;
    let divergent = find_divergent_commits(&children, &stack_ids);
    if !divergent.is_empty() {
        debug!(?divergent, "divergent changes in stack");
        return Ok(LinearityCheckResult {
            is_linear: false,
            reason: Some(NonLinearReason::Divergent),
            problematic_commits: divergent,
        });
    }

    Ok(LinearityCheckResult::linear())
}

/// Conflicted changes between `base` and `@`
pub async fn check_conflicts(repo: &JjRepo, base_branch: &str) -> Result<Vec<ConflictedCommit>> {
    let output = repo.oneline_since(base_branch).await?;
    let conflicts = parse_conflicts(&output);
    debug!(count = conflicts.len(), "conflict scan");
    Ok(conflicts)
}

/// Reject non-linear or conflicted stacks
pub async fn validate_stack(repo: &JjRepo, base_branch: &str) -> Result<()> {
    let linearity = check_linearity(repo).await?;
    if !linearity.is_linear {
        return Err(Error::NonLinearStack {
            reason: linearity.reason.unwrap_or(NonLinearReason::Merge),
            commits: linearity.problematic_commits,
        });
    }

    let conflicts = check_conflicts(repo, base_branch).await?;
    if !conflicts.is_empty() {
        return Err(Error::Conflicts(conflicts));
    }
    Ok(())
}
