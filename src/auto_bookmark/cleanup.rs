//! Removal of auto bookmarks that no longer serve a PR
//!
//! Both passes are idempotent. A bookmark that cannot be deleted, or whose PR
//! state cannot be determined, is reported as kept and the pass moves on.

use super::is_auto_bookmark;
use crate::platform::PlatformService;
use crate::repo::JjRepo;
use crate::types::CleanupResult;
use std::collections::HashSet;
use tracing::debug;

async fn delete(repo: &JjRepo, name: &str, forget_remote: bool, result: &mut CleanupResult) {
    if let Err(e) = repo.delete_bookmark(name).await {
        repo.reporter()
            .warn(&format!("Could not delete bookmark {name}: {e}"));
        result.kept.push(name.to_string());
        return;
    }

    if forget_remote && let Err(e) = repo.forget_bookmark(name).await {
        debug!(name, error = %e, "forget failed, remote ref may linger");
    }
    result.deleted.push(name.to_string());
}

/// Delete auto bookmarks whose PR is merged, closed or gone
///
/// The local bookmark is deleted and its remote-tracking ref forgotten.
/// Bookmarks with an open PR are kept, as are bookmarks whose PR lookup
/// failed. Names without the auto prefix are ignored.
pub async fn cleanup_merged_auto_bookmarks(
    repo: &JjRepo,
    platform: &dyn PlatformService,
    bookmarks: &[String],
) -> CleanupResult {
    let mut result = CleanupResult::default();

    for name in bookmarks.iter().filter(|n| is_auto_bookmark(n)) {
        let pr = match platform.find_pr_for_head(name).await {
            Ok(pr) => pr,
            Err(e) => {
                repo.reporter()
                    .warn(&format!("Could not check PR for {name}, keeping it: {e}"));
                result.kept.push(name.clone());
                continue;
            }
        };

        match pr {
            Some(pr) if !pr.state.is_finished() => {
                debug!(name, pr = pr.number, "auto bookmark has an open PR");
                result.kept.push(name.clone());
            }
            Some(pr) => {
                repo.reporter()
                    .verbose(&format!("Removing {name}: PR #{} is {}", pr.number, pr.state));
                delete(repo, name, true, &mut result).await;
            }
            None => {
                repo.reporter()
                    .verbose(&format!("Removing {name}: no PR found"));
                delete(repo, name, true, &mut result).await;
            }
        }
    }

    result
}

/// Delete auto bookmarks that are no longer part of the stack
pub async fn cleanup_orphaned_auto_bookmarks(
    repo: &JjRepo,
    all_local: &[String],
    stack_bookmarks: &[String],
) -> CleanupResult {
    let in_stack: HashSet<&str> = stack_bookmarks.iter().map(String::as_str).collect();
    let mut result = CleanupResult::default();

    for name in all_local
        .iter()
        .filter(|n| is_auto_bookmark(n) && !in_stack.contains(n.as_str()))
    {
        repo.reporter()
            .verbose(&format!("Removing {name}: no longer in the stack"));
        delete(repo, name, false, &mut result).await;
    }

    result
}
