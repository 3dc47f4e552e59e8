//! Stack resolution pipeline
//!
//! Runs everything between "which branch is trunk" and "which PRs should
//! exist": validation, the forge snapshot, auto-bookmark cleanup and
//! creation, stack parsing and chain resolution. Submission is left to the
//! caller so it can preview or confirm the plan first.

use crate::auto_bookmark::{
    cleanup_merged_auto_bookmarks, cleanup_orphaned_auto_bookmarks, create_auto_bookmarks,
    find_unbookmarked_changes, mutable_window, splice_planned_bookmarks,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph::{PrChain, ReconciliationFailure, build_pr_chain_with_auto_create, index_prs_by_head};
use crate::platform::PlatformService;
use crate::repo::JjRepo;
use crate::stack::{
    StackOptions, detect_base_branch, detect_stack_with, parse_bookmark_names, validate_stack,
};
use crate::types::{AutoBookmark, CleanupResult, ExistingPr, StackInfo};
use tracing::debug;

/// Everything the resolution pipeline produced
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Branch the bottom PR targets
    pub base_branch: String,
    /// The parsed local stack
    pub stack: StackInfo,
    /// The resolved PR chain
    pub chain: PrChain,
    /// Auto bookmarks deleted and kept by cleanup
    pub cleanup: CleanupResult,
    /// Auto bookmarks created for unbookmarked changes
    pub auto_bookmarks: Vec<AutoBookmark>,
    /// Chain members created locally from their remote bookmark
    pub materialized: Vec<String>,
    /// Chain members that could not be created locally
    pub failures: Vec<ReconciliationFailure>,
}

/// Base branch from config, else detected from `trunk()`, else the fallback
pub async fn resolve_base_branch(repo: &JjRepo, config: &Config) -> String {
    if let Some(base) = &config.base_branch {
        return base.clone();
    }
    match detect_base_branch(repo).await {
        Some(base) => base,
        None => {
            debug!(fallback = %config.base_branch_fallback, "no trunk bookmark, using fallback");
            config.base_branch_fallback.clone()
        }
    }
}

async fn open_prs(repo: &JjRepo, platform: &dyn PlatformService) -> Vec<ExistingPr> {
    match platform.list_open_prs().await {
        Ok(prs) => prs,
        Err(e) => {
            repo.reporter()
                .warn(&format!("Could not list open PRs, continuing without them: {e}"));
            Vec::new()
        }
    }
}

async fn merged_prs(repo: &JjRepo, platform: &dyn PlatformService) -> Vec<ExistingPr> {
    match platform.list_merged_prs().await {
        Ok(prs) => prs,
        Err(e) => {
            repo.reporter()
                .warn(&format!("Could not list merged PRs: {e}"));
            Vec::new()
        }
    }
}

async fn run_cleanup(
    repo: &JjRepo,
    platform: &dyn PlatformService,
    base_branch: &str,
    config: &Config,
) -> Result<CleanupResult> {
    let lineage = repo.lineage(config.stack.include_descendants).await?;
    let stack_names = parse_bookmark_names(&lineage, base_branch, &config.remote);
    let all_local = repo.local_bookmarks().await?;

    let mut result = cleanup_merged_auto_bookmarks(repo, platform, &all_local).await;

    let remaining: Vec<String> = all_local
        .into_iter()
        .filter(|n| !result.deleted.contains(n))
        .collect();
    let orphans = cleanup_orphaned_auto_bookmarks(repo, &remaining, &stack_names).await;
    result.kept.retain(|n| !orphans.deleted.contains(n));
    result.extend(orphans);

    debug!(deleted = ?result.deleted, kept = ?result.kept, "auto bookmark cleanup");
    Ok(result)
}

/// Validate the stack and resolve it into a PR chain
///
/// Non-linear or conflicted stacks and an empty stack are fatal. A failed
/// PR listing degrades to an empty snapshot with a warning.
pub async fn resolve(
    repo: &JjRepo,
    platform: &dyn PlatformService,
    config: &Config,
    base_branch: &str,
) -> Result<Resolution> {
    validate_stack(repo, base_branch).await?;

    let open = open_prs(repo, platform).await;
    debug!(count = open.len(), "open PR snapshot");

    let mut cleanup = if config.should_cleanup() {
        run_cleanup(repo, platform, base_branch, config).await?
    } else {
        CleanupResult::default()
    };

    let auto_bookmarks = if config.auto_bookmark.enabled {
        let merged = merged_prs(repo, platform).await;
        let changes = find_unbookmarked_changes(repo, &merged, &cleanup.deleted).await?;
        create_auto_bookmarks(repo, &changes).await
    } else {
        Vec::new()
    };

    // A bookmark deleted for lacking a PR and recreated on its change lives on
    cleanup
        .deleted
        .retain(|name| !auto_bookmarks.iter().any(|a| &a.name == name));

    // Dry runs never created their auto bookmarks, so the lineage lacks them
    let window = if repo.is_dry_run() && !auto_bookmarks.is_empty() {
        mutable_window(repo).await?
    } else {
        Vec::new()
    };

    let options = StackOptions {
        remote: config.remote.clone(),
        include_descendants: config.stack.include_descendants,
    };
    let stack = detect_stack_with(repo, base_branch, &options, |stack| {
        if !window.is_empty() {
            splice_planned_bookmarks(stack, &auto_bookmarks, &window);
        }
    })
    .await?;
    if stack.is_partial_stack {
        repo.reporter().warn(
            "Bookmarks above the working copy are not part of this stack; run from the tip to include them",
        );
    }

    let snapshot = index_prs_by_head(open);
    let build = build_pr_chain_with_auto_create(
        repo,
        &stack.bookmarks,
        &snapshot,
        base_branch,
        &cleanup.deleted,
        &config.remote,
    )
    .await?;

    for failure in &build.failures {
        repo.reporter()
            .warn(&Error::from(failure.clone()).to_string());
    }

    Ok(Resolution {
        base_branch: base_branch.to_string(),
        stack,
        chain: build.chain,
        cleanup,
        auto_bookmarks,
        materialized: build.created,
        failures: build.failures,
    })
}
