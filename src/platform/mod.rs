//! Forge services for GitHub
//!
//! Provides one interface for the PR operations the engine needs, backed
//! either by the `gh` command line or by the GitHub API.

mod detection;
mod factory;
mod gh_cli;
mod github;

pub use detection::parse_repo_info;
pub use factory::create_platform_service;
pub use gh_cli::GhCliService;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::ExistingPr;
use async_trait::async_trait;

/// Fields of a new pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrRequest {
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Head branch
    pub head: String,
    /// Base branch
    pub base: String,
    /// Open as draft
    pub draft: bool,
}

/// Platform service trait for PR operations
///
/// Listing methods return PRs authored by the authenticated user.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Open PRs
    async fn list_open_prs(&self) -> Result<Vec<ExistingPr>>;

    /// Merged PRs
    async fn list_merged_prs(&self) -> Result<Vec<ExistingPr>>;

    /// Most recent PR in any state whose head is `head`
    async fn find_pr_for_head(&self, head: &str) -> Result<Option<ExistingPr>>;

    /// Create a PR
    async fn create_pr(&self, request: &CreatePrRequest) -> Result<ExistingPr>;

    /// Change the base branch of a PR
    async fn update_pr_base(&self, number: u64, base: &str) -> Result<()>;

    /// Replace the body of a PR
    async fn update_pr_body(&self, number: u64, body: &str) -> Result<()>;

    /// Convert a PR to draft (`true`) or mark it ready for review (`false`)
    async fn set_draft(&self, number: u64, draft: bool) -> Result<()>;
}
