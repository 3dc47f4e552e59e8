//! Backend selection

use crate::auth::get_github_auth;
use crate::config::{Config, ForgeBackend};
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::platform::{GhCliService, GitHubService, PlatformService, parse_repo_info};
use std::sync::Arc;
use tracing::debug;

/// Create the forge service selected by `config.forge.backend`
///
/// The `gh` backend targets the remote's repository when its URL parses and
/// otherwise lets `gh` infer it. The API backend requires a parseable GitHub
/// remote URL and a token.
pub async fn create_platform_service(
    config: &Config,
    runner: Arc<dyn CommandRunner>,
    remote_url: Option<&str>,
) -> Result<Box<dyn PlatformService>> {
    match config.forge.backend {
        ForgeBackend::Gh => {
            let mut service = GhCliService::new(runner);
            if let Some(url) = remote_url {
                match parse_repo_info(url) {
                    Ok(repo) => service = service.with_repo(&repo),
                    Err(e) => debug!(url, error = %e, "letting gh infer the repository"),
                }
            }
            Ok(Box::new(service))
        }
        ForgeBackend::Api => {
            let repo = parse_repo_info(remote_url.unwrap_or_default())?;
            let auth = get_github_auth(runner.as_ref()).await?;
            debug!(source = ?auth.source, owner = %repo.owner, repo = %repo.repo, "using GitHub API");
            Ok(Box::new(GitHubService::new(&auth.token, repo)?))
        }
    }
}
