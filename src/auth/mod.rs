//! GitHub authentication
//!
//! Tokens come from the environment (`GITHUB_TOKEN`, then `GH_TOKEN`) or
//! from the `gh` CLI's stored login.

use crate::error::{Error, Result};
use crate::exec::{CommandRunner, argv};
use tracing::debug;

/// Environment variables checked for a token, in order
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from `gh auth token`
    Cli,
    /// Token from environment variable
    EnvVar,
}

/// A resolved GitHub token
#[derive(Clone)]
pub struct GitHubAuthConfig {
    /// The token
    pub token: String,
    /// Where it came from
    pub source: AuthSource,
}

impl std::fmt::Debug for GitHubAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuthConfig")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Pick the first non-empty token from `lookup` over [`TOKEN_ENV_VARS`]
pub fn token_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
}

/// Resolve a GitHub token from the environment or `gh auth token`
pub async fn get_github_auth(runner: &dyn CommandRunner) -> Result<GitHubAuthConfig> {
    if let Some(token) = token_from_env(|var| std::env::var(var).ok()) {
        debug!("using GitHub token from environment");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
        });
    }

    let out = runner.exec(&argv(["gh", "auth", "token"])).await;
    let token = out.stdout.trim();
    if out.success() && !token.is_empty() {
        debug!("using GitHub token from gh CLI");
        return Ok(GitHubAuthConfig {
            token: token.to_string(),
            source: AuthSource::Cli,
        });
    }

    Err(Error::Auth(
        "no GitHub token found: set GITHUB_TOKEN or run `gh auth login`".to_string(),
    ))
}
