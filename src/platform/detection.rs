//! GitHub repository detection from remote URLs

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use url::Url;

const GITHUB_HOST: &str = "github.com";

fn is_github_host(host: &str) -> bool {
    if host == GITHUB_HOST || host.contains("github") {
        return true;
    }
    std::env::var("GH_HOST").is_ok_and(|h| h.eq_ignore_ascii_case(host))
}

/// Turn `git@host:owner/repo` into `ssh://git@host/owner/repo`
fn normalize(remote_url: &str) -> String {
    let trimmed = remote_url.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        return trimmed.to_string();
    }
    match trimmed.split_once(':') {
        Some((user_host, path)) if user_host.contains('@') => format!("ssh://{user_host}/{path}"),
        _ => trimmed.to_string(),
    }
}

/// Parse owner, repo and host from a GitHub remote URL
///
/// Accepts HTTPS, `ssh://` and scp-style (`git@github.com:owner/repo.git`)
/// URLs. Hosts other than github.com are recorded for GitHub Enterprise.
pub fn parse_repo_info(remote_url: &str) -> Result<PlatformConfig> {
    let url = Url::parse(&normalize(remote_url)).map_err(|_| Error::NoSupportedRemotes)?;
    let host = url.host_str().ok_or(Error::NoSupportedRemotes)?.to_lowercase();
    if !is_github_host(&host) {
        return Err(Error::NoSupportedRemotes);
    }

    let segments: Vec<&str> = url
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let [owner, repo] = segments.as_slice() else {
        return Err(Error::Parse(format!(
            "expected <owner>/<repo> in remote URL: {remote_url}"
        )));
    };
    let repo = repo.strip_suffix(".git").unwrap_or(*repo);

    Ok(PlatformConfig {
        owner: (*owner).to_string(),
        repo: repo.to_string(),
        host: (host != GITHUB_HOST).then_some(host),
    })
}
