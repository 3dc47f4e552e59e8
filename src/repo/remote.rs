//! Git remote listing and selection

use crate::error::{Error, Result};
use crate::types::GitRemote;

/// Parse `jj git remote list` output (`<name> <url>` per line)
pub fn parse_remote_list(output: &str) -> Vec<GitRemote> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let url = parts.next()?;
            Some(GitRemote {
                name: name.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

/// Pick the remote to work against
///
/// An explicitly requested remote must exist. Otherwise `origin` is
/// preferred, then the first remote listed.
pub fn select_remote(remotes: &[GitRemote], requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        return remotes
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.name.clone())
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()));
    }

    remotes
        .iter()
        .find(|r| r.name == "origin")
        .or_else(|| remotes.first())
        .map(|r| r.name.clone())
        .ok_or(Error::NoSupportedRemotes)
}
