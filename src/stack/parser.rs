//! Bookmark chain parsing
//!
//! The lineage query prints one line per change, tip first. Each line holds
//! the change's bookmark tokens:
//!
//! - `name` for a local bookmark (`name*` on the working-copy change)
//! - `name@remote` for a remote bookmark
//!
//! Parsing reverses the lines so the result reads base to tip.

use crate::error::{Error, Result};
use crate::repo::{JjRepo, revset_symbol};
use crate::types::{Bookmark, RemoteBookmark, StackInfo};
use std::collections::HashSet;
use tracing::debug;

/// Suffix marking bookmarks on the working-copy change
pub const CURRENT_MARKER: char = '*';

/// Settings for [`detect_stack`]
#[derive(Debug, Clone)]
pub struct StackOptions {
    /// Remote whose `name@remote` refs count as stack members
    pub remote: String,
    /// Include descendants of `@` in the lineage window
    pub include_descendants: bool,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            include_descendants: true,
        }
    }
}

enum Token<'a> {
    Local(&'a str),
    Remote(String),
}

fn classify<'a>(token: &'a str, primary_remote: &str) -> Option<Token<'a>> {
    match RemoteBookmark::parse(token) {
        Some(rb) if rb.remote == primary_remote => Some(Token::Remote(rb.name)),
        Some(_) => None,
        None if token.contains('@') => None,
        None => Some(Token::Local(token)),
    }
}

/// Bookmarks base to tip plus the index of the first marked one
fn collect_bookmarks(
    log_output: &str,
    base_branch: &str,
    primary_remote: &str,
) -> (Vec<Bookmark>, Option<usize>) {
    let lines: Vec<&str> = log_output.lines().rev().collect();

    // A bare local token anywhere wins over the same name seen via the remote
    let local_names: HashSet<&str> = lines
        .iter()
        .flat_map(|l| l.split_whitespace())
        .filter(|t| !t.contains('@'))
        .map(|t| t.trim_end_matches(CURRENT_MARKER))
        .collect();

    let mut bookmarks: Vec<Bookmark> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut current_index = None;
    let mut group = 0;

    for line in lines {
        let mut line_contributed = false;

        for raw in line.split_whitespace() {
            let marked = raw.ends_with(CURRENT_MARKER);
            let token = raw.trim_end_matches(CURRENT_MARKER);

            let (name, is_local) = match classify(token, primary_remote) {
                Some(Token::Local(name)) => (name.to_string(), true),
                Some(Token::Remote(name)) if !local_names.contains(name.as_str()) => (name, false),
                Some(Token::Remote(_)) | None => continue,
            };

            if name.is_empty() || name == base_branch || !seen.insert(name.clone()) {
                continue;
            }

            if marked && current_index.is_none() {
                current_index = Some(bookmarks.len());
            }
            bookmarks.push(Bookmark {
                name,
                commit_hash: None,
                commit_message: None,
                is_current: false,
                commit_group: group,
                is_local,
            });
            line_contributed = true;
        }

        if line_contributed {
            group += 1;
        }
    }

    if let Some(i) = current_index {
        bookmarks[i].is_current = true;
    }
    (bookmarks, current_index)
}

/// Parse lineage output into a [`StackInfo`]
///
/// Fails with [`Error::NoBookmarks`] when no bookmark survives filtering.
pub fn parse_stack(log_output: &str, base_branch: &str, primary_remote: &str) -> Result<StackInfo> {
    let (bookmarks, current_index) = collect_bookmarks(log_output, base_branch, primary_remote);
    if bookmarks.is_empty() {
        return Err(Error::NoBookmarks);
    }

    Ok(StackInfo {
        bookmarks,
        base_branch: base_branch.to_string(),
        is_partial_stack: false,
        current_index,
    })
}

/// Bookmark names in lineage output, base to tip, with the same filtering as
/// [`parse_stack`]. Empty output yields an empty list.
pub fn parse_bookmark_names(log_output: &str, base_branch: &str, primary_remote: &str) -> Vec<String> {
    collect_bookmarks(log_output, base_branch, primary_remote)
        .0
        .into_iter()
        .map(|b| b.name)
        .collect()
}

/// Fill in commit hash and message for each bookmark
///
/// Best-effort: a failed lookup leaves the bookmark's fields empty.
pub async fn enrich_commit_messages(repo: &JjRepo, stack: &mut StackInfo, primary_remote: &str) {
    for bookmark in &mut stack.bookmarks {
        let revset = if bookmark.is_local {
            revset_symbol(&bookmark.name)
        } else {
            format!(
                "{}@{}",
                revset_symbol(&bookmark.name),
                revset_symbol(primary_remote)
            )
        };

        match repo.commit_summary(&revset).await {
            Ok((hash, message)) => {
                if !hash.is_empty() {
                    bookmark.commit_hash = Some(hash);
                }
                if !message.is_empty() {
                    bookmark.commit_message = Some(message);
                }
            }
            Err(e) => {
                debug!(bookmark = %bookmark.name, error = %e, "commit message lookup failed");
            }
        }
    }
}

/// Whether `@::` holds bookmarks the stack does not
pub async fn detect_partial_stack(
    repo: &JjRepo,
    stack: &StackInfo,
    primary_remote: &str,
) -> Result<bool> {
    let output = repo.descendants().await?;
    let above = parse_bookmark_names(&output, &stack.base_branch, primary_remote);
    let missing: Vec<&String> = above.iter().filter(|n| !stack.contains(n)).collect();
    if !missing.is_empty() {
        debug!(?missing, "bookmarks above the working copy are not in the stack");
    }
    Ok(!missing.is_empty())
}

/// Query, parse and enrich the local stack
pub async fn detect_stack(repo: &JjRepo, base_branch: &str, options: &StackOptions) -> Result<StackInfo> {
    detect_stack_with(repo, base_branch, options, |_| {}).await
}

/// [`detect_stack`] with a hook that may add bookmarks before the empty check
///
/// Dry runs use the hook to add the bookmarks they only pretended to create.
pub async fn detect_stack_with(
    repo: &JjRepo,
    base_branch: &str,
    options: &StackOptions,
    adjust: impl FnOnce(&mut StackInfo),
) -> Result<StackInfo> {
    let output = repo.lineage(options.include_descendants).await?;
    let (bookmarks, current_index) = collect_bookmarks(&output, base_branch, &options.remote);
    let mut stack = StackInfo {
        bookmarks,
        base_branch: base_branch.to_string(),
        is_partial_stack: false,
        current_index,
    };

    enrich_commit_messages(repo, &mut stack, &options.remote).await;
    adjust(&mut stack);
    if stack.bookmarks.is_empty() {
        return Err(Error::NoBookmarks);
    }

    match detect_partial_stack(repo, &stack, &options.remote).await {
        Ok(partial) => stack.is_partial_stack = partial,
        Err(e) => debug!(error = %e, "partial stack check failed"),
    }

    if let Some(current) = stack.current() {
        debug!(current = %current.name, count = stack.bookmarks.len(), "detected stack");
    } else {
        debug!(count = stack.bookmarks.len(), "detected stack");
    }
    Ok(stack)
}
