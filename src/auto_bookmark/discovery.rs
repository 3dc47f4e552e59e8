//! Finding and bookmarking changes that have no bookmark yet

use super::{generate_bookmark_name, is_auto_bookmark};
use crate::error::Result;
use crate::repo::JjRepo;
use crate::types::{AutoBookmark, Bookmark, ExistingPr, StackInfo, UnbookmarkedChange};
use std::collections::HashMap;
use tracing::debug;

/// One line of the mutable-window query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutableChange {
    /// Full change id
    pub change_id: String,
    /// Whether the change has no diff
    pub is_empty: bool,
    /// Local bookmarks on the change
    pub bookmarks: Vec<String>,
    /// First line of the description
    pub description: String,
}

impl MutableChange {
    fn is_root(&self) -> bool {
        !self.change_id.is_empty()
            && (self.change_id.chars().all(|c| c == '0') || self.change_id.chars().all(|c| c == 'z'))
    }
}

/// Parse `<change-id>\t<empty|changed>\t<bookmarks>\t<first line>` lines
pub fn parse_mutable_changes(output: &str) -> Vec<MutableChange> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(4, '\t');
            let change_id = fields.next()?.trim();
            let flag = fields.next()?.trim();
            let bookmarks = fields.next()?;
            let description = fields.next().unwrap_or_default().trim();
            if change_id.is_empty() {
                return None;
            }
            Some(MutableChange {
                change_id: change_id.to_string(),
                is_empty: flag == "empty",
                bookmarks: bookmarks.split_whitespace().map(String::from).collect(),
                description: description.to_string(),
            })
        })
        .collect()
}

/// Change-id suffixes of merged PRs whose head was an auto bookmark
pub fn merged_auto_suffixes(merged_prs: &[ExistingPr]) -> Vec<String> {
    merged_prs
        .iter()
        .filter(|pr| is_auto_bookmark(&pr.head_ref_name))
        .filter_map(|pr| pr.head_ref_name.rsplit_once('-'))
        .map(|(_, suffix)| suffix.to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Changes that should receive an auto bookmark, base first
///
/// Skips the root change, empty changes, changes that still carry a bookmark
/// once `deleted` names are discounted, and changes already shipped through a
/// merged auto-bookmark PR.
pub fn select_unbookmarked(
    changes: Vec<MutableChange>,
    merged_suffixes: &[String],
    deleted: &[String],
) -> Vec<UnbookmarkedChange> {
    changes
        .into_iter()
        .rev()
        .filter(|c| !c.is_root() && !c.is_empty)
        .filter(|c| c.bookmarks.iter().all(|b| deleted.contains(b)))
        .filter(|c| {
            let shipped = merged_suffixes.iter().any(|s| c.change_id.starts_with(s.as_str()));
            if shipped {
                debug!(change_id = %c.change_id, "change already merged via auto bookmark");
            }
            !shipped
        })
        .map(|c| UnbookmarkedChange {
            change_id: c.change_id,
            description: c.description,
        })
        .collect()
}

/// Query the mutable window, tip first
pub async fn mutable_window(repo: &JjRepo) -> Result<Vec<MutableChange>> {
    Ok(parse_mutable_changes(&repo.mutable_changes().await?))
}

/// Query the mutable window for changes without bookmarks
///
/// `deleted` names bookmarks removed earlier in the run. A dry run still sees
/// them in the window, so they are discounted here.
pub async fn find_unbookmarked_changes(
    repo: &JjRepo,
    merged_prs: &[ExistingPr],
    deleted: &[String],
) -> Result<Vec<UnbookmarkedChange>> {
    let changes = select_unbookmarked(
        mutable_window(repo).await?,
        &merged_auto_suffixes(merged_prs),
        deleted,
    );
    debug!(count = changes.len(), "unbookmarked changes");
    Ok(changes)
}

/// Create an auto bookmark on each change
///
/// A failed creation is reported and skipped. In dry-run every bookmark is
/// reported and returned as if it had been created.
pub async fn create_auto_bookmarks(
    repo: &JjRepo,
    changes: &[UnbookmarkedChange],
) -> Vec<AutoBookmark> {
    let mut created = Vec::with_capacity(changes.len());
    for change in changes {
        let name = generate_bookmark_name(&change.description, &change.change_id);
        match repo.create_bookmark(&name, &change.change_id).await {
            Ok(()) => {
                repo.reporter().verbose(&format!("Created bookmark {name}"));
                created.push(AutoBookmark {
                    name,
                    change_id: change.change_id.clone(),
                    description: change.description.clone(),
                });
            }
            Err(e) => {
                repo.reporter()
                    .warn(&format!("Could not create bookmark {name}: {e}"));
            }
        }
    }
    created
}

/// Add bookmarks a dry run only reported into `stack`
///
/// `window` is the mutable window, tip first. Each planned bookmark goes
/// before the first stack bookmark on a later change, or after the last one
/// on an earlier change. Names already in the stack are left alone. A planned
/// bookmark on the working-copy change becomes current when nothing else is.
pub fn splice_planned_bookmarks(
    stack: &mut StackInfo,
    planned: &[AutoBookmark],
    window: &[MutableChange],
) {
    let depth = window.len();
    let rank_of_change: HashMap<&str, usize> = window
        .iter()
        .enumerate()
        .map(|(i, c)| (c.change_id.as_str(), depth - 1 - i))
        .collect();
    let rank_of_bookmark: HashMap<&str, usize> = window
        .iter()
        .enumerate()
        .flat_map(|(i, c)| c.bookmarks.iter().map(move |b| (b.as_str(), depth - 1 - i)))
        .collect();

    // (rank, planned) per stack entry, kept in step with stack.bookmarks
    let mut slots: Vec<(Option<usize>, bool)> = stack
        .bookmarks
        .iter()
        .map(|b| (rank_of_bookmark.get(b.name.as_str()).copied(), false))
        .collect();
    let working_copy = window.first().map(|c| c.change_id.as_str());
    let mut current = stack
        .current_index
        .and_then(|i| stack.bookmarks.get(i))
        .map(|b| b.name.clone());

    for auto in planned {
        if stack.contains(&auto.name) {
            continue;
        }
        let Some(&rank) = rank_of_change.get(auto.change_id.as_str()) else {
            debug!(name = %auto.name, "planned bookmark outside the mutable window");
            continue;
        };

        let at = slots
            .iter()
            .position(|(r, _)| r.is_some_and(|r| r > rank))
            .unwrap_or_else(|| {
                slots
                    .iter()
                    .rposition(|(r, _)| r.is_some())
                    .map_or(slots.len(), |i| i + 1)
            });

        let mut bookmark = Bookmark::new(auto.name.clone());
        if !auto.description.is_empty() {
            bookmark.commit_message = Some(auto.description.clone());
        }
        stack.bookmarks.insert(at, bookmark);
        slots.insert(at, (Some(rank), true));

        if current.is_none() && working_copy == Some(auto.change_id.as_str()) {
            current = Some(auto.name.clone());
        }
    }

    // Renumber change groups: planned bookmarks each sit on their own change
    let mut group = 0;
    let mut previous: Option<(bool, usize)> = None;
    for (i, (bookmark, (_, is_planned))) in stack.bookmarks.iter_mut().zip(&slots).enumerate() {
        let key = if *is_planned { (true, i) } else { (false, bookmark.commit_group) };
        if previous.is_some_and(|p| p != key) {
            group += 1;
        }
        previous = Some(key);
        bookmark.commit_group = group;
        bookmark.is_current = current.as_deref() == Some(bookmark.name.as_str());
    }
    stack.current_index = stack.bookmarks.iter().position(|b| b.is_current);
}
