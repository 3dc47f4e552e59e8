//! Stack graph resolution
//!
//! The local stack seeds a working set that is closed over the PR graph:
//! upward through PR bases, then downward through PRs based on a member.
//! Deleted bookmarks are removed, their dependents re-based past them, and
//! the survivors are ordered with a post-order DFS so every node targets the
//! one before it.

use super::chain::{LocalState, PrChain, PrChainNode, PrSnapshot};
use crate::error::{Error, Result};
use crate::repo::{JjRepo, revset_symbol};
use crate::types::{Bookmark, ExistingPr};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A chain member whose local bookmark could not be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationFailure {
    /// Bookmark that could not be created
    pub bookmark: String,
    /// Underlying failure
    pub message: String,
}

impl From<ReconciliationFailure> for Error {
    fn from(f: ReconciliationFailure) -> Self {
        Self::Reconciliation {
            bookmark: f.bookmark,
            message: f.message,
        }
    }
}

/// Result of [`build_pr_chain_with_auto_create`]
#[derive(Debug, Clone)]
pub struct ChainBuild {
    /// The resolved chain
    pub chain: PrChain,
    /// Bookmarks created from their remote counterpart
    pub created: Vec<String>,
    /// Bookmarks that stayed missing
    pub failures: Vec<ReconciliationFailure>,
}

/// Index PRs by head branch, keeping the first PR seen for each head
pub fn index_prs_by_head(prs: Vec<ExistingPr>) -> PrSnapshot {
    let mut snapshot = PrSnapshot::new();
    for pr in prs {
        snapshot.entry(pr.head_ref_name.clone()).or_insert(pr);
    }
    snapshot
}

/// Insertion-ordered name set
#[derive(Default)]
struct WorkingSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl WorkingSet {
    fn insert(&mut self, name: &str) -> bool {
        if self.members.insert(name.to_string()) {
            self.order.push(name.to_string());
            true
        } else {
            false
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    fn remove_all(&mut self, names: &HashSet<&str>) {
        self.order.retain(|n| !names.contains(n.as_str()));
        self.members.retain(|n| !names.contains(n.as_str()));
    }
}

/// Repeat `step` until it adds nothing, failing after `limit` productive rounds
fn fixpoint(
    set: &mut WorkingSet,
    limit: usize,
    what: &str,
    mut step: impl FnMut(&WorkingSet) -> Vec<String>,
) -> Result<()> {
    for _ in 0..=limit {
        let additions = step(set);
        let mut added = false;
        for name in &additions {
            added |= set.insert(name);
        }
        if !added {
            return Ok(());
        }
    }
    Err(Error::CyclicPrGraph(format!(
        "{what} closure did not settle within {limit} rounds"
    )))
}

/// Follow recorded PR bases past deleted names
fn effective_base<'a>(
    name: &str,
    existing: &'a PrSnapshot,
    deleted: &HashSet<&str>,
    base_branch: &'a str,
    limit: usize,
) -> Result<Option<&'a str>> {
    let Some(mut current) = existing.get(name).map(|pr| pr.base_ref_name.as_str()) else {
        return Ok(None);
    };

    let mut steps = 0;
    while deleted.contains(current) {
        steps += 1;
        if steps > limit {
            return Err(Error::CyclicPrGraph(format!(
                "base of '{name}' loops through deleted bookmarks"
            )));
        }
        current = existing
            .get(current)
            .map_or(base_branch, |pr| pr.base_ref_name.as_str());
    }
    Ok(Some(current))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

fn visit(
    name: &str,
    parents: &HashMap<String, Option<String>>,
    marks: &mut HashMap<String, Visit>,
    order: &mut Vec<String>,
) -> Result<()> {
    match marks.get(name) {
        Some(Visit::Done) => return Ok(()),
        Some(Visit::InProgress) => {
            return Err(Error::CyclicPrGraph(format!(
                "'{name}' is its own ancestor"
            )));
        }
        None => {}
    }

    marks.insert(name.to_string(), Visit::InProgress);
    if let Some(Some(parent)) = parents.get(name) {
        visit(parent, parents, marks, order)?;
    }
    marks.insert(name.to_string(), Visit::Done);
    order.push(name.to_string());
    Ok(())
}

/// Resolve the local stack and the open-PR snapshot into a PR chain
///
/// `local` is ordered base to tip. Names in `deleted` never appear in the
/// result, and members whose PR targeted a deleted name are re-based past
/// it. Identical inputs give identical chains.
pub fn build_pr_chain(
    local: &[Bookmark],
    existing: &PrSnapshot,
    base_branch: &str,
    deleted: &[String],
) -> Result<PrChain> {
    let limit = existing.len() + 1;
    let deleted: HashSet<&str> = deleted.iter().map(String::as_str).collect();

    let mut set = WorkingSet::default();
    for bookmark in local {
        set.insert(&bookmark.name);
    }

    fixpoint(&mut set, limit, "dependency", |set| {
        set.order
            .iter()
            .filter_map(|name| existing.get(name))
            .map(|pr| &pr.base_ref_name)
            .filter(|b| b.as_str() != base_branch && !set.contains(b))
            .cloned()
            .collect()
    })?;

    fixpoint(&mut set, limit, "dependent", |set| {
        existing
            .values()
            .filter(|pr| set.contains(&pr.base_ref_name) && !set.contains(&pr.head_ref_name))
            .map(|pr| pr.head_ref_name.clone())
            .collect()
    })?;

    set.remove_all(&deleted);
    set.order.retain(|n| n != base_branch);
    set.members.remove(base_branch);

    let local_order: Vec<&Bookmark> = local.iter().filter(|b| set.contains(&b.name)).collect();
    let local_names: HashSet<&str> = local_order.iter().map(|b| b.name.as_str()).collect();

    let mut parents: HashMap<String, Option<String>> = HashMap::new();
    for (i, bookmark) in local_order.iter().enumerate() {
        let parent = if i > 0 {
            Some(local_order[i - 1].name.clone())
        } else {
            effective_base(&bookmark.name, existing, &deleted, base_branch, limit)?
                .filter(|b| set.contains(b) && !local_names.contains(b))
                .map(String::from)
        };
        parents.insert(bookmark.name.clone(), parent);
    }
    for name in set.order.iter().filter(|n| !local_names.contains(n.as_str())) {
        let parent = effective_base(name, existing, &deleted, base_branch, limit)?
            .filter(|b| set.contains(b))
            .map(String::from);
        parents.insert(name.clone(), parent);
    }

    let mut marks = HashMap::new();
    let mut order = Vec::with_capacity(set.order.len());
    for bookmark in &local_order {
        visit(&bookmark.name, &parents, &mut marks, &mut order)?;
    }
    for name in &set.order {
        visit(name, &parents, &mut marks, &mut order)?;
    }

    let by_name: HashMap<&str, &Bookmark> = local_order.iter().map(|b| (b.name.as_str(), *b)).collect();
    let mut nodes = Vec::with_capacity(order.len());
    let mut previous = base_branch.to_string();
    for (i, name) in order.into_iter().enumerate() {
        let bookmark = by_name.get(name.as_str());
        let title = bookmark
            .and_then(|b| b.commit_message.clone())
            .unwrap_or_else(|| fallback_title(&name));
        let local_state = if bookmark.is_some_and(|b| b.is_local) {
            LocalState::Present
        } else {
            LocalState::Missing
        };

        nodes.push(PrChainNode {
            base: std::mem::replace(&mut previous, name.clone()),
            existing_pr: existing.get(&name).cloned(),
            bookmark: name,
            title,
            is_bottom: i == 0,
            local_state,
        });
    }

    debug!(chain = ?nodes.iter().map(|n| n.bookmark.as_str()).collect::<Vec<_>>(), "resolved PR chain");
    Ok(PrChain::new(base_branch.to_string(), nodes))
}

fn fallback_title(name: &str) -> String {
    format!("Changes from {name}")
}

/// [`build_pr_chain`], then create local bookmarks for missing members
///
/// Each missing member gets a local bookmark at `<name>@<remote>`. A failed
/// creation is collected and the member stays [`LocalState::Missing`]; the
/// chain is still returned.
pub async fn build_pr_chain_with_auto_create(
    repo: &JjRepo,
    local: &[Bookmark],
    existing: &PrSnapshot,
    base_branch: &str,
    deleted: &[String],
    remote: &str,
) -> Result<ChainBuild> {
    let mut chain = build_pr_chain(local, existing, base_branch, deleted)?;
    let mut created = Vec::new();
    let mut failures = Vec::new();

    for node in chain.nodes_mut() {
        if node.local_state != LocalState::Missing {
            continue;
        }

        match repo.create_bookmark_from_remote(&node.bookmark, remote).await {
            Ok(()) => {
                node.local_state = LocalState::Created;
                created.push(node.bookmark.clone());

                if node.title == fallback_title(&node.bookmark) {
                    let revset = format!(
                        "{}@{}",
                        revset_symbol(&node.bookmark),
                        revset_symbol(remote)
                    );
                    if let Ok((_, message)) = repo.commit_summary(&revset).await
                        && !message.is_empty()
                    {
                        node.title = message;
                    }
                }
            }
            Err(e) => {
                debug!(bookmark = %node.bookmark, error = %e, "could not materialize bookmark");
                failures.push(ReconciliationFailure {
                    bookmark: node.bookmark.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(ChainBuild {
        chain,
        created,
        failures,
    })
}
