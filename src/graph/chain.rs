//! The ordered PR chain

use crate::types::ExistingPr;
use std::collections::BTreeMap;

/// Open PRs keyed by head branch, iterated in sorted head order
pub type PrSnapshot = BTreeMap<String, ExistingPr>;

/// Whether a chain member has a local bookmark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalState {
    /// The bookmark exists locally
    Present,
    /// The bookmark was created from its remote counterpart in this run
    Created,
    /// No local bookmark exists and none could be created
    Missing,
}

/// One PR in the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrChainNode {
    /// Head bookmark
    pub bookmark: String,
    /// Branch the PR targets: the previous node, or the base branch
    pub base: String,
    /// PR title for new PRs
    pub title: String,
    /// First node of the chain
    pub is_bottom: bool,
    /// The PR already open for this bookmark
    pub existing_pr: Option<ExistingPr>,
    /// Local bookmark status
    pub local_state: LocalState,
}

impl PrChainNode {
    /// Whether the open PR targets a different base than the chain requires
    pub fn needs_retarget(&self) -> bool {
        self.existing_pr
            .as_ref()
            .is_some_and(|pr| pr.base_ref_name != self.base)
    }
}

/// PR chain ordered base to tip
///
/// `nodes[0].base` is the base branch, `nodes[i].base` is
/// `nodes[i - 1].bookmark`, and bookmark names are unique. Only the graph
/// builder constructs chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrChain {
    base_branch: String,
    nodes: Vec<PrChainNode>,
}

impl PrChain {
    pub(super) const fn new(base_branch: String, nodes: Vec<PrChainNode>) -> Self {
        Self { base_branch, nodes }
    }

    pub(super) fn nodes_mut(&mut self) -> &mut [PrChainNode] {
        &mut self.nodes
    }

    /// Branch the bottom PR targets
    pub fn base_branch(&self) -> &str {
        &self.base_branch
    }

    /// Nodes, base to tip
    pub fn nodes(&self) -> &[PrChainNode] {
        &self.nodes
    }

    /// Iterate nodes, base to tip
    pub fn iter(&self) -> std::slice::Iter<'_, PrChainNode> {
        self.nodes.iter()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the chain has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `index`
    pub fn get(&self, index: usize) -> Option<&PrChainNode> {
        self.nodes.get(index)
    }

    /// Index of the node for `bookmark`
    pub fn position(&self, bookmark: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.bookmark == bookmark)
    }

    /// Bookmark names, base to tip
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.bookmark.as_str()).collect()
    }

    /// Whether every node targets its predecessor and names are unique
    pub fn is_consistent(&self) -> bool {
        let mut expected = self.base_branch.as_str();
        for (i, node) in self.nodes.iter().enumerate() {
            if node.base != expected || node.is_bottom != (i == 0) {
                return false;
            }
            if self.nodes[..i].iter().any(|n| n.bookmark == node.bookmark) {
                return false;
            }
            expected = &node.bookmark;
        }
        true
    }
}

impl<'a> IntoIterator for &'a PrChain {
    type Item = &'a PrChainNode;
    type IntoIter = std::slice::Iter<'a, PrChainNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
