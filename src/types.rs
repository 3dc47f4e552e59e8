//! Core types for jj-stack-prs

use serde::{Deserialize, Serialize};

/// A jj bookmark in the local lineage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bookmark {
    /// Bookmark name
    pub name: String,
    /// Short commit hash of the change the bookmark points at
    pub commit_hash: Option<String>,
    /// First line of the commit description
    pub commit_message: Option<String>,
    /// Whether this bookmark sits on the working-copy change
    pub is_current: bool,
    /// Sequential id shared by bookmarks on the same change
    pub commit_group: usize,
    /// False when the bookmark was only seen as `<name>@<remote>`
    pub is_local: bool,
}

impl Bookmark {
    /// Create a local bookmark with no metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_hash: None,
            commit_message: None,
            is_current: false,
            commit_group: 0,
            is_local: true,
        }
    }
}

/// A bookmark token of the form `name@remote`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBookmark {
    /// Bookmark name
    pub name: String,
    /// Remote name
    pub remote: String,
}

impl RemoteBookmark {
    /// Split a `name@remote` token. Returns `None` for plain names.
    pub fn parse(token: &str) -> Option<Self> {
        let (name, remote) = token.rsplit_once('@')?;
        if name.is_empty() || remote.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            remote: remote.to_string(),
        })
    }
}

impl std::fmt::Display for RemoteBookmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.remote)
    }
}

/// The local stack of bookmarks between trunk and the working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackInfo {
    /// Bookmarks ordered base (index 0) to tip
    pub bookmarks: Vec<Bookmark>,
    /// Trunk bookmark the stack is based on (never part of `bookmarks`)
    pub base_branch: String,
    /// True when bookmarks exist above the working copy that the chain lacks
    pub is_partial_stack: bool,
    /// Index of the bookmark on the working-copy change, if any
    pub current_index: Option<usize>,
}

impl StackInfo {
    /// Bookmark on the working-copy change
    pub fn current(&self) -> Option<&Bookmark> {
        self.current_index.and_then(|i| self.bookmarks.get(i))
    }

    /// Whether a bookmark with this name is part of the stack
    pub fn contains(&self, name: &str) -> bool {
        self.bookmarks.iter().any(|b| b.name == name)
    }

    /// Bookmark names, base to tip
    pub fn names(&self) -> Vec<&str> {
        self.bookmarks.iter().map(|b| b.name.as_str()).collect()
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl PrState {
    /// Merged or closed
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Closed | Self::Merged)
    }
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// A pull request as the forge reports it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExistingPr {
    /// PR number
    pub number: u64,
    /// Head branch (the bookmark name)
    pub head_ref_name: String,
    /// Base branch
    pub base_ref_name: String,
    /// Whether PR is a draft
    pub is_draft: bool,
    /// Current state
    pub state: PrState,
    /// Web URL
    pub url: String,
    /// PR body, when the listing included it
    pub body: Option<String>,
}

/// A jj change in the mutable window that carries no bookmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbookmarkedChange {
    /// Full jj change id
    pub change_id: String,
    /// First line of the description
    pub description: String,
}

/// A tool-created `auto/jjsp-*` bookmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoBookmark {
    /// Generated bookmark name
    pub name: String,
    /// Change the bookmark was created on
    pub change_id: String,
    /// First line of the change's description
    pub description: String,
}

/// A conflicted change found by the conflict scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictedCommit {
    /// jj change id (short form as printed)
    pub change_id: String,
    /// First bookmark on the change, if any
    pub bookmark: Option<String>,
    /// Description text
    pub description: String,
}

/// Outcome of the linearity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearityCheckResult {
    /// Whether the stack is linear
    pub is_linear: bool,
    /// Which check failed, for non-linear stacks
    pub reason: Option<crate::error::NonLinearReason>,
    /// Offending changes formatted as `<id> (<n> parents)` or `<id> (<n> children)`
    pub problematic_commits: Vec<String>,
}

impl LinearityCheckResult {
    /// A linear result
    pub const fn linear() -> Self {
        Self {
            is_linear: true,
            reason: None,
            problematic_commits: Vec::new(),
        }
    }
}

/// Bookmarks deleted and kept by an auto-bookmark cleanup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupResult {
    /// Bookmarks that were deleted (or would be, in dry-run)
    pub deleted: Vec<String>,
    /// Bookmarks that were kept
    pub kept: Vec<String>,
}

impl CleanupResult {
    /// Merge another pass's result into this one
    pub fn extend(&mut self, other: Self) {
        self.deleted.extend(other.deleted);
        self.kept.extend(other.kept);
    }
}

/// A git remote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// GitHub repository coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
