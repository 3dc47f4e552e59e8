//! Error types for jj-stack-prs

use crate::types::ConflictedCommit;
use thiserror::Error;

/// Why a stack was rejected as non-linear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonLinearReason {
    /// A change in the stack has more than one parent
    Merge,
    /// A change in the stack has more than one child
    Divergent,
}

impl std::fmt::Display for NonLinearReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge commit"),
            Self::Divergent => write!(f, "divergent history"),
        }
    }
}

/// Errors that can occur in jj-stack-prs
#[derive(Error, Debug)]
pub enum Error {
    /// The resolved stack contains no bookmarks
    #[error("no bookmarks found in the current stack (empty stack between trunk and @)")]
    NoBookmarks,

    /// The stack contains merges or divergent changes
    #[error("stack is not linear ({reason}): {}", .commits.join(", "))]
    NonLinearStack {
        /// Which check failed
        reason: NonLinearReason,
        /// Offending changes, formatted as `<id> (<n> parents|children)`
        commits: Vec<String>,
    },

    /// The stack contains conflicted changes
    #[error("stack contains {} conflicted change(s)", .0.len())]
    Conflicts(Vec<ConflictedCommit>),

    /// A required jj command exited nonzero
    #[error("jj command failed ({code}): {command}: {stderr}")]
    JjCommand {
        /// The command line that was run
        command: String,
        /// Process exit code
        code: i32,
        /// Trimmed stderr output
        stderr: String,
    },

    /// Forge (PR) operation failed
    #[error("{0}")]
    Platform(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Creating a local bookmark from its remote counterpart failed
    #[error("failed to materialize bookmark '{bookmark}': {message}")]
    Reconciliation {
        /// Bookmark that could not be created
        bookmark: String,
        /// Underlying failure
        message: String,
    },

    /// The forge's PR base graph contains a cycle
    #[error("PR base graph is inconsistent: {0}")]
    CyclicPrGraph(String),

    /// Command output could not be parsed
    #[error("failed to parse output: {0}")]
    Parse(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// Requested remote does not exist
    #[error("remote '{0}' not found")]
    RemoteNotFound(String),

    /// No GitHub remote configured
    #[error("no supported remotes found (GitHub)")]
    NoSupportedRemotes,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl Error {
    /// Suggested command for the user to fix the condition, if there is one
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoBookmarks => Some("jj bookmark create <name> -r @-"),
            Self::NonLinearStack {
                reason: NonLinearReason::Merge,
                ..
            } => Some("jj rebase -s <change> -d <single parent>"),
            Self::NonLinearStack {
                reason: NonLinearReason::Divergent,
                ..
            } => Some("jj log -r 'trunk()..' to inspect, then jj rebase or jj abandon the extra branch"),
            Self::Conflicts(_) => Some("jj new <change> && jj resolve, then jj squash"),
            Self::Auth(_) => Some("gh auth login"),
            Self::NoSupportedRemotes | Self::RemoteNotFound(_) => {
                Some("jj git remote add origin <github url>")
            }
            Self::CyclicPrGraph(_) => Some("gh pr edit <number> --base <branch>"),
            _ => None,
        }
    }
}

/// Result type alias for jj-stack-prs
pub type Result<T> = std::result::Result<T, Error>;
