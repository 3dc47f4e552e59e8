//! Local stack detection and validation
//!
//! Turns jj log output into a [`StackInfo`](crate::types::StackInfo) and
//! rejects stacks the engine cannot turn into a PR chain.

mod base_branch;
mod parser;
mod validate;

pub use base_branch::{PREFERRED_BASE_BRANCHES, detect_base_branch, select_base_branch};
pub use parser::{
    CURRENT_MARKER, StackOptions, detect_partial_stack, detect_stack, detect_stack_with,
    enrich_commit_messages, parse_bookmark_names, parse_stack,
};
pub use validate::{
    check_conflicts, check_linearity, find_divergent_commits, find_merge_commits,
    parse_conflicts, stack_change_ids, validate_stack,
};
