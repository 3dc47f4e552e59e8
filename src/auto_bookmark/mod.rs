//! Lifecycle of tool-created `auto/jjsp-*` bookmarks
//!
//! Unbookmarked changes in the mutable window get a generated bookmark so
//! they can become PRs. Cleanup removes those bookmarks again once their PR
//! is merged or closed, or once the change has left the lineage. Only names
//! carrying [`AUTO_BOOKMARK_PREFIX`] are ever touched; a user bookmark that
//! merely starts with `auto/` is left alone.

mod cleanup;
mod discovery;
mod naming;

pub use cleanup::{cleanup_merged_auto_bookmarks, cleanup_orphaned_auto_bookmarks};
pub use discovery::{
    MutableChange, create_auto_bookmarks, find_unbookmarked_changes, merged_auto_suffixes,
    mutable_window, parse_mutable_changes, select_unbookmarked, splice_planned_bookmarks,
};
pub use naming::{generate_bookmark_name, slugify, MAX_SLUG_LEN};

/// Prefix of every bookmark this tool creates
pub const AUTO_BOOKMARK_PREFIX: &str = "auto/jjsp-";

/// Whether `name` was created by this tool
pub fn is_auto_bookmark(name: &str) -> bool {
    name.starts_with(AUTO_BOOKMARK_PREFIX)
}
