//! jj repository access
//!
//! All jj invocations live here: argv construction, templates and revsets.
//! Callers receive raw query output only through the parsers in `stack` and
//! `auto_bookmark`, which turn it into typed values immediately.

mod jj;
mod remote;

pub use jj::{JjRepo, revset_symbol};
pub use remote::{parse_remote_list, select_remote};

/// Revsets used by the engine
pub mod revsets {
    /// Ancestors and descendants of `@` since trunk
    pub const LINEAGE: &str = "(::@ | @::) & trunk()..";
    /// Ancestors of `@` since trunk
    pub const ANCESTORS: &str = "::@ & trunk()..";
    /// Descendants of `@` since trunk
    pub const DESCENDANTS: &str = "@:: & trunk()..";
    /// Mutable part of the local stack
    pub const MUTABLE_STACK: &str = "::@ ~ immutable()";
    /// Children of every change in the stack
    pub const STACK_CHILDREN: &str = "children(::@ & trunk()..)";
    /// The canonical trunk change
    pub const TRUNK: &str = "trunk()";

    /// Changes in the stack that are not yet in `base`
    pub fn conflict_scan(base: &str) -> String {
        format!("::@ ~ ::{}", super::revset_symbol(base))
    }
}

/// Templates used by the engine
pub mod templates {
    /// All bookmark names on a change, jj's default rendering
    pub const BOOKMARKS: &str = r#"bookmarks ++ "\n""#;

    /// One line per change: local names (`*`-suffixed on `@`) then `name@remote`
    pub const LINEAGE: &str = r#"separate(" ", local_bookmarks.map(|b| b.name() ++ if(current_working_copy, "*")), remote_bookmarks.map(|b| b.name() ++ "@" ++ b.remote())) ++ "\n""#;

    /// `<change-id>\t<empty|changed>\t<bookmarks>\t<first line>`
    pub const MUTABLE_CHANGES: &str = r#"change_id ++ "\t" ++ if(empty, "empty", "changed") ++ "\t" ++ local_bookmarks.map(|b| b.name()).join(" ") ++ "\t" ++ description.first_line() ++ "\n""#;

    /// `<change-id> <parent count>`
    pub const PARENT_COUNT: &str = r#"change_id.short(12) ++ " " ++ parents.len() ++ "\n""#;

    /// `<change-id> <parent change ids...>`
    pub const PARENT_IDS: &str = r#"change_id.short(12) ++ " " ++ parents.map(|p| p.change_id().short(12)).join(" ") ++ "\n""#;

    /// `<commit hash>\t<first line>`
    pub const COMMIT_SUMMARY: &str = r#"commit_id.short(8) ++ "\t" ++ description.first_line() ++ "\n""#;

    /// Local bookmark names from `jj bookmark list`
    pub const BOOKMARK_NAMES: &str = r#"if(remote, "", name ++ "\n")"#;

    /// jj's built-in one-line log
    pub const ONELINE: &str = "builtin_log_oneline";
}
