//! Typed wrapper over the `jj` command line

use super::{revsets, templates};
use crate::error::{Error, Result};
use crate::exec::{CommandRunner, ExecOutput};
use crate::report::Reporter;
use crate::types::GitRemote;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Quote a bookmark or branch name as a revset string literal
pub fn revset_symbol(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// A jj workspace driven through its CLI
///
/// Query methods always run. Mutating methods become no-ops that only report
/// their intent when the repo was opened in dry-run mode.
#[derive(Clone)]
pub struct JjRepo {
    runner: Arc<dyn CommandRunner>,
    reporter: Arc<dyn Reporter>,
    dry_run: bool,
}

impl JjRepo {
    /// Wrap a command runner
    pub fn new(runner: Arc<dyn CommandRunner>, reporter: Arc<dyn Reporter>, dry_run: bool) -> Self {
        Self {
            runner,
            reporter,
            dry_run,
        }
    }

    /// Whether mutations are suppressed
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// The reporter this repo was opened with
    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    async fn exec(&self, args: &[&str]) -> ExecOutput {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("jj".to_string());
        argv.extend(args.iter().map(|a| (*a).to_string()));
        self.runner.exec(&argv).await
    }

    /// Run a jj command and return stdout, failing on nonzero exit
    pub async fn run(&self, args: &[&str]) -> Result<String> {
        let out = self.exec(args).await;
        if out.success() {
            Ok(out.stdout)
        } else {
            debug!(exit_code = out.exit_code, stderr = %out.stderr.trim(), "jj failed");
            Err(Error::JjCommand {
                command: format!("jj {}", args.join(" ")),
                code: out.exit_code,
                stderr: out.stderr.trim().to_string(),
            })
        }
    }

    /// `jj log` over a revset with a template, no graph, no color
    pub async fn log(&self, revset: &str, template: &str) -> Result<String> {
        self.run(&[
            "log", "--no-graph", "--color", "never", "-r", revset, "-T", template,
        ])
        .await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Root directory of the workspace
    pub async fn workspace_root(&self) -> Result<PathBuf> {
        let out = self.run(&["root"]).await?;
        Ok(PathBuf::from(out.trim()))
    }

    /// Bookmark tokens on the trunk change
    pub async fn trunk_bookmarks(&self) -> Result<String> {
        self.run(&[
            "log",
            "--no-graph",
            "--color",
            "never",
            "--limit",
            "1",
            "-r",
            revsets::TRUNK,
            "-T",
            templates::BOOKMARKS,
        ])
        .await
    }

    /// Lineage output, one line per change, tip first
    pub async fn lineage(&self, include_descendants: bool) -> Result<String> {
        let revset = if include_descendants {
            revsets::LINEAGE
        } else {
            revsets::ANCESTORS
        };
        self.log(revset, templates::LINEAGE).await
    }

    /// Lineage output restricted to descendants of `@`
    pub async fn descendants(&self) -> Result<String> {
        self.log(revsets::DESCENDANTS, templates::LINEAGE).await
    }

    /// Mutable changes of the local stack
    pub async fn mutable_changes(&self) -> Result<String> {
        self.log(revsets::MUTABLE_STACK, templates::MUTABLE_CHANGES)
            .await
    }

    /// Parent counts of the stack's changes
    pub async fn parent_counts(&self) -> Result<String> {
        self.log(revsets::ANCESTORS, templates::PARENT_COUNT).await
    }

    /// Parent ids of every child of the stack's changes
    pub async fn stack_children(&self) -> Result<String> {
        self.log(revsets::STACK_CHILDREN, templates::PARENT_IDS)
            .await
    }

    /// One-line log of changes not yet in `base`
    pub async fn oneline_since(&self, base: &str) -> Result<String> {
        self.log(&revsets::conflict_scan(base), templates::ONELINE)
            .await
    }

    /// Short commit hash and first description line of the change at `revset`
    pub async fn commit_summary(&self, revset: &str) -> Result<(String, String)> {
        let out = self
            .run(&[
                "log",
                "--no-graph",
                "--color",
                "never",
                "--limit",
                "1",
                "-r",
                revset,
                "-T",
                templates::COMMIT_SUMMARY,
            ])
            .await?;
        let line = out.lines().next().unwrap_or_default();
        let (hash, message) = line.split_once('\t').unwrap_or((line, ""));
        Ok((hash.trim().to_string(), message.trim().to_string()))
    }

    /// Names of all local bookmarks in the repo
    pub async fn local_bookmarks(&self) -> Result<Vec<String>> {
        let out = self
            .run(&["bookmark", "list", "-T", templates::BOOKMARK_NAMES])
            .await?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.contains('@'))
            .map(String::from)
            .collect())
    }

    /// Configured git remotes
    pub async fn git_remotes(&self) -> Result<Vec<GitRemote>> {
        let out = self.run(&["git", "remote", "list"]).await?;
        Ok(super::parse_remote_list(&out))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create bookmark `name` at revision `rev`
    pub async fn create_bookmark(&self, name: &str, rev: &str) -> Result<()> {
        if self.dry_run {
            self.reporter
                .dry_run(&format!("create bookmark {name} at {rev}"));
            return Ok(());
        }
        debug!(name, rev, "creating bookmark");
        self.run(&["bookmark", "create", name, "-r", rev]).await?;
        Ok(())
    }

    /// Create local bookmark `name` at `name@remote`
    pub async fn create_bookmark_from_remote(&self, name: &str, remote: &str) -> Result<()> {
        let rev = format!("{}@{}", revset_symbol(name), revset_symbol(remote));
        self.create_bookmark(name, &rev).await
    }

    /// Delete local bookmark `name`
    pub async fn delete_bookmark(&self, name: &str) -> Result<()> {
        if self.dry_run {
            self.reporter.dry_run(&format!("delete bookmark {name}"));
            return Ok(());
        }
        debug!(name, "deleting bookmark");
        let pattern = format!("exact:{name}");
        self.run(&["bookmark", "delete", &pattern]).await?;
        Ok(())
    }

    /// Forget `name` including its remote-tracking refs
    pub async fn forget_bookmark(&self, name: &str) -> Result<()> {
        if self.dry_run {
            self.reporter
                .dry_run(&format!("forget bookmark {name} and its remote refs"));
            return Ok(());
        }
        debug!(name, "forgetting bookmark");
        let pattern = format!("exact:{name}");
        self.run(&["bookmark", "forget", "--include-remotes", &pattern])
            .await?;
        Ok(())
    }

    /// Push a bookmark to `remote`, creating it there if needed
    pub async fn push_bookmark(&self, name: &str, remote: &str) -> Result<()> {
        if self.dry_run {
            self.reporter
                .dry_run(&format!("push bookmark {name} to {remote}"));
            return Ok(());
        }
        debug!(name, remote, "pushing bookmark");
        self.run(&[
            "git",
            "push",
            "--remote",
            remote,
            "--bookmark",
            name,
            "--allow-new",
        ])
        .await?;
        Ok(())
    }
}
