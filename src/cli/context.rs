//! Shared command context
//!
//! Locates the workspace, loads config, picks the remote and opens the
//! forge backend.

use super::CliReporter;
use jj_stack_prs::config::{Config, Overrides};
use jj_stack_prs::error::Result;
use jj_stack_prs::exec::{CommandRunner, ProcessRunner};
use jj_stack_prs::platform::{PlatformService, create_platform_service};
use jj_stack_prs::repo::{JjRepo, select_remote};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs to talk to jj and the forge
pub struct CommandContext {
    /// jj access rooted at the workspace
    pub repo: JjRepo,
    /// Terminal reporter shared with `repo`
    pub reporter: Arc<CliReporter>,
    /// Root path of the workspace
    pub workspace_root: PathBuf,
    /// Resolved configuration, with `remote` set to the selected remote
    pub config: Config,
    /// Forge backend
    pub platform: Box<dyn PlatformService>,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// An explicit `--remote` must exist. Otherwise the configured remote is
    /// used when present, falling back to `origin` or the first remote.
    pub async fn new(
        path: &Path,
        overrides: &Overrides,
        reporter: Arc<CliReporter>,
        dry_run: bool,
    ) -> Result<Self> {
        let probe = JjRepo::new(
            Arc::new(ProcessRunner::new(path)),
            reporter.clone(),
            dry_run,
        );
        let workspace_root = probe.workspace_root().await?;
        debug!(root = %workspace_root.display(), "workspace located");

        let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new(&workspace_root));
        let repo = JjRepo::new(runner.clone(), reporter.clone(), dry_run);

        let mut config = Config::load(&workspace_root)?;
        let configured_remote = config.remote.clone();
        config = config.with_overrides(overrides);

        let remotes = repo.git_remotes().await?;
        config.remote = match overrides.remote.as_deref() {
            Some(requested) => select_remote(&remotes, Some(requested))?,
            None if remotes.iter().any(|r| r.name == configured_remote) => configured_remote,
            None => select_remote(&remotes, None)?,
        };
        let remote_url = remotes
            .iter()
            .find(|r| r.name == config.remote)
            .map(|r| r.url.clone());
        debug!(remote = %config.remote, url = ?remote_url, "remote selected");

        let platform = create_platform_service(&config, runner, remote_url.as_deref()).await?;

        Ok(Self {
            repo,
            reporter,
            workspace_root,
            config,
            platform,
        })
    }
}
