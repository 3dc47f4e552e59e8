//! jjsp - stacked GitHub PRs for Jujutsu bookmark chains

mod cli;

use clap::Parser;
use cli::submit::{SubmitOptions, run_submit};
use jj_stack_prs::config::Overrides;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "jjsp",
    version,
    about = "Stacked GitHub PRs for Jujutsu bookmark chains"
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Base branch for the bottom PR (default: detected from trunk())
    #[arg(long, value_name = "NAME")]
    base: Option<String>,

    /// Don't create bookmarks for unbookmarked changes
    #[arg(long)]
    no_auto_bookmark: bool,

    /// Don't delete auto bookmarks of merged PRs
    #[arg(long, conflicts_with = "force_cleanup")]
    skip_cleanup: bool,

    /// Clean up auto bookmarks even when auto-bookmarking is disabled
    #[arg(long)]
    force_cleanup: bool,

    /// Show what would be done without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Print every step
    #[arg(short, long)]
    verbose: bool,

    /// Remote to push to and read bookmarks from
    #[arg(long, value_name = "NAME")]
    remote: Option<String>,

    /// Path inside the jj workspace
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Open new PRs as drafts
    #[arg(long, conflicts_with = "publish")]
    draft: bool,

    /// Mark every draft PR in the stack ready for review
    #[arg(long)]
    publish: bool,

    /// Preview the plan and ask before executing
    #[arg(long)]
    confirm: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            remote: self.remote.clone(),
            base_branch: self.base.clone(),
            no_auto_bookmark: self.no_auto_bookmark,
            skip_cleanup: self.skip_cleanup,
            force_cleanup: self.force_cleanup,
            draft: self.draft,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "jj_stack_prs=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let options = SubmitOptions {
        overrides: args.overrides(),
        dry_run: args.dry_run,
        verbose: args.verbose,
        publish: args.publish,
        confirm: args.confirm,
    };

    match run_submit(&args.path, options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            cli::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
