//! Submit command - resolve the stack and bring its PRs up to date

use crate::cli::CliReporter;
use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, Stylize, arrow, hyperlink};
use anstream::println;
use dialoguer::Confirm;
use jj_stack_prs::config::Overrides;
use jj_stack_prs::engine::{Resolution, resolve, resolve_base_branch};
use jj_stack_prs::error::{Error, Result};
use jj_stack_prs::graph::{LocalState, PrChain};
use jj_stack_prs::report::Reporter;
use jj_stack_prs::submit::{
    PlanOptions, SubmissionPlan, SubmissionResult, create_submission_plan, execute_submission,
};
use std::path::Path;
use std::sync::Arc;

/// Options for the submit command
#[derive(Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SubmitOptions {
    /// Config overrides from flags
    pub overrides: Overrides,
    /// Show what would be done without making changes
    pub dry_run: bool,
    /// Print every step
    pub verbose: bool,
    /// Mark draft PRs ready for review
    pub publish: bool,
    /// Preview plan and prompt for confirmation before executing
    pub confirm: bool,
}

/// Run the submit command
pub async fn run_submit(path: &Path, options: SubmitOptions) -> Result<()> {
    let reporter = Arc::new(CliReporter::new(options.verbose));
    let ctx = CommandContext::new(path, &options.overrides, reporter.clone(), options.dry_run)
        .await?;
    reporter.verbose(&format!("Workspace: {}", ctx.workspace_root.display()));

    let base_branch = resolve_base_branch(&ctx.repo, &ctx.config).await;
    reporter.start(format!("Resolving stack onto {}...", base_branch.emphasis()));
    let resolution = match resolve(&ctx.repo, ctx.platform.as_ref(), &ctx.config, &base_branch).await
    {
        Ok(r) => r,
        Err(e) => {
            reporter.clear();
            return Err(e);
        }
    };
    reporter.finish(&format!(
        "Resolved {} bookmark(s) onto {}",
        resolution.chain.len().accent(),
        base_branch.emphasis()
    ));
    print_resolution(&resolution);

    let plan = create_submission_plan(
        &resolution.chain,
        &PlanOptions {
            draft: ctx.config.submit.draft,
            publish: options.publish,
        },
    );

    if plan.steps.is_empty() {
        println!("{}", "Nothing to submit".muted());
        return Ok(());
    }

    if options.dry_run || options.confirm {
        print_plan_preview(&plan);
    }

    if options.confirm && !options.dry_run {
        let proceed = Confirm::new()
            .with_prompt("Proceed with submit?")
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?;
        if !proceed {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
        println!();
    }

    println!(
        "{} {}",
        "Submitting stack onto".emphasis(),
        base_branch.accent()
    );
    if !options.dry_run {
        reporter.start(format!("Pushing to {}...", ctx.config.remote.emphasis()));
    }
    let result = match execute_submission(
        &plan,
        &resolution.chain,
        &ctx.repo,
        ctx.platform.as_ref(),
        &ctx.config.remote,
    )
    .await
    {
        Ok(r) => r,
        Err(e) => {
            reporter.clear();
            return Err(e);
        }
    };
    reporter.clear();

    println!();
    if options.dry_run {
        println!("{}", "Dry run complete".muted());
    } else {
        print_summary(&result, &resolution.chain);
    }

    Ok(())
}

fn print_resolution(resolution: &Resolution) {
    if !resolution.cleanup.deleted.is_empty() {
        println!(
            "{} Removed {} stale auto bookmark(s)",
            arrow(),
            resolution.cleanup.deleted.len().accent()
        );
    }
    for auto in &resolution.auto_bookmarks {
        println!(
            "{} Created {} for change {}",
            arrow(),
            auto.name.accent(),
            auto.change_id.muted()
        );
    }
    for name in &resolution.materialized {
        println!("{} Restored {} from the remote", arrow(), name.accent());
    }
    println!();
    print_chain(&resolution.chain);
}

fn print_chain(chain: &PrChain) {
    println!("{}:", "Stack".emphasis());
    for (i, node) in chain.iter().enumerate().rev() {
        let pr = node
            .existing_pr
            .as_ref()
            .map(|pr| format!(" #{}", pr.number).accent())
            .unwrap_or_default();
        let missing = if node.local_state == LocalState::Missing {
            format!(" {}", "(no local bookmark)".warning())
        } else {
            String::new()
        };
        println!(
            "  {}. {}{pr}{missing} {}",
            i + 1,
            node.bookmark.emphasis(),
            node.title.muted()
        );
    }
    println!("  {} {}", arrow(), chain.base_branch().accent());
    println!();
}

/// Print plan preview for --confirm and --dry-run
fn print_plan_preview(plan: &SubmissionPlan) {
    println!("{}:", "Submit plan".emphasis());
    for step in &plan.steps {
        println!("  {} {step}", arrow());
    }
    for name in &plan.skipped {
        println!(
            "  {} {}",
            arrow(),
            format!("skip {name}: no local bookmark and no PR").muted()
        );
    }
    println!();
}

fn print_summary(result: &SubmissionResult, chain: &PrChain) {
    println!(
        "{} {} pushed, {} created, {} retargeted, {} updated",
        format!("{CHECK} Submit complete:").success(),
        result.pushed.len().accent(),
        result.created.len().accent(),
        result.retargeted.len().accent(),
        result.updated_bodies.len().accent()
    );

    let links: Vec<(&str, u64, &str)> = chain
        .iter()
        .filter_map(|node| {
            result
                .created
                .iter()
                .find(|pr| pr.head_ref_name == node.bookmark)
                .or(node.existing_pr.as_ref())
                .map(|pr| (node.bookmark.as_str(), pr.number, pr.url.as_str()))
        })
        .collect();
    for (bookmark, number, url) in links.into_iter().rev() {
        println!(
            "  {} {}",
            hyperlink(&format!("#{number}"), url).accent(),
            bookmark.muted()
        );
    }
}
