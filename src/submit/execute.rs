//! Submission execution - effectful operations
//!
//! Runs a [`SubmissionPlan`] step by step. Steps are awaited in order and
//! the first failure aborts the run; re-running converges because every
//! step is skipped once the forge already matches the chain.

use super::description::{DescriptionContext, StackEntry, compose_description, extract_original_body};
use super::plan::{SubmissionPlan, SubmitStep};
use crate::error::Result;
use crate::graph::{PrChain, PrChainNode};
use crate::platform::{CreatePrRequest, PlatformService};
use crate::repo::JjRepo;
use crate::types::ExistingPr;
use std::collections::HashMap;
use tracing::debug;

/// Result of submission execution
#[derive(Debug, Clone, Default)]
pub struct SubmissionResult {
    /// Bookmarks pushed to the remote
    pub pushed: Vec<String>,
    /// PRs opened in this run
    pub created: Vec<ExistingPr>,
    /// Bookmarks whose PR base changed
    pub retargeted: Vec<String>,
    /// Bookmarks whose PR body was rewritten
    pub updated_bodies: Vec<String>,
    /// Bookmarks whose PR draft state changed
    pub draft_changes: Vec<String>,
}

impl SubmissionResult {
    /// Whether anything changed on the forge
    pub fn has_changes(&self) -> bool {
        !self.created.is_empty()
            || !self.retargeted.is_empty()
            || !self.updated_bodies.is_empty()
            || !self.draft_changes.is_empty()
    }
}

/// PR numbers and bodies known so far, keyed by bookmark
struct ForgeState {
    numbers: HashMap<String, u64>,
    bodies: HashMap<String, String>,
}

impl ForgeState {
    fn from_chain(chain: &PrChain) -> Self {
        let mut numbers = HashMap::new();
        let mut bodies = HashMap::new();
        for node in chain {
            if let Some(pr) = &node.existing_pr {
                numbers.insert(node.bookmark.clone(), pr.number);
                bodies.insert(node.bookmark.clone(), pr.body.clone().unwrap_or_default());
            }
        }
        Self { numbers, bodies }
    }

    fn entries(&self, chain: &PrChain) -> Vec<StackEntry> {
        chain
            .iter()
            .map(|n| StackEntry {
                bookmark: n.bookmark.clone(),
                pr_number: self.numbers.get(&n.bookmark).copied(),
            })
            .collect()
    }
}

/// User text for a node: the preserved PR body, else the commit message
fn user_text(node: &PrChainNode) -> String {
    node.existing_pr
        .as_ref()
        .and_then(|pr| pr.body.as_deref())
        .map(extract_original_body)
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| node.title.clone())
}

fn render(chain: &PrChain, state: &ForgeState, index: usize, body: &str) -> String {
    let entries = state.entries(chain);
    compose_description(&DescriptionContext {
        base_branch: chain.base_branch(),
        entries: &entries,
        index,
        body,
    })
}

/// Execute the submission plan (EFFECTFUL)
///
/// Mutations go through `repo` and `platform`; in dry-run the forge steps
/// are only reported.
pub async fn execute_submission(
    plan: &SubmissionPlan,
    chain: &PrChain,
    repo: &JjRepo,
    platform: &dyn PlatformService,
    remote: &str,
) -> Result<SubmissionResult> {
    let reporter = repo.reporter();
    let dry_run = repo.is_dry_run();
    let mut state = ForgeState::from_chain(chain);
    let mut result = SubmissionResult::default();

    for step in &plan.steps {
        let Some(index) = chain.position(step.bookmark_name()) else {
            debug!(bookmark = step.bookmark_name(), "step for bookmark outside the chain");
            continue;
        };
        let node = &chain.nodes()[index];

        if dry_run && !matches!(step, SubmitStep::Push { .. }) {
            reporter.dry_run(&step.to_string());
            continue;
        }

        match step {
            SubmitStep::Push { bookmark } => {
                reporter.verbose(&format!("Pushing {bookmark}"));
                repo.push_bookmark(bookmark, remote).await?;
                result.pushed.push(bookmark.clone());
            }
            SubmitStep::CreatePr {
                bookmark,
                base,
                title,
                draft,
            } => {
                let body = render(chain, &state, index, &user_text(node));
                let pr = platform
                    .create_pr(&CreatePrRequest {
                        title: title.clone(),
                        body: body.clone(),
                        head: bookmark.clone(),
                        base: base.clone(),
                        draft: *draft,
                    })
                    .await?;
                reporter.info(&format!("Created PR #{} for {bookmark}", pr.number));
                state.numbers.insert(bookmark.clone(), pr.number);
                state.bodies.insert(bookmark.clone(), body);
                result.created.push(pr);
            }
            SubmitStep::UpdateBase {
                bookmark,
                pr_number,
                from,
                to,
            } => {
                platform.update_pr_base(*pr_number, to).await?;
                reporter.info(&format!("Retargeted PR #{pr_number} ({bookmark}): {from} → {to}"));
                result.retargeted.push(bookmark.clone());
            }
            SubmitStep::UpdateBody { bookmark } => {
                let Some(&number) = state.numbers.get(bookmark) else {
                    continue;
                };
                let body = render(chain, &state, index, &user_text(node));
                if state.bodies.get(bookmark) == Some(&body) {
                    debug!(bookmark, "description already current");
                    continue;
                }
                platform.update_pr_body(number, &body).await?;
                reporter.verbose(&format!("Updated description of PR #{number}"));
                state.bodies.insert(bookmark.clone(), body);
                result.updated_bodies.push(bookmark.clone());
            }
            SubmitStep::SetDraft {
                bookmark,
                pr_number,
                draft,
            } => {
                platform.set_draft(*pr_number, *draft).await?;
                reporter.info(&step.to_string());
                result.draft_changes.push(bookmark.clone());
            }
        }
    }

    Ok(result)
}
