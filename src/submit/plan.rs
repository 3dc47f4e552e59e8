//! Submission planning - pure functions
//!
//! Turns a resolved [`PrChain`] into the ordered list of remote mutations
//! that bring the forge in line with it. No I/O happens here.

use crate::graph::{LocalState, PrChain};
use std::fmt;

/// Options for submission planning
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Open new PRs as drafts
    pub draft: bool,
    /// Mark every draft PR in the chain ready for review
    pub publish: bool,
}

/// A single step in the submission plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStep {
    /// Push the bookmark to the remote
    Push {
        /// Bookmark name
        bookmark: String,
    },
    /// Open a PR for the bookmark
    CreatePr {
        /// Bookmark name
        bookmark: String,
        /// Base branch
        base: String,
        /// PR title
        title: String,
        /// Open as draft
        draft: bool,
    },
    /// Point an open PR at a new base
    UpdateBase {
        /// Bookmark name
        bookmark: String,
        /// PR number
        pr_number: u64,
        /// Current base
        from: String,
        /// New base
        to: String,
    },
    /// Re-render the PR body with the current stack
    UpdateBody {
        /// Bookmark name
        bookmark: String,
    },
    /// Change the draft state of an open PR
    SetDraft {
        /// Bookmark name
        bookmark: String,
        /// PR number
        pr_number: u64,
        /// Target draft state
        draft: bool,
    },
}

impl SubmitStep {
    /// Get the bookmark name for this step
    pub fn bookmark_name(&self) -> &str {
        match self {
            Self::Push { bookmark }
            | Self::CreatePr { bookmark, .. }
            | Self::UpdateBase { bookmark, .. }
            | Self::UpdateBody { bookmark }
            | Self::SetDraft { bookmark, .. } => bookmark,
        }
    }
}

impl fmt::Display for SubmitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push { bookmark } => write!(f, "push {bookmark}"),
            Self::CreatePr {
                bookmark,
                base,
                draft,
                ..
            } => {
                let kind = if *draft { "draft PR" } else { "PR" };
                write!(f, "create {kind} {bookmark} → {base}")
            }
            Self::UpdateBase {
                pr_number,
                from,
                to,
                ..
            } => write!(f, "retarget PR #{pr_number}: {from} → {to}"),
            Self::UpdateBody { bookmark } => write!(f, "update description of {bookmark}"),
            Self::SetDraft {
                pr_number, draft, ..
            } => {
                if *draft {
                    write!(f, "convert PR #{pr_number} to draft")
                } else {
                    write!(f, "mark PR #{pr_number} ready for review")
                }
            }
        }
    }
}

/// Submission plan - the functional core output
///
/// Steps run in order: pushes bottom-up, PR creation bottom-up, base
/// updates, description updates, then draft toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionPlan {
    /// Ordered steps to perform
    pub steps: Vec<SubmitStep>,
    /// Chain members without a local bookmark or PR, left untouched
    pub skipped: Vec<String>,
}

impl SubmissionPlan {
    /// Whether the plan changes anything remotely besides pushes and bodies
    pub fn has_structural_changes(&self) -> bool {
        self.steps.iter().any(|s| {
            matches!(
                s,
                SubmitStep::CreatePr { .. } | SubmitStep::UpdateBase { .. } | SubmitStep::SetDraft { .. }
            )
        })
    }

    /// Number of PRs the plan opens
    pub fn create_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, SubmitStep::CreatePr { .. }))
            .count()
    }
}

/// Create a submission plan (PURE - no I/O, easily testable)
pub fn create_submission_plan(chain: &PrChain, options: &PlanOptions) -> SubmissionPlan {
    let mut pushes = Vec::new();
    let mut creates = Vec::new();
    let mut retargets = Vec::new();
    let mut bodies = Vec::new();
    let mut drafts = Vec::new();
    let mut skipped = Vec::new();

    for node in chain {
        let bookmark = node.bookmark.clone();

        if node.local_state == LocalState::Present {
            pushes.push(SubmitStep::Push {
                bookmark: bookmark.clone(),
            });
        }

        match &node.existing_pr {
            Some(pr) => {
                if pr.base_ref_name != node.base {
                    retargets.push(SubmitStep::UpdateBase {
                        bookmark: bookmark.clone(),
                        pr_number: pr.number,
                        from: pr.base_ref_name.clone(),
                        to: node.base.clone(),
                    });
                }
                if options.publish && pr.is_draft {
                    drafts.push(SubmitStep::SetDraft {
                        bookmark: bookmark.clone(),
                        pr_number: pr.number,
                        draft: false,
                    });
                }
            }
            None if node.local_state == LocalState::Missing => {
                skipped.push(bookmark);
                continue;
            }
            None => creates.push(SubmitStep::CreatePr {
                bookmark: bookmark.clone(),
                base: node.base.clone(),
                title: node.title.clone(),
                draft: options.draft && !options.publish,
            }),
        }

        bodies.push(SubmitStep::UpdateBody { bookmark });
    }

    let mut steps = pushes;
    steps.extend(creates);
    steps.extend(retargets);
    steps.extend(bodies);
    steps.extend(drafts);

    SubmissionPlan { steps, skipped }
}
