//! PR submission for a resolved chain
//!
//! Two-phase pattern:
//! 1. Plan - create `SubmissionPlan` from the chain (pure, testable)
//! 2. Execute - push bookmarks and create or update PRs (effectful)

mod description;
mod execute;
mod plan;

pub use description::{
    DescriptionContext, FOOTER_MARKER, STACK_MARKER, StackEntry, compose_description,
    extract_original_body,
};
pub use execute::{SubmissionResult, execute_submission};
pub use plan::{PlanOptions, SubmissionPlan, SubmitStep, create_submission_plan};
