//! PR chain resolution
//!
//! Reconciles the local bookmark stack with the forge's open-PR graph and
//! produces a gap-free, base-to-tip [`PrChain`].

mod builder;
mod chain;

pub use builder::{
    ChainBuild, ReconciliationFailure, build_pr_chain, build_pr_chain_with_auto_create,
    index_prs_by_head,
};
pub use chain::{LocalState, PrChain, PrChainNode, PrSnapshot};
