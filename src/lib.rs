//! jj-stack-prs - stacked GitHub PRs for Jujutsu
//!
//! Turns the linear chain of bookmarked jj changes between trunk and the
//! working copy into a chain of dependent pull requests, and keeps that
//! chain consistent as changes are added, rebased, merged or removed.
//!
//! The pipeline per run:
//!
//! 1. [`stack`] detects the base branch, validates the stack and parses the
//!    bookmark chain from `jj log` output.
//! 2. [`auto_bookmark`] removes stale `auto/jjsp-*` bookmarks and creates
//!    new ones for unbookmarked changes.
//! 3. [`graph`] reconciles the chain with the forge's open PRs.
//! 4. [`submit`] pushes bookmarks and creates or updates the PRs.
//!
//! [`engine::resolve`] runs steps 1 to 3.
//!
//! All external processes run through [`exec::CommandRunner`], so every
//! stage can be driven by scripted output in tests.

pub mod auth;
pub mod auto_bookmark;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod graph;
pub mod platform;
pub mod repo;
pub mod report;
pub mod stack;
pub mod submit;
pub mod types;

pub use error::{Error, Result};
