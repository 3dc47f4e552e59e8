//! Shared test helpers

#![allow(dead_code)]

mod mock_platform;
mod scripted_runner;

pub use mock_platform::{MockPlatformService, UpdateBaseCall, UpdateBodyCall};
pub use scripted_runner::ScriptedRunner;

use jj_stack_prs::graph::{PrSnapshot, index_prs_by_head};
use jj_stack_prs::repo::JjRepo;
use jj_stack_prs::report::Reporter;
use jj_stack_prs::types::{Bookmark, ExistingPr, PrState};
use std::sync::{Arc, Mutex};

/// Reporter that records every line by kind
#[derive(Default)]
pub struct RecordingReporter {
    pub lines: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    pub fn of_kind(&self, kind: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.of_kind("warn")
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.lines.lock().unwrap().push(("info", message.to_string()));
    }

    fn verbose(&self, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push(("verbose", message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.lines.lock().unwrap().push(("warn", message.to_string()));
    }

    fn dry_run(&self, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push(("dry_run", message.to_string()));
    }
}

/// A repo over a scripted runner, with handles to the runner and reporter
pub struct TestRepo {
    pub repo: JjRepo,
    pub runner: Arc<ScriptedRunner>,
    pub reporter: Arc<RecordingReporter>,
}

pub fn test_repo(dry_run: bool) -> TestRepo {
    let runner = Arc::new(ScriptedRunner::new());
    let reporter = Arc::new(RecordingReporter::default());
    let repo = JjRepo::new(runner.clone(), reporter.clone(), dry_run);
    TestRepo {
        repo,
        runner,
        reporter,
    }
}

/// Open PR from `head` into `base`
pub fn make_pr(number: u64, head: &str, base: &str) -> ExistingPr {
    ExistingPr {
        number,
        head_ref_name: head.to_string(),
        base_ref_name: base.to_string(),
        is_draft: false,
        state: PrState::Open,
        url: format!("https://github.com/test/repo/pull/{number}"),
        body: None,
    }
}

/// PR in a given state
pub fn make_pr_in_state(number: u64, head: &str, state: PrState) -> ExistingPr {
    ExistingPr {
        state,
        ..make_pr(number, head, "main")
    }
}

/// Local bookmark with a commit message
pub fn local(name: &str, message: &str) -> Bookmark {
    Bookmark {
        commit_message: Some(message.to_string()),
        ..Bookmark::new(name)
    }
}

/// Local bookmarks ordered base to tip, messages derived from names
pub fn make_linear_stack(names: &[&str]) -> Vec<Bookmark> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Bookmark {
            commit_group: i,
            ..local(name, &format!("Add {name}"))
        })
        .collect()
}

pub fn snapshot(prs: Vec<ExistingPr>) -> PrSnapshot {
    index_prs_by_head(prs)
}
