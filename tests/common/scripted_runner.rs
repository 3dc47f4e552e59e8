//! Command runner that answers from a script

#![allow(dead_code)]

use async_trait::async_trait;
use jj_stack_prs::exec::{CommandRunner, ExecOutput};
use std::sync::Mutex;

struct Rule {
    parts: Vec<String>,
    output: ExecOutput,
}

/// [`CommandRunner`] returning canned output
///
/// A rule matches when every one of its parts appears as a whole argv
/// element. Rules are tried in the order they were added; unmatched commands
/// fail with exit code 1.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands containing all of `parts` with `output`
    pub fn on(&self, parts: &[&str], output: ExecOutput) -> &Self {
        self.rules.lock().unwrap().push(Rule {
            parts: parts.iter().map(|p| (*p).to_string()).collect(),
            output,
        });
        self
    }

    /// Answer commands containing all of `parts` with a successful `stdout`
    pub fn ok(&self, parts: &[&str], stdout: &str) -> &Self {
        self.on(parts, ExecOutput::ok(stdout))
    }

    /// Every argv run so far
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Runs whose argv contains all of `parts`
    pub fn calls_with(&self, parts: &[&str]) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|argv| parts.iter().all(|p| argv.iter().any(|a| a == p)))
            .collect()
    }

    /// Whether any run's argv contains all of `parts`
    pub fn ran(&self, parts: &[&str]) -> bool {
        !self.calls_with(parts).is_empty()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn exec(&self, argv: &[String]) -> ExecOutput {
        self.calls.lock().unwrap().push(argv.to_vec());
        self.rules
            .lock()
            .unwrap()
            .iter()
            .find(|rule| rule.parts.iter().all(|p| argv.contains(p)))
            .map_or_else(
                || ExecOutput::failed(1, format!("unscripted: {}", argv.join(" "))),
                |rule| rule.output.clone(),
            )
    }
}
