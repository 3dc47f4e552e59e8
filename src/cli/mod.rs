//! Command-line front end

pub mod context;
pub mod style;
pub mod submit;

use anstream::{eprintln, println};
use indicatif::ProgressBar;
use jj_stack_prs::error::Error;
use jj_stack_prs::report::Reporter;
use std::sync::Mutex;
use std::time::Duration;
use style::{Stylize, check, spinner_style};

/// Reporter that prints to the terminal
///
/// While a spinner is running, lines are printed above it.
pub struct CliReporter {
    verbose: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            spinner: Mutex::new(None),
        }
    }

    /// Start a spinner, replacing any running one
    pub fn start(&self, message: String) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(old) = slot.replace(spinner)
        {
            old.finish_and_clear();
        }
    }

    /// Stop the spinner, leaving `message` behind a check mark
    pub fn finish(&self, message: &str) {
        if let Some(spinner) = self.take_spinner() {
            spinner.finish_with_message(format!("{} {message}", check()));
        }
    }

    /// Stop the spinner and erase it
    pub fn clear(&self) {
        if let Some(spinner) = self.take_spinner() {
            spinner.finish_and_clear();
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|mut slot| slot.take())
    }

    fn print(&self, line: &str, to_stderr: bool) {
        let emit = || {
            if to_stderr {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        };
        let active = self.spinner.lock().ok().and_then(|slot| slot.clone());
        match active {
            Some(spinner) => spinner.suspend(emit),
            None => emit(),
        }
    }
}

impl Reporter for CliReporter {
    fn info(&self, message: &str) {
        self.print(message, false);
    }

    fn verbose(&self, message: &str) {
        if self.verbose {
            self.print(&message.muted(), false);
        }
    }

    fn warn(&self, message: &str) {
        self.print(&format!("{} {message}", "warning:".warning()), true);
    }

    fn dry_run(&self, message: &str) {
        self.print(&format!("{} would {message}", "[dry-run]".accent()), false);
    }
}

/// Print a fatal error with its details and remedial hint
pub fn print_error(error: &Error) {
    eprintln!("{} {error}", "error:".failure());

    match error {
        Error::NonLinearStack { commits, .. } => {
            for commit in commits {
                eprintln!("  {} {commit}", style::arrow());
            }
        }
        Error::Conflicts(conflicts) => {
            for c in conflicts {
                let bookmark = c
                    .bookmark
                    .as_deref()
                    .map(|b| format!(" {}", b.accent()))
                    .unwrap_or_default();
                eprintln!(
                    "  {} {}{bookmark} {}",
                    style::arrow(),
                    c.change_id.emphasis(),
                    c.description.muted()
                );
            }
        }
        _ => {}
    }

    if let Some(hint) = error.hint() {
        eprintln!("{} {}", "hint:".emphasis(), hint.accent());
    }
}
