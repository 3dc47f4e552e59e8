//! Output capability passed into effectful components
//!
//! Components never print directly. They receive a `&dyn Reporter` and the
//! CLI decides how (and whether) each line is shown.

/// Sink for user-facing progress output
pub trait Reporter: Send + Sync {
    /// Normal progress line
    fn info(&self, message: &str);

    /// Detail shown only in verbose mode
    fn verbose(&self, message: &str);

    /// Non-fatal problem
    fn warn(&self, message: &str);

    /// A mutation skipped because of dry-run
    fn dry_run(&self, message: &str) {
        self.info(&format!("[dry-run] would {message}"));
    }
}
