//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use j3n::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Planning build");
//! ui.error("Step failed");
//!
//! assert!(ui.messages().contains(&"Planning build".to_string()));
//! assert!(ui.has_error("failed"));
//! ```

use crate::runner::{ExecutionReport, StepOutcome, StepStatus};

use super::{OutputMode, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    steps: Vec<(String, StepStatus, Option<String>)>,
    summaries: Vec<(usize, usize)>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured warnings.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured errors.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all captured headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Steps shown, as (reference, status, error).
    pub fn steps(&self) -> &[(String, StepStatus, Option<String>)] {
        &self.steps
    }

    /// Summaries shown, as (succeeded, failed).
    pub fn summaries(&self) -> &[(usize, usize)] {
        &self.summaries
    }

    /// Check if any message contains the given text.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    /// Check if any success message contains the given text.
    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    /// Check if any warning contains the given text.
    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    /// Check if any error contains the given text.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_step(&mut self, outcome: &StepOutcome, error: Option<&str>) {
        self.steps.push((
            outcome.reference.to_string(),
            outcome.status,
            error.map(str::to_string),
        ));
    }

    fn show_summary(&mut self, report: &ExecutionReport) {
        self.summaries
            .push((report.succeeded_count(), report.failure_count()));
    }
}
