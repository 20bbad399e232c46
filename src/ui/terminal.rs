//! Terminal UI.

use console::Term;
use std::io::Write;

use crate::runner::{ExecutionReport, StepOutcome, StepStatus};

use super::{should_use_colors, J3nTheme, OutputMode, UserInterface};

/// Terminal UI implementation.
///
/// Status goes to stdout, errors to stderr.
pub struct TerminalUI {
    term: Term,
    err: Term,
    theme: J3nTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            J3nTheme::new()
        } else {
            J3nTheme::plain()
        };

        Self {
            term: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_step(&mut self, outcome: &StepOutcome, error: Option<&str>) {
        if self.mode.shows_status() || outcome.status == StepStatus::Failed {
            let duration = if outcome.status.is_terminal() && self.mode.shows_details() {
                self.theme
                    .duration
                    .apply_to(outcome.format_duration())
                    .to_string()
            } else {
                String::new()
            };

            writeln!(
                self.term,
                "  {} {:<30} {}",
                self.theme.status_icon(outcome.status),
                outcome.reference,
                duration
            )
            .ok();
        }

        if let Some(error) = error {
            let b = &self.theme.border;
            for line in error.lines() {
                writeln!(self.err, "    {} {}", b.apply_to("│"), line).ok();
            }
        }
    }

    fn show_summary(&mut self, report: &ExecutionReport) {
        if !self.mode.shows_status() {
            return;
        }

        let not_run = report
            .outcomes
            .len()
            .saturating_sub(report.succeeded_count() + report.failure_count());
        writeln!(self.term).ok();
        writeln!(
            self.term,
            "  Total: {} {} {} succeeded {} {} failed {} {} not run",
            self.theme.duration.apply_to(report.format_duration()),
            self.theme.dim.apply_to("·"),
            report.succeeded_count(),
            self.theme.dim.apply_to("·"),
            report.failure_count(),
            self.theme.dim.apply_to("·"),
            not_run,
        )
        .ok();
    }
}

/// Create the UI for the current terminal.
pub fn create_ui(mode: OutputMode) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_ui_output_mode() {
        let ui = TerminalUI::new(OutputMode::Verbose);
        assert_eq!(ui.output_mode(), OutputMode::Verbose);
    }

    #[test]
    fn create_ui_respects_mode() {
        let ui = create_ui(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }
}
