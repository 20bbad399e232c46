//! Action command implementation.
//!
//! The `j3n action <name>` command executes an action and everything it
//! depends on.

use std::sync::mpsc;
use std::thread;

use crate::cli::args::ActionArgs;
use crate::error::Result;
use crate::runner::{Discipline, Executor, RunProgress, StepOutcome, StepStatus};
use crate::steps::StepRegistry;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::{ConfigSource, CONFIG_ERROR_EXIT_CODE};

/// The action command implementation.
pub struct ActionCommand {
    source: ConfigSource,
    args: ActionArgs,
    registry: StepRegistry,
}

impl ActionCommand {
    /// Create a new action command using the built-in step runners.
    pub fn new(source: ConfigSource, args: ActionArgs) -> Self {
        Self {
            source,
            args,
            registry: StepRegistry::with_builtins(),
        }
    }

    /// Use a different step registry.
    pub fn with_registry(mut self, registry: StepRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn discipline(&self) -> Discipline {
        if self.args.linear {
            Discipline::Linear
        } else {
            Discipline::Layered
        }
    }
}

impl Command for ActionCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(actions) = self.source.load(ui)? else {
            return Ok(CommandResult::failure(CONFIG_ERROR_EXIT_CODE));
        };

        let executor = Executor::new(&actions, &self.registry).with_discipline(self.discipline());
        ui.show_header(&self.args.name);

        let show_running = ui.output_mode().shows_details();
        let name = self.args.name.as_str();
        let (sender, events) = mpsc::channel::<(StepOutcome, Option<String>)>();

        // Steps are shown as they finish while the executor runs on its own thread.
        let report = thread::scope(|scope| {
            let worker = scope.spawn(move || {
                executor.execute_with_progress(name, move |event| {
                    let shown = match event {
                        RunProgress::StepStarting { reference } if show_running => Some((
                            StepOutcome {
                                status: StepStatus::Running,
                                ..StepOutcome::planned(reference.clone())
                            },
                            None,
                        )),
                        RunProgress::StepStarting { .. } => None,
                        RunProgress::StepFinished { outcome, error } => {
                            Some((outcome.clone(), error.map(|e| e.to_string())))
                        }
                    };
                    if let Some(shown) = shown {
                        let _ = sender.send(shown);
                    }
                })
            });

            for (outcome, error) in events {
                ui.show_step(&outcome, error.as_deref());
            }

            worker
                .join()
                .unwrap_or_else(|_| Err(anyhow::anyhow!("executor thread panicked").into()))
        })?;

        for outcome in &report.outcomes {
            if outcome.status == StepStatus::Planned {
                ui.show_step(outcome, None);
            }
        }
        ui.show_summary(&report);

        if report.is_success() {
            ui.success(&format!("Action '{}' completed", self.args.name));
            Ok(CommandResult::success())
        } else {
            ui.error(&format!(
                "Action '{}' failed: {} step(s) failed",
                self.args.name,
                report.failure_count()
            ));
            Ok(CommandResult::failure(1))
        }
    }
}
