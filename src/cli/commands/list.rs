//! List command implementation.
//!
//! The `j3n list` command lists actions with their dependencies and steps.

use crate::cli::args::ListArgs;
use crate::error::{J3nError, Result};
use crate::ui::theme::J3nTheme;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::{ConfigSource, CONFIG_ERROR_EXIT_CODE};

/// The list command implementation.
pub struct ListCommand {
    source: ConfigSource,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(source: ConfigSource, args: ListArgs) -> Self {
        Self { source, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(actions) = self.source.load(ui)? else {
            return Ok(CommandResult::failure(CONFIG_ERROR_EXIT_CODE));
        };

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&actions).map_err(|e| J3nError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        let theme = J3nTheme::new();

        ui.message(&format!("  {}", theme.key.apply_to("Actions:")));
        for (name, action) in &actions.actions {
            ui.message(&format!("    {}", theme.highlight.apply_to(name)));

            if !action.dependencies.is_empty() {
                ui.message(&format!(
                    "      {} {}",
                    theme.dim.apply_to("└── depends on:"),
                    theme.dim.apply_to(action.dependencies.join(", "))
                ));
            }

            for (step_name, step) in &action.steps {
                let mut line = format!(
                    "      {} {}",
                    step_name,
                    theme.dim.apply_to(format!("({})", step.step_type))
                );
                let prerequisites = step.prerequisites();
                if !prerequisites.is_empty() {
                    line.push_str(&format!(
                        " {}",
                        theme.dim.apply_to(format!("← {}", prerequisites.join(", ")))
                    ));
                }
                ui.message(&line);
            }
        }

        Ok(CommandResult::success())
    }
}
