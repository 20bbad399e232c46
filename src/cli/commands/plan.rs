//! Plan command implementation.
//!
//! The `j3n plan <name>` command shows the steps an action would run, in
//! order, and how they group into concurrent fronts.

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::runner::ExecutionPlan;
use crate::ui::theme::J3nTheme;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::{ConfigSource, CONFIG_ERROR_EXIT_CODE};

/// The plan command implementation.
pub struct PlanCommand {
    source: ConfigSource,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(source: ConfigSource, args: PlanArgs) -> Self {
        Self { source, args }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(actions) = self.source.load(ui)? else {
            return Ok(CommandResult::failure(CONFIG_ERROR_EXIT_CODE));
        };

        let plan = ExecutionPlan::build(&actions, &self.args.name)?;
        let fronts = plan.fronts()?;
        let theme = J3nTheme::new();
        let details = ui.output_mode().shows_details();

        ui.message(&format!("  {}", theme.key.apply_to("Steps:")));
        for (index, planned) in plan.steps().iter().enumerate() {
            let mut line = format!("    {:>2}. {}", index + 1, planned.reference);
            if details && !planned.prerequisites.is_empty() {
                let after: Vec<String> =
                    planned.prerequisites.iter().map(|r| r.to_string()).collect();
                line.push_str(&format!(
                    " {}",
                    theme.dim.apply_to(format!("(after {})", after.join(", ")))
                ));
            }
            ui.message(&line);
        }

        ui.message("");
        ui.message(&format!("  {}", theme.key.apply_to("Fronts:")));
        for (index, front) in fronts.iter().enumerate() {
            let members: Vec<String> = front.iter().map(|r| r.to_string()).collect();
            ui.message(&format!("    {:>2}. {}", index + 1, members.join(", ")));
        }

        Ok(CommandResult::success())
    }
}
