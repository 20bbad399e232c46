//! Step execution orchestration.
//!
//! - [`DependencyGraph`] - Generic graph with cycle detection and fronts
//! - [`ExecutionPlan`] - Ordered, validated list of steps for one action
//! - [`Executor`] - Runs a plan against a step registry
//! - [`ExecutionReport`] - Outcomes, failures and outputs of a run

pub mod dependency;
pub mod executor;
pub mod plan;
pub mod report;

pub use dependency::DependencyGraph;
pub use executor::{Discipline, Executor, RunProgress};
pub use plan::{ExecutionPlan, PlannedStep};
pub use report::{ExecutionReport, Failures, OutputStore, StepOutcome, StepStatus};
