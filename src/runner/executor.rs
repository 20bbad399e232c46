//! Action execution.
//!
//! The [`Executor`] plans an action and runs its steps with one of two
//! disciplines:
//!
//! - [`Discipline::Layered`] runs the plan front by front. Every step of a
//!   front runs on its own thread and the next front starts only after the
//!   whole front has finished. Failures are collected per front; after a
//!   front with failures nothing else runs.
//! - [`Discipline::Linear`] runs the plan in order on the calling thread and
//!   stops at the first failure.

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::action::{ActionCollection, Params, Reference, Step};
use crate::error::{Result, StepError};
use crate::steps::StepRegistry;

use super::plan::{ExecutionPlan, PlannedStep};
use super::report::{ExecutionReport, Failures, OutputStore, StepOutcome, StepStatus};

/// How the steps of a plan are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Discipline {
    /// Fronts of independent steps run concurrently.
    #[default]
    Layered,

    /// Steps run one at a time, stopping at the first failure.
    Linear,
}

/// Progress events emitted while an action executes.
///
/// With the layered discipline events arrive from worker threads, in no
/// particular order within a front.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to run.
    StepStarting { reference: &'a Reference },

    /// A step finished.
    StepFinished {
        outcome: &'a StepOutcome,
        error: Option<&'a StepError>,
    },
}

/// Runs actions against a step registry.
#[derive(Debug, Clone, Copy)]
pub struct Executor<'a> {
    actions: &'a ActionCollection,
    registry: &'a StepRegistry,
    discipline: Discipline,
}

impl<'a> Executor<'a> {
    /// Create an executor using the layered discipline.
    pub fn new(actions: &'a ActionCollection, registry: &'a StepRegistry) -> Self {
        Self {
            actions,
            registry,
            discipline: Discipline::default(),
        }
    }

    /// Set the scheduling discipline.
    pub fn with_discipline(mut self, discipline: Discipline) -> Self {
        self.discipline = discipline;
        self
    }

    /// The scheduling discipline in use.
    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Plan an action without running it.
    pub fn plan(&self, name: &str) -> Result<ExecutionPlan> {
        ExecutionPlan::build(self.actions, name)
    }

    /// Execute an action and everything it depends on.
    ///
    /// Definition errors (unknown action, undefined reference, cycles) are
    /// returned as `Err` before any step runs. Step failures are collected
    /// in the report.
    pub fn execute(&self, name: &str) -> Result<ExecutionReport> {
        self.execute_with_progress(name, |_| {})
    }

    /// Execute an action, reporting progress through a callback.
    pub fn execute_with_progress<F>(&self, name: &str, on_progress: F) -> Result<ExecutionReport>
    where
        F: Fn(RunProgress<'_>) + Sync,
    {
        let start = Instant::now();
        let plan = self.plan(name)?;
        info!(
            "Executing action '{}' ({} steps, {:?})",
            name,
            plan.len(),
            self.discipline
        );

        let outputs = OutputStore::new();
        let mut tally = Tally::new(&plan);

        match self.discipline {
            Discipline::Layered => self.run_layered(&plan, &outputs, &mut tally, &on_progress)?,
            Discipline::Linear => self.run_linear(&plan, &outputs, &mut tally, &on_progress),
        }

        Ok(ExecutionReport {
            action: name.to_string(),
            outcomes: tally.outcomes,
            failures: tally.failures,
            outputs: outputs.into_inner(),
            duration: start.elapsed(),
        })
    }

    fn run_layered<F>(
        &self,
        plan: &ExecutionPlan,
        outputs: &OutputStore,
        tally: &mut Tally,
        on_progress: &F,
    ) -> Result<()>
    where
        F: Fn(RunProgress<'_>) + Sync,
    {
        let fronts = plan.fronts()?;

        for (index, front) in fronts.iter().enumerate() {
            debug!("Front {}/{}: {} steps", index + 1, fronts.len(), front.len());
            for reference in front {
                tally.mark_running(reference);
            }

            let results: Vec<(Reference, Duration, std::result::Result<(), StepError>)> =
                thread::scope(|scope| {
                    let handles: Vec<_> = front
                        .iter()
                        .map(|reference| {
                            let handle = scope.spawn(move || {
                                self.run_planned(plan, reference, outputs, on_progress)
                            });
                            (reference, handle)
                        })
                        .collect();

                    handles
                        .into_iter()
                        .map(|(reference, handle)| {
                            let (duration, result) = handle.join().unwrap_or_else(|_| {
                                (
                                    Duration::ZERO,
                                    Err(StepError::Other(anyhow::anyhow!("step panicked"))),
                                )
                            });
                            (reference.clone(), duration, result)
                        })
                        .collect()
                });

            for (reference, duration, result) in results {
                tally.record(reference, duration, result);
            }

            if !tally.failures.is_empty() {
                warn!(
                    "Stopping after front {}/{}: {} step(s) failed",
                    index + 1,
                    fronts.len(),
                    tally.failure_count()
                );
                break;
            }
        }

        Ok(())
    }

    fn run_linear<F>(
        &self,
        plan: &ExecutionPlan,
        outputs: &OutputStore,
        tally: &mut Tally,
        on_progress: &F,
    ) where
        F: Fn(RunProgress<'_>) + Sync,
    {
        for planned in plan.steps() {
            tally.mark_running(&planned.reference);
            let (duration, result) = self.run_timed(planned, outputs, on_progress);
            let failed = result.is_err();
            tally.record(planned.reference.clone(), duration, result);

            if failed {
                warn!("Stopping at failed step {}", planned.reference);
                break;
            }
        }
    }

    fn run_planned<F>(
        &self,
        plan: &ExecutionPlan,
        reference: &Reference,
        outputs: &OutputStore,
        on_progress: &F,
    ) -> (Duration, std::result::Result<(), StepError>)
    where
        F: Fn(RunProgress<'_>) + Sync,
    {
        match plan.get(reference) {
            Some(planned) => self.run_timed(planned, outputs, on_progress),
            None => (
                Duration::ZERO,
                Err(StepError::Other(anyhow::anyhow!(
                    "step {} is not part of the plan",
                    reference
                ))),
            ),
        }
    }

    fn run_timed<F>(
        &self,
        planned: &PlannedStep,
        outputs: &OutputStore,
        on_progress: &F,
    ) -> (Duration, std::result::Result<(), StepError>)
    where
        F: Fn(RunProgress<'_>) + Sync,
    {
        on_progress(RunProgress::StepStarting {
            reference: &planned.reference,
        });

        let start = Instant::now();
        let result = self.run_step(planned, outputs);
        let duration = start.elapsed();

        let outcome = StepOutcome {
            reference: planned.reference.clone(),
            status: if result.is_ok() {
                StepStatus::Succeeded
            } else {
                StepStatus::Failed
            },
            duration,
        };
        on_progress(RunProgress::StepFinished {
            outcome: &outcome,
            error: result.as_ref().err(),
        });

        (duration, result)
    }

    fn run_step(
        &self,
        planned: &PlannedStep,
        outputs: &OutputStore,
    ) -> std::result::Result<(), StepError> {
        let reference = &planned.reference;
        let step = self.actions.step(reference).ok_or_else(|| {
            StepError::Other(anyhow::anyhow!("step {} is not defined", reference))
        })?;

        info!("Executing step {}", reference);

        let runner =
            self.registry
                .get(&step.step_type)
                .ok_or_else(|| StepError::NoRunnerForType {
                    step_type: step.step_type.clone(),
                })?;

        let input = match &planned.input {
            Some(source) => Some(outputs.get(source).ok_or_else(|| {
                StepError::InputNotFound {
                    reference: source.to_string(),
                }
            })?),
            None => None,
        };

        let params = effective_params(step);
        let output = runner.run(input.as_ref(), &params)?;

        if step.output {
            let value = output.ok_or(StepError::NilOutput)?;
            outputs.insert(reference.clone(), value);
        }

        debug!("Step {} done", reference);
        Ok(())
    }
}

/// Step params with the step-level process tolerance settings filled in.
///
/// Values already present in params take precedence.
fn effective_params(step: &Step) -> Params {
    let mut params = step.params.clone();

    if step.continue_on_error && !params.contains_key("continue_on_error") {
        params.insert("continue_on_error".to_string(), serde_json::Value::Bool(true));
    }
    if !step.ignore_exit_codes.is_empty() && !params.contains_key("ignore_exit_codes") {
        params.insert(
            "ignore_exit_codes".to_string(),
            serde_json::Value::from(step.ignore_exit_codes.clone()),
        );
    }

    params
}

struct Tally {
    outcomes: Vec<StepOutcome>,
    index: HashMap<Reference, usize>,
    failures: Failures,
}

impl Tally {
    fn new(plan: &ExecutionPlan) -> Self {
        let outcomes: Vec<StepOutcome> = plan
            .references()
            .map(|r| StepOutcome::planned(r.clone()))
            .collect();
        let index = outcomes
            .iter()
            .enumerate()
            .map(|(i, o)| (o.reference.clone(), i))
            .collect();

        Self {
            outcomes,
            index,
            failures: Failures::new(),
        }
    }

    fn mark_running(&mut self, reference: &Reference) {
        if let Some(&i) = self.index.get(reference) {
            self.outcomes[i].status = StepStatus::Running;
        }
    }

    fn record(
        &mut self,
        reference: Reference,
        duration: Duration,
        result: std::result::Result<(), StepError>,
    ) {
        let status = match result {
            Ok(()) => StepStatus::Succeeded,
            Err(e) => {
                warn!("Step '{}' errored: {}", reference, e);
                self.failures
                    .entry(reference.action.clone())
                    .or_default()
                    .insert(reference.step.clone(), e);
                StepStatus::Failed
            }
        };

        if let Some(&i) = self.index.get(&reference) {
            self.outcomes[i].status = status;
            self.outcomes[i].duration = duration;
        }
    }

    fn failure_count(&self) -> usize {
        self.failures.values().map(|steps| steps.len()).sum()
    }
}
