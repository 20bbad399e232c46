//! Execution results.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Duration;

use crate::action::{Reference, Value};
use crate::error::StepError;

/// Status of a planned step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step has not run (yet).
    Planned,

    /// Step is currently executing.
    Running,

    /// Step completed successfully.
    Succeeded,

    /// Step failed.
    Failed,
}

impl StepStatus {
    /// Check if this is a terminal state (no more changes expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Succeeded | StepStatus::Failed)
    }

    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Planned => '○',
            StepStatus::Running => '◉',
            StepStatus::Succeeded => '✓',
            StepStatus::Failed => '✗',
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Planned => "planned",
            StepStatus::Running => "running",
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// What happened to one planned step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub reference: Reference,
    pub status: StepStatus,
    /// Wall time spent in the runner, zero if the step never ran.
    pub duration: Duration,
}

impl StepOutcome {
    /// Outcome of a step that has not run.
    pub fn planned(reference: Reference) -> Self {
        Self {
            reference,
            status: StepStatus::Planned,
            duration: Duration::ZERO,
        }
    }

    /// Human-readable duration.
    pub fn format_duration(&self) -> String {
        format_duration(self.duration)
    }
}

/// Step failures keyed by action name, then step name.
pub type Failures = BTreeMap<String, BTreeMap<String, StepError>>;

/// Values produced by steps that declare output, keyed by qualified
/// reference.
///
/// Shared between the steps of one execution. Steps running in the same
/// front write distinct keys.
#[derive(Debug, Default)]
pub struct OutputStore {
    values: RwLock<HashMap<Reference, Value>>,
}

impl OutputStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the output of a step, replacing any previous value.
    pub fn insert(&self, reference: Reference, value: Value) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(reference, value);
    }

    /// Output of a step, if it produced one.
    pub fn get(&self, reference: &Reference) -> Option<Value> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(reference).cloned()
    }

    /// Check if a step has produced output.
    pub fn contains(&self, reference: &Reference) -> bool {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.contains_key(reference)
    }

    /// Number of stored outputs.
    pub fn len(&self) -> usize {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.len()
    }

    /// Check if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the store, returning the outputs.
    pub fn into_inner(self) -> HashMap<Reference, Value> {
        self.values.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

/// Result of executing an action.
#[derive(Debug)]
pub struct ExecutionReport {
    /// The requested action.
    pub action: String,

    /// One entry per planned step, in plan order.
    pub outcomes: Vec<StepOutcome>,

    /// Steps that failed.
    pub failures: Failures,

    /// Outputs produced during the run.
    pub outputs: HashMap<Reference, Value>,

    /// Total duration.
    pub duration: Duration,
}

impl ExecutionReport {
    /// Whether every step that ran succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure recorded for a step.
    pub fn error(&self, action: &str, step: &str) -> Option<&StepError> {
        self.failures.get(action).and_then(|steps| steps.get(step))
    }

    /// Number of recorded failures.
    pub fn failure_count(&self) -> usize {
        self.failures.values().map(BTreeMap::len).sum()
    }

    /// Outcome of a step.
    pub fn outcome(&self, reference: &Reference) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| &o.reference == reference)
    }

    /// Output of a step, if it produced one.
    pub fn output(&self, reference: &Reference) -> Option<&Value> {
        self.outputs.get(reference)
    }

    /// Number of steps that ran successfully.
    pub fn succeeded_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == StepStatus::Succeeded)
            .count()
    }

    /// Human-readable total duration.
    pub fn format_duration(&self) -> String {
        format_duration(self.duration)
    }
}

/// Format a duration for display.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{}s", secs, millis / 100)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}
