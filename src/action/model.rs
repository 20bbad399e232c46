//! Action and step definitions.
//!
//! These types map one-to-one onto the `actions` document:
//!
//! ```json
//! {
//!   "actions": {
//!     "build": {
//!       "steps": {
//!         "compile": { "type": "exec", "output": true, "params": { "command": "cargo" } }
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::reference::Reference;
use super::value::Params;
use crate::error::{J3nError, Result};
use crate::runner::DependencyGraph;

fn is_false(b: &bool) -> bool {
    !b
}

/// A unit of executable work within an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Name of the step runner that executes this step.
    #[serde(rename = "type")]
    pub step_type: String,

    /// Steps that must run first, bare or `<action>.<step>`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Step whose output becomes this step's input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Whether this step produces a value other steps can reference.
    #[serde(default, skip_serializing_if = "is_false")]
    pub output: bool,

    /// Tolerate a failing process.
    #[serde(default, alias = "continueOnError", skip_serializing_if = "is_false")]
    pub continue_on_error: bool,

    /// Exit codes treated as success.
    #[serde(default, alias = "ignoreExitCodes", skip_serializing_if = "Vec::is_empty")]
    pub ignore_exit_codes: Vec<i32>,

    /// Runner-specific configuration.
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub params: Params,
}

impl Step {
    /// Create a step of the given runner type.
    pub fn new(step_type: impl Into<String>) -> Self {
        Self {
            step_type: step_type.into(),
            ..Default::default()
        }
    }

    /// Add a dependency.
    pub fn depends_on(mut self, reference: impl Into<String>) -> Self {
        self.dependencies.push(reference.into());
        self
    }

    /// Set the input reference.
    pub fn with_input(mut self, reference: impl Into<String>) -> Self {
        self.input = Some(reference.into());
        self
    }

    /// Mark the step as producing output.
    pub fn with_output(mut self) -> Self {
        self.output = true;
        self
    }

    /// Set a runner parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// The input reference, treating an empty string as absent.
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref().filter(|s| !s.is_empty())
    }

    /// Dependencies plus the input reference, without duplicates.
    pub fn prerequisites(&self) -> Vec<&str> {
        let mut prerequisites: Vec<&str> = Vec::new();
        for reference in self.dependencies.iter().map(String::as_str).chain(self.input()) {
            if !prerequisites.contains(&reference) {
                prerequisites.push(reference);
            }
        }
        prerequisites
    }
}

/// A named group of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Actions that must complete before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Steps by name.
    #[serde(default)]
    pub steps: BTreeMap<String, Step>,
}

impl Action {
    /// Create an empty action.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action-level dependency.
    pub fn depends_on(mut self, action: impl Into<String>) -> Self {
        self.dependencies.push(action.into());
        self
    }

    /// Add a step.
    pub fn with_step(mut self, name: impl Into<String>, step: Step) -> Self {
        self.steps.insert(name.into(), step);
        self
    }

    /// Check if a step exists.
    pub fn has_step(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Look up a step by name.
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.get(name)
    }
}

/// All actions of a configuration, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionCollection {
    #[serde(default)]
    pub actions: BTreeMap<String, Action>,
}

impl ActionCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action.
    pub fn with_action(mut self, name: impl Into<String>, action: Action) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    /// Check if an action exists.
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Look up an action, failing with `ActionNotFound`.
    pub fn action(&self, name: &str) -> Result<&Action> {
        self.actions
            .get(name)
            .ok_or_else(|| J3nError::ActionNotFound {
                name: name.to_string(),
            })
    }

    /// Look up the step a reference points at.
    pub fn step(&self, reference: &Reference) -> Option<&Step> {
        self.actions
            .get(&reference.action)
            .and_then(|action| action.step(&reference.step))
    }

    /// Action names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Graph of action names to their declared action dependencies.
    pub fn graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (name, action) in &self.actions {
            graph.add_node(name.clone());
            for dependency in &action.dependencies {
                graph.add_edge(name.clone(), dependency.clone());
            }
        }
        graph
    }
}
