//! Step runner registry.
//!
//! Maps step type names to the runners that execute them. A registry is
//! owned by whoever builds an [`Executor`](crate::runner::Executor), so
//! tests and embedders can each use their own set of runners.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::action::{Params, Value};
use crate::error::{J3nError, Result, StepError};

use super::exec::ExecRunner;
use super::print::PrintRunner;

/// Executes one step type.
///
/// Receives the step's input (the output of its `input` reference, if
/// any) and its params. Returns the produced value, if any.
pub trait StepRunner: Send + Sync {
    fn run(
        &self,
        input: Option<&Value>,
        params: &Params,
    ) -> std::result::Result<Option<Value>, StepError>;
}

struct FnRunner<F>(F);

impl<F> StepRunner for FnRunner<F>
where
    F: Fn(Option<&Value>, &Params) -> std::result::Result<Option<Value>, StepError> + Send + Sync,
{
    fn run(
        &self,
        input: Option<&Value>,
        params: &Params,
    ) -> std::result::Result<Option<Value>, StepError> {
        (self.0)(input, params)
    }
}

/// Lookup table from step type to runner.
#[derive(Clone, Default)]
pub struct StepRegistry {
    runners: BTreeMap<String, Arc<dyn StepRunner>>,
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("runners", &self.runners.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StepRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in `exec` and `print` runners.
    pub fn with_builtins() -> Self {
        let mut runners: BTreeMap<String, Arc<dyn StepRunner>> = BTreeMap::new();
        runners.insert("exec".to_string(), Arc::new(ExecRunner));
        runners.insert("print".to_string(), Arc::new(PrintRunner));
        Self { runners }
    }

    /// Register a runner. Fails if the name is already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        runner: impl StepRunner + 'static,
    ) -> Result<()> {
        let name = name.into();
        if self.runners.contains_key(&name) {
            return Err(J3nError::AlreadyRegistered { name });
        }
        tracing::debug!("registered step runner {}", name);
        self.runners.insert(name, Arc::new(runner));
        Ok(())
    }

    /// Register a closure as a runner.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, runner: F) -> Result<()>
    where
        F: Fn(Option<&Value>, &Params) -> std::result::Result<Option<Value>, StepError>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, FnRunner(runner))
    }

    /// Look up the runner for a step type.
    pub fn get(&self, name: &str) -> Option<&dyn StepRunner> {
        self.runners.get(name).map(|runner| runner.as_ref())
    }

    /// Check if a step type has a runner.
    pub fn contains(&self, name: &str) -> bool {
        self.runners.contains_key(name)
    }

    /// Registered step types, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.runners.keys().map(String::as_str)
    }
}
