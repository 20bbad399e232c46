//! Error types for j3n operations.
//!
//! This module defines [`J3nError`], the error type for everything that
//! aborts a command before or instead of running steps, and [`StepError`],
//! the error type recorded for a single step that failed while running.
//!
//! # Error Handling Strategy
//!
//! - Definition errors (unknown actions, bad references, cycles) are
//!   `J3nError` and stop an execution before any step runs
//! - Step failures are `StepError` and are collected per action and step
//! - Use `anyhow::Error` (via `J3nError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for j3n operations.
#[derive(Debug, Error)]
pub enum J3nError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// The requested action is not part of the collection.
    #[error("Action '{name}' not found")]
    ActionNotFound { name: String },

    /// An action lists a dependency on an action that does not exist.
    #[error(
        "Action '{action}' depends on '{dependency}', but '{dependency}' is not defined \
         (actions can only depend on other actions)"
    )]
    UndefinedActionDependency { action: String, dependency: String },

    /// A step references a step (or action) that does not exist.
    #[error("Step '{step}' in action '{action}' depends on '{reference}', but '{reference}' is not defined")]
    UndefinedStep {
        action: String,
        step: String,
        reference: String,
    },

    /// A reference string is not of the form `<action>.<step>`.
    #[error("Invalid reference '{reference}': expected '<action>.<step>'")]
    InvalidReference { reference: String },

    /// Dependency cycle detected.
    #[error("Cyclic dependency detected: {cycle}")]
    CyclicDependency { cycle: String },

    /// A step runner with this type name is already registered.
    #[error("Step runner '{name}' is already registered")]
    AlreadyRegistered { name: String },

    /// A version string is not valid semantic versioning.
    #[error("Invalid version: {input}")]
    InvalidVersion { input: String },

    /// A version source holds no recognizable version.
    #[error("No version found in {location}")]
    VersionNotFound { location: String },

    /// Version sources disagree about the current version.
    #[error("Version sources disagree: {versions}")]
    VersionMismatch { versions: String },

    /// The project has no version source at all.
    #[error("No version source found (set version.current in the action document, add package.json, or configure version.strategies)")]
    NoVersionSource,

    /// A configured file pattern or expression is invalid.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for j3n operations.
pub type Result<T> = std::result::Result<T, J3nError>;

/// Failure of a single step while an action is executing.
#[derive(Debug, Error)]
pub enum StepError {
    /// No runner is registered for the step's type.
    #[error("No runner registered for step type '{step_type}'")]
    NoRunnerForType { step_type: String },

    /// The step's input reference has no stored output.
    #[error("Input '{reference}' not found (the producing step did not run, failed, or does not declare output)")]
    InputNotFound { reference: String },

    /// The step declares output but its runner returned none.
    #[error("Step declares output but its runner returned no value")]
    NilOutput,

    /// A runner parameter is missing or has the wrong type.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParam { name: String, message: String },

    /// The input value has a type the runner cannot consume.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The runner cannot handle a value of this kind.
    #[error("Unsupported value type '{kind}'")]
    UnsupportedType { kind: String },

    /// External process could not be started.
    #[error("Failed to start command '{command}': {message}")]
    Spawn { command: String, message: String },

    /// External process exited with a code that is not tolerated.
    #[error("Command \"{command}\" failed\n    exit code: {code:?}\n    stderr: {stderr}\n    stdout: {stdout}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Runner-specific failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = J3nError::ConfigNotFound {
            path: PathBuf::from("/foo/actions.json"),
        };
        assert!(err.to_string().contains("/foo/actions.json"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = J3nError::ConfigParseError {
            path: PathBuf::from("/actions.json"),
            message: "expected value".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/actions.json"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn undefined_step_names_everything() {
        let err = J3nError::UndefinedStep {
            action: "build".into(),
            step: "test".into(),
            reference: "other.step".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("build"));
        assert!(msg.contains("test"));
        assert!(msg.contains("other.step"));
    }

    #[test]
    fn undefined_action_dependency_names_both() {
        let err = J3nError::UndefinedActionDependency {
            action: "deploy".into(),
            dependency: "build".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("deploy"));
        assert!(msg.contains("build"));
    }

    #[test]
    fn cyclic_dependency_displays_cycle() {
        let err = J3nError::CyclicDependency {
            cycle: "a -> b -> a".into(),
        };
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn version_mismatch_lists_versions() {
        let err = J3nError::VersionMismatch {
            versions: "package.json: 1.0.0, actions.json: 1.1.0".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("package.json: 1.0.0"));
        assert!(msg.contains("actions.json: 1.1.0"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: J3nError = io_err.into();
        assert!(matches!(err, J3nError::Io(_)));
    }

    #[test]
    fn command_failed_displays_code_and_streams() {
        let err = StepError::CommandFailed {
            command: "make".into(),
            code: Some(2),
            stdout: "out".into(),
            stderr: "boom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("make"));
        assert!(msg.contains("exit code: Some(2)"));
        assert!(msg.contains("boom"));
        assert!(msg.contains("out"));
    }

    #[test]
    fn input_not_found_names_reference() {
        let err = StepError::InputNotFound {
            reference: "build.compile".into(),
        };
        assert!(err.to_string().contains("build.compile"));
    }
}
