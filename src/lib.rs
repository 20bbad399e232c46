//! j3n - Dependent build actions from a declarative document.
//!
//! An action document declares named actions, each a set of steps. Steps
//! depend on other steps, feed their output into later steps, and run
//! through pluggable step runners (`exec` and `print` are built in).
//!
//! # Modules
//!
//! - [`action`] - Actions, steps, references and values
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Action document loading
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Dependency graph, planning and execution
//! - [`shell`] - External process execution
//! - [`steps`] - Step runner registry and built-in runners
//! - [`ui`] - Terminal output
//! - [`version`] - Semantic version value type
//! - [`versioning`] - Reading and writing a project's version
//!
//! # Example
//!
//! ```
//! use j3n::action::{Action, ActionCollection, Reference, Step, Value};
//! use j3n::runner::Executor;
//! use j3n::steps::StepRegistry;
//!
//! let actions = ActionCollection::new().with_action(
//!     "build",
//!     Action::new()
//!         .with_step("greet", Step::new("greet").with_output())
//!         .with_step("shout", Step::new("upper").with_input("greet").with_output()),
//! );
//!
//! let mut registry = StepRegistry::new();
//! registry
//!     .register_fn("greet", |_, _| Ok(Some(Value::from("hello"))))
//!     .unwrap();
//! registry
//!     .register_fn("upper", |input, _| {
//!         let text = input.and_then(Value::as_str).unwrap_or_default();
//!         Ok(Some(Value::from(text.to_uppercase())))
//!     })
//!     .unwrap();
//!
//! let report = Executor::new(&actions, &registry).execute("build").unwrap();
//! assert!(report.is_success());
//! assert_eq!(
//!     report.output(&Reference::new("build", "shout")),
//!     Some(&Value::from("HELLO"))
//! );
//! ```

pub mod action;
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod ui;
pub mod version;
pub mod versioning;

pub use error::{J3nError, Result, StepError};
