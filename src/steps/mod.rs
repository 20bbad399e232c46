//! Step runners.
//!
//! - [`StepRegistry`] - Lookup table from step type to runner
//! - [`StepRunner`] - Trait every runner implements
//! - [`ExecRunner`] - Built-in `exec` step (external programs)
//! - [`PrintRunner`] - Built-in `print` step
//!
//! # Example
//!
//! ```
//! use j3n::action::Value;
//! use j3n::steps::StepRegistry;
//!
//! let mut registry = StepRegistry::with_builtins();
//! registry
//!     .register_fn("greet", |_input, _params| Ok(Some(Value::from("hello"))))
//!     .unwrap();
//!
//! assert!(registry.contains("greet"));
//! assert!(registry.register_fn("exec", |_, _| Ok(None)).is_err());
//! ```

pub mod exec;
pub mod params;
pub mod print;
pub mod registry;

pub use exec::ExecRunner;
pub use print::PrintRunner;
pub use registry::{StepRegistry, StepRunner};
