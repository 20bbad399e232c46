//! Action document loading.
//!
//! # Example
//!
//! ```
//! use j3n::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(
//!     temp.path().join("actions.yml"),
//!     "actions:\n  build:\n    steps:\n      hello:\n        type: print\n",
//! )
//! .unwrap();
//!
//! let actions = load_config(temp.path(), None).unwrap();
//! assert!(actions.has_action("build"));
//! ```

pub mod loader;

pub use loader::{
    find_project_root, load_actions, load_config, load_versioning, parse_actions,
    parse_versioning, read_document, resolve_config_path, ConfigFormat, DEFAULT_CONFIG_FILES,
};
