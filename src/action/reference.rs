//! Qualified step references.
//!
//! A reference names a step as `<action>.<step>`. Bare step names are
//! resolved against the action that mentions them.

use std::fmt;
use std::str::FromStr;

use crate::error::{J3nError, Result};

/// Separator between the action and step parts of a reference.
pub const SEPARATOR: char = '.';

/// A fully qualified (action, step) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub action: String,
    pub step: String,
}

impl Reference {
    /// Create a reference from its parts.
    pub fn new(action: impl Into<String>, step: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            step: step.into(),
        }
    }

    /// Parse a fully qualified `<action>.<step>` reference.
    ///
    /// Exactly two non-empty parts are required.
    pub fn parse(text: &str) -> Result<Self> {
        let mut parts = text.split(SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(action), Some(step), None) if !action.is_empty() && !step.is_empty() => {
                Ok(Self::new(action, step))
            }
            _ => Err(J3nError::InvalidReference {
                reference: text.to_string(),
            }),
        }
    }

    /// Resolve `text` as seen from `current_action`.
    ///
    /// Qualified references are parsed as-is; a bare name refers to a step
    /// of `current_action`.
    pub fn resolve(text: &str, current_action: &str) -> Result<Self> {
        if text.contains(SEPARATOR) {
            Self::parse(text)
        } else if text.is_empty() {
            Err(J3nError::InvalidReference {
                reference: text.to_string(),
            })
        } else {
            Ok(Self::new(current_action, text))
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.action, SEPARATOR, self.step)
    }
}

impl FromStr for Reference {
    type Err = J3nError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_qualified_reference() {
        let reference = Reference::parse("build.compile").unwrap();
        assert_eq!(reference.action, "build");
        assert_eq!(reference.step, "compile");
    }

    #[test]
    fn parse_rejects_wrong_part_counts() {
        for text in ["build", "a.b.c", ".compile", "build.", "."] {
            assert!(
                matches!(
                    Reference::parse(text),
                    Err(J3nError::InvalidReference { .. })
                ),
                "expected '{}' to be rejected",
                text
            );
        }
    }

    #[test]
    fn resolve_bare_name_uses_current_action() {
        let reference = Reference::resolve("compile", "build").unwrap();
        assert_eq!(reference, Reference::new("build", "compile"));
    }

    #[test]
    fn resolve_qualified_name_ignores_current_action() {
        let reference = Reference::resolve("build.compile", "deploy").unwrap();
        assert_eq!(reference, Reference::new("build", "compile"));
    }

    #[test]
    fn resolve_rejects_empty_name() {
        assert!(Reference::resolve("", "build").is_err());
    }

    #[test]
    fn display_round_trips_through_resolve() {
        let references = [
            Reference::new("build", "compile"),
            Reference::new("release-prep", "bump_version"),
            Reference::new("a", "b"),
        ];
        for reference in references {
            let resolved = Reference::resolve(&reference.to_string(), "anything").unwrap();
            assert_eq!(resolved, reference);
            assert_eq!(resolved.to_string(), reference.to_string());
        }
    }
}
