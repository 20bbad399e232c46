//! The version strategy trait.

use crate::error::Result;
use crate::version::Version;

/// One place a project's version is kept.
///
/// `get` may find several versions (an expression strategy reads every
/// matched file); `set` overwrites all of them.
pub trait VersionStrategy: Send + Sync {
    /// Display name used in listings and mismatch reports.
    fn name(&self) -> String;

    /// Read the versions held by this source.
    fn get(&self) -> Result<Vec<Version>>;

    /// Write `version` into this source.
    fn set(&self, version: &Version) -> Result<()>;
}
