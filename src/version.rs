//! Semantic version value type.
//!
//! [`Version`] is an immutable SemVer 2.0.0 value used by release
//! bookkeeping: strict parsing, canonical formatting, precedence
//! comparison, next-release bumps and placeholder rendering for branch
//! names and commit messages.
//!
//! # Example
//!
//! ```
//! use j3n::version::{ReleaseKind, Version};
//!
//! let current: Version = "1.4.2".parse().unwrap();
//! let next = current.next(ReleaseKind::Minor);
//! assert_eq!(next.to_string(), "1.5.0-DEV");
//! assert_eq!(next.release_branch(), "1.5");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Local, TimeZone};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{J3nError, Result};

static SEMVER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<major>0|[1-9][0-9]*)\.(?P<minor>0|[1-9][0-9]*)\.(?P<patch>0|[1-9][0-9]*)",
        r"(?:-(?P<prerelease>(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)",
        r"(?:\.(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
        r"(?:\+(?P<build>[0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    ))
    .unwrap()
});

/// Unanchored SemVer pattern without capture groups, for embedding in
/// larger expressions.
pub(crate) const VERSION_PATTERN: &str = concat!(
    r"(?:0|[1-9][0-9]*)\.(?:0|[1-9][0-9]*)\.(?:0|[1-9][0-9]*)",
    r"(?:-(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)",
    r"(?:\.(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*)?",
    r"(?:\+[0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*)?",
);

static BRANCH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<major>[0-9]+)\.(?P<minor>[0-9]+)$").unwrap());

/// Which component a next release bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReleaseKind {
    Major,
    Minor,
}

/// A semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Vec<String>,
    pub build: Vec<String>,
}

impl Version {
    /// Create a release version without prerelease or build metadata.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: Vec::new(),
            build: Vec::new(),
        }
    }

    /// Parse a complete SemVer string.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || J3nError::InvalidVersion {
            input: input.to_string(),
        };

        let caps = SEMVER_REGEX.captures(input).ok_or_else(invalid)?;
        let number = |name: &str| -> Result<u64> {
            caps.name(name)
                .ok_or_else(invalid)?
                .as_str()
                .parse::<u64>()
                .map_err(|_| invalid())
        };
        let identifiers = |name: &str| -> Vec<String> {
            caps.name(name)
                .map(|m| m.as_str().split('.').map(str::to_string).collect())
                .unwrap_or_default()
        };

        Ok(Self {
            major: number("major")?,
            minor: number("minor")?,
            patch: number("patch")?,
            prerelease: identifiers("prerelease"),
            build: identifiers("build"),
        })
    }

    /// Whether this version carries prerelease identifiers.
    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }

    /// Compare by SemVer precedence. Build metadata does not participate.
    pub fn compare(&self, other: &Version) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| compare_prerelease(&self.prerelease, &other.prerelease))
    }

    /// The development version that opens the next release line.
    pub fn next(&self, kind: ReleaseKind) -> Self {
        let (major, minor) = match kind {
            ReleaseKind::Major => (self.major + 1, 0),
            ReleaseKind::Minor => (self.major, self.minor + 1),
        };

        Self {
            major,
            minor,
            patch: 0,
            prerelease: vec!["DEV".to_string()],
            build: Vec::new(),
        }
    }

    /// Name of the release branch for this version (`<major>.<minor>`).
    pub fn release_branch(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// Recover the version a release branch was cut for.
    pub fn from_release_branch(branch: &str) -> Result<Self> {
        let invalid = || J3nError::InvalidVersion {
            input: branch.to_string(),
        };
        let caps = BRANCH_REGEX.captures(branch).ok_or_else(invalid)?;
        let major = caps["major"].parse().map_err(|_| invalid())?;
        let minor = caps["minor"].parse().map_err(|_| invalid())?;
        Ok(Self::new(major, minor, 0))
    }

    /// Substitute version and time placeholders in `template`.
    pub fn render(&self, template: &str) -> String {
        self.render_at(template, &Local::now())
    }

    /// Like [`Version::render`], with an explicit clock.
    pub fn render_at<Tz>(&self, template: &str, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let replacements = [
            ("{{VERSION_MAJOR}}", self.major.to_string()),
            ("{{VERSION_MINOR}}", self.minor.to_string()),
            ("{{VERSION_PATCH}}", self.patch.to_string()),
            ("{{VERSION_PRERELEASE}}", self.prerelease.join(".")),
            ("{{VERSION_BUILD}}", self.build.join(".")),
            ("{{VERSION}}", self.to_string()),
            ("{{TIME_YEAR}}", now.format("%Y").to_string()),
            ("{{TIME_MONTH}}", now.format("%m").to_string()),
            ("{{TIME_DAY}}", now.format("%d").to_string()),
            ("{{TIME_HOUR}}", now.format("%H").to_string()),
            ("{{TIME_MINUTE}}", now.format("%M").to_string()),
            ("{{TIME_SECOND}}", now.format("%S").to_string()),
            ("{{TIME_RFC3339}}", now.to_rfc3339()),
        ];

        replacements
            .iter()
            .fold(template.to_string(), |acc, (placeholder, value)| {
                acc.replace(placeholder, value)
            })
    }
}

fn compare_prerelease(left: &[String], right: &[String]) -> Ordering {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => return Ordering::Equal,
        // A release outranks any of its prereleases.
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    for (l, r) in left.iter().zip(right.iter()) {
        // Numeric identifiers have no leading zeros, so the longer one is
        // larger whatever its magnitude.
        let ordering = match (is_numeric(l), is_numeric(r)) {
            (true, true) => l.len().cmp(&r.len()).then_with(|| l.cmp(r)),
            (false, false) => l.as_str().cmp(r.as_str()),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    left.len().cmp(&right.len())
}

fn is_numeric(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.prerelease.is_empty() {
            write!(f, "-{}", self.prerelease.join("."))?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build.join("."))?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = J3nError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn parses_plain_release() {
        let version = v("10.20.30");
        assert_eq!(version, Version::new(10, 20, 30));
        assert!(!version.is_prerelease());
    }

    #[test]
    fn parses_prerelease_and_build() {
        let version = v("1.0.0-alpha-a.b-c-somethinglong+build.1-aef.1-its-okay");
        assert_eq!(version.prerelease, vec!["alpha-a", "b-c-somethinglong"]);
        assert_eq!(version.build, vec!["build", "1-aef", "1-its-okay"]);
    }

    #[test]
    fn parses_build_only() {
        let version = v("1.0.0+0.build.1-rc.10000aaa-kk-0.1");
        assert!(version.prerelease.is_empty());
        assert_eq!(version.build, vec!["0", "build", "1-rc", "10000aaa-kk-0", "1"]);
    }

    #[test]
    fn parses_hyphen_heavy_prerelease() {
        let version = v("1.2.3----RC-SNAPSHOT.12.9.1--.12+788");
        assert_eq!(
            version.prerelease,
            vec!["---RC-SNAPSHOT", "12", "9", "1--", "12"]
        );
        assert_eq!(version.build, vec!["788"]);
    }

    #[test]
    fn parses_largest_u64_like_numbers() {
        let version = v("9999999999999999999.9999999999999999999.9999999999999999999");
        assert_eq!(version.major, 9_999_999_999_999_999_999);
    }

    #[test]
    fn rejects_invalid_versions() {
        for input in [
            "",
            "1",
            "1.2",
            "1.2.3-0123",
            "1.2.3-0123.0123",
            "1.1.2+.123",
            "+invalid",
            "-invalid",
            "alpha",
            "1.0.0-alpha_beta",
            "1.0.0-alpha..1",
            "01.1.1",
            "1.01.1",
            "1.1.01",
            "1.2.3.DEV",
            "1.2-SNAPSHOT",
            "-1.0.3-gamma+b7718",
            "9.8.7+meta+meta",
            "9.8.7-whatever+meta+meta",
            "99999999999999999999999.1.1",
        ] {
            assert!(Version::parse(input).is_err(), "expected '{}' to fail", input);
        }
    }

    #[test]
    fn display_round_trips() {
        for input in ["0.0.4", "1.1.2-prerelease+meta", "2.0.0+build.1848", "1.0.0-0A.is.legal"] {
            assert_eq!(v(input).to_string(), input);
        }
    }

    #[test]
    fn compare_numeric_fields() {
        assert_eq!(v("1.0.0").compare(&v("2.0.0")), Ordering::Less);
        assert_eq!(v("2.1.0").compare(&v("2.0.9")), Ordering::Greater);
        assert_eq!(v("2.1.1").compare(&v("2.1.1")), Ordering::Equal);
    }

    #[test]
    fn compare_follows_semver_precedence_chain() {
        let chain = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];
        for pair in chain.windows(2) {
            assert_eq!(
                v(pair[0]).compare(&v(pair[1])),
                Ordering::Less,
                "{} < {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn compare_numeric_prerelease_beyond_u64() {
        let huge = "1.0.0-rc.99999999999999999999999";
        assert_eq!(v("1.0.0-rc.2").compare(&v(huge)), Ordering::Less);
        assert_eq!(v(huge).compare(&v("1.0.0-rc.a")), Ordering::Less);
        assert_eq!(
            v("1.0.0-18446744073709551616").compare(&v("1.0.0-18446744073709551617")),
            Ordering::Less
        );
        assert_eq!(v(huge).compare(&v(huge)), Ordering::Equal);
    }

    #[test]
    fn compare_ignores_build_metadata() {
        assert_eq!(v("1.0.0+a").compare(&v("1.0.0+b")), Ordering::Equal);
    }

    #[test]
    fn next_minor_resets_patch() {
        assert_eq!(v("1.4.2").next(ReleaseKind::Minor).to_string(), "1.5.0-DEV");
    }

    #[test]
    fn next_major_resets_minor_and_patch() {
        assert_eq!(
            v("1.4.2-rc.1+b5").next(ReleaseKind::Major).to_string(),
            "2.0.0-DEV"
        );
    }

    #[test]
    fn release_branch_round_trip() {
        let version = v("3.7.1");
        assert_eq!(version.release_branch(), "3.7");
        assert_eq!(
            Version::from_release_branch("3.7").unwrap(),
            Version::new(3, 7, 0)
        );
        assert!(Version::from_release_branch("release/3.7").is_err());
    }

    #[test]
    fn render_substitutes_version_placeholders() {
        let version = v("1.2.3-rc.1+b7");
        let rendered = version.render("release/{{VERSION_MAJOR}}.{{VERSION_MINOR}} ({{VERSION}}) {{VERSION_PRERELEASE}} {{VERSION_BUILD}}");
        assert_eq!(rendered, "release/1.2 (1.2.3-rc.1+b7) rc.1 b7");
    }

    #[test]
    fn render_substitutes_time_placeholders() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let rendered = v("1.0.0").render_at(
            "{{TIME_YEAR}}-{{TIME_MONTH}}-{{TIME_DAY}} {{TIME_HOUR}}:{{TIME_MINUTE}}:{{TIME_SECOND}}",
            &now,
        );
        assert_eq!(rendered, "2024-03-05 07:08:09");
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&v("1.2.3-DEV")).unwrap();
        assert_eq!(json, "\"1.2.3-DEV\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("1.2.3-DEV"));
        assert!(serde_json::from_str::<Version>("\"1.2\"").is_err());
    }
}
