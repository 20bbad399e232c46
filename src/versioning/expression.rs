//! Versions embedded in arbitrary files.
//!
//! An expression strategy matches files by glob pattern under a set of
//! directories and finds the version with a regular expression. The
//! expression either contains `{{VERSION}}`, which stands for any SemVer
//! version, or defines a named group `version` itself. On `set`, every
//! match is replaced by the rendered `replacement` template.

use std::fs;
use std::path::{Component, Path, PathBuf};

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{J3nError, Result};
use crate::version::{Version, VERSION_PATTERN};

use super::strategy::VersionStrategy;

const PLACEHOLDER: &str = "{{VERSION}}";

fn current_directory() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

/// Settings of one expression strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionConfig {
    /// Directories searched, relative to the project root.
    #[serde(default = "current_directory")]
    pub directories: Vec<PathBuf>,

    /// Glob pattern joined to each directory.
    pub pattern: String,

    /// Regular expression locating the version.
    pub expression: String,

    /// Template written in place of each match.
    pub replacement: String,
}

/// Reads and rewrites versions in files matched by an [`ExpressionConfig`].
#[derive(Debug, Clone)]
pub struct ExpressionStrategy {
    root: PathBuf,
    config: ExpressionConfig,
}

impl ExpressionStrategy {
    pub fn new(root: &Path, config: ExpressionConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    /// Compile the expression, expanding `{{VERSION}}`.
    ///
    /// Only the first placeholder captures; later ones match any version.
    pub fn regex(&self) -> Result<Regex> {
        let expression = &self.config.expression;
        let source = match expression.split_once(PLACEHOLDER) {
            Some((before, after)) => format!(
                "{before}(?P<version>{VERSION_PATTERN}){}",
                after.replace(PLACEHOLDER, &format!("(?:{VERSION_PATTERN})"))
            ),
            None => expression.clone(),
        };

        let invalid = |message: String| J3nError::InvalidPattern {
            pattern: expression.clone(),
            message,
        };
        let regex = Regex::new(&source).map_err(|e| invalid(e.to_string()))?;
        if !regex.capture_names().flatten().any(|name| name == "version") {
            return Err(invalid(format!(
                "expected {PLACEHOLDER} or a named group `version`"
            )));
        }
        Ok(regex)
    }

    /// Files matched by the pattern, sorted and de-duplicated.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for directory in &self.config.directories {
            let base: PathBuf = directory
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
            let base = glob::Pattern::escape(&self.root.join(base).to_string_lossy());
            let pattern = format!("{}/{}", base.trim_end_matches('/'), self.config.pattern);
            let entries = glob::glob(&pattern).map_err(|e| J3nError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            files.extend(entries.filter_map(|entry| entry.ok()).filter(|p| p.is_file()));
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn location(&self) -> String {
        let directories: Vec<String> = self
            .config
            .directories
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        format!("{} in {}", self.config.pattern, directories.join(", "))
    }
}

impl VersionStrategy for ExpressionStrategy {
    fn name(&self) -> String {
        format!("expression ({})", self.location())
    }

    fn get(&self) -> Result<Vec<Version>> {
        let regex = self.regex()?;
        let mut versions = Vec::new();

        for file in self.files()? {
            let content = fs::read_to_string(&file)?;
            for caps in regex.captures_iter(&content) {
                if let Some(found) = caps.name("version") {
                    versions.push(Version::parse(found.as_str())?);
                }
            }
        }

        if versions.is_empty() {
            return Err(J3nError::VersionNotFound {
                location: self.location(),
            });
        }
        Ok(versions)
    }

    fn set(&self, version: &Version) -> Result<()> {
        let regex = self.regex()?;
        let replacement = version.render(&self.config.replacement);
        let mut updated = 0;

        for file in self.files()? {
            let content = fs::read_to_string(&file)?;
            if !regex.is_match(&content) {
                tracing::warn!("No version found in {}", file.display());
                continue;
            }
            let rewritten = regex.replace_all(&content, NoExpand(&replacement));
            fs::write(&file, rewritten.as_bytes())?;
            tracing::debug!("Rewrote version in {}", file.display());
            updated += 1;
        }

        if updated == 0 {
            return Err(J3nError::VersionNotFound {
                location: self.location(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn config(pattern: &str, expression: &str, replacement: &str) -> ExpressionConfig {
        ExpressionConfig {
            directories: vec![PathBuf::from("src")],
            pattern: pattern.to_string(),
            expression: expression.to_string(),
            replacement: replacement.to_string(),
        }
    }

    fn project(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        for (name, content) in files {
            fs::write(temp.path().join("src").join(name), content).unwrap();
        }
        temp
    }

    #[test]
    fn placeholder_expands_to_version_group() {
        let temp = TempDir::new().unwrap();
        let strategy = ExpressionStrategy::new(
            temp.path(),
            config("*.rs", r#"VERSION = "{{VERSION}}""#, ""),
        );
        let regex = strategy.regex().unwrap();
        let caps = regex.captures(r#"pub const VERSION = "1.2.3-rc.1+b5";"#).unwrap();
        assert_eq!(&caps["version"], "1.2.3-rc.1+b5");
    }

    #[test]
    fn explicit_version_group_is_accepted() {
        let temp = TempDir::new().unwrap();
        let strategy = ExpressionStrategy::new(
            temp.path(),
            config("*.txt", r"v(?P<version>\d+\.\d+\.\d+)", ""),
        );
        assert!(strategy.regex().is_ok());
    }

    #[test]
    fn expression_without_version_group_is_rejected() {
        let temp = TempDir::new().unwrap();
        let strategy =
            ExpressionStrategy::new(temp.path(), config("*.txt", r"v(\d+\.\d+\.\d+)", ""));
        assert!(matches!(
            strategy.regex(),
            Err(J3nError::InvalidPattern { .. })
        ));

        let broken = ExpressionStrategy::new(temp.path(), config("*.txt", "v(", ""));
        assert!(matches!(broken.regex(), Err(J3nError::InvalidPattern { .. })));
    }

    #[test]
    fn get_collects_versions_from_matched_files() {
        let temp = project(&[
            ("a.txt", "version 1.0.0\n"),
            ("b.txt", "version 1.0.0\nother 9.9.9\n"),
            ("c.md", "version 7.0.0\n"),
        ]);
        let strategy = ExpressionStrategy::new(
            temp.path(),
            config("*.txt", "version {{VERSION}}", "version {{VERSION}}"),
        );

        assert_eq!(strategy.files().unwrap().len(), 2);
        assert_eq!(strategy.get().unwrap(), vec![v("1.0.0"), v("1.0.0")]);
    }

    #[test]
    fn get_without_match_fails() {
        let temp = project(&[("a.txt", "nothing here\n")]);
        let strategy = ExpressionStrategy::new(
            temp.path(),
            config("*.txt", "version {{VERSION}}", "version {{VERSION}}"),
        );
        assert!(matches!(
            strategy.get(),
            Err(J3nError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn set_rewrites_every_match() {
        let temp = project(&[
            (
                "lib.rs",
                "pub const VERSION: &str = \"1.0.0\";\n// VERSION: &str = \"1.0.0\"\n",
            ),
            ("notes.rs", "// no version\n"),
        ]);
        let strategy = ExpressionStrategy::new(
            temp.path(),
            config(
                "*.rs",
                r#"VERSION: &str = "{{VERSION}}""#,
                r#"VERSION: &str = "{{VERSION}}""#,
            ),
        );

        strategy.set(&v("1.1.0-DEV")).unwrap();

        let lib = fs::read_to_string(temp.path().join("src").join("lib.rs")).unwrap();
        assert_eq!(
            lib,
            "pub const VERSION: &str = \"1.1.0-DEV\";\n// VERSION: &str = \"1.1.0-DEV\"\n"
        );
        let notes = fs::read_to_string(temp.path().join("src").join("notes.rs")).unwrap();
        assert_eq!(notes, "// no version\n");
    }

    #[test]
    fn replacement_renders_version_parts_literally() {
        let temp = project(&[("build.gradle", "versionName '2.3.4'\nversionCode 20304\n")]);
        let strategy = ExpressionStrategy::new(
            temp.path(),
            config(
                "*.gradle",
                "versionName '{{VERSION}}'",
                "versionName '{{VERSION_MAJOR}}.{{VERSION_MINOR}}.$0'",
            ),
        );

        strategy.set(&v("2.4.0")).unwrap();

        let content = fs::read_to_string(temp.path().join("src").join("build.gradle")).unwrap();
        assert_eq!(content, "versionName '2.4.$0'\nversionCode 20304\n");
    }

    #[test]
    fn directories_default_to_project_root() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("VERSION"), "3.0.0\n").unwrap();

        let config: ExpressionConfig = serde_json::from_str(
            r#"{"pattern": "VERSION", "expression": "^{{VERSION}}", "replacement": "{{VERSION}}"}"#,
        )
        .unwrap();
        let strategy = ExpressionStrategy::new(temp.path(), config);

        assert_eq!(strategy.get().unwrap(), vec![v("3.0.0")]);
        strategy.set(&v("3.0.1")).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join("VERSION")).unwrap(),
            "3.0.1\n"
        );
    }

    #[test]
    fn set_without_any_match_fails() {
        let temp = project(&[("a.txt", "nothing\n")]);
        let strategy = ExpressionStrategy::new(
            temp.path(),
            config("*.txt", "version {{VERSION}}", "version {{VERSION}}"),
        );
        assert!(matches!(
            strategy.set(&v("1.0.0")),
            Err(J3nError::VersionNotFound { .. })
        ));
    }
}
