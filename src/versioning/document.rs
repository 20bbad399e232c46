//! The `version.current` field of the action document.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{load_versioning, read_document, ConfigFormat};
use crate::error::{J3nError, Result};
use crate::version::Version;

use super::strategy::VersionStrategy;

/// Keeps the version in the action document itself.
#[derive(Debug, Clone)]
pub struct DocumentStrategy {
    path: PathBuf,
}

impl DocumentStrategy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_error(&self, message: impl ToString) -> J3nError {
        J3nError::ConfigParseError {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }

    fn rewrite_json(&self, content: &str, version: &Version) -> Result<String> {
        let mut document: serde_json::Value =
            serde_json::from_str(content).map_err(|e| self.parse_error(e))?;
        let root = document
            .as_object_mut()
            .ok_or_else(|| self.parse_error("document is not an object"))?;

        let section = root
            .entry("version")
            .or_insert_with(|| serde_json::Value::Object(Default::default()));
        let section = section
            .as_object_mut()
            .ok_or_else(|| self.parse_error("`version` is not an object"))?;
        section.insert(
            "current".to_string(),
            serde_json::Value::String(version.to_string()),
        );

        let mut output = serde_json::to_string_pretty(&document).map_err(|e| self.parse_error(e))?;
        output.push('\n');
        Ok(output)
    }

    fn rewrite_yaml(&self, content: &str, version: &Version) -> Result<String> {
        use serde_yaml::{Mapping, Value};

        let mut document: Value = serde_yaml::from_str(content).map_err(|e| self.parse_error(e))?;
        let root = document
            .as_mapping_mut()
            .ok_or_else(|| self.parse_error("document is not a mapping"))?;

        let key = Value::from("version");
        if !root.contains_key(&key) {
            root.insert(key.clone(), Value::Mapping(Mapping::new()));
        }
        let section = root
            .get_mut(&key)
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| self.parse_error("`version` is not a mapping"))?;
        section.insert(Value::from("current"), Value::from(version.to_string()));

        serde_yaml::to_string(&document).map_err(|e| self.parse_error(e))
    }
}

impl VersionStrategy for DocumentStrategy {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn get(&self) -> Result<Vec<Version>> {
        let config = load_versioning(&self.path)?;
        let current = config.current.ok_or_else(|| J3nError::VersionNotFound {
            location: format!("{} (version.current)", self.path.display()),
        })?;
        Ok(vec![current])
    }

    fn set(&self, version: &Version) -> Result<()> {
        let content = read_document(&self.path)?;
        let updated = match ConfigFormat::from_path(&self.path) {
            ConfigFormat::Json => self.rewrite_json(&content, version)?,
            ConfigFormat::Yaml => self.rewrite_yaml(&content, version)?,
        };
        fs::write(&self.path, updated)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_actions;
    use tempfile::TempDir;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn get_reads_current_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("actions.json");
        fs::write(&path, r#"{"version": {"current": "0.3.0"}, "actions": {}}"#).unwrap();

        let strategy = DocumentStrategy::new(&path);
        assert_eq!(strategy.name(), "actions.json");
        assert_eq!(strategy.get().unwrap(), vec![v("0.3.0")]);
    }

    #[test]
    fn get_without_current_version_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("actions.json");
        fs::write(&path, r#"{"actions": {}}"#).unwrap();

        let err = DocumentStrategy::new(&path).get().unwrap_err();
        assert!(matches!(err, J3nError::VersionNotFound { .. }));
    }

    #[test]
    fn set_json_keeps_actions_and_key_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("actions.json");
        fs::write(
            &path,
            r#"{"version": {"current": "0.3.0"}, "actions": {"build": {"steps": {"compile": {"type": "exec"}}}}}"#,
        )
        .unwrap();

        let strategy = DocumentStrategy::new(&path);
        strategy.set(&v("0.4.0-DEV")).unwrap();

        assert_eq!(strategy.get().unwrap(), vec![v("0.4.0-DEV")]);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.find("\"version\"").unwrap() < content.find("\"actions\"").unwrap());
        assert!(content.ends_with("}\n"));
        assert!(load_actions(&path).unwrap().actions.contains_key("build"));
    }

    #[test]
    fn set_yaml_adds_missing_section() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("actions.yml");
        fs::write(
            &path,
            "actions:\n  build:\n    steps:\n      compile:\n        type: exec\n",
        )
        .unwrap();

        let strategy = DocumentStrategy::new(&path);
        strategy.set(&v("1.0.0")).unwrap();

        assert_eq!(strategy.get().unwrap(), vec![v("1.0.0")]);
        assert!(load_actions(&path).unwrap().actions.contains_key("build"));
    }

    #[test]
    fn set_rejects_non_object_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("actions.json");
        fs::write(&path, "[1, 2]").unwrap();

        let err = DocumentStrategy::new(&path).set(&v("1.0.0")).unwrap_err();
        assert!(matches!(err, J3nError::ConfigParseError { .. }));
    }
}
