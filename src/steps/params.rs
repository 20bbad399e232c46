//! Typed accessors for untyped runner params.

use std::collections::HashMap;

use serde_json::Value as Json;

use crate::action::Params;
use crate::error::StepError;

type Result<T> = std::result::Result<T, StepError>;

fn invalid(name: &str, message: impl Into<String>) -> StepError {
    StepError::InvalidParam {
        name: name.to_string(),
        message: message.into(),
    }
}

fn present<'p>(params: &'p Params, name: &str) -> Option<&'p Json> {
    params.get(name).filter(|value| !value.is_null())
}

/// Optional string param.
pub fn string<'p>(params: &'p Params, name: &str) -> Result<Option<&'p str>> {
    match present(params, name) {
        None => Ok(None),
        Some(Json::String(s)) => Ok(Some(s)),
        Some(other) => Err(invalid(name, format!("expected a string, got {}", other))),
    }
}

/// Required string param.
pub fn required_string<'p>(params: &'p Params, name: &str) -> Result<&'p str> {
    string(params, name)?.ok_or_else(|| invalid(name, "is required"))
}

/// Boolean param, `false` when absent.
pub fn flag(params: &Params, name: &str) -> Result<bool> {
    match present(params, name) {
        None => Ok(false),
        Some(Json::Bool(b)) => Ok(*b),
        Some(other) => Err(invalid(name, format!("expected a boolean, got {}", other))),
    }
}

/// List of strings. Numbers and booleans are converted to text.
pub fn string_list(params: &Params, name: &str) -> Result<Vec<String>> {
    match present(params, name) {
        None => Ok(Vec::new()),
        Some(Json::Array(items)) => items
            .iter()
            .map(|item| match item {
                Json::String(s) => Ok(s.clone()),
                Json::Number(n) => Ok(n.to_string()),
                Json::Bool(b) => Ok(b.to_string()),
                other => Err(invalid(name, format!("unsupported list item {}", other))),
            })
            .collect(),
        Some(other) => Err(invalid(name, format!("expected a list, got {}", other))),
    }
}

/// List of integers.
pub fn int_list(params: &Params, name: &str) -> Result<Vec<i64>> {
    match present(params, name) {
        None => Ok(Vec::new()),
        Some(Json::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_i64()
                    .ok_or_else(|| invalid(name, format!("expected an integer, got {}", item)))
            })
            .collect(),
        Some(other) => Err(invalid(name, format!("expected a list, got {}", other))),
    }
}

/// Environment variables given as `["KEY=VALUE", ...]` or `{"KEY": "VALUE"}`.
pub fn env_map(params: &Params, name: &str) -> Result<HashMap<String, String>> {
    match present(params, name) {
        None => Ok(HashMap::new()),
        Some(Json::Object(map)) => map
            .iter()
            .map(|(key, value)| match value {
                Json::String(s) => Ok((key.clone(), s.clone())),
                other => Ok((key.clone(), other.to_string())),
            })
            .collect(),
        Some(Json::Array(_)) => string_list(params, name)?
            .into_iter()
            .map(|entry| match entry.split_once('=') {
                Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
                _ => Err(invalid(name, format!("expected KEY=VALUE, got '{}'", entry))),
            })
            .collect(),
        Some(other) => Err(invalid(name, format!("expected a list or map, got {}", other))),
    }
}
