//! Argument extraction helpers shared by the registry builders.
//!
//! Mappers validate before hydration: a wrong or missing argument fails the
//! invocation before anything touches the wire.

use anyhow::{Result, bail};
use serde_json::{Map as JsonMap, Value};

pub(crate) fn require_str(args: &JsonMap<String, Value>, key: &str) -> Result<String> {
    match args.get(key) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(Value::String(_)) => bail!("argument '{key}' must not be empty"),
        Some(_) => bail!("argument '{key}' must be a string"),
        None => bail!("missing required argument '{key}'"),
    }
}

pub(crate) fn opt_str(args: &JsonMap<String, Value>, key: &str) -> Result<Option<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => bail!("argument '{key}' must be a string"),
    }
}

pub(crate) fn opt_bool(args: &JsonMap<String, Value>, key: &str) -> Result<Option<bool>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(_) => bail!("argument '{key}' must be a boolean"),
    }
}

pub(crate) fn opt_u64(args: &JsonMap<String, Value>, key: &str) -> Result<Option<u64>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_u64() {
            Some(number) => Ok(Some(number)),
            None => bail!("argument '{key}' must be a non-negative integer"),
        },
    }
}

pub(crate) fn require_i64(args: &JsonMap<String, Value>, key: &str) -> Result<i64> {
    match args.get(key).and_then(Value::as_i64) {
        Some(number) => Ok(number),
        None => bail!("missing required integer argument '{key}'"),
    }
}

pub(crate) fn opt_i64(args: &JsonMap<String, Value>, key: &str) -> Result<Option<i64>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_i64() {
            Some(number) => Ok(Some(number)),
            None => bail!("argument '{key}' must be an integer"),
        },
    }
}

pub(crate) fn str_array(args: &JsonMap<String, Value>, key: &str) -> Result<Vec<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(value) => Ok(value.clone()),
                _ => bail!("argument '{key}' must be an array of strings"),
            })
            .collect(),
        Some(_) => bail!("argument '{key}' must be an array of strings"),
    }
}
