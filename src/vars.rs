//! Seeding the variable store from TOML files and `NAME=VALUE` flags.

use anyhow::{Context, Result};
use oxidize_env::expand::parser::is_valid_name;
use std::{collections::HashMap, fs, path::Path};
use tracing::debug;

/// Read a TOML file into flat `name = value` pairs.
pub fn load(path: &Path) -> Result<HashMap<String, String>> {
    let src = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let table: toml::Value =
        toml::from_str(&src).with_context(|| format!("parse {}", path.display()))?;

    let mut vars = HashMap::new();
    flatten("", &table, &mut vars);
    Ok(vars)
}

/// Flatten a TOML value into `prefix_key = string` pairs.
///
/// Scalars become their display form. Arrays and datetimes have no single
/// string form a placeholder could take, so they are dropped (visible with
/// `--verbose`).
pub fn flatten(prefix: &str, value: &toml::Value, out: &mut HashMap<String, String>) {
    match value {
        toml::Value::Table(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}_{k}")
                };
                flatten(&key, v, out);
            }
        }
        toml::Value::String(s) => {
            out.insert(prefix.to_owned(), s.clone());
        }
        toml::Value::Integer(i) => {
            out.insert(prefix.to_owned(), i.to_string());
        }
        toml::Value::Float(f) => {
            out.insert(prefix.to_owned(), f.to_string());
        }
        toml::Value::Boolean(b) => {
            out.insert(prefix.to_owned(), b.to_string());
        }
        other => debug!(key = prefix, kind = other.type_str(), "ignoring TOML value"),
    }
}

/// clap value parser for `--set NAME=VALUE`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    if !is_valid_name(name) {
        return Err(format!("invalid variable name '{name}'"));
    }
    Ok((name.to_owned(), value.to_owned()))
}
