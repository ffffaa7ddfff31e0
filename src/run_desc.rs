//! Run-description document loading and key lookup.
//!
//! A run description is a declarative YAML document specifying the paths,
//! executables, and parameters of one model run. This module only loads the
//! document and resolves nested keys; it does not validate the schema.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{OceanError, Result};

/// Load a run description YAML file.
pub fn load(run_desc_file: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(run_desc_file)?;
    Ok(serde_yaml::from_str(&text)?)
}

/// Look up a string value at a nested key path, e.g.
/// `get_str(&desc, &["paths", "NEMO code config"])`.
pub fn get_str<'a>(run_desc: &'a Value, keys: &[&str]) -> Result<&'a str> {
    let mut node = run_desc;
    for key in keys {
        node = node
            .get(key)
            .ok_or_else(|| OceanError::KeyNotFound(keys.join(": ")))?;
    }
    node.as_str()
        .ok_or_else(|| OceanError::NotAString(keys.join(": ")))
}

/// Look up a path value at a nested key path, expanding `$VAR` references
/// and a leading `~` the way the values are written in run descriptions.
pub fn get_path(run_desc: &Value, keys: &[&str]) -> Result<PathBuf> {
    let raw = get_str(run_desc, keys)?;
    Ok(PathBuf::from(expand(raw)))
}

fn expand(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            let mut closed = false;
            for inner in chars.by_ref() {
                if inner == '}' {
                    closed = true;
                    break;
                }
                name.push(inner);
            }
            match std::env::var(&name) {
                Ok(value) if closed => out.push_str(&value),
                _ => {
                    out.push_str("${");
                    out.push_str(&name);
                    if closed {
                        out.push('}');
                    }
                }
            }
            continue;
        }
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        match std::env::var(&name) {
            Ok(value) if !name.is_empty() => out.push_str(&value),
            // Unset or empty variable names are left as written
            _ => {
                out.push('$');
                out.push_str(&name);
            }
        }
    }
    if let Some(rest) = out.strip_prefix('~') {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{home}{rest}");
        }
    }
    out
}
