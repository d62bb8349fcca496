//! tsconfig.json handling for the pre-compilation step.

use crate::bundler::{Error, Result, error::ErrorExt};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Options that make no sense for a single-file transpile and are dropped.
const EXCLUDED_COMPILER_OPTIONS: &[&str] = &["composite", "charset", "noEmit", "tsBuildInfoFile"];

/// Guards against `extends` cycles.
const MAX_EXTENDS_DEPTH: usize = 16;

/// Reads `compilerOptions`, following relative `extends` chains.
///
/// Options from the extending file override the base.
pub fn read_compiler_options(tsconfig: &Path) -> Result<Map<String, Value>> {
    read_with_depth(tsconfig, 0)
}

fn read_with_depth(tsconfig: &Path, depth: usize) -> Result<Map<String, Value>> {
    if depth > MAX_EXTENDS_DEPTH {
        return Err(Error::configuration(format!(
            "tsconfig `extends` chain is too deep at `{}`",
            tsconfig.display()
        )));
    }

    let content = std::fs::read_to_string(tsconfig).fs_context("reading tsconfig", tsconfig)?;
    let json: Value = serde_json::from_str(&content)?;

    let mut options = match json.get("extends").and_then(Value::as_str) {
        Some(base) if base.starts_with('.') => {
            let dir = tsconfig.parent().unwrap_or(Path::new("."));
            let mut base_path = dir.join(base);
            if base_path.extension().is_none() {
                base_path.set_extension("json");
            }
            read_with_depth(&base_path, depth + 1)?
        }
        Some(base) => {
            log::warn!(
                "Ignoring non-relative tsconfig `extends` ({}) in {}",
                base,
                tsconfig.display()
            );
            Map::new()
        }
        None => Map::new(),
    };

    if let Some(Value::Object(own)) = json.get("compilerOptions") {
        for (key, value) in own {
            options.insert(key.clone(), value.clone());
        }
    }

    Ok(options)
}

/// Renders compiler options as `tsc` flags.
///
/// Keys are sorted. `incremental` is forced off and `rootDir`/`outDir` are set
/// to `./` so the emitted `.js` lands next to its `.ts` source.
pub fn compiler_flags(options: &Map<String, Value>) -> String {
    let mut options = options.clone();
    options.insert("incremental".to_string(), Value::Bool(false));
    options.insert("rootDir".to_string(), Value::String("./".to_string()));
    options.insert("outDir".to_string(), Value::String("./".to_string()));

    let mut keys: Vec<&String> = options.keys().collect();
    keys.sort();

    let mut flags = Vec::new();
    for key in keys {
        if EXCLUDED_COMPILER_OPTIONS.contains(&key.as_str()) {
            continue;
        }
        let flag = format!("--{key}");
        match &options[key] {
            Value::Bool(true) => flags.push(flag),
            Value::Bool(false) => flags.push(format!("{flag} false")),
            Value::String(s) => flags.push(format!("{flag} {s}")),
            Value::Number(n) => flags.push(format!("{flag} {n}")),
            Value::Array(items) => {
                let joined = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                flags.push(format!("{flag} {joined}"));
            }
            // Objects (`paths`, `plugins`) have no command-line form.
            Value::Object(_) | Value::Null => {
                log::debug!("Skipping compiler option `{}` without a CLI form", key);
            }
        }
    }

    flags.join(" ")
}

/// Explicit tsconfig, or the closest `tsconfig.json` above the entry.
///
/// # Errors
///
/// [`Error::Configuration`] when neither exists.
pub fn resolve(explicit: Option<&Path>, entry: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let start = entry.parent().unwrap_or(entry);
    crate::bundler::utils::fs::find_up("tsconfig.json", start).ok_or_else(|| {
        Error::configuration(
            "Cannot find a `tsconfig.json` but `pre_compilation` is set to `true`, \
             please specify it via `tsconfig`",
        )
    })
}
