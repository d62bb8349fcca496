//! External tool detection and availability checking.
//!
//! Probes whether `esbuild` / `tsc` can run on the host and at which version.
//! Results are cached per tool name for the lifetime of the [`ToolCache`], so
//! repeated builds do not spawn the probe again.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::Command,
    sync::{PoisonError, RwLock},
};

/// A tool found on the host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Installation {
    /// Installed in the project's `node_modules/.bin` rather than on `PATH`.
    pub local: bool,
    /// Output of `<tool> --version`, trimmed.
    pub version: String,
}

impl Installation {
    /// Major version component, if the version string is semver.
    pub fn major(&self) -> Option<u64> {
        let version = self.version.trim_start_matches('v');
        semver::Version::parse(version).ok().map(|v| v.major)
    }
}

/// Per-tool cache of installation probes.
///
/// `None` entries record that the tool was not found, which is cached too.
#[derive(Debug, Default)]
pub struct ToolCache {
    entries: RwLock<HashMap<String, Option<Installation>>>,
}

impl ToolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached probe for `tool`, probing on first use.
    ///
    /// `project_root` is searched for a project-local installation first.
    pub fn detect(&self, tool: &str, project_root: &Path) -> Option<Installation> {
        if let Some(cached) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tool)
        {
            return cached.clone();
        }

        let detected = detect_installation(tool, project_root);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(tool.to_string())
            .or_insert(detected)
            .clone()
    }

    /// Records a probe result without spawning anything.
    pub fn insert(&self, tool: &str, installation: Option<Installation>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tool.to_string(), installation);
    }

    /// Forgets every probe result.
    pub fn reset(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn local_bin(tool: &str, project_root: &Path) -> PathBuf {
    let bin = project_root.join("node_modules").join(".bin");
    if cfg!(windows) {
        bin.join(format!("{tool}.cmd"))
    } else {
        bin.join(tool)
    }
}

fn detect_installation(tool: &str, project_root: &Path) -> Option<Installation> {
    let local = local_bin(tool, project_root);
    if local.is_file()
        && let Some(version) = probe_version(tool, &local)
    {
        log::info!("✓ {} available locally: {}", tool, version);
        return Some(Installation {
            local: true,
            version,
        });
    }

    match which::which(tool) {
        Ok(path) => {
            log::debug!("Found {} at: {}", tool, path.display());
            probe_version(tool, &path).map(|version| {
                log::info!("✓ {} available: {}", tool, version);
                Installation {
                    local: false,
                    version,
                }
            })
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", tool, e);
            None
        }
    }
}

fn probe_version(tool: &str, path: &Path) -> Option<String> {
    match Command::new(path).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            // `tsc --version` prints "Version 5.4.5"
            let version = version
                .strip_prefix("Version ")
                .unwrap_or(&version)
                .to_string();
            Some(version)
        }
        Ok(output) => {
            log::warn!(
                "{} found at {} but --version check failed (exit code: {:?}). \
                 Stderr: {}",
                tool,
                path.display(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            );
            None
        }
        Err(e) => {
            log::warn!(
                "{} found at {} but failed to execute: {}. Check file permissions.",
                tool,
                path.display(),
                e
            );
            None
        }
    }
}
