//! Version lookup for node modules installed next to the bundle.

use crate::bundler::{Error, Result, error::ErrorExt, utils::fs::find_up};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, String>,
}

impl PackageJson {
    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).fs_context("reading package.json", path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn declared_version(&self, module: &str) -> Option<&String> {
        self.dependencies
            .get(module)
            .or_else(|| self.dev_dependencies.get(module))
            .or_else(|| self.peer_dependencies.get(module))
    }
}

/// The `package.json` closest to the entry's directory.
pub fn find_package_json(entry: &Path) -> Result<PathBuf> {
    let start = entry.parent().unwrap_or(entry);
    find_up("package.json", start).ok_or_else(|| {
        Error::ResourceResolution(format!(
            "Cannot find a `package.json` above `{}`, needed to install node modules",
            start.display()
        ))
    })
}

/// Pins each module to the version declared in `package_json`.
///
/// Falls back to the version installed under `node_modules/<module>`.
///
/// # Errors
///
/// [`Error::ResourceResolution`] when a module is neither declared nor installed.
pub fn extract_dependencies(
    package_json: &Path,
    modules: &[String],
) -> Result<BTreeMap<String, String>> {
    let manifest = PackageJson::read(package_json)?;
    let project_dir = package_json.parent().unwrap_or(Path::new("."));

    let mut dependencies = BTreeMap::new();
    for module in modules {
        let version = match manifest.declared_version(module) {
            Some(version) => version.clone(),
            None => installed_version(project_dir, module).ok_or_else(|| {
                Error::ResourceResolution(format!(
                    "Cannot extract version for module '{module}'. \
                     Check that it's referenced in your package.json or installed."
                ))
            })?,
        };
        dependencies.insert(module.clone(), version);
    }

    Ok(dependencies)
}

fn installed_version(project_dir: &Path, module: &str) -> Option<String> {
    let path = project_dir
        .join("node_modules")
        .join(module)
        .join("package.json");
    PackageJson::read(&path).ok().and_then(|pkg| pkg.version)
}
