//! Package manager detection from lock files.
//!
//! The lock file name selects the package manager. `yarn.lock` is further split
//! into Yarn classic and Yarn Berry by its header: Berry lock files are YAML with
//! a `__metadata:` block.

use crate::bundler::{Error, Result, utils::os_command::OsPlatform};
use std::{fmt, path::Path};

/// Lock file names, in lookup order.
///
/// The first match wins both for exact name matching and when searching
/// upwards from the entry for a lock file.
pub const LOCK_FILES: &[(&str, LockFile)] = &[
    ("pnpm-lock.yaml", LockFile::Pnpm),
    ("yarn.lock", LockFile::Yarn),
    ("bun.lockb", LockFile::Bun),
    ("bun.lock", LockFile::Bun),
    ("package-lock.json", LockFile::Npm),
];

/// Kind of lock file, before Yarn flavours are told apart.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LockFile {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl LockFile {
    /// Exact file name match against [`LOCK_FILES`].
    pub fn from_file_name(name: &str) -> Option<LockFile> {
        LOCK_FILES
            .iter()
            .find(|(file, _)| *file == name)
            .map(|(_, kind)| *kind)
    }
}

/// Package manager governing the project.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PackageManager {
    /// npm (`package-lock.json`)
    Npm,
    /// Yarn 1.x (`yarn.lock`)
    Yarn,
    /// Yarn 2+ (`yarn.lock` with a `__metadata` header), may use Plug'n'Play
    YarnBerry,
    /// pnpm (`pnpm-lock.yaml`)
    Pnpm,
    /// Bun (`bun.lockb` / `bun.lock`)
    Bun,
}

impl PackageManager {
    /// Selects the package manager from a lock file path.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceResolution`] when the file name is not a known lock file.
    pub fn from_lock_file(lock_file: &Path) -> Result<Self> {
        let name = lock_file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        let kind = LockFile::from_file_name(name).ok_or_else(|| {
            Error::ResourceResolution(format!(
                "Unsupported lock file `{}`. Expected one of: {}",
                lock_file.display(),
                LOCK_FILES
                    .iter()
                    .map(|(file, _)| *file)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

        Ok(match kind {
            LockFile::Npm => Self::Npm,
            LockFile::Pnpm => Self::Pnpm,
            LockFile::Bun => Self::Bun,
            LockFile::Yarn if is_berry_lock_file(lock_file) => Self::YarnBerry,
            LockFile::Yarn => Self::Yarn,
        })
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::YarnBerry => "yarn-berry",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }

    /// Lock file name copied next to the installed modules.
    pub fn lock_file(&self) -> &'static str {
        match self {
            Self::Npm => "package-lock.json",
            Self::Yarn | Self::YarnBerry => "yarn.lock",
            Self::Pnpm => "pnpm-lock.yaml",
            Self::Bun => "bun.lockb",
        }
    }

    /// Command installing dependencies from `package.json` and the lock file.
    pub fn install_command(&self) -> Vec<&'static str> {
        match self {
            Self::Npm => vec!["npm", "ci"],
            Self::Yarn => vec!["yarn", "install", "--no-immutable"],
            Self::YarnBerry => vec!["yarn", "install"],
            Self::Pnpm => vec![
                "pnpm",
                "install",
                "--config.node-linker=hoisted",
                "--config.package-import-method=clone-or-copy",
                "--no-prefer-frozen-lockfile",
            ],
            Self::Bun => vec!["bun", "install", "--frozen-lockfile", "--backend", "copyfile"],
        }
    }

    /// Command prefix running a binary installed in the project.
    pub fn run_command(&self) -> Vec<&'static str> {
        match self {
            Self::Npm => vec!["npx", "--no-install"],
            Self::Yarn | Self::YarnBerry => vec!["yarn", "run"],
            Self::Pnpm => vec!["pnpm", "exec"],
            Self::Bun => vec!["bun", "run"],
        }
    }

    fn args_separator(&self) -> Option<&'static str> {
        match self {
            Self::Pnpm => Some("--"),
            _ => None,
        }
    }

    /// Shell fragment running a project-local binary.
    ///
    /// On Windows hosts the binary name gets the `.cmd` shim suffix npm uses.
    pub fn run_bin_command(&self, bin: &str, os: OsPlatform) -> String {
        let bin = match os {
            OsPlatform::Windows => format!("{bin}.cmd"),
            OsPlatform::Unix => bin.to_string(),
        };
        let mut parts: Vec<String> = self.run_command().into_iter().map(String::from).collect();
        if let Some(separator) = self.args_separator() {
            parts.push(separator.to_string());
        }
        parts.push(bin);
        parts.join(" ")
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Yarn Berry lock files start with a `__metadata:` block.
///
/// An unreadable lock file is treated as Yarn classic.
fn is_berry_lock_file(lock_file: &Path) -> bool {
    match std::fs::read_to_string(lock_file) {
        Ok(content) => content.lines().any(|line| line.starts_with("__metadata:")),
        Err(e) => {
            log::debug!(
                "Could not read {} ({}), assuming Yarn classic",
                lock_file.display(),
                e
            );
            false
        }
    }
}
