//! File system utilities for bundling.
//!
//! Idempotent directory operations plus upward file lookup used to find lock
//! files, `package.json` and `tsconfig.json`.

use crate::bundler::error::{ErrorExt, Result};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Finds `name` in `start` or the closest ancestor that contains it.
pub fn find_up(name: &str, start: &Path) -> Option<PathBuf> {
    start.ancestors().map(|dir| dir.join(name)).find(|p| p.is_file())
}

/// Like [`find_up`] for several names; the first name found in the closest
/// directory wins.
pub fn find_up_any(names: &[&str], start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        names
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    })
}

/// Renders a path with forward slashes, for use inside POSIX shell commands.
pub fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// True when the directory does not exist or has no entries.
pub async fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = match fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e).fs_context("reading directory", path),
    };
    Ok(entries
        .next_entry()
        .await
        .fs_context("reading directory", path)?
        .is_none())
}

/// Moves a directory into place without overwriting an existing one.
///
/// If `to` already exists the source is discarded, since identical hashes mean
/// identical content.
pub async fn move_dir(from: &Path, to: &Path) -> Result<()> {
    if fs::try_exists(to).await.unwrap_or(false) {
        log::debug!("{} already staged, discarding {}", to.display(), from.display());
        return remove_dir_all(from).await;
    }
    fs::rename(from, to).await.fs_context("moving bundle to", to)
}
