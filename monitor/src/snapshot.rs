//! Active-player snapshots of the in-progress directory.
//!
//! While a game is running the server keeps one or more artifact files per
//! player in the in-progress directory, named `<player>:<suffix>`. The set of
//! distinct `<player>` prefixes is the set of active players.
//!
//! NFS leaves transient `.nfs` + 24 digit files behind while an open file is
//! unlinked; those are never players.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Separator between the player name and the rest of an artifact name.
pub const NAME_DELIMITER: char = ':';

static LOCK_FILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.nfs[0-9]{24}$").expect("lock file pattern is valid"));

/// Errors that can occur while snapshotting the in-progress directory.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Listing the directory failed.
    #[error("failed to list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A file name had no player component.
    #[error("unexpected file name: {0}")]
    UnexpectedFileName(String),
}

/// Returns `true` if `name` is a transient NFS lock artifact.
#[must_use]
pub fn is_lock_file(name: &str) -> bool {
    LOCK_FILE_PATTERN.is_match(name)
}

/// Extracts the player name from an artifact path.
///
/// Returns `Ok(None)` for lock artifacts.
///
/// # Errors
///
/// Returns [`SnapshotError::UnexpectedFileName`] if the path has no usable
/// file name.
pub fn player_name(path: &Path) -> Result<Option<String>, SnapshotError> {
    let base = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .ok_or_else(|| SnapshotError::UnexpectedFileName(path.display().to_string()))?;

    let candidate = base
        .split(NAME_DELIMITER)
        .next()
        .ok_or_else(|| SnapshotError::UnexpectedFileName(base.to_string()))?;

    if is_lock_file(candidate) {
        return Ok(None);
    }

    Ok(Some(candidate.to_string()))
}

/// Lists every file under `dir` and returns the distinct active player names.
///
/// # Errors
///
/// Returns an error if any directory in the tree cannot be listed.
pub fn active_users(dir: &Path) -> Result<BTreeSet<String>, SnapshotError> {
    let mut users = BTreeSet::new();
    collect_users(dir, &mut users)?;

    debug!(
        dir = %dir.display(),
        active_count = users.len(),
        "Snapshotted active players"
    );

    Ok(users)
}

fn collect_users(dir: &Path, users: &mut BTreeSet<String>) -> Result<(), SnapshotError> {
    let io_err = |source| SnapshotError::Io {
        path: dir.display().to_string(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();

        // Symlinks are not followed; a linked directory counts as one artifact.
        if entry.file_type().map_err(io_err)?.is_dir() {
            collect_users(&path, users)?;
        } else if let Some(name) = player_name(&path)? {
            users.insert(name);
        }
    }

    Ok(())
}
