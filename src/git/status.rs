/*!
 * Changed files of the working tree
 */

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use git2::{Repository, Status, StatusOptions};

use super::error::{GitError, GitResult};
use crate::utils::path_to_string;

/// Absolute, slash-normalized paths of modified, staged and untracked files
///
/// Untracked directories are expanded to the files inside them. Ignored files
/// are left out.
pub fn changed_paths(root: &Path) -> GitResult<HashSet<String>> {
    let repo = Repository::discover(root)
        .map_err(|_| GitError::NotARepository(root.display().to_string()))?;
    let workdir = repo
        .workdir()
        .ok_or_else(|| GitError::BareRepository(repo.path().display().to_string()))?;
    let workdir = fs::canonicalize(workdir)?;

    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .exclude_submodules(true);

    let statuses = repo
        .statuses(Some(&mut options))
        .map_err(GitError::StatusError)?;

    let changed: HashSet<String> = statuses
        .iter()
        .filter(|entry| is_change(entry.status()))
        .filter_map(|entry| entry.path().map(|p| path_to_string(&workdir.join(p))))
        .collect();

    log::debug!("{} changed paths in {}", changed.len(), workdir.display());
    Ok(changed)
}

/// Like [`changed_paths`], but any failure is a warning and an empty set
pub fn changed_paths_or_empty(root: &Path) -> HashSet<String> {
    changed_paths(root).unwrap_or_else(|e| {
        log::warn!("Git not available for {}: {}", root.display(), e);
        HashSet::new()
    })
}

fn is_change(status: Status) -> bool {
    !status.is_empty() && !status.contains(Status::IGNORED)
}
