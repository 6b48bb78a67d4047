//! Framework detection over the root directory's immediate entries

use std::path::Path;

use crate::fs::{DirEntryInfo, FileSource};

use super::catalog::{by_priority, FrameworkDefinition, Trigger};

/// Detect the highest-priority framework whose triggers match the root
///
/// A listing failure counts as an empty directory, so detection degrades to
/// `None` instead of failing.
pub fn detect(root: &Path, source: &dyn FileSource) -> Option<&'static FrameworkDefinition> {
    let entries = source.list_entries(root).unwrap_or_else(|e| {
        log::debug!("Cannot list {} for detection: {}", root.display(), e);
        Vec::new()
    });

    let detected = by_priority().into_iter().find(|def| {
        def.triggers
            .iter()
            .any(|trigger| trigger_matches(trigger, root, &entries, source))
    });

    match detected {
        Some(def) => log::debug!("Detected framework {} ({})", def.name, def.id),
        None => log::debug!("No framework detected in {}", root.display()),
    }

    detected
}

fn trigger_matches(
    trigger: &Trigger,
    root: &Path,
    entries: &[DirEntryInfo],
    source: &dyn FileSource,
) -> bool {
    if let Some(nested) = trigger.nested_path() {
        let path = root.join(nested);
        return source.stat(&path).is_ok() || source.list_entries(&path).is_ok();
    }

    entries.iter().any(|entry| trigger.matches_entry(&entry.name))
}
