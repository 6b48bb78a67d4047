/*!
 * Selection algorithms over the project tree
 *
 * All operations mutate `checked` flags in place. Ordinary toggles keep the
 * directory invariant "checked iff every child is checked"; the git filter
 * and presets derive directories with OR instead, marking them relevant when
 * anything below them is.
 */

use std::collections::{BTreeMap, HashSet};

use crate::framework::{FrameworkDefinition, PresetRule};
use crate::types::ProjectNode;
use crate::utils::{base_name, normalize_path, relative_path};

/// Flat path → checked side-table that survives tree rebuilds
pub type SelectionMap = BTreeMap<String, bool>;

/// Set `checked` on a node and every descendant
pub fn set_subtree(node: &mut ProjectNode, value: bool) {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        current.checked = value;
        stack.extend(current.children.iter_mut());
    }
}

/// Recompute every directory as the AND of its children, bottom-up
///
/// Returns the node's resulting state.
pub fn reconcile(node: &mut ProjectNode) -> bool {
    if node.children.is_empty() {
        return node.checked;
    }

    let mut all_checked = true;
    for child in &mut node.children {
        let child_checked = reconcile(child);
        all_checked = all_checked && child_checked;
    }

    node.checked = all_checked;
    node.checked
}

/// Set the subtree at `target_path` to `value`, then re-derive all directories
///
/// Returns `false` when no node has that path; the tree is still reconciled.
pub fn toggle_and_reconcile(root: &mut ProjectNode, target_path: &str, value: bool) -> bool {
    let found = match root.find_mut(target_path) {
        Some(node) => {
            set_subtree(node, value);
            true
        }
        None => {
            log::debug!("Toggle target not in tree: {}", target_path);
            false
        }
    };

    reconcile(root);
    found
}

/// [`toggle_and_reconcile`] with a path relative to the root
///
/// An empty path or `.` addresses the root itself.
pub fn toggle_relative(root: &mut ProjectNode, relative: &str, value: bool) -> bool {
    let relative = normalize_path(relative);
    let relative = relative.trim_start_matches("./").trim_matches('/');
    let target = if relative.is_empty() || relative == "." {
        root.path.clone()
    } else {
        format!("{}/{}", root.path.trim_end_matches('/'), relative)
    };
    toggle_and_reconcile(root, &target, value)
}

/// Check exactly the files in `changed`; directories are checked when any
/// descendant is
///
/// Returns whether anything in the subtree ended up checked.
pub fn apply_git_filter(node: &mut ProjectNode, changed: &HashSet<String>) -> bool {
    if node.is_file() {
        node.checked = changed.contains(&node.path);
        return node.checked;
    }

    let mut any_checked = false;
    for child in &mut node.children {
        let child_checked = apply_git_filter(child, changed);
        any_checked = any_checked || child_checked;
    }

    node.checked = any_checked;
    node.checked
}

/// Apply a framework's preset to the whole tree
pub fn apply_preset(root: &mut ProjectNode, framework: &FrameworkDefinition) {
    let root_path = normalize_path(&root.path);
    apply_rule(root, &framework.preset, &root_path, false);
    log::info!("Applied {} preset", framework.name);
}

fn apply_rule(node: &mut ProjectNode, rule: &PresetRule, root: &str, force_include: bool) -> bool {
    let path = normalize_path(&node.path);

    if rule.exclude.iter().any(|re| re.is_match(&path)) {
        set_subtree(node, false);
        return false;
    }

    if node.is_dir() {
        let include_root = is_include_dir(rule, root, &path);
        let force_children = force_include || include_root;

        let mut any_checked = false;
        for child in &mut node.children {
            let child_checked = apply_rule(child, rule, root, force_children);
            any_checked = any_checked || child_checked;
        }

        node.checked = include_root || any_checked;
        return node.checked;
    }

    node.checked = force_include || rule.include_files.iter().any(|re| re.is_match(&path));
    node.checked
}

/// Include entries match a directory's base name, or its root-relative path
/// when the entry itself contains a slash
fn is_include_dir(rule: &PresetRule, root: &str, path: &str) -> bool {
    let name = base_name(path);
    rule.include_dirs.iter().any(|dir| {
        *dir == name || (dir.contains('/') && relative_path(root, path) == *dir)
    })
}

/// Snapshot every node's `checked` flag
pub fn collect_selection(root: &ProjectNode) -> SelectionMap {
    root.iter()
        .map(|node| (node.path.clone(), node.checked))
        .collect()
}

/// Restore saved flags by path; nodes missing from `saved` keep their state
///
/// Directories are re-derived afterwards so the AND invariant holds.
pub fn restore_selection(root: &mut ProjectNode, saved: &SelectionMap) -> usize {
    let mut restored = 0;
    let mut stack = vec![&mut *root];
    while let Some(node) = stack.pop() {
        if let Some(&checked) = saved.get(&node.path) {
            node.checked = checked;
            restored += 1;
        }
        stack.extend(node.children.iter_mut());
    }

    reconcile(root);
    restored
}
