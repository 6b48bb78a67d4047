/*!
 * Core types and data structures for the snapfs selection tree
 */

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Regular file
    File,
    /// Directory with at least one visible descendant
    Directory,
}

/// Reason a file's content is kept out of snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileMeta {
    /// Extension is in the binary set
    Binary,
    /// Size is above the content threshold
    Large,
}

impl fmt::Display for FileMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "Binary"),
            Self::Large => write!(f, "Large (>1MB)"),
        }
    }
}

/// A node of the project tree
///
/// `path` is absolute and slash-normalized; it is the node's identity across
/// rebuilds. For directories `checked` is derived from the children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectNode {
    /// Absolute, slash-normalized path
    pub path: String,
    /// Base name
    pub name: String,
    /// File or directory
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Selection flag
    pub checked: bool,
    /// Children, in listing order (always empty for files)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ProjectNode>,
    /// Content exclusion marker (files only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<FileMeta>,
}

impl ProjectNode {
    /// Create a checked file node
    pub fn file(path: impl Into<String>, name: impl Into<String>, meta: Option<FileMeta>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: NodeKind::File,
            checked: true,
            children: Vec::new(),
            meta,
        }
    }

    /// Create a checked directory node
    pub fn directory(
        path: impl Into<String>,
        name: impl Into<String>,
        children: Vec<ProjectNode>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: NodeKind::Directory,
            checked: true,
            children,
            meta: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Pre-order traversal over this node and all descendants
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Find a node by exact path
    pub fn find(&self, path: &str) -> Option<&ProjectNode> {
        self.iter().find(|node| node.path == path)
    }

    /// Find a node by exact path, mutably (depth-first)
    pub fn find_mut(&mut self, path: &str) -> Option<&mut ProjectNode> {
        if self.path == path {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(path))
    }

    /// Checked files in pre-order
    pub fn checked_files(&self) -> Vec<&ProjectNode> {
        self.iter()
            .filter(|node| node.is_file() && node.checked)
            .collect()
    }

    /// Number of file nodes in the tree
    pub fn file_count(&self) -> usize {
        self.iter().filter(|node| node.is_file()).count()
    }
}

/// Stack-based pre-order iterator, so deep trees don't grow the call stack
pub struct PreOrder<'a> {
    stack: Vec<&'a ProjectNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a ProjectNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProjectNode {
        ProjectNode::directory(
            "/p",
            "p",
            vec![
                ProjectNode::directory(
                    "/p/src",
                    "src",
                    vec![
                        ProjectNode::file("/p/src/a.rs", "a.rs", None),
                        ProjectNode::file("/p/src/b.rs", "b.rs", None),
                    ],
                ),
                ProjectNode::file("/p/logo.png", "logo.png", Some(FileMeta::Binary)),
            ],
        )
    }

    #[test]
    fn test_pre_order() {
        let root = sample();
        let paths: Vec<_> = root.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/p", "/p/src", "/p/src/a.rs", "/p/src/b.rs", "/p/logo.png"]
        );
    }

    #[test]
    fn test_find_and_checked_files() {
        let mut root = sample();
        assert!(root.find("/p/src/b.rs").is_some());
        assert!(root.find("/p/missing").is_none());

        root.find_mut("/p/src/a.rs").unwrap().checked = false;
        let files: Vec<_> = root.checked_files().iter().map(|n| n.name.clone()).collect();
        assert_eq!(files, vec!["b.rs", "logo.png"]);
        assert_eq!(root.file_count(), 3);
    }

    #[test]
    fn test_meta_display() {
        assert_eq!(FileMeta::Binary.to_string(), "Binary");
        assert_eq!(FileMeta::Large.to_string(), "Large (>1MB)");
    }

    #[test]
    fn test_serializes_type_tag() {
        let json = serde_json::to_value(ProjectNode::file("/p/a", "a", None)).unwrap();
        assert_eq!(json["type"], "file");
        assert!(json.get("children").is_none());
    }
}
