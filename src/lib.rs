/*!
 * snapfs - Select project files and export them as an AI-ready snapshot
 *
 * Scans a project into a tree of checkable nodes, seeds the selection from a
 * framework preset, git changes or a saved selection, and renders the
 * checked files as Markdown or XML with a token estimate.
 */

pub mod clipboard;
pub mod config;
pub mod error;
pub mod framework;
pub mod fs;
pub mod git;
pub mod report;
pub mod scanner;
pub mod selection;
pub mod splitter;
pub mod store;
pub mod template;
pub mod tokenizer;
pub mod types;
pub mod utils;
pub mod visibility;
pub mod writer;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use config::{Config, OverflowPolicy, SelectionSource};
pub use error::{Result, SnapError};
pub use fs::{FileSource, LocalFs, MemoryFs};
pub use report::{Destination, SnapshotReport};
pub use scanner::{scan_tree, ScanOptions, Scanner};
pub use selection::{
    apply_git_filter, apply_preset, collect_selection, restore_selection, set_subtree,
    toggle_and_reconcile, SelectionMap,
};
pub use splitter::{join_parts, split_snapshot, Chunk};
pub use store::{StateFile, StateStore, UiState};
pub use template::TemplateCatalog;
pub use tokenizer::{estimate_tokens, Model, TokenEstimate};
pub use types::{FileMeta, NodeKind, ProjectNode};
pub use visibility::VisibilityPolicy;
pub use writer::{build_snapshot, OutputFormat, Snapshot, SnapshotBuilder, StructureStyle};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
