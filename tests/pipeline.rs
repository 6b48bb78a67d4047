use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use snapfs::framework;
use snapfs::selection::toggle_relative;
use snapfs::{
    apply_git_filter, apply_preset, collect_selection, estimate_tokens, join_parts,
    restore_selection, scan_tree, split_snapshot, FileMeta, FileSource, MemoryFs, OutputFormat,
    ProjectNode, ScanOptions, SnapshotBuilder, StateFile, StateStore, TemplateCatalog,
};
use tempfile::tempdir;

fn rust_project() -> Arc<dyn FileSource> {
    Arc::new(
        MemoryFs::new()
            .with_file("/proj/Cargo.toml", "[package]\nname = \"demo\"\n")
            .with_file("/proj/README.md", "# Demo\n")
            .with_file("/proj/src/main.rs", "fn main() {}\n")
            .with_file("/proj/src/lib.rs", "pub mod parser;\n")
            .with_file("/proj/src/parser.rs", "pub fn parse() {}\n")
            .with_file("/proj/docs/guide.md", "Guide\n")
            .with_sized_file("/proj/media/dump.txt", 4 * 1024 * 1024),
    )
}

fn scan(source: &Arc<dyn FileSource>) -> ProjectNode {
    scan_tree(ScanOptions::new("/proj"), source.clone()).expect("tree")
}

#[test]
fn test_preset_to_prompt() {
    let source = rust_project();
    let mut root = scan(&source);

    let detected = framework::detect(Path::new("/proj"), source.as_ref()).expect("framework");
    assert_eq!(detected.id, "rust");
    apply_preset(&mut root, detected);

    let snapshot = SnapshotBuilder::new(source.clone(), OutputFormat::Markdown)
        .build(&root)
        .unwrap();
    assert_eq!(snapshot.files, 4);
    assert!(!snapshot.text.contains("## README.md"));
    assert!(!snapshot.text.contains("docs/guide.md"));

    let catalog = TemplateCatalog::new();
    let prompt = catalog.apply(&snapshot.text, "review");
    assert!(prompt.contains("## src/parser.rs"));
    assert!(prompt.len() > snapshot.text.len());

    let raw = catalog.apply(&snapshot.text, "default");
    assert_eq!(raw, snapshot.text);

    let estimate = estimate_tokens(&prompt, 400_000);
    assert!(estimate.within_limit);
    assert_eq!(estimate.tokens, prompt.chars().count().div_ceil(4));
}

#[test]
fn test_large_file_is_not_inlined() {
    let source = rust_project();
    let mut root = scan(&source);
    toggle_relative(&mut root, ".", false);
    toggle_relative(&mut root, "media", true);

    let big = root.find("/proj/media/dump.txt").unwrap();
    assert_eq!(big.meta, Some(FileMeta::Large));

    let snapshot = SnapshotBuilder::new(source, OutputFormat::Markdown)
        .build(&root)
        .unwrap();
    assert!(snapshot.text.contains("\n## media/dump.txt\n[Skipped: Large (>1MB)]\n"));
    assert_eq!(snapshot.skipped, 1);
}

#[test]
fn test_git_changes_focus_the_snapshot() {
    let source = rust_project();
    let mut root = scan(&source);

    let changed: HashSet<String> = ["/proj/src/parser.rs", "/proj/README.md", "/proj/deleted.rs"]
        .iter()
        .map(|p| p.to_string())
        .collect();
    apply_git_filter(&mut root, &changed);

    assert!(root.checked);
    assert!(root.find("/proj/src").unwrap().checked);
    assert!(!root.find("/proj/src/main.rs").unwrap().checked);
    assert!(!root.find("/proj/docs").unwrap().checked);

    let snapshot = SnapshotBuilder::new(source, OutputFormat::Xml)
        .build(&root)
        .unwrap();
    assert_eq!(snapshot.files, 2);
    assert!(snapshot.text.contains("<source>src/parser.rs</source>"));
    assert!(!snapshot.text.contains("<source>src/main.rs</source>"));
}

#[test]
fn test_oversized_snapshot_splits_on_lines() {
    let mut memory = MemoryFs::new();
    for i in 0..40 {
        memory = memory.with_file(format!("/proj/file_{:02}.txt", i), &"line of text\n".repeat(20));
    }
    let source: Arc<dyn FileSource> = Arc::new(memory);
    let root = scan(&source);

    let snapshot = SnapshotBuilder::new(source, OutputFormat::Markdown)
        .build(&root)
        .unwrap();
    let estimate = estimate_tokens(&snapshot.text, 500);
    assert!(!estimate.within_limit);

    let chunks = split_snapshot(&snapshot.text, 500);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        // budget plus the trailing newline of the last line
        assert!(chunk.content.chars().count() <= 500 * 4 + 1);
        assert!(chunk.content.ends_with('\n'));
    }

    let rejoined: String = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(rejoined.trim_end(), snapshot.text.trim_end());

    let joined = join_parts(&chunks);
    assert!(joined.starts_with("# Part 1\n\n# Project Structure\n"));
    assert!(joined.contains(&format!("# Part {}\n\n", chunks.len())));
}

#[test]
fn test_selection_survives_a_rescan() {
    let dir = tempdir().unwrap();
    let store = StateStore::at(dir.path().join("proj.state.json"));

    let source = rust_project();
    let mut root = scan(&source);
    toggle_relative(&mut root, "docs", false);
    toggle_relative(&mut root, "src/main.rs", false);

    let state = StateFile {
        selection: collect_selection(&root),
        ..Default::default()
    };
    store.save(&state).unwrap();

    let mut rescanned = scan(&source);
    let restored = restore_selection(&mut rescanned, &store.load().selection);
    assert_eq!(restored, rescanned.iter().count());

    assert!(!rescanned.find("/proj/docs/guide.md").unwrap().checked);
    assert!(!rescanned.find("/proj/src/main.rs").unwrap().checked);
    assert!(rescanned.find("/proj/src/lib.rs").unwrap().checked);
    assert!(!rescanned.find("/proj/src").unwrap().checked);
    assert!(!rescanned.checked);
}
