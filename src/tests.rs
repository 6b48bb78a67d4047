/*!
 * End-to-end tests over real directories
 */

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::Event;
use quick_xml::Reader;
use tempfile::{tempdir, TempDir};

use crate::framework;
use crate::fs::{FileSource, LocalFs};
use crate::scanner::{scan_tree, ScanOptions};
use crate::selection::{apply_preset, toggle_relative};
use crate::types::{FileMeta, ProjectNode};
use crate::utils::path_to_string;
use crate::writer::{OutputFormat, SnapshotBuilder};

fn write_file(root: &Path, relative: &str, content: &[u8]) -> io::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(content)
}

// A small Rust project with the usual noise around it
fn setup_project() -> io::Result<TempDir> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    write_file(root, "Cargo.toml", b"[package]\nname = \"demo\"\n")?;
    write_file(root, "README.md", b"# Demo\n")?;
    write_file(root, "src/main.rs", b"fn main() {}\n")?;
    write_file(root, "src/util/mod.rs", b"pub fn helper() {}\n")?;
    write_file(root, "images/logo.png", &[0x89, b'P', b'N', b'G'])?;
    write_file(root, "notes/latin1.txt", &[0x63, 0x61, 0x66, 0xe9])?;
    write_file(root, "target/debug/demo", b"ELF")?;
    write_file(root, "node_modules/left-pad/index.js", b"module.exports = 1;")?;
    write_file(root, ".env", b"SECRET=1")?;
    write_file(root, "debug.log", b"trace")?;
    write_file(root, ".gitignore", b"*.log\n/target\n")?;
    fs::create_dir_all(root.join("empty/nested"))?;

    Ok(temp_dir)
}

fn scan(root: &Path) -> ProjectNode {
    scan_tree(ScanOptions::new(root), Arc::new(LocalFs)).unwrap()
}

fn relative_paths(root: &ProjectNode) -> Vec<String> {
    let prefix = format!("{}/", root.path);
    root.iter()
        .skip(1)
        .map(|node| node.path.strip_prefix(&prefix).unwrap_or(&node.path).to_string())
        .collect()
}

#[test]
fn test_scan_real_directory() {
    let temp_dir = setup_project().unwrap();
    let root = scan(temp_dir.path());

    assert_eq!(root.path, path_to_string(&fs::canonicalize(temp_dir.path()).unwrap()));
    assert_eq!(
        relative_paths(&root),
        vec![
            ".gitignore",
            "Cargo.toml",
            "README.md",
            "images",
            "images/logo.png",
            "notes",
            "notes/latin1.txt",
            "src",
            "src/main.rs",
            "src/util",
            "src/util/mod.rs",
        ]
    );
    assert_eq!(root.find(&format!("{}/images/logo.png", root.path)).unwrap().meta, Some(FileMeta::Binary));
    assert!(root.iter().all(|node| node.checked));
}

#[test]
fn test_toggles_change_what_is_visible() {
    let temp_dir = setup_project().unwrap();
    let mut options = ScanOptions::new(temp_dir.path());
    options.use_gitignore = false;
    options.exclude_sensitive = false;

    let root = scan_tree(options, Arc::new(LocalFs)).unwrap();
    let paths = relative_paths(&root);

    assert!(paths.contains(&".env".to_string()));
    assert!(paths.contains(&"debug.log".to_string()));
    assert!(paths.contains(&"target/debug/demo".to_string()));
    assert!(!paths.iter().any(|p| p.starts_with("node_modules")));
}

#[test]
fn test_large_file_is_flagged() {
    let temp_dir = tempdir().unwrap();
    write_file(temp_dir.path(), "big.txt", &vec![b'a'; 1024 * 1024 + 1]).unwrap();
    write_file(temp_dir.path(), "small.txt", b"ok").unwrap();

    let root = scan(temp_dir.path());
    let big = root.find(&format!("{}/big.txt", root.path)).unwrap();
    assert_eq!(big.meta, Some(FileMeta::Large));
}

#[test]
fn test_preset_snapshot_markdown() {
    let temp_dir = setup_project().unwrap();
    let mut root = scan(temp_dir.path());

    let source: Arc<dyn FileSource> = Arc::new(LocalFs);
    let detected = framework::detect(Path::new(&root.path), source.as_ref()).unwrap();
    assert_eq!(detected.id, "rust");
    apply_preset(&mut root, detected);

    let snapshot = SnapshotBuilder::new(source, OutputFormat::Markdown)
        .build(&root)
        .unwrap();

    assert!(snapshot
        .text
        .starts_with("# Project Structure\nCargo.toml\nsrc/main.rs\nsrc/util/mod.rs\n\n---\n"));
    assert!(snapshot.text.contains("\n## src/main.rs\n```rust\nfn main() {}\n\n```\n"));
    assert!(snapshot.text.contains("\n## Cargo.toml\n```toml\n"));
    assert!(!snapshot.text.contains("README.md"));
    assert_eq!(snapshot.files, 3);
    assert_eq!(snapshot.skipped, 0);
}

#[test]
fn test_unreadable_text_is_annotated() {
    let temp_dir = setup_project().unwrap();
    let mut root = scan(temp_dir.path());
    toggle_relative(&mut root, ".", false);
    toggle_relative(&mut root, "notes/latin1.txt", true);
    toggle_relative(&mut root, "images", true);

    let snapshot = SnapshotBuilder::new(Arc::new(LocalFs), OutputFormat::Markdown)
        .build(&root)
        .unwrap();

    assert!(snapshot.text.contains("\n## images/logo.png\n[Skipped: Binary]\n"));
    assert!(snapshot.text.contains("\n## notes/latin1.txt\n[Skipped: Unreadable]\n"));
    assert_eq!(snapshot.skipped, 2);
}

#[test]
fn test_xml_snapshot_is_indexed() {
    let temp_dir = setup_project().unwrap();
    let mut root = scan(temp_dir.path());
    toggle_relative(&mut root, ".", false);
    toggle_relative(&mut root, "src", true);

    let snapshot = SnapshotBuilder::new(Arc::new(LocalFs), OutputFormat::Xml)
        .build(&root)
        .unwrap();

    let mut reader = Reader::from_str(&snapshot.text);
    let mut indices = Vec::new();
    let mut sources = Vec::new();
    let mut in_source = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"document" => {
                let index = e
                    .try_get_attribute("index")
                    .unwrap()
                    .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
                    .unwrap();
                indices.push(index);
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"source" => in_source = true,
            Ok(Event::Text(e)) if in_source => {
                sources.push(String::from_utf8_lossy(&e).to_string());
                in_source = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("Error parsing XML: {:?}", e),
            _ => (),
        }
    }

    assert_eq!(indices, vec!["1", "2", "3"]);
    assert_eq!(sources, vec!["project_structure", "src/main.rs", "src/util/mod.rs"]);
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_is_cut() {
    let temp_dir = tempdir().unwrap();
    let root_dir = temp_dir.path();
    write_file(root_dir, "a/file.txt", b"content").unwrap();
    std::os::unix::fs::symlink(root_dir, root_dir.join("a/up")).unwrap();

    let root = scan(root_dir);
    assert_eq!(relative_paths(&root), vec!["a", "a/file.txt"]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_file_is_listed() {
    let temp_dir = tempdir().unwrap();
    write_file(temp_dir.path(), "real.txt", b"text").unwrap();
    std::os::unix::fs::symlink(temp_dir.path().join("real.txt"), temp_dir.path().join("link.txt")).unwrap();

    let root = scan(temp_dir.path());
    assert_eq!(relative_paths(&root), vec!["link.txt", "real.txt"]);
}
