/*!
 * Snapshot writer: renders the checked part of a project tree as Markdown or
 * as an indexed XML document set
 */

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::fs::FileSource;
use crate::types::ProjectNode;
use crate::utils::{language_tag, relative_path};

/// Synthetic source name of the structure document in XML output
pub const STRUCTURE_SOURCE: &str = "project_structure";

/// Snapshot output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Headings and fenced code blocks
    #[default]
    Markdown,
    /// `<documents>` with one indexed `<document>` per entry
    Xml,
}

impl OutputFormat {
    /// File extension used for default output names
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Xml => "xml",
        }
    }
}

/// How the structure summary is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StructureStyle {
    /// One relative path per line
    #[default]
    List,
    /// ASCII tree of checked files and their ancestors
    Tree,
}

/// Body of one file entry
#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    Content(String),
    Skipped(String),
}

impl Body {
    fn skip_annotation(reason: &str) -> String {
        format!("[Skipped: {}]", reason)
    }
}

/// A rendered snapshot
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Full output text
    pub text: String,
    /// Checked files emitted as entries
    pub files: usize,
    /// Entries emitted as a skip annotation instead of content
    pub skipped: usize,
}

/// Builds snapshots from a tree using a text reader
pub struct SnapshotBuilder {
    source: Arc<dyn FileSource>,
    format: OutputFormat,
    structure: StructureStyle,
}

impl SnapshotBuilder {
    /// Create a builder with the list structure style
    pub fn new(source: Arc<dyn FileSource>, format: OutputFormat) -> Self {
        Self {
            source,
            format,
            structure: StructureStyle::List,
        }
    }

    /// Use another structure style
    pub fn with_structure(mut self, structure: StructureStyle) -> Self {
        self.structure = structure;
        self
    }

    /// Render every checked file of `root`, in pre-order
    pub fn build(&self, root: &ProjectNode) -> io::Result<Snapshot> {
        let files = root.checked_files();
        let structure = match self.structure {
            StructureStyle::List => render_path_list(root),
            StructureStyle::Tree => render_ascii_tree(root),
        };

        // par_iter keeps input order on collect
        let bodies: Vec<Body> = files.par_iter().map(|node| self.read_body(node)).collect();

        let entries: Vec<(String, Body)> = files
            .iter()
            .map(|node| relative_path(&root.path, &node.path))
            .zip(bodies)
            .collect();
        let skipped = entries
            .iter()
            .filter(|(_, body)| matches!(body, Body::Skipped(_)))
            .count();

        let text = match self.format {
            OutputFormat::Markdown => write_markdown(&structure, &entries),
            OutputFormat::Xml => write_xml(&structure, &entries)?,
        };

        log::info!(
            "Built {:?} snapshot: {} files, {} skipped, {} characters",
            self.format,
            entries.len(),
            skipped,
            text.chars().count()
        );

        Ok(Snapshot {
            text,
            files: entries.len(),
            skipped,
        })
    }

    fn read_body(&self, node: &ProjectNode) -> Body {
        if let Some(meta) = node.meta {
            return Body::Skipped(Body::skip_annotation(&meta.to_string()));
        }

        match self.source.read_text(Path::new(&node.path)) {
            Some(content) => Body::Content(content),
            None => {
                log::debug!("Unreadable file: {}", node.path);
                Body::Skipped(Body::skip_annotation("Unreadable"))
            }
        }
    }
}

/// Build a list-style snapshot in one call
pub fn build_snapshot(
    root: &ProjectNode,
    format: OutputFormat,
    source: Arc<dyn FileSource>,
) -> io::Result<String> {
    SnapshotBuilder::new(source, format)
        .build(root)
        .map(|snapshot| snapshot.text)
}

fn write_markdown(structure: &str, entries: &[(String, Body)]) -> String {
    let mut output = format!("# Project Structure\n{}\n\n---\n", structure);

    for (relative, body) in entries {
        output.push_str(&format!("\n## {}\n", relative));
        match body {
            Body::Content(content) => {
                let lang = language_tag(relative);
                output.push_str(&format!("```{}\n{}\n```\n", lang, content));
            }
            Body::Skipped(annotation) => {
                output.push_str(annotation);
                output.push('\n');
            }
        }
    }

    output
}

fn write_xml(structure: &str, entries: &[(String, Body)]) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Start(BytesStart::new("documents")))?;
    write_document(&mut writer, 1, STRUCTURE_SOURCE, structure)?;

    for (offset, (relative, body)) in entries.iter().enumerate() {
        let content = match body {
            Body::Content(content) => content.as_str(),
            Body::Skipped(annotation) => annotation.as_str(),
        };
        write_document(&mut writer, offset + 2, relative, content)?;
    }

    writer.write_event(Event::End(BytesEnd::new("documents")))?;

    String::from_utf8(writer.into_inner()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write one `<document>`; text is inserted verbatim
fn write_document<W: Write>(
    writer: &mut Writer<W>,
    index: usize,
    source: &str,
    content: &str,
) -> io::Result<()> {
    let index = index.to_string();
    let mut start_tag = BytesStart::new("document");
    start_tag.push_attribute(("index", index.as_str()));
    writer.write_event(Event::Start(start_tag))?;

    writer.write_event(Event::Start(BytesStart::new("source")))?;
    writer.write_event(Event::Text(BytesText::from_escaped(source)))?;
    writer.write_event(Event::End(BytesEnd::new("source")))?;

    writer.write_event(Event::Start(BytesStart::new("document_content")))?;
    writer.write_event(Event::Text(BytesText::from_escaped(content)))?;
    writer.write_event(Event::End(BytesEnd::new("document_content")))?;

    writer.write_event(Event::End(BytesEnd::new("document")))?;

    Ok(())
}

fn meta_suffix(node: &ProjectNode) -> String {
    node.meta
        .map(|meta| format!(" ({})", meta))
        .unwrap_or_default()
}

/// Relative paths of checked files in pre-order, one per line
pub fn render_path_list(root: &ProjectNode) -> String {
    root.checked_files()
        .iter()
        .map(|node| format!("{}{}", relative_path(&root.path, &node.path), meta_suffix(node)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// ASCII tree of checked files and the directories leading to them
pub fn render_ascii_tree(root: &ProjectNode) -> String {
    let mut lines = vec![format!("{}/", root.name)];
    render_children(root, "", &mut lines);
    lines.join("\n")
}

fn has_checked_file(node: &ProjectNode) -> bool {
    node.iter().any(|n| n.is_file() && n.checked)
}

fn render_children(node: &ProjectNode, prefix: &str, lines: &mut Vec<String>) {
    let visible: Vec<&ProjectNode> = node.children.iter().filter(|c| has_checked_file(c)).collect();

    for (i, child) in visible.iter().enumerate() {
        let last = i + 1 == visible.len();
        let connector = if last { "└── " } else { "├── " };

        if child.is_dir() {
            lines.push(format!("{}{}{}/", prefix, connector, child.name));
            let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render_children(child, &nested, lines);
        } else {
            lines.push(format!("{}{}{}{}", prefix, connector, child.name, meta_suffix(child)));
        }
    }
}

/// Whole tree with a `[x]`/`[ ]` mark per node
pub fn render_checklist(root: &ProjectNode) -> String {
    let mut lines = vec![format!("{} {}/", mark(root), root.name)];
    render_marked(root, "", &mut lines);
    lines.join("\n")
}

fn mark(node: &ProjectNode) -> &'static str {
    if node.checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn render_marked(node: &ProjectNode, prefix: &str, lines: &mut Vec<String>) {
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == node.children.len();
        let connector = if last { "└── " } else { "├── " };
        let slash = if child.is_dir() { "/" } else { "" };
        lines.push(format!(
            "{}{}{} {}{}{}",
            prefix,
            connector,
            mark(child),
            child.name,
            slash,
            meta_suffix(child)
        ));

        if child.is_dir() {
            let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render_marked(child, &nested, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;
    use crate::types::FileMeta;
    use crate::utils::base_name;

    fn file(path: &str, meta: Option<FileMeta>) -> ProjectNode {
        ProjectNode::file(path, base_name(path), meta)
    }

    fn dir(path: &str, children: Vec<ProjectNode>) -> ProjectNode {
        ProjectNode::directory(path, base_name(path), children)
    }

    fn sample() -> (ProjectNode, Arc<dyn FileSource>) {
        let root = dir(
            "/p",
            vec![
                dir(
                    "/p/src",
                    vec![file("/p/src/main.rs", None), file("/p/src/logo.png", Some(FileMeta::Binary))],
                ),
                file("/p/notes.txt", None),
            ],
        );
        let mem = MemoryFs::new()
            .with_file("/p/src/main.rs", "fn main() {}")
            .with_file("/p/src/logo.png", "")
            .with_file("/p/notes.txt", "a < b & c");
        (root, Arc::new(mem))
    }

    #[test]
    fn test_markdown_with_skipped_binary() {
        let (root, source) = sample();
        let snapshot = SnapshotBuilder::new(source, OutputFormat::Markdown)
            .build(&root)
            .unwrap();

        let expected = "# Project Structure\n\
            src/main.rs\n\
            src/logo.png (Binary)\n\
            notes.txt\n\
            \n---\n\
            \n## src/main.rs\n\
            ```rust\nfn main() {}\n```\n\
            \n## src/logo.png\n\
            [Skipped: Binary]\n\
            \n## notes.txt\n\
            ```\na < b & c\n```\n";
        assert_eq!(snapshot.text, expected);
        assert_eq!(snapshot.files, 3);
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.text.matches("```rust").count(), 1);
    }

    #[test]
    fn test_unchecked_files_are_left_out() {
        let (mut root, source) = sample();
        root.find_mut("/p/src/main.rs").unwrap().checked = false;

        let text = build_snapshot(&root, OutputFormat::Markdown, source).unwrap();
        assert!(!text.contains("main.rs"));
        assert!(text.contains("## notes.txt"));
    }

    #[test]
    fn test_unreadable_file_annotation() {
        let root = dir("/p", vec![file("/p/gone.txt", None)]);
        let text = build_snapshot(&root, OutputFormat::Markdown, Arc::new(MemoryFs::new())).unwrap();
        assert!(text.ends_with("\n## gone.txt\n[Skipped: Unreadable]\n"));
    }

    #[test]
    fn test_xml_documents() {
        let (root, source) = sample();
        let text = build_snapshot(&root, OutputFormat::Xml, source).unwrap();

        assert!(text.starts_with("<documents>"));
        assert!(text.trim_end().ends_with("</documents>"));
        assert!(text.contains("<document index=\"1\">"));
        assert!(text.contains("<source>project_structure</source>"));
        assert!(text.contains("<document index=\"2\">"));
        assert!(text.contains("<source>src/main.rs</source>"));
        assert!(text.contains("<document_content>fn main() {}</document_content>"));
        assert!(text.contains("<document_content>[Skipped: Binary]</document_content>"));
        assert!(text.contains("<document index=\"4\">"));
        // content goes in verbatim
        assert!(text.contains("<document_content>a < b & c</document_content>"));
        assert!(!text.contains("&amp;"));
    }

    #[test]
    fn test_path_list_is_pre_order() {
        let root = dir(
            "/p",
            vec![
                dir("/p/b", vec![file("/p/b/z.rs", None), dir("/p/b/c", vec![file("/p/b/c/y.rs", None)])]),
                file("/p/a.rs", None),
                file("/p/big.log", Some(FileMeta::Large)),
            ],
        );
        assert_eq!(render_path_list(&root), "b/z.rs\nb/c/y.rs\na.rs\nbig.log (Large (>1MB))");
    }

    #[test]
    fn test_ascii_tree_prunes_unchecked_branches() {
        let mut root = dir(
            "/p",
            vec![
                dir("/p/src", vec![file("/p/src/lib.rs", None), file("/p/src/main.rs", None)]),
                dir("/p/docs", vec![file("/p/docs/guide.md", None)]),
                file("/p/Cargo.toml", None),
            ],
        );
        root.find_mut("/p/docs/guide.md").unwrap().checked = false;

        let expected = "p/\n\
            ├── src/\n\
            │   ├── lib.rs\n\
            │   └── main.rs\n\
            └── Cargo.toml";
        assert_eq!(render_ascii_tree(&root), expected);
    }

    #[test]
    fn test_checklist_shows_every_node() {
        let (mut root, _) = sample();
        root.find_mut("/p/notes.txt").unwrap().checked = false;
        root.checked = false;

        let expected = "[ ] p/\n\
            ├── [x] src/\n\
            │   ├── [x] main.rs\n\
            │   └── [x] logo.png (Binary)\n\
            └── [ ] notes.txt";
        assert_eq!(render_checklist(&root), expected);
    }

    #[test]
    fn test_tree_structure_in_snapshot() {
        let (root, source) = sample();
        let snapshot = SnapshotBuilder::new(source, OutputFormat::Markdown)
            .with_structure(StructureStyle::Tree)
            .build(&root)
            .unwrap();
        assert!(snapshot.text.starts_with("# Project Structure\np/\n├── src/\n"));
        assert!(snapshot.text.contains("│   └── logo.png (Binary)\n└── notes.txt\n\n---\n"));
    }
}
