/*!
 * Directory scanning: builds the selection tree
 */

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use indicatif::ProgressBar;

use crate::fs::FileSource;
use crate::types::{FileMeta, ProjectNode};
use crate::utils::{
    base_name, extension_of, normalize_path, path_to_string, relative_path, BINARY_EXTENSIONS,
    MAX_FILE_SIZE, RULES_FILE_NAME,
};
use crate::visibility::{VisibilityOptions, VisibilityPolicy};

/// Options for one scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory to scan
    pub root: PathBuf,
    /// Honor the root `.gitignore`
    pub use_gitignore: bool,
    /// Hide secret and credential files
    pub exclude_sensitive: bool,
    /// Absolute paths never added to the tree (e.g. our own output file)
    pub skip_paths: Vec<String>,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            use_gitignore: true,
            exclude_sensitive: true,
            skip_paths: Vec::new(),
        }
    }
}

/// Scanner statistics
#[derive(Debug, Clone, Default)]
pub struct ScannerStatistics {
    /// Directories kept in the tree
    pub directories: usize,
    /// Files kept in the tree
    pub files: usize,
    /// Entries left out by the visibility policy
    pub ignored: usize,
    /// Entries skipped because they could not be listed or inspected
    pub unreadable: usize,
    /// Files kept with a binary marker
    pub binary_files: usize,
    /// Root-relative paths of files kept with a size marker
    pub large_files: Vec<String>,
}

impl ScannerStatistics {
    /// Warning text about content-excluded large files, if any
    pub fn large_files_notice(&self) -> Option<String> {
        if self.large_files.is_empty() {
            return None;
        }

        let preview = self
            .large_files
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let suffix = if self.large_files.len() > 3 {
            format!("...and {} more", self.large_files.len() - 3)
        } else {
            String::new()
        };

        Some(format!(
            "{} large files (>1MB) will be skipped in the snapshot: {}{}",
            self.large_files.len(),
            preview,
            suffix
        ))
    }
}

/// Scanner for directory contents
pub struct Scanner {
    /// Scan options
    options: ScanOptions,
    /// Filesystem access
    source: Arc<dyn FileSource>,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Scanner statistics
    statistics: Mutex<ScannerStatistics>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(options: ScanOptions, source: Arc<dyn FileSource>, progress: Arc<ProgressBar>) -> Self {
        Self {
            options,
            source,
            progress,
            statistics: Mutex::new(ScannerStatistics::default()),
        }
    }

    /// Get scanner statistics
    pub fn get_statistics(&self) -> ScannerStatistics {
        self.statistics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, update: impl FnOnce(&mut ScannerStatistics)) {
        let mut stats = self
            .statistics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        update(&mut stats);
    }

    /// Absolute, slash-normalized form of the scan root
    pub fn root_path(&self) -> String {
        let resolved = self
            .source
            .canonicalize(&self.options.root)
            .unwrap_or_else(|_| self.options.root.clone());
        path_to_string(&resolved)
    }

    /// Scan the root and return the tree
    ///
    /// Returns `None` when nothing under the root survives filtering. The
    /// statistics are reset on every call.
    pub fn scan(&self) -> Option<ProjectNode> {
        self.record(|stats| *stats = ScannerStatistics::default());

        let root = self.root_path();
        let policy = VisibilityPolicy::new(
            VisibilityOptions {
                root: root.clone(),
                use_gitignore: self.options.use_gitignore,
                exclude_sensitive: self.options.exclude_sensitive,
            },
            self.source.as_ref(),
        );

        log::debug!(
            "Scanning {} (gitignore: {}, sensitive excluded: {})",
            root,
            policy.has_rules(),
            self.options.exclude_sensitive
        );

        let mut ancestors = Vec::new();
        let tree = self.scan_directory(&root, &root, &policy, &mut ancestors);

        let stats = self.get_statistics();
        log::info!(
            "Scanned {}: {} files, {} directories, {} ignored",
            root,
            stats.files,
            stats.directories,
            stats.ignored
        );

        tree
    }

    /// Scan a directory; `None` when it has no qualifying children
    fn scan_directory(
        &self,
        root: &str,
        dir: &str,
        policy: &VisibilityPolicy,
        ancestors: &mut Vec<PathBuf>,
    ) -> Option<ProjectNode> {
        let dir_path = Path::new(dir);

        let identity = self
            .source
            .canonicalize(dir_path)
            .unwrap_or_else(|_| dir_path.to_path_buf());
        if ancestors.contains(&identity) {
            log::warn!("Skipping {}: directory cycle", dir);
            return None;
        }

        let entries = match self.source.list_entries(dir_path) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Cannot list {}: {}", dir, e);
                self.record(|stats| stats.unreadable += 1);
                return None;
            }
        };

        ancestors.push(identity);
        let mut children = Vec::new();

        for entry in entries {
            let full_path = normalize_path(&format!("{}/{}", dir.trim_end_matches('/'), entry.name));

            if entry.name != RULES_FILE_NAME && policy.is_ignored(&full_path, entry.is_dir) {
                log::trace!("Ignoring {}", full_path);
                self.record(|stats| stats.ignored += 1);
                continue;
            }

            if self.options.skip_paths.iter().any(|p| *p == full_path) {
                continue;
            }

            if entry.is_dir {
                if let Some(child) = self.scan_directory(root, &full_path, policy, ancestors) {
                    children.push(child);
                }
                continue;
            }

            if let Some(file) = self.process_file(root, &full_path, &entry.name) {
                children.push(file);
            }
        }

        ancestors.pop();

        if children.is_empty() {
            return None;
        }

        self.record(|stats| stats.directories += 1);
        Some(ProjectNode::directory(dir, base_name(dir), children))
    }

    /// Build a file node, classifying it by size and extension
    fn process_file(&self, root: &str, path: &str, name: &str) -> Option<ProjectNode> {
        let stat = match self.source.stat(Path::new(path)) {
            Ok(stat) => stat,
            Err(e) => {
                log::debug!("Cannot stat {}: {}", path, e);
                self.record(|stats| stats.unreadable += 1);
                return None;
            }
        };

        self.progress.inc(1);
        let display_name = if name.len() > 40 {
            let mut start = name.len() - 37;
            while !name.is_char_boundary(start) {
                start += 1;
            }
            format!("...{}", &name[start..])
        } else {
            name.to_string()
        };
        self.progress
            .set_message(format!("Current file: {}", display_name));

        let meta = if stat.size > MAX_FILE_SIZE {
            Some(FileMeta::Large)
        } else if BINARY_EXTENSIONS.contains(&extension_of(name).as_str()) {
            Some(FileMeta::Binary)
        } else {
            None
        };

        self.record(|stats| {
            stats.files += 1;
            match meta {
                Some(FileMeta::Large) => stats.large_files.push(relative_path(root, path)),
                Some(FileMeta::Binary) => stats.binary_files += 1,
                None => {}
            }
        });

        Some(ProjectNode::file(path, name, meta))
    }
}

/// Scan with a hidden progress bar
pub fn scan_tree(options: ScanOptions, source: Arc<dyn FileSource>) -> Option<ProjectNode> {
    Scanner::new(options, source, Arc::new(ProgressBar::hidden())).scan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{DirEntryInfo, FileStat, MemoryFs};
    use std::io;

    fn scan_memory(mem: MemoryFs, use_gitignore: bool) -> Option<ProjectNode> {
        let mut options = ScanOptions::new("/p");
        options.use_gitignore = use_gitignore;
        scan_tree(options, Arc::new(mem))
    }

    fn child_names(node: &ProjectNode) -> Vec<&str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_hidden_directory_is_absent() {
        let mem = MemoryFs::new()
            .with_file("/p/node_modules/lib/index.js", "x")
            .with_file("/p/a.txt", "a");

        let root = scan_memory(mem, true).unwrap();
        assert_eq!(root.path, "/p");
        assert_eq!(child_names(&root), vec!["a.txt"]);
    }

    #[test]
    fn test_empty_directories_are_pruned() {
        let mem = MemoryFs::new()
            .with_dir("/p/empty")
            .with_file("/p/only_ignored/.env", "SECRET=1")
            .with_file("/p/b.txt", "b");

        let root = scan_memory(mem, true).unwrap();
        assert_eq!(child_names(&root), vec!["b.txt"]);
    }

    #[test]
    fn test_gitignore_rules_and_rules_file_kept() {
        let mem = MemoryFs::new()
            .with_file("/p/.gitignore", "*.log\n.gitignore\n")
            .with_file("/p/app.log", "log")
            .with_file("/p/app.txt", "txt");

        let root = scan_memory(mem, true).unwrap();
        assert_eq!(child_names(&root), vec![".gitignore", "app.txt"]);
    }

    #[test]
    fn test_gitignore_disabled_keeps_everything() {
        let mem = MemoryFs::new()
            .with_file("/p/.gitignore", "*.log\n")
            .with_file("/p/app.log", "log");

        let root = scan_memory(mem, false).unwrap();
        assert_eq!(child_names(&root), vec![".gitignore", "app.log"]);
    }

    #[test]
    fn test_meta_classification() {
        let mem = MemoryFs::new()
            .with_file("/p/logo.PNG", "png")
            .with_sized_file("/p/dump.sql", MAX_FILE_SIZE + 1)
            .with_file("/p/main.rs", "fn main() {}");

        let options = ScanOptions::new("/p");
        let scanner = Scanner::new(options, Arc::new(mem), Arc::new(ProgressBar::hidden()));
        let root = scanner.scan().unwrap();

        let meta: Vec<_> = root.children.iter().map(|c| (c.name.as_str(), c.meta)).collect();
        assert_eq!(
            meta,
            vec![
                ("dump.sql", Some(FileMeta::Large)),
                ("logo.PNG", Some(FileMeta::Binary)),
                ("main.rs", None),
            ]
        );
        assert!(root.iter().all(|n| n.checked));

        let stats = scanner.get_statistics();
        assert_eq!(stats.files, 3);
        assert_eq!(stats.binary_files, 1);
        assert_eq!(stats.large_files, vec!["dump.sql".to_string()]);
        assert!(stats.large_files_notice().unwrap().contains("dump.sql"));
    }

    #[test]
    fn test_nothing_to_show() {
        let mem = MemoryFs::new().with_file("/p/.git/config", "[core]");
        assert!(scan_memory(mem, true).is_none());
    }

    #[test]
    fn test_skip_paths() {
        let mem = MemoryFs::new()
            .with_file("/p/out.md", "old snapshot")
            .with_file("/p/a.txt", "a");
        let mut options = ScanOptions::new("/p");
        options.skip_paths = vec!["/p/out.md".to_string()];

        let root = scan_tree(options, Arc::new(mem)).unwrap();
        assert_eq!(child_names(&root), vec!["a.txt"]);
    }

    struct BrokenStat(MemoryFs);

    impl FileSource for BrokenStat {
        fn list_entries(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
            self.0.list_entries(dir)
        }

        fn stat(&self, path: &Path) -> io::Result<FileStat> {
            if path.ends_with("broken.txt") {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            self.0.stat(path)
        }

        fn read_text(&self, path: &Path) -> Option<String> {
            self.0.read_text(path)
        }
    }

    #[test]
    fn test_stat_failure_skips_entry() {
        let mem = MemoryFs::new()
            .with_file("/p/broken.txt", "x")
            .with_file("/p/fine.txt", "y");
        let scanner = Scanner::new(
            ScanOptions::new("/p"),
            Arc::new(BrokenStat(mem)),
            Arc::new(ProgressBar::hidden()),
        );

        let root = scanner.scan().unwrap();
        assert_eq!(child_names(&root), vec!["fine.txt"]);
        assert_eq!(scanner.get_statistics().unreadable, 1);
    }

    #[test]
    fn test_large_files_notice_truncates() {
        let stats = ScannerStatistics {
            large_files: (1..=5).map(|i| format!("f{}.bin", i)).collect(),
            ..Default::default()
        };
        let notice = stats.large_files_notice().unwrap();
        assert!(notice.starts_with("5 large files"));
        assert!(notice.ends_with("f1.bin, f2.bin, f3.bin...and 2 more"));
        assert!(ScannerStatistics::default().large_files_notice().is_none());
    }
}
