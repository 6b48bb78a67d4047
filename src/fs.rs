//! Filesystem capabilities consumed by the scanner and the snapshot writer.
//!
//! The core only needs three things from the outside world: a directory
//! listing, a size lookup and a text read. Keeping them behind a trait lets the
//! tree algorithms run against an in-memory fixture as easily as the disk.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One immediate entry of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    /// Base name
    pub name: String,
    /// Whether the entry is (or links to) a directory
    pub is_dir: bool,
}

/// Size information for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes
    pub size: u64,
}

/// Read access to a project tree
pub trait FileSource: Send + Sync {
    /// Lists the immediate entries of a directory, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Returns size information for a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be inspected.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Reads a file as UTF-8 text; `None` when unreadable or not text.
    fn read_text(&self, path: &Path) -> Option<String>;

    /// Resolves a directory to the identity used for cycle detection.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(path.to_path_buf())
    }
}

/// Local disk access
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSource for LocalFs {
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) => entries.push(DirEntryInfo {
                    name: entry.file_name().to_string_lossy().to_string(),
                    is_dir: entry.file_type().is_dir(),
                }),
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => log::debug!("Skipping entry in {}: {}", dir.display(), e),
            }
        }

        Ok(entries)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = fs::metadata(path)?;
        Ok(FileStat {
            size: metadata.len(),
        })
    }

    fn read_text(&self, path: &Path) -> Option<String> {
        match fs::read(path) {
            Ok(bytes) => String::from_utf8(bytes).ok(),
            Err(e) => {
                log::debug!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    size: u64,
    content: Option<String>,
}

/// In-memory project tree, for tests and embedders that already hold content
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeMap<PathBuf, MemoryFile>,
    dirs: BTreeSet<PathBuf>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text file; its size is the content length
    pub fn with_file(mut self, path: impl AsRef<Path>, content: &str) -> Self {
        self.files.insert(
            path.as_ref().to_path_buf(),
            MemoryFile {
                size: content.len() as u64,
                content: Some(content.to_string()),
            },
        );
        self
    }

    /// Add a file that reports `size` bytes but cannot be read
    pub fn with_sized_file(mut self, path: impl AsRef<Path>, size: u64) -> Self {
        self.files.insert(
            path.as_ref().to_path_buf(),
            MemoryFile {
                size,
                content: None,
            },
        );
        self
    }

    /// Add an empty directory
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.dirs.insert(path.as_ref().to_path_buf());
        self
    }
}

impl FileSource for MemoryFs {
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut seen: BTreeMap<String, bool> = BTreeMap::new();

        for (path, explicit_dir) in self
            .files
            .keys()
            .map(|p| (p, false))
            .chain(self.dirs.iter().map(|p| (p, true)))
        {
            let Ok(rest) = path.strip_prefix(dir) else {
                continue;
            };
            let mut components = rest.components();
            if let Some(first) = components.next() {
                let name = first.as_os_str().to_string_lossy().to_string();
                let is_dir = explicit_dir || components.next().is_some();
                *seen.entry(name).or_insert(false) |= is_dir;
            }
        }

        if seen.is_empty() && !self.dirs.contains(dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No such directory: {}", dir.display()),
            ));
        }

        Ok(seen
            .into_iter()
            .map(|(name, is_dir)| DirEntryInfo { name, is_dir })
            .collect())
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        self.files
            .get(path)
            .map(|file| FileStat { size: file.size })
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("No such file: {}", path.display()),
                )
            })
    }

    fn read_text(&self, path: &Path) -> Option<String> {
        self.files.get(path).and_then(|file| file.content.clone())
    }
}
