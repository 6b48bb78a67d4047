/*!
 * Utility functions and fixed tables for snapfs
 */

use std::path::Path;

/// Files above this size keep their node but lose their content (1 MiB)
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Conventional version-control ignore file, always shown in the tree
pub const RULES_FILE_NAME: &str = ".gitignore";

/// Directory names hidden unconditionally
pub const HIDDEN_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    ".svelte-kit",
    "coverage",
    "logs",
    "tmp",
    ".cache",
    ".idea",
    ".vscode",
];

/// Base names that stay visible even when ignore rules match them
pub const ALWAYS_VISIBLE: &[&str] = &[
    ".gitignore",
    "package.json",
    "tsconfig.json",
    "jsconfig.json",
    "README.md",
];

/// Extensions (lowercase, with dot) treated as binary content
pub const BINARY_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".ico", ".svg", ".webp", ".zip", ".tar", ".gz", ".7z",
    ".rar", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".exe", ".dll", ".so",
    ".dylib", ".bin", ".iso",
];

/// Replace backslashes with forward slashes
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Lossy, slash-normalized string form of a path
pub fn path_to_string(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}

/// Base name of a slash-normalized path
pub fn base_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

/// Path of `path` relative to `root`, both slash-normalized
///
/// Returns an empty string for the root itself and the input unchanged when it
/// is not under `root`.
pub fn relative_path(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    if path == root {
        return String::new();
    }
    match path.strip_prefix(root) {
        Some(rest) if rest.starts_with('/') => rest[1..].to_string(),
        _ => path.to_string(),
    }
}

/// Lowercase extension including the leading dot, or empty
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Code fence tag for a file name; empty when unknown
pub fn language_tag(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or("").to_lowercase();

    match ext.as_str() {
        "ts" => "ts",
        "tsx" => "tsx",
        "js" => "js",
        "jsx" => "jsx",
        "json" => "json",
        "md" => "md",
        "yml" | "yaml" => "yaml",
        "lua" => "lua",
        "py" => "py",
        "go" => "go",
        "rs" => "rust",
        "java" => "java",
        "php" => "php",
        "sql" => "sql",
        "env" => "env",
        "sh" => "bash",
        "toml" => "toml",
        "html" => "html",
        "css" => "css",
        _ => "",
    }
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Format a count with thousands separators
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
