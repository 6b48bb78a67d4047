/*!
 * Visibility policy: decides which paths make it into the project tree
 *
 * Rules are evaluated in order, first match wins:
 * hidden directory names, always-visible names, sensitive names (when
 * enabled), then the root `.gitignore` rules (when enabled and present).
 */

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::fs::FileSource;
use crate::utils::{base_name, normalize_path, relative_path, ALWAYS_VISIBLE, HIDDEN_DIRS, RULES_FILE_NAME};

/// Secret and credential file names
static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"^\.env($|\.)", r"\.pem$", r"\.key$", r"id_rsa", r"id_ed25519"]
        .iter()
        .map(|p| Regex::new(p).expect("sensitive pattern is valid"))
        .collect()
});

/// Options for building a [`VisibilityPolicy`]
#[derive(Debug, Clone)]
pub struct VisibilityOptions {
    /// Scan root; ignore rules are evaluated relative to it
    pub root: String,
    /// Honor the root `.gitignore`
    pub use_gitignore: bool,
    /// Hide secret and credential files
    pub exclude_sensitive: bool,
}

/// Outcome of evaluating one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Base name is a hidden directory name
    Hidden,
    /// Base name is allow-listed
    AlwaysVisible,
    /// Base name looks like a secret
    Sensitive,
    /// Matched by `.gitignore` rules
    IgnoredByRules,
    /// Nothing matched
    Visible,
}

impl Visibility {
    pub fn is_ignored(self) -> bool {
        matches!(self, Self::Hidden | Self::Sensitive | Self::IgnoredByRules)
    }
}

/// Returns true when a base name matches a sensitive pattern
pub fn is_sensitive_name(name: &str) -> bool {
    SENSITIVE_PATTERNS.iter().any(|re| re.is_match(name))
}

/// Load `.gitignore` rules from the root, if the file exists and parses
pub fn load_ignore_rules(root: &Path, source: &dyn FileSource) -> Option<Gitignore> {
    let text = source.read_text(&root.join(RULES_FILE_NAME))?;
    let mut builder = GitignoreBuilder::new(root);

    for line in text.lines() {
        if let Err(e) = builder.add_line(None, line) {
            log::warn!("Skipping invalid ignore rule {:?}: {}", line, e);
        }
    }

    match builder.build() {
        Ok(rules) => {
            log::debug!("Loaded {} ignore rules from {}", rules.num_ignores(), root.display());
            Some(rules)
        }
        Err(e) => {
            log::warn!("Failed to build ignore rules: {}", e);
            None
        }
    }
}

/// Pure visibility decision over pre-loaded rule state
#[derive(Debug, Clone)]
pub struct VisibilityPolicy {
    root: String,
    exclude_sensitive: bool,
    rules: Option<Gitignore>,
}

impl VisibilityPolicy {
    /// Build a policy, loading ignore rules through `source` when enabled
    pub fn new(options: VisibilityOptions, source: &dyn FileSource) -> Self {
        let root = normalize_path(&options.root);
        let rules = if options.use_gitignore {
            load_ignore_rules(Path::new(&root), source)
        } else {
            None
        };

        Self {
            root,
            exclude_sensitive: options.exclude_sensitive,
            rules,
        }
    }

    /// Whether `.gitignore` rules were found and are in effect
    pub fn has_rules(&self) -> bool {
        self.rules.is_some()
    }

    /// Evaluate the precedence chain for a path
    pub fn classify(&self, path: &str, is_dir: bool) -> Visibility {
        let normalized = normalize_path(path);
        let name = base_name(&normalized);

        if HIDDEN_DIRS.contains(&name) {
            return Visibility::Hidden;
        }

        if ALWAYS_VISIBLE.contains(&name) {
            return Visibility::AlwaysVisible;
        }

        if self.exclude_sensitive && is_sensitive_name(name) {
            return Visibility::Sensitive;
        }

        if let Some(rules) = &self.rules {
            let relative = relative_path(&self.root, &normalized);
            if !relative.is_empty()
                && !Path::new(&relative).has_root()
                && rules
                    .matched_path_or_any_parents(&relative, is_dir)
                    .is_ignore()
            {
                return Visibility::IgnoredByRules;
            }
        }

        Visibility::Visible
    }

    /// Decide whether an entry of known kind is left out of the tree
    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        self.classify(path, is_dir).is_ignored()
    }

    /// Decide whether a path is left out of the tree
    ///
    /// Directory-only rules (`build/`) need [`Self::is_ignored`] with the
    /// entry kind; paths beneath an ignored directory match either way.
    pub fn should_ignore(&self, path: &str) -> bool {
        self.is_ignored(path, false)
    }
}
