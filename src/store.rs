/*!
 * Per-project state kept between runs: the selection side-table and the
 * last used preferences
 */

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapError};
use crate::selection::SelectionMap;
use crate::template::DEFAULT_TEMPLATE_ID;
use crate::writer::OutputFormat;

/// Preferences remembered per project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiState {
    /// Apply the root `.gitignore`
    pub use_gitignore: bool,
    /// Hide credential-like files
    pub exclude_sensitive: bool,
    /// Snapshot format
    pub output_format: OutputFormat,
    /// Template applied to the snapshot
    pub template_id: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            use_gitignore: true,
            exclude_sensitive: true,
            output_format: OutputFormat::Markdown,
            template_id: DEFAULT_TEMPLATE_ID.to_string(),
        }
    }
}

/// Everything stored for one project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFile {
    /// Node path → checked
    pub selection: SelectionMap,
    /// Preferences
    pub ui: UiState,
}

/// Location of the state file for a project root
pub fn state_path(project_dir: &Path) -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| SnapError::Config("Could not determine cache directory".to_string()))?
        .join("snapfs");

    let canonical_path = fs::canonicalize(project_dir)
        .map_err(|e| SnapError::Config(format!("Invalid project directory: {}", e)))?;

    let path_str = canonical_path.to_string_lossy().to_string();
    let sanitized_path = path_str.replace(
        |c: char| !c.is_alphanumeric() && c != '_' && c != '-' && c != '.',
        "_",
    );

    Ok(cache_dir.join(format!("{}.state.json", sanitized_path)))
}

/// Reads and writes one state file
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store for a project root, under the user cache directory
    pub fn for_project(project_dir: &Path) -> Result<Self> {
        Ok(Self::at(state_path(project_dir)?))
    }

    /// Store at an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// State file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state; a missing or unreadable file gives defaults
    pub fn load(&self) -> StateFile {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                log::debug!("No saved state at {}: {}", self.path.display(), e);
                return StateFile::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring corrupt state file {}: {}", self.path.display(), e);
            StateFile::default()
        })
    }

    /// Write the state, creating parent directories as needed
    pub fn save(&self, state: &StateFile) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, content)?;
        log::debug!(
            "Saved {} selection entries to {}",
            state.selection.len(),
            self.path.display()
        );

        Ok(())
    }

    /// Delete the state file if it exists
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
