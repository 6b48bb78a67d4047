/*!
 * Configuration handling for snapfs
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use clap_complete::Shell;

use crate::ensure;
use crate::error::Result;
use crate::scanner::ScanOptions;
use crate::store::UiState;
use crate::tokenizer::{Model, DEFAULT_TOKEN_LIMIT};
use crate::utils::path_to_string;
use crate::writer::{OutputFormat, StructureStyle};

/// What to do when the estimate exceeds the token limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OverflowPolicy {
    /// Write nothing and exit (default)
    #[default]
    Cancel,
    /// Split into `# Part N` sections sized to the limit
    Split,
    /// Write the oversized snapshot anyway
    Ignore,
}

/// How the selection is seeded after scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSource {
    /// Saved selection, everything else checked
    Saved,
    /// Only files changed in the git working tree
    GitChanges,
    /// Preset of the detected framework
    DetectedPreset,
    /// Preset of a named framework
    NamedPreset(String),
}

/// Command-line arguments for snapfs
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "snapfs",
    version = env!("CARGO_PKG_VERSION"),
    about = "Select project files and export them as an AI-ready snapshot",
    long_about = "Scans a project into a selection tree, applies framework presets, saved selections or git changes, and writes the checked files as one Markdown or XML snapshot sized for an LLM context window."
)]
pub struct Args {
    /// Project directory to snapshot
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Output file name (default: .snapfs.snapshot.md or .xml)
    pub output_file: Option<String>,

    /// Apply the root .gitignore (remembered per project)
    #[clap(long, action = ArgAction::Set, value_name = "BOOL")]
    pub use_gitignore: Option<bool>,

    /// Hide credential-like files such as .env and *.pem (remembered per project)
    #[clap(long, action = ArgAction::Set, value_name = "BOOL")]
    pub exclude_sensitive: Option<bool>,

    /// Snapshot format (remembered per project)
    #[clap(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Prompt template id (remembered per project)
    #[clap(long, value_name = "ID")]
    pub template: Option<String>,

    /// JSON file with custom templates: [{"id", "label", "description", "prompt"}]
    #[clap(long, value_name = "FILE")]
    pub templates: Option<String>,

    /// List available templates and exit
    #[clap(long)]
    pub list_templates: bool,

    /// Target model; sets the token limit, and xml output for Claude
    #[clap(long, value_enum)]
    pub model: Option<Model>,

    /// Token limit for the snapshot (overrides --model)
    #[clap(long, value_name = "TOKENS")]
    pub token_limit: Option<usize>,

    /// What to do when the snapshot exceeds the token limit
    #[clap(long, value_enum, default_value_t = OverflowPolicy::default())]
    pub on_overflow: OverflowPolicy,

    /// Structure summary style
    #[clap(long, value_enum, default_value_t = StructureStyle::default())]
    pub structure: StructureStyle,

    /// Select only files changed in the git working tree
    #[clap(long, conflicts_with_all = ["preset", "framework"])]
    pub git_changes: bool,

    /// Detect the framework and apply its preset
    #[clap(long, conflicts_with = "framework")]
    pub preset: bool,

    /// Apply the preset of a framework by id (next, rust, django, ...)
    #[clap(long, value_name = "ID")]
    pub framework: Option<String>,

    /// Print the detected framework and exit
    #[clap(long)]
    pub detect: bool,

    /// Check these paths (relative to the project) and everything below them
    #[clap(long, value_delimiter = ',', value_name = "PATH")]
    pub select: Vec<String>,

    /// Uncheck these paths (relative to the project) and everything below them
    #[clap(long, value_delimiter = ',', value_name = "PATH")]
    pub deselect: Vec<String>,

    /// Check every file before applying --select/--deselect
    #[clap(long, conflicts_with = "deselect_all")]
    pub select_all: bool,

    /// Uncheck every file before applying --select/--deselect
    #[clap(long)]
    pub deselect_all: bool,

    /// Print the selection tree and exit
    #[clap(long)]
    pub show_tree: bool,

    /// Copy output to clipboard
    #[clap(long, help = "Copy output to system clipboard")]
    pub clip: bool,

    /// Print the snapshot to stdout instead of writing a file
    #[clap(long)]
    pub stdout: bool,

    /// Number of threads to use for reading files
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Do not read or write the saved project state
    #[clap(long)]
    pub no_save: bool,

    /// Forget the saved selection before scanning
    #[clap(long)]
    pub reset: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// No logging at all
    #[clap(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Project directory
    pub target_dir: PathBuf,

    /// Output file path
    pub output_file: PathBuf,

    /// Apply the root .gitignore
    pub use_gitignore: bool,

    /// Hide sensitive files
    pub exclude_sensitive: bool,

    /// Snapshot format
    pub format: OutputFormat,

    /// Structure summary style
    pub structure: StructureStyle,

    /// Template id
    pub template_id: String,

    /// Custom templates file
    pub templates_file: Option<PathBuf>,

    /// Token limit
    pub token_limit: usize,

    /// Oversized output policy
    pub on_overflow: OverflowPolicy,

    /// How the selection is seeded
    pub selection_source: SelectionSource,

    /// Paths to check after seeding
    pub select: Vec<String>,

    /// Paths to uncheck after seeding
    pub deselect: Vec<String>,

    /// Check everything first
    pub select_all: bool,

    /// Uncheck everything first
    pub deselect_all: bool,

    /// Copy output to clipboard
    pub clip: bool,

    /// Print to stdout instead of a file
    pub stdout: bool,

    /// Number of threads to use for reading files
    pub num_threads: usize,

    /// Forget the saved selection
    pub reset: bool,
}

impl Config {
    /// Create configuration from command-line arguments and saved preferences
    pub fn from_args(args: Args, saved: &UiState) -> Self {
        let format = match (args.format, args.model) {
            (Some(format), _) => format,
            (None, Some(model)) if model.is_claude() => OutputFormat::Xml,
            (None, _) => saved.output_format,
        };

        let token_limit = args
            .token_limit
            .or_else(|| args.model.map(|m| m.token_limit()))
            .unwrap_or(DEFAULT_TOKEN_LIMIT);

        let selection_source = if args.git_changes {
            SelectionSource::GitChanges
        } else if let Some(id) = args.framework {
            SelectionSource::NamedPreset(id)
        } else if args.preset {
            SelectionSource::DetectedPreset
        } else {
            SelectionSource::Saved
        };

        let output_file = args
            .output_file
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(default_output_name(format)));

        Self {
            target_dir: PathBuf::from(args.directory_path),
            output_file,
            use_gitignore: args.use_gitignore.unwrap_or(saved.use_gitignore),
            exclude_sensitive: args.exclude_sensitive.unwrap_or(saved.exclude_sensitive),
            format,
            structure: args.structure,
            template_id: args.template.unwrap_or_else(|| saved.template_id.clone()),
            templates_file: args.templates.map(PathBuf::from),
            token_limit,
            on_overflow: args.on_overflow,
            selection_source,
            select: args.select,
            deselect: args.deselect,
            select_all: args.select_all,
            deselect_all: args.deselect_all,
            clip: args.clip,
            stdout: args.stdout,
            num_threads: args.threads,
            reset: args.reset,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.target_dir.is_dir(),
            PathNotFound,
            "Target directory not found: {}",
            self.target_dir.display()
        );

        if !self.stdout {
            if let Some(parent) = self.output_file.parent() {
                ensure!(
                    parent.as_os_str().is_empty() || parent.exists(),
                    PathNotFound,
                    "Output directory not found: {}",
                    parent.display()
                );
            }
        }

        if let Some(path) = &self.templates_file {
            ensure!(path.is_file(), PathNotFound, "Templates file not found: {}", path.display());
        }

        ensure!(self.token_limit > 0, InvalidArgument, "Token limit must be greater than zero");
        ensure!(self.num_threads > 0, InvalidArgument, "Thread count must be greater than zero");

        Ok(())
    }

    /// Scanner options; the output file itself is never scanned
    pub fn scan_options(&self) -> ScanOptions {
        let mut options = ScanOptions::new(&self.target_dir);
        options.use_gitignore = self.use_gitignore;
        options.exclude_sensitive = self.exclude_sensitive;
        if let Some(output) = absolute_output_path(&self.output_file) {
            options.skip_paths.push(output);
        }
        options
    }

    /// Preferences to remember for the next run
    pub fn ui_state(&self) -> UiState {
        UiState {
            use_gitignore: self.use_gitignore,
            exclude_sensitive: self.exclude_sensitive,
            output_format: self.format,
            template_id: self.template_id.clone(),
        }
    }
}

/// Default output file name for a format
pub fn default_output_name(format: OutputFormat) -> String {
    format!(".snapfs.snapshot.{}", format.extension())
}

/// Log level for `-v` repetitions, or off when quiet
pub fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    if quiet {
        return log::LevelFilter::Off;
    }
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn absolute_output_path(output: &Path) -> Option<String> {
    let name = output.file_name()?;
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent = fs::canonicalize(parent).ok()?;
    Some(path_to_string(&parent.join(name)))
}
