/*!
 * Command-line interface for snapfs
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;

use snapfs::clipboard::copy_to_clipboard;
use snapfs::config::{log_level, Args, Config, OverflowPolicy, SelectionSource};
use snapfs::framework;
use snapfs::fs::{FileSource, LocalFs};
use snapfs::git;
use snapfs::report::{Destination, SnapshotReport};
use snapfs::scanner::Scanner;
use snapfs::selection::{
    apply_git_filter, apply_preset, collect_selection, restore_selection, set_subtree,
    toggle_relative, SelectionMap,
};
use snapfs::splitter::{join_parts, split_snapshot};
use snapfs::store::{StateFile, StateStore};
use snapfs::template::{load_custom_templates, TemplateCatalog};
use snapfs::tokenizer::estimate_tokens;
use snapfs::types::ProjectNode;
use snapfs::writer::{render_checklist, SnapshotBuilder};

fn setup_logging(quiet: bool, verbose: u8) {
    let level = log_level(verbose, quiet);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", level);
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        generate(shell, &mut Args::command(), "snapfs", &mut io::stdout());
        return Ok(());
    }

    setup_logging(args.quiet, args.verbose);
    let quiet = args.quiet;
    let detect_only = args.detect;
    let list_templates = args.list_templates;
    let show_tree = args.show_tree;

    // Saved preferences feed the defaults of the configuration
    let store = if args.no_save {
        None
    } else {
        match StateStore::for_project(Path::new(&args.directory_path)) {
            Ok(store) => Some(store),
            Err(e) => {
                log::warn!("Project state disabled: {}", e);
                None
            }
        }
    };
    let mut state = store.as_ref().map(StateStore::load).unwrap_or_default();

    let config = Config::from_args(args, &state.ui);
    config.validate()?;

    let catalog = load_catalog(&config)?;
    if list_templates {
        for template in catalog.iter() {
            println!("{:<12} {:<32} {}", template.id, template.label, template.description);
        }
        return Ok(());
    }

    let source: Arc<dyn FileSource> = Arc::new(LocalFs);

    if detect_only {
        let root = fs::canonicalize(&config.target_dir)?;
        match framework::detect(&root, source.as_ref()) {
            Some(def) => println!("{} ({})", def.name, def.id),
            None => println!("No framework detected"),
        }
        return Ok(());
    }

    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        log::warn!("Failed to set thread pool size: {}", e);
    }

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} ⏱️  {elapsed_precise}")
        {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    };
    progress.set_prefix("📊 Scanning");
    progress.set_message(format!("📂 {}", config.target_dir.display()));

    let start_time = Instant::now();

    let scanner = Scanner::new(config.scan_options(), source.clone(), Arc::new(progress.clone()));
    let mut root = match scanner.scan() {
        Some(root) => root,
        None => {
            progress.finish_and_clear();
            log::warn!("Nothing to snapshot in {}", config.target_dir.display());
            return Ok(());
        }
    };

    if let Some(notice) = scanner.get_statistics().large_files_notice() {
        log::warn!("{}", notice);
    }

    if config.reset {
        state.selection.clear();
    }
    let framework_name = seed_selection(&config, &mut root, &state.selection, source.as_ref())?;
    apply_overrides(&config, &mut root);

    if let Some(store) = &store {
        save_state(store, &mut state, &config, &root);
    }

    if show_tree {
        progress.finish_and_clear();
        println!("{}", render_checklist(&root));
        return Ok(());
    }

    progress.set_prefix("📝 Building");
    progress.set_message(format!("{:?} snapshot", config.format));

    let snapshot = SnapshotBuilder::new(source, config.format)
        .with_structure(config.structure)
        .build(&root)?;
    progress.finish_and_clear();

    if snapshot.files == 0 {
        log::warn!("No files are selected; the snapshot only has the structure header");
    }

    let text = catalog.apply(&snapshot.text, &config.template_id);
    let estimate = estimate_tokens(&text, config.token_limit);

    let mut report = SnapshotReport {
        destination: Destination::None,
        copied: false,
        duration: start_time.elapsed(),
        framework: framework_name,
        template: config.template_id.clone(),
        files_selected: snapshot.files,
        files_skipped: snapshot.skipped,
        estimate,
        bytes: 0,
        parts: None,
    };

    let text = if estimate.within_limit {
        text
    } else {
        match config.on_overflow {
            OverflowPolicy::Cancel => {
                log::warn!(
                    "Snapshot is about {} tokens, over the limit of {}; nothing written (see --on-overflow)",
                    estimate.tokens,
                    estimate.limit
                );
                if !quiet {
                    report.print();
                }
                return Ok(());
            }
            OverflowPolicy::Split => {
                let chunks = split_snapshot(&text, config.token_limit);
                log::info!("Split snapshot into {} parts", chunks.len());
                report.parts = Some(chunks.len());
                join_parts(&chunks)
            }
            OverflowPolicy::Ignore => {
                log::warn!(
                    "Snapshot is about {} tokens, over the limit of {}",
                    estimate.tokens,
                    estimate.limit
                );
                text
            }
        }
    };

    report.bytes = text.len();
    if config.stdout {
        print!("{}", text);
        report.destination = Destination::Stdout;
    } else {
        fs::write(&config.output_file, &text)?;
        report.destination = Destination::File(config.output_file.display().to_string());
    }

    if config.clip {
        match copy_to_clipboard(&text) {
            Ok(provider) => {
                log::info!("Copied snapshot with {}", provider.program());
                report.copied = true;
            }
            Err(e) => log::warn!("Failed to copy to clipboard: {}", e),
        }
    }

    report.duration = start_time.elapsed();
    if !quiet {
        report.print();
    }

    Ok(())
}

fn load_catalog(config: &Config) -> io::Result<TemplateCatalog> {
    let catalog = TemplateCatalog::new();
    match &config.templates_file {
        Some(path) => {
            let custom = load_custom_templates(path)?;
            Ok(catalog.with_custom(custom)?)
        }
        None => Ok(catalog),
    }
}

/// Seed `checked` flags; returns the name of the applied framework preset
fn seed_selection(
    config: &Config,
    root: &mut ProjectNode,
    saved: &SelectionMap,
    source: &dyn FileSource,
) -> io::Result<Option<String>> {
    let root_path = PathBuf::from(&root.path);

    match &config.selection_source {
        SelectionSource::Saved => {
            let restored = restore_selection(root, saved);
            log::debug!("Restored {} saved selection entries", restored);
            Ok(None)
        }
        SelectionSource::GitChanges => {
            let changed = git::changed_paths_or_empty(&root_path);
            if changed.is_empty() {
                log::warn!("No git changes detected");
            }
            apply_git_filter(root, &changed);
            log::info!("Focused on {} changed files", changed.len());
            Ok(None)
        }
        SelectionSource::DetectedPreset => match framework::detect(&root_path, source) {
            Some(def) => {
                apply_preset(root, def);
                Ok(Some(def.name.to_string()))
            }
            None => {
                log::warn!("No framework detected; keeping the saved selection");
                restore_selection(root, saved);
                Ok(None)
            }
        },
        SelectionSource::NamedPreset(id) => {
            let def = framework::find(id)
                .ok_or_else(|| snapfs::error!(Config, "Unknown framework: {}", id))?;
            apply_preset(root, def);
            Ok(Some(def.name.to_string()))
        }
    }
}

fn apply_overrides(config: &Config, root: &mut ProjectNode) {
    if config.select_all {
        set_subtree(root, true);
    }
    if config.deselect_all {
        set_subtree(root, false);
    }

    for path in &config.select {
        if !toggle_relative(root, path, true) {
            log::warn!("Not in the tree, cannot select: {}", path);
        }
    }
    for path in &config.deselect {
        if !toggle_relative(root, path, false) {
            log::warn!("Not in the tree, cannot deselect: {}", path);
        }
    }
}

fn save_state(store: &StateStore, state: &mut StateFile, config: &Config, root: &ProjectNode) {
    state.selection = collect_selection(root);
    state.ui = config.ui_state();
    if let Err(e) = store.save(state) {
        log::warn!("Failed to save project state: {}", e);
    }
}
