//! # CLI Module
//!
//! Command-line interface for the photo organizer.
//!
//! ## Usage
//! ```bash
//! # Organize a messy tree into a dated library
//! photo-organize organize ~/Unsorted ~/Photos --policy ask
//!
//! # See what would happen first
//! photo-organize organize ~/Unsorted ~/Photos --dry-run
//!
//! # Quarantine exact duplicates anywhere under a tree
//! photo-organize dedup ~/Photos
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use photo_organizer::core::pipeline::{self, OrganizeOptions};
use photo_organizer::core::{DuplicatePolicy, ExclusionSet, OperationStatus};
use photo_organizer::core::dedup;
use photo_organizer::error::{OrganizerError, Result};
use photo_organizer::events::{DedupEvent, Event, EventChannel, MoveEvent, PassEvent};

/// Photo Organizer - a dated library without losing a single byte
#[derive(Parser, Debug)]
#[command(name = "photo-organize")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move media files into a year/month library structure
    Organize {
        /// Directory to scan for media files
        source: PathBuf,

        /// Root of the organized library
        destination: PathBuf,

        /// Directories to exclude from the scan (with everything under them)
        #[arg(short, long)]
        exclude: Vec<PathBuf>,

        /// JSON file holding persisted exclusions
        #[arg(long)]
        exclusion_config: Option<PathBuf>,

        /// What to do when the library already holds an exact duplicate
        #[arg(short, long, default_value = "ask")]
        policy: Policy,

        /// Report every action without touching the filesystem
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Remove source directories emptied by the pass
        #[arg(long)]
        clean_empty: bool,
    },

    /// Find exact duplicates in a tree and quarantine them under _DUPLICADOS
    Dedup {
        /// Directory tree to deduplicate
        target: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Report duplicates and leave them for you to decide
    Ask,
    /// Leave the source file where it is
    Skip,
    /// Replace the library copy
    Overwrite,
    /// Delete the source file (the library already has it)
    DeleteOriginal,
}

impl From<Policy> for DuplicatePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Ask => DuplicatePolicy::Ask,
            Policy::Skip => DuplicatePolicy::Skip,
            Policy::Overwrite => DuplicatePolicy::Overwrite,
            Policy::DeleteOriginal => DuplicatePolicy::DeleteOriginal,
        }
    }
}

/// Caller-side persistence of the exclusion list.
///
/// The core never reads this; it only accepts an already-resolved
/// [`ExclusionSet`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExclusionConfig {
    /// Whether to write the merged list back after a run
    #[serde(default)]
    pub persist_exclusions: bool,
    /// Excluded directory paths, as entered by the user
    #[serde(default)]
    pub excluded_folders: Vec<String>,
}

impl ExclusionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| OrganizerError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| OrganizerError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| OrganizerError::Config(e.to_string()))?;
        std::fs::write(path, raw)
            .map_err(|e| OrganizerError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Organize {
            source,
            destination,
            exclude,
            exclusion_config,
            policy,
            dry_run,
            clean_empty,
        } => run_organize(
            source,
            destination,
            exclude,
            exclusion_config,
            policy.into(),
            dry_run,
            clean_empty,
        ),
        Commands::Dedup { target } => run_dedup(target),
    }
}

fn run_organize(
    source: PathBuf,
    destination: PathBuf,
    mut exclude: Vec<PathBuf>,
    exclusion_config: Option<PathBuf>,
    policy: DuplicatePolicy,
    dry_run: bool,
    clean_empty: bool,
) -> Result<()> {
    let term = Term::stderr();

    // Merge persisted exclusions with the ones given on the command line
    if let Some(config_path) = &exclusion_config {
        if config_path.exists() {
            let mut config = ExclusionConfig::load(config_path)?;
            exclude.extend(config.excluded_folders.iter().map(PathBuf::from));
            if config.persist_exclusions {
                config.excluded_folders = exclude
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                config.save(config_path)?;
            }
        }
    }
    let exclusions = ExclusionSet::resolve(&exclude);

    term.write_line(&format!(
        "{} {}",
        style("Photo Organizer").bold().cyan(),
        if dry_run {
            style("(dry run)").yellow().to_string()
        } else {
            String::new()
        }
    ))
    .ok();

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            cancel.store(true, Ordering::Relaxed);
        })
        .map_err(|e| OrganizerError::Config(format!("failed to install Ctrl-C handler: {}", e)))?;
    }

    let (sender, receiver) = EventChannel::new();

    // Render events in a separate thread while the pass runs
    let event_thread = thread::spawn(move || {
        let term = Term::stderr();
        for event in receiver.iter() {
            if let Event::Move(MoveEvent::Completed { primary, result }) = event {
                let name = primary
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| primary.display().to_string());
                let line = match result.status {
                    OperationStatus::Success => {
                        format!("{} {} - {}", style("✓").green(), name, result.message)
                    }
                    OperationStatus::Skipped => {
                        format!("{} {} - {}", style("·").dim(), name, result.message)
                    }
                    OperationStatus::Duplicate => {
                        format!("{} {} - {}", style("≡").yellow(), name, result.message)
                    }
                    OperationStatus::Error => {
                        format!("{} {} - {}", style("✗").red(), name, result.message)
                    }
                };
                term.write_line(&line).ok();
            }
        }
    });

    let options = OrganizeOptions {
        destination,
        policy,
        simulate: dry_run,
        clean_source: clean_empty,
    };
    let summary = pipeline::run(&source, &exclusions, &options, &sender, &cancel);

    drop(sender);
    event_thread.join().ok();

    term.write_line("").ok();
    if cancel.load(Ordering::Relaxed) {
        term.write_line(&format!("{}", style("Cancelled.").yellow().bold())).ok();
    }
    term.write_line(&format!(
        "{} moved, {} skipped, {} duplicates, {} errors ({} total)",
        style(summary.moved).green(),
        style(summary.skipped).dim(),
        style(summary.duplicates).yellow(),
        style(summary.errors).red(),
        summary.total()
    ))
    .ok();

    Ok(())
}

fn run_dedup(target: PathBuf) -> Result<()> {
    let term = Term::stderr();
    term.write_line(&format!(
        "{} {}",
        style("Duplicate Finder").bold().cyan(),
        style(target.display().to_string()).dim()
    ))
    .ok();

    let (sender, receiver) = EventChannel::new();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let event_thread = thread::spawn(move || {
        let term = Term::stderr();
        for event in receiver.iter() {
            match event {
                Event::Dedup(DedupEvent::Bucketed { total_files }) => {
                    spinner.set_message(format!("{} files found, hashing candidates...", total_files));
                }
                Event::Dedup(DedupEvent::Hashing { path }) => {
                    spinner.set_message(format!(
                        "hashing {}",
                        path.file_name().unwrap_or_default().to_string_lossy()
                    ));
                }
                Event::Dedup(DedupEvent::Moved { from, to }) => {
                    spinner.suspend(|| {
                        term.write_line(&format!(
                            "{} {} → {}",
                            style("≡").yellow(),
                            from.display(),
                            to.display()
                        ))
                        .ok();
                    });
                }
                Event::Dedup(DedupEvent::Error { path, message }) => {
                    spinner.suspend(|| {
                        term.write_line(&format!(
                            "{} {}: {}",
                            style("✗").red(),
                            path.display(),
                            message
                        ))
                        .ok();
                    });
                }
                Event::Dedup(DedupEvent::Completed { .. }) => {
                    spinner.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let outcome = dedup::quarantine_duplicates(&target, &sender);
    drop(sender);
    event_thread.join().ok();

    let summary = outcome?;
    term.write_line(&format!(
        "Done. {} duplicates found, {} moved to '{}'.",
        style(summary.duplicates_found).yellow(),
        style(summary.files_moved).green(),
        dedup::QUARANTINE_DIR
    ))
    .ok();

    Ok(())
}
