use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use design_patcher::{resolve_node_id, ChangeStatus, DesignPatcher, PatcherConfig, PendingChange};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "design-patcher")]
#[command(about = "Apply visual design edits back to JSX/TSX source", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending design changes to a source file
    Apply {
        /// Source file to patch
        #[arg(short, long)]
        file: PathBuf,

        /// JSON array of pending changes
        #[arg(short, long)]
        changes: PathBuf,

        /// Patcher configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Print a workflow node id
    NodeId {
        /// Workflow the node belongs to
        workflow_id: u64,

        /// Id assigned by the server, if any
        #[arg(long)]
        server_id: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("design_patcher=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Apply {
            file,
            changes,
            config,
            dry_run,
            diff,
        } => cmd_apply(&file, &changes, config.as_deref(), dry_run, diff),

        Commands::NodeId {
            workflow_id,
            server_id,
        } => {
            let id = resolve_node_id(server_id, workflow_id)?;
            println!("{id}");
            Ok(())
        }
    }
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("creating temp file next to {}", path.display()))?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

fn load_changes(path: &Path) -> Result<Vec<PendingChange>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading changes from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing changes in {}", path.display()))
}

fn cmd_apply(
    file: &Path,
    changes: &Path,
    config: Option<&Path>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => PatcherConfig::from_file(path)?,
        None => PatcherConfig::default(),
    };
    let changes = load_changes(changes)?;
    let original = fs::read_to_string(file)
        .with_context(|| format!("reading source {}", file.display()))?;

    println!("File: {}", file.display());
    println!("Changes: {}", changes.len());
    if dry_run {
        println!("{}", "  [DRY RUN - showing what would be applied]".cyan());
    }
    println!();

    let report = DesignPatcher::new(config).apply(&original, &changes);

    for outcome in &report.outcomes {
        let change = &changes[outcome.index];
        let label = format!(
            "{} <{}> at {}",
            change.kind, change.source_info.element_type, outcome.position
        );
        match &outcome.status {
            ChangeStatus::Applied => println!("{} {}: Applied", "✓".green(), label),
            ChangeStatus::Unchanged => println!("{} {}: Already up to date", "⊙".yellow(), label),
            ChangeStatus::Failed(err) => {
                eprintln!("{} {}: Skipped - {}", "✗".red(), label, err);
                if err.is_not_found() {
                    eprintln!("  Possible causes:");
                    eprintln!("    - The file was edited after the page was rendered");
                    eprintln!("    - The element is produced by a component in another file");
                }
            }
        }
    }

    if show_diff && report.content != original {
        display_diff(file, &original, &report.content);
    }

    if !dry_run && report.content != original {
        atomic_write(file, report.content.as_bytes())?;
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", report.applied()).green());
    println!("  {} unchanged", format!("{}", report.unchanged()).yellow());
    println!("  {} skipped", format!("{}", report.failed()).red());

    Ok(())
}
