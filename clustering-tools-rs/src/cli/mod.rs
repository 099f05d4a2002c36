//! Command-line interface for the clustering tools.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::offsets::{generate_for, GridSize};
use crate::core::render::{self, OutputFormat};
use crate::ToolsConfig;

#[derive(Parser)]
#[command(name = "clustering-tools")]
#[command(about = "Sampling offsets and variance log maintenance for the clustering experiment", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print jittered sampling offsets for an n x n grid
    Offsets {
        /// Grid size (power of two, greater than 1)
        grid_size: u32,
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Variable name of the generated C# array
        #[arg(long)]
        name: Option<String>,
    },

    /// Rename `mode:` settings in log file names to `algorithm:`
    RenameLogs {
        /// Directory whose subdirectories contain the CSV logs
        directory: PathBuf,
        /// Preview changes without renaming files
        #[arg(long)]
        dry_run: bool,
    },

    /// Truncate variance logs at a repeated header line
    TrimLogs {
        /// Directory containing the logs to trim
        directory: PathBuf,
        /// Line at which logs are truncated
        #[arg(short, long)]
        marker: Option<String>,
        /// Preview changes without rewriting files
        #[arg(long)]
        dry_run: bool,
    },

    /// Plot the traversal order of the offsets as a PNG
    Plot {
        /// Grid size (power of two, greater than 1)
        grid_size: u32,
        /// Output PNG file path (defaults to jitter_<n>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Image width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Image height in pixels
        #[arg(long)]
        height: Option<u32>,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match ToolsConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                ToolsConfig::default()
            }
        },
        None => ToolsConfig::default(),
    };

    // Dispatch to subcommands
    let outcome = match cli.command {
        Commands::Offsets { grid_size, format, name } => {
            cmd_offsets(grid_size, format, name, &config)
        }
        Commands::RenameLogs { directory, dry_run } => {
            cmd_rename_logs(&directory, dry_run, &config)
        }
        Commands::TrimLogs { directory, marker, dry_run } => {
            cmd_trim_logs(&directory, marker, dry_run, &config)
        }
        Commands::Plot { grid_size, output, width, height } => {
            cmd_plot(grid_size, output, width, height, &config)
        }
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn cmd_offsets(
    grid_size: u32,
    format: Option<OutputFormat>,
    name: Option<String>,
    config: &ToolsConfig,
) -> Result<()> {
    // Stdout carries only the rendered offsets so it can be pasted or piped as-is
    let size = GridSize::new(grid_size).context("Invalid grid size")?;
    let format = format.unwrap_or(config.offsets.format);
    let name = name.unwrap_or_else(|| config.offsets.variable_name.clone());

    let offsets = generate_for(size);
    debug!("Generated {} offsets for a {} grid (depth {})", offsets.len(), size, size.depth());

    let text = render::render(&offsets, format, &name).context("Rendering failed")?;
    println!("{}", text);

    Ok(())
}

fn cmd_rename_logs(directory: &Path, dry_run: bool, config: &ToolsConfig) -> Result<()> {
    use crate::processors::renaming;

    let start = Instant::now();

    if dry_run {
        println!("DRY RUN: No files will be renamed");
    }

    let spinner = create_spinner("Scanning log directories...");

    let result = renaming::rename_logs(directory, &config.logs, dry_run);

    spinner.finish_and_clear();

    let renamed = result.with_context(|| format!("Rename failed in {}", directory.display()))?;

    print_summary(
        "Rename Logs Complete",
        &[
            ("Directory", directory.display().to_string()),
            ("Key", format!("{} -> {}", config.logs.legacy_key, config.logs.key)),
            ("Files renamed", renamed.len().to_string()),
            ("Dry run", dry_run.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

fn cmd_trim_logs(
    directory: &Path,
    marker: Option<String>,
    dry_run: bool,
    config: &ToolsConfig,
) -> Result<()> {
    use crate::processors::trimming;

    let start = Instant::now();
    let marker = marker.unwrap_or_else(|| config.logs.marker.clone());

    if dry_run {
        println!("DRY RUN: No files will be rewritten");
    }

    println!("Trimming logs at marker: {:?}", marker);

    let spinner = create_spinner("Trimming log files...");

    let result = trimming::trim_directory(directory, &marker, dry_run);

    spinner.finish_and_clear();

    let reports = result.with_context(|| format!("Trim failed in {}", directory.display()))?;
    let dropped: usize = reports.iter().map(|r| r.dropped_lines).sum();

    for report in &reports {
        println!(
            "  - {} (kept {}, dropped {})",
            report.path.display(),
            report.kept_lines,
            report.dropped_lines
        );
    }

    print_summary(
        "Trim Logs Complete",
        &[
            ("Directory", directory.display().to_string()),
            ("Files trimmed", reports.len().to_string()),
            ("Lines dropped", dropped.to_string()),
            ("Dry run", dry_run.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

fn cmd_plot(
    grid_size: u32,
    output: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    config: &ToolsConfig,
) -> Result<()> {
    use crate::visualization;

    let start = Instant::now();
    let size = GridSize::new(grid_size).context("Invalid grid size")?;
    let width = width.unwrap_or(config.plot.width);
    let height = height.unwrap_or(config.plot.height);

    let output_path = output.unwrap_or_else(|| PathBuf::from(format!("jitter_{}.png", size.get())));

    println!("Plotting offsets...");
    println!("Grid: {}", size);
    println!("Output: {}", output_path.display());

    let spinner = create_spinner("Generating plot...");

    let offsets = generate_for(size);
    let result = visualization::plot_offsets(&output_path, &offsets, size, width, height);

    spinner.finish_and_clear();

    result.with_context(|| format!("Plot failed for {}", output_path.display()))?;

    print_summary(
        "Plot Complete",
        &[
            ("Grid", size.to_string()),
            ("Offsets", offsets.len().to_string()),
            ("Output PNG", output_path.display().to_string()),
            ("Image size", format!("{}x{}", width, height)),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}
