use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use configuration::{Config, LogFormat, WindowRange, init_logging, load_config, load_config_from};
use core_types::{Selection, TaskStatus};
use datastore::{DataLayout, PathResolver, ReadOptions, parse_output, read_series};
use grid::{CompletedTask, GridSetup, PoolGrid, SequentialGrid, TaskGrid, generate_tasks, submit_all};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// The main entry point for the bubble index application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG and BUBBLE__* overrides may live in a .env file.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("Failed to load configuration")?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    let _log_guard = init_logging(&config.logging).context("Failed to initialize logging")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Run(args) => handle_run(args, config).await,
        Commands::Inspect(args) => handle_inspect(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Computes the bubble index of daily price histories over sliding windows.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of ./config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Console log layout.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan every selection for every window and bring the result files up to date.
    Run(RunArgs),
    /// Show what is known about one selection's price history.
    Inspect(InspectArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Category folder to scan (overrides `sweep.category`).
    #[arg(long)]
    category: Option<String>,

    /// Selection to scan. Repeat for several (overrides `sweep.selections`).
    #[arg(long = "selection")]
    selections: Vec<String>,

    /// Comma-separated window lengths (overrides `sweep.windows`).
    #[arg(long, value_delimiter = ',')]
    windows: Option<Vec<usize>>,

    /// Never use the accelerator.
    #[arg(long)]
    force_host: bool,

    /// Host scan threads per task.
    #[arg(long)]
    threads: Option<usize>,

    /// Tasks run concurrently.
    #[arg(long)]
    workers: Option<usize>,

    /// Run tasks one after another on the main worker thread.
    #[arg(long)]
    sequential: bool,

    /// Draw a progress bar instead of printing progress lines.
    #[arg(long)]
    progress: bool,

    /// Raise the stop flag after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Parser)]
struct InspectArgs {
    /// Category folder (defaults to `sweep.category`).
    #[arg(long)]
    category: Option<String>,

    /// Selection name within the category.
    #[arg(long)]
    selection: String,
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

async fn handle_run(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config);
    config.validate().context("Invalid configuration after command-line overrides")?;

    let specs = generate_tasks(&config.sweep, &config.model)?;
    let context = config.run.to_context();
    let stop = context.stop.clone();
    let setup = GridSetup::new(context, Arc::new(DataLayout::new(&config.data.root)));
    let sequential = args.sequential;
    let workers = config.run.task_workers;

    info!(
        tasks = specs.len(),
        category = %config.sweep.category,
        sequential,
        workers,
        "Starting bubble index batch."
    );

    let mut batch = tokio::task::spawn_blocking(move || -> Result<Vec<CompletedTask>, grid::GridError> {
        let mut grid: Box<dyn TaskGrid> = if sequential {
            Box::new(SequentialGrid::new(setup))
        } else {
            Box::new(PoolGrid::new(setup, workers))
        };
        submit_all(grid.as_mut(), specs)?;
        let completed = grid.execute_all();
        grid.shutdown();
        completed
    });

    let timeout = args.timeout_secs.map(Duration::from_secs);
    let watchdog = async move {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    let joined = tokio::select! {
        joined = &mut batch => joined,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupt received; stopping once running tasks reach a checkpoint.");
            stop.request();
            batch.await
        }
        _ = watchdog => {
            warn!(timeout_secs = ?args.timeout_secs, "Timeout reached; stopping the batch.");
            stop.request();
            batch.await
        }
    };
    let completed = joined.context("Batch worker thread failed")??;

    print_summary(&completed);

    let failed = completed.iter().filter(|c| c.task.status().is_failure()).count();
    if !completed.is_empty() && failed == completed.len() {
        anyhow::bail!("All {} tasks failed.", failed);
    }
    Ok(())
}

fn apply_overrides(args: &RunArgs, config: &mut Config) {
    if let Some(category) = &args.category {
        config.sweep.category = category.clone();
    }
    if !args.selections.is_empty() {
        config.sweep.selections = args.selections.clone();
    }
    if let Some(windows) = &args.windows {
        config.sweep.windows = WindowRange::List(windows.clone());
    }
    if args.force_host {
        config.run.force_host = true;
    }
    if let Some(threads) = args.threads {
        config.run.threads = threads;
    }
    if let Some(workers) = args.workers {
        config.run.task_workers = workers;
    }
    if args.progress {
        config.run.headless = false;
    }
}

fn print_summary(completed: &[CompletedTask]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Handle", "Selection", "Window", "Path", "Status", "New Rows"]);

    for done in completed {
        let task = &done.task;
        let rows = match task.status() {
            TaskStatus::Written => task.results().map_or(0, <[f64]>::len).to_string(),
            _ => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(done.handle),
            Cell::new(task.selection()),
            Cell::new(task.params().window()),
            Cell::new(task.path_used().map_or("-".to_string(), |p| p.to_string())),
            Cell::new(task.status()),
            Cell::new(rows),
        ]);
    }
    println!("{table}");

    for done in completed.iter().filter(|c| c.task.status().is_failure()) {
        if let Some(reason) = done.task.messages().last() {
            println!("{}: {}", done.task.label(), reason);
        }
    }
}

// ==============================================================================
// Inspect Command Logic
// ==============================================================================

fn handle_inspect(args: InspectArgs, config: &Config) -> anyhow::Result<()> {
    let category = args.category.unwrap_or_else(|| config.sweep.category.clone());
    let selection = Selection::new(category, args.selection);
    let layout = DataLayout::new(&config.data.root);

    let input = layout.input_path(&selection);
    let series = read_series(&input, ReadOptions::default())
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("Selection: {}", selection);
    println!("Input:     {}", input.display());
    println!("Days:      {}", series.len());
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        println!("Span:      {} to {}", first, last);
    }
    match scanner::default_device() {
        Ok(device) => println!("Accelerator: {}", device.name()),
        Err(e) => println!("Accelerator: {}", e),
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Window", "Admissible Days", "Rows Written", "Output"]);
    for window in config.sweep.windows.expand()? {
        let output = layout.output_path(&selection, window);
        let written = match std::fs::read(&output) {
            Ok(bytes) => parse_output(&bytes).map_or_else(|e| format!("unreadable ({})", e), |rows| rows.len().to_string()),
            Err(_) => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(window),
            Cell::new(series.admissible_days(window)),
            Cell::new(written),
            Cell::new(output.display()),
        ]);
    }
    println!("{table}");
    Ok(())
}
