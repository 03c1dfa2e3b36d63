// Entry point and high-level CLI flow.
//
// Each `analyze` invocation is one upload: read the rig log, compute the
// shaker KPIs for the selected mesh and threshold, print them, and
// optionally export tables and charts. Nothing is kept between runs.
mod charts;
mod config;
mod error;
mod loader;
mod metrics;
mod output;
mod reports;
mod types;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crate::config::{DashboardConfig, MeshType};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shaker-health")]
#[command(about = "Shale-shaker screen health metrics from rig CSV logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute KPIs and daily aggregates for a rig log
    Analyze(AnalyzeArgs),
    /// Check a CSV header against the required columns
    Inspect {
        csv: PathBuf,
    },
    /// List screen mesh types and their capacities
    Meshes,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Rig log CSV; omit to see the awaiting-input notice
    csv: Option<PathBuf>,

    /// Screen mesh type (API 100, API 140, API 170, API 200)
    #[arg(long)]
    mesh: Option<MeshType>,

    /// Daily utilization threshold percentage (50-100)
    #[arg(long)]
    threshold: Option<u32>,

    /// TOML file with mesh, threshold and heuristic overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write derived_records.csv, daily_aggregates.csv and summary.json here
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Write SVG time-series charts here
    #[arg(long)]
    charts_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Analyze(args) => handle_analyze(args, &mut io::stdout().lock()),
        Command::Inspect { csv } => handle_inspect(&csv),
        Command::Meshes => {
            for mesh in MeshType::ALL {
                println!("{:<8} capacity {}", mesh.label(), mesh.capacity());
            }
            Ok(())
        }
    }
}

fn resolve_config(args: &AnalyzeArgs) -> Result<DashboardConfig> {
    let file = match &args.config {
        Some(path) => Some(
            crate::config::load_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
        ),
        None => None,
    };
    Ok(crate::config::resolve(file, args.mesh, args.threshold)?)
}

fn handle_analyze(args: AnalyzeArgs, out: &mut impl Write) -> Result<()> {
    let config = resolve_config(&args)?;
    let Some(path) = args.csv.as_deref() else {
        writeln!(out, "{}", reports::AWAITING_INPUT)?;
        return Ok(());
    };

    let (table, load) = loader::load_and_clean(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = load.loaded_rows,
        mesh = %config.mesh_type,
        threshold = config.utilization_threshold,
        "loaded rig log"
    );
    writeln!(out, "{}", reports::load_diagnostics(&load))?;

    let report = metrics::calculate(&table, &config);
    write!(out, "{}", reports::build_summary(&report, &config))?;
    if report.is_no_data() {
        return Ok(());
    }

    if let Some(dir) = &args.export_dir {
        export(dir, &report, &config)?;
        writeln!(out, "(Tables exported to {})", dir.display())?;
    }

    if let Some(dir) = &args.charts_dir {
        match &table.timestamps {
            Ok(()) => {
                let written = charts::render_all(dir, &report.derived)?;
                writeln!(out, "({} charts written to {})", written.len(), dir.display())?;
            }
            Err(e) => warn!(error = %e, "skipping charts"),
        }
    }
    Ok(())
}

fn export(dir: &Path, report: &metrics::MetricsReport, config: &DashboardConfig) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    output::write_csv(&dir.join("derived_records.csv"), &report.derived)
        .context("failed to export derived records")?;
    match &report.daily {
        Ok(daily) => output::write_csv(&dir.join("daily_aggregates.csv"), &reports::daily_rows(daily))
            .context("failed to export daily aggregates")?,
        Err(e) => warn!(error = %e, "skipping daily_aggregates.csv"),
    }
    output::write_json(&dir.join("summary.json"), &reports::summary_stats(report, config))
        .context("failed to export summary")?;
    Ok(())
}

fn handle_inspect(path: &Path) -> Result<()> {
    let table = loader::read_headers(path)
        .with_context(|| format!("failed to read header of {}", path.display()))?;
    println!("{}", output::markdown_table(&reports::column_status_rows(&table)));
    let missing = table.missing_required();
    if missing.is_empty() {
        println!("All required columns present.");
    } else {
        println!("{} required columns missing.", missing.len());
    }
    Ok(())
}
