//! Command-line front end: read a request, plan the day, write the CSV.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use visit_planner::{PlanRequest, PlannerConfig, export, plan_day};

#[derive(Debug, Parser)]
#[command(name = "visit-planner", about = "Plan a day of field visits")]
struct Cli {
    /// JSON request: visit_date, origin, stops and optional must_first ids.
    #[arg(long)]
    request: PathBuf,

    /// JSON planner config; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV destination; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Distance API key. Falls back to GOOGLE_MAPS_API_KEY.
    #[arg(long)]
    api_key: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,visit_planner=debug")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PlannerConfig::from_file(path)?,
        None => PlannerConfig::default(),
    };
    let config = match cli.api_key {
        Some(key) => config.with_api_key(Some(key)),
        None => config.with_env_api_key(),
    };

    let text = std::fs::read_to_string(&cli.request)
        .with_context(|| format!("reading {}", cli.request.display()))?;
    let request: PlanRequest = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", cli.request.display()))?;

    let plan = plan_day(&request, &config)?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            export::write_csv(&plan, BufWriter::new(file))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            export::write_csv(&plan, &mut handle)?;
            handle.flush()?;
        }
    }

    info!(
        stops = plan.summary.stop_count,
        source = ?plan.matrix_source,
        projected_value = plan.summary.total_projected_value,
        "schedule written"
    );

    Ok(())
}
