//! tline: evaluates a transmission line from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tline_engine::params::Preset;
use tline_engine::settings::{parse_assignment, Settings};
use tline_engine::{RunDescriptor, Simulation, SimulationDescriptor};

#[derive(Parser)]
#[command(name = "tline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Number of clock ticks to advance before reporting
    #[arg(short, long)]
    ticks: Option<usize>,

    /// Positions sampled along the line
    #[arg(long)]
    samples: Option<usize>,

    /// Replace the load with a named scenario
    #[arg(short, long)]
    preset: Option<Preset>,

    /// Set a line parameter, e.g. --set z0=75 (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_set)]
    assignments: Vec<(String, String)>,

    /// Ignore series resistance and shunt conductance
    #[arg(long)]
    lossless: bool,

    /// Show a progress bar while ticking
    #[arg(long)]
    progress: bool,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn parse_set(text: &str) -> Result<(String, String), String> {
    parse_assignment(text).map_err(|err| err.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    let mut assignments = cli.assignments;
    if cli.lossless {
        assignments.push(("lossless".to_string(), "true".to_string()));
    }
    settings
        .apply_overrides(&assignments, cli.preset)
        .context("Invalid line parameters")?;
    if let Some(ticks) = cli.ticks {
        settings.animation.ticks = ticks;
    }
    if let Some(samples) = cli.samples {
        settings.animation.samples = samples;
    }
    settings.validate()?;
    tracing::info!(?settings, "settings loaded");

    let mut simulation = Simulation::new(SimulationDescriptor {
        tick_source: settings.tick_source()?,
        record: settings.line.clone(),
        options: settings.evaluation_options(),
    })
    .context("Failed to set up the line")?;

    let evaluation = simulation.run(RunDescriptor {
        ticks: settings.animation.ticks,
        verbose: cli.progress,
    })?;

    match cli.format {
        OutputFormat::Text => print!("{}", evaluation),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&evaluation)?),
    }

    Ok(())
}
