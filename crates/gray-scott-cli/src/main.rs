use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gray_scott_core::{ExecutionMode, Preset, RunSummary, Simulation, SimulationParameters};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetArg {
    Organic,
    Biomorphic,
    Emergence,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Organic => Preset::OrganicMetamorphosis,
            PresetArg::Biomorphic => Preset::BiomorphicDreams,
            PresetArg::Emergence => Preset::EmergenceSymphony,
        }
    }
}

#[derive(Parser)]
#[command(name = "gray-scott")]
#[command(version)]
#[command(about = "Run a Gray-Scott reaction-diffusion simulation and dump its fields")]
struct Cli {
    /// Start from a named parameter set
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// JSON parameter file (applied before individual overrides)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    #[arg(long)]
    feed: Option<f32>,

    #[arg(long)]
    kill: Option<f32>,

    #[arg(long)]
    damping: Option<f32>,

    #[arg(long)]
    iterations: Option<usize>,

    #[arg(long)]
    seed_count: Option<usize>,

    /// Random seed; omit for a fresh one (reported in the summary)
    #[arg(long)]
    seed: Option<u64>,

    /// Step rows on one thread instead of the rayon pool
    #[arg(long)]
    sequential: bool,

    /// Sample field statistics every N steps
    #[arg(long, default_value = "100")]
    sample_every: usize,

    /// Write the run summary here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write the final activator field as JSON rows
    #[arg(long)]
    field_output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct FieldDump<'a> {
    width: usize,
    height: usize,
    activator: Vec<&'a [f32]>,
}

fn build_params(cli: &Cli) -> Result<SimulationParameters> {
    let mut params = match (&cli.config, cli.preset) {
        (Some(path), _) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SimulationParameters::from_json_str(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        (None, Some(preset)) => Preset::from(preset).parameters(),
        (None, None) => SimulationParameters::default(),
    };
    if let Some(width) = cli.width {
        params.width = width;
    }
    if let Some(height) = cli.height {
        params.height = height;
    }
    if let Some(feed) = cli.feed {
        params.feed = feed;
    }
    if let Some(kill) = cli.kill {
        params.kill = kill;
    }
    if let Some(damping) = cli.damping {
        params.damping = damping;
    }
    if let Some(iterations) = cli.iterations {
        params.iterations = iterations;
    }
    if let Some(seed_count) = cli.seed_count {
        params.seed_count = seed_count;
    }
    if cli.seed.is_some() {
        params.rng_seed = cli.seed;
    }
    if cli.sequential {
        params.execution = ExecutionMode::Sequential;
    }
    params.validate()?;
    Ok(params)
}

fn write_json<T: Serialize>(path: Option<&Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let params = build_params(&cli)?;
    let mut sim = Simulation::new(params)?;
    let summary: RunSummary = sim.run_experiment(cli.sample_every)?;

    if let Some(path) = &cli.field_output {
        let activator = sim.fields().activator();
        let dump = FieldDump {
            width: activator.width(),
            height: activator.height(),
            activator: activator.rows().collect(),
        };
        write_json(Some(path), &dump)?;
    }
    write_json(cli.output.as_deref(), &summary)
}
