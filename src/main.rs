use anyhow::{Context, Result, bail};
use clap::Parser;
use iat_experiment::{Engine, ExperimentConfig};
use iat_timing::HighPrecisionTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod display;
mod input;
mod session;

use display::TerminalRenderer;
use input::{KeyMap, ThreadedLines};
use session::{Session, SessionOptions};

/// Implicit Association Test in the terminal
#[derive(Parser, Debug)]
#[command(name = "iat", version, about)]
struct Args {
    /// Experiment definition (JSON). Defaults to the built-in AI-perception IAT.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for stimulus shuffling, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Countdown between blocks, in seconds
    #[arg(long, default_value_t = 3)]
    pause_secs: u64,

    /// Write the raw responses and score of each finished run to this file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Key for the left category
    #[arg(long, default_value_t = 'e')]
    left_key: char,

    /// Key for the right category
    #[arg(long, default_value_t = 'i')]
    right_key: char,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Verbosity level (-v, -vv, -vvv); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let keys = key_map(&args)?;
    let config = match &args.config {
        Some(path) => ExperimentConfig::from_path(path)
            .with_context(|| format!("invalid experiment configuration {}", path.display()))?,
        None => ExperimentConfig::builtin().context("built-in configuration is invalid")?,
    };
    info!(
        blocks = config.block_count(),
        categories = config.categories().len(),
        "configuration loaded"
    );

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let timer = HighPrecisionTimer::new();
    let input = ThreadedLines::spawn(BufReader::new(io::stdin()), timer.clone())
        .context("failed to start the input reader")?;
    let engine = Engine::new(config, timer, rng);
    let renderer = TerminalRenderer::new(io::stdout(), !args.no_color, keys);
    let options = SessionOptions {
        pause_secs: args.pause_secs,
        export: args.export,
    };

    let mut session = Session::new(engine, renderer, input, keys, options);
    session.run()
}

fn key_map(args: &Args) -> Result<KeyMap> {
    let keys = KeyMap {
        left: args.left_key,
        right: args.right_key,
    };
    if keys.left.eq_ignore_ascii_case(&keys.right) {
        bail!("left and right keys must differ");
    }
    if [keys.left, keys.right].iter().any(|k| k.eq_ignore_ascii_case(&'q')) {
        bail!("'q' is reserved for quitting");
    }
    Ok(keys)
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}
