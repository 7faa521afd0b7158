use std::path::PathBuf;

use arbiter_core::SelectionPolicy;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "arbiter",
    about = "Weighted round-robin arbiter: scenarios and randomized trials",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Run configuration (arbiter.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Selection policy: strict or credit (overrides the config file)
    #[arg(short, long, global = true)]
    policy: Option<SelectionPolicy>,
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Which {
    Equal,
    Weighted,
    All,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the directed scenarios (1:1:1:1 and 2:1:1:2, all requests, handshake every cycle)
    Scenario {
        #[arg(value_enum, default_value_t = Which::All)]
        which: Which,
    },
    /// Run seeded randomized trials.
    ///
    /// SEED, TRIALS and CYCLES environment variables override the config
    /// file; flags override both.
    Random {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        trials: Option<u32>,
        #[arg(long)]
        cycles: Option<u32>,
        /// Pin ready and valid high for every trial
        #[arg(long)]
        force_handshake: bool,
    },
    /// Write a scaffold arbiter.toml
    Init {
        #[arg(long, default_value = "arbiter.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("arbiter=info".parse()?);
    if cli.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let mut config = commands::load_config(cli.config.as_deref(), cli.policy)?;

    match cli.command {
        Commands::Scenario { which } => commands::scenario::run(&config, which, cli.format),
        Commands::Random {
            seed,
            trials,
            cycles,
            force_handshake,
        } => {
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            let stimulus = &mut config.stimulus;
            stimulus.seed = seed.unwrap_or(stimulus.seed);
            stimulus.trials = trials.unwrap_or(stimulus.trials);
            stimulus.cycles = cycles.unwrap_or(stimulus.cycles);
            stimulus.force_handshake |= force_handshake;
            commands::random::run(&config, cli.format)
        }
        Commands::Init { path, force } => commands::init::init(&path, config.policy, force),
    }
}
