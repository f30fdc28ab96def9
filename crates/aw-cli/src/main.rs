//! CLI frontend for Apeworld.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "aw",
    about = "Apeworld: a tile-based rescue adventure in the valley of the apes",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the session's world and inputs come from.
#[derive(clap::Args)]
struct SessionArgs {
    /// Scenario JSON file (default: the built-in valley)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// File with one input token per tick
    #[arg(long, conflicts_with = "input")]
    script: Option<PathBuf>,

    /// Inline input tokens, e.g. "up*3 interact attack"
    #[arg(short, long)]
    input: Option<String>,

    /// RNG seed for deterministic play
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Ticks between random item spawns (0 disables spawning)
    #[arg(long, default_value = "600")]
    spawn_interval: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scripted session and report what happened
    Run {
        #[command(flatten)]
        session: SessionArgs,

        /// Show every event (not just the notable ones)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the race table with base stats and weapon affinities
    Races,

    /// Show how each faction regards the others
    Factions,

    /// Play a scripted session and print its snapshot as JSON
    Snapshot {
        #[command(flatten)]
        session: SessionArgs,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the built-in valley as a scenario file
    Valley {
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { session, verbose } => commands::run::run(&session.into(), verbose),
        Commands::Races => commands::races::run(),
        Commands::Factions => commands::factions::run(),
        Commands::Snapshot { session, output } => {
            commands::snapshot::run(&session.into(), output.as_deref())
        }
        Commands::Valley { output } => commands::valley::run(output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

impl From<SessionArgs> for commands::SessionSource {
    fn from(args: SessionArgs) -> Self {
        Self {
            scenario: args.scenario,
            script: args.script,
            input: args.input,
            seed: args.seed,
            spawn_interval: args.spawn_interval,
        }
    }
}
