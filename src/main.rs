use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crocomine::client::CrocomineClient;
use crocomine::driver::{self, RunConfig};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "SAT-driven agent for the Crocomine animal-minesweeper server."
)]
struct Cli {
    /// Base URL of the game server.
    #[arg(short, long, default_value = "http://localhost:8000")]
    server: String,

    /// Group name announced to the server.
    #[arg(short, long, default_value = "Group 1")]
    group: String,

    /// Member names announced to the server.
    #[arg(short, long, default_value = "solo")]
    members: String,

    /// Seed for the agent's tie-breaking random source.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Optional: dump the clause set of every non-won grid to this CNF file.
    #[arg(short, long)]
    cnf_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut client = CrocomineClient::new(&cli.server, &cli.group, &cli.members);
    let config = RunConfig { seed: cli.seed, cnf_file: cli.cnf_file };
    let stats = driver::run(&mut client, &config)?;

    println!(
        "GG: {}  KO: {}  stalled: {}  aborted: {}",
        stats.wins, stats.losses, stats.stalled, stats.aborted
    );
    println!(
        "{} grids, {} moves, {:.2?} total",
        stats.grids, stats.moves, stats.elapsed
    );
    Ok(())
}
