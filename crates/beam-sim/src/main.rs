use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    analyze::{self, AnalyzeArgs},
    lattice::{self, LatticeArgs},
    moments::{self, MomentsArgs},
    run::{self, RunArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "beam-sim", version, about = "Beam tracking and regression analysis")]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Track a beam through a lattice as described by a YAML configuration.
    Run(RunArgs),
    /// Check beam snapshots against the reference values of a regression case.
    Analyze(AnalyzeArgs),
    /// Print the moments of a set of particle shards as JSON.
    Moments(MomentsArgs),
    /// Expand a MAD-X lattice and list its elements.
    Lattice(LatticeArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Analyze(args) => analyze::run(&args),
        Command::Moments(args) => moments::run(&args),
        Command::Lattice(args) => lattice::run(&args),
    }
}
