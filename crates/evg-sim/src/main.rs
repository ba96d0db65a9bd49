use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    generate::{self, GenerateArgs},
    scan::{self, ScanArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "evg-sim", about = "Resonance kinematics generator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate events and write a JSON run summary.
    Generate(GenerateArgs),
    /// Print the maximum cross-section ceiling at one energy.
    Scan(ScanArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Scan(args) => scan::run(&args),
    }
}
