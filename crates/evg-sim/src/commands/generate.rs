use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use evg_sim::{generate, RunConfig};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Overrides the number of events.
    #[arg(long)]
    pub events: Option<usize>,
    /// Overrides the master seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Summary destination; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let mut config = RunConfig::load(&args.config)?;
    if let Some(events) = args.events {
        config.events = events;
    }
    if let Some(seed) = args.seed {
        config.seed_policy.master_seed = seed;
    }
    let summary = generate(&config, config.seed_policy.master_seed)?;
    let json = serde_json::to_string_pretty(&summary)?;
    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, json)?;
        }
        None => println!("{json}"),
    }
    Ok(())
}
