use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use evg_sim::{parse_channel, scan, RunConfig};

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Probe energy in GeV.
    #[arg(long)]
    pub energy: f64,
    /// Resonance to scan instead of the configured one, e.g. `P11(1440)`.
    #[arg(long)]
    pub channel: Option<String>,
}

pub fn run(args: &ScanArgs) -> Result<(), Box<dyn Error>> {
    let mut config = RunConfig::load(&args.config)?;
    if let Some(name) = &args.channel {
        config.beam.channel = parse_channel(name)?;
    }
    let report = scan(&config, args.energy)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
