use std::error::Error;
use std::fs;
use std::path::PathBuf;

use beam_track::SimConfig;
use clap::Args;
use log::info;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Diagnostics directory, overriding `diagnostics.directory`.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Also write the summary as JSON to this file.
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let mut config = SimConfig::from_yaml_file(&args.config)?;
    if let Some(out) = &args.out {
        config.diagnostics.directory = out.clone();
    }
    info!(
        "running {} with {} particle(s), diagnostics in {}",
        args.config.display(),
        config.beam.npart,
        config.diagnostics.directory.display()
    );

    let summary = beam_track::run(&config)?;
    let json = serde_json::to_string_pretty(&summary)?;
    if let Some(path) = &args.summary {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &json)?;
    }
    println!("{json}");
    Ok(())
}
