use std::error::Error;

use beam_diag::{get_moments, read_all_files};
use clap::Args;

#[derive(Args, Debug)]
pub struct MomentsArgs {
    /// Glob matching the shards of one snapshot, e.g. `diags/beam_final.*`.
    #[arg(long)]
    pub pattern: String,
}

pub fn run(args: &MomentsArgs) -> Result<(), Box<dyn Error>> {
    let table = read_all_files(&args.pattern)?;
    let moments = get_moments(&table)?;
    println!("{}", serde_json::to_string_pretty(&moments)?);
    Ok(())
}
