use std::error::Error;
use std::path::PathBuf;

use beam_lattice::{BeamlineElement, MadxDeck};
use clap::Args;

#[derive(Args, Debug)]
pub struct LatticeArgs {
    /// MAD-X file.
    #[arg(long)]
    pub file: PathBuf,
    /// Slices per thick element.
    #[arg(long, default_value_t = 1)]
    pub nslice: usize,
    /// Line to expand instead of the one selected by `use`.
    #[arg(long)]
    pub sequence: Option<String>,
    /// Print the element list as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &LatticeArgs) -> Result<(), Box<dyn Error>> {
    let deck = MadxDeck::from_file(&args.file)?;
    let lattice = match &args.sequence {
        Some(name) => deck.lattice_for(name, args.nslice)?,
        None => deck.lattice(args.nslice)?,
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&lattice)?);
        return Ok(());
    }

    let mut s = 0.0;
    for (idx, element) in lattice.iter().enumerate() {
        s += element.ds();
        println!(
            "{idx:>4}  {:<14} ds={:<12.6} nslice={:<4} s={s:.6}",
            element.name(),
            element.ds(),
            element.nslice()
        );
    }
    println!(
        "{} element(s), length {:.6} m, {} slice step(s)",
        lattice.len(),
        lattice.total_length(),
        lattice.total_slices()
    );
    if let Ok(refpart) = deck.reference_particle() {
        println!(
            "reference: mass {:.6} MeV, charge {} qe, kinetic energy {:.6} MeV",
            refpart.mass_mev(),
            refpart.charge_qe(),
            refpart.energy_mev()
        );
    }
    Ok(())
}
