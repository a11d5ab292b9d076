use beam_core::{RefPart, Species};
use beam_dist::{BeamParams, KnownDistribution};
use beam_lattice::{ConstF, Element, Lattice, Quad};
use beam_track::Simulation;
use criterion::{criterion_group, criterion_main, Criterion};

fn fodo() -> Lattice {
    Lattice::new(vec![
        Element::Quad(Quad::new(0.5, 1.2, 10).unwrap()),
        Element::ConstF(ConstF::new(1.0, 0.3, 0.3, 0.1, 20).unwrap()),
        Element::Quad(Quad::new(0.5, -1.2, 10).unwrap()),
    ])
    .unwrap()
}

fn bench_evolve(c: &mut Criterion) {
    let dist = KnownDistribution::Gaussian(BeamParams::uncorrelated(
        1e-3, 1e-3, 3e-4, 1e-3, 1e-3, 3e-3,
    ));
    for ranks in [1usize, 4] {
        c.bench_function(&format!("evolve_fodo_{ranks}_ranks"), |b| {
            b.iter(|| {
                let mut sim = Simulation::new(3);
                sim.set_ranks(ranks).unwrap();
                sim.set_diagnostics(false);
                sim.init_grids().unwrap();
                sim.set_ref_particle(RefPart::for_species(Species::Proton, 2.0e3).unwrap())
                    .unwrap();
                sim.add_particles(1e-9, &dist, 20_000).unwrap();
                sim.set_lattice(fodo()).unwrap();
                sim.evolve().unwrap()
            })
        });
    }
}

criterion_group!(benches, bench_evolve);
criterion_main!(benches);
