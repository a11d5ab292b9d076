use beam_core::rng::RngHandle;
use beam_dist::{BeamParams, KnownDistribution};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_sampling(c: &mut Criterion) {
    let params = BeamParams::uncorrelated(1e-3, 1e-3, 3e-4, 1e-3, 1e-3, 3.3e-3);
    for dist in [
        KnownDistribution::Waterbag(params),
        KnownDistribution::Kurth6d(params),
        KnownDistribution::Gaussian(params),
    ] {
        c.bench_function(&format!("sample_{}", dist.name()), |b| {
            b.iter(|| {
                let mut rng = RngHandle::from_seed(7);
                let _ = dist.generate(10_000, &mut rng).unwrap();
            })
        });
    }
}

criterion_group!(benches, bench_sampling);
criterion_main!(benches);
