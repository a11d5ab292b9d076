use beam_core::rng::RngHandle;
use beam_dist::{BeamDistribution, BeamParams, KVdist, Kurth6D, Semigaussian, Waterbag};
use proptest::prelude::*;

fn unit() -> BeamParams {
    BeamParams::uncorrelated(1.0, 1.0, 1.0, 1.0, 1.0, 1.0)
}

fn norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

proptest! {
    #[test]
    fn waterbag_stays_inside_its_ball(seed in any::<u64>()) {
        let dist = Waterbag::new(unit()).unwrap();
        let mut rng = RngHandle::from_seed(seed);
        for _ in 0..32 {
            let p = dist.sample(&mut rng);
            prop_assert!(norm(&p.to_array()) <= 8f64.sqrt() + 1e-12);
        }
    }

    #[test]
    fn kv_lies_on_transverse_shell(seed in any::<u64>()) {
        let dist = KVdist::new(unit()).unwrap();
        let mut rng = RngHandle::from_seed(seed);
        for _ in 0..32 {
            let p = dist.sample(&mut rng);
            prop_assert!((norm(&[p.x, p.y, p.px, p.py]) - 2.0).abs() < 1e-12);
            prop_assert!(p.t.abs() <= 3f64.sqrt());
        }
    }

    #[test]
    fn semigaussian_positions_in_ball(seed in any::<u64>()) {
        let dist = Semigaussian::new(unit()).unwrap();
        let mut rng = RngHandle::from_seed(seed);
        for _ in 0..32 {
            let p = dist.sample(&mut rng);
            prop_assert!(norm(&[p.x, p.y, p.t]) <= 5f64.sqrt() + 1e-12);
        }
    }

    #[test]
    fn kurth6d_is_finite_and_bounded(seed in any::<u64>()) {
        let dist = Kurth6D::new(unit()).unwrap();
        let mut rng = RngHandle::from_seed(seed);
        for _ in 0..32 {
            let p = dist.sample(&mut rng);
            prop_assert!(p.is_finite());
            // r^2 + p^2 <= 1 + L^2 <= 2 before scaling by sqrt(5)
            prop_assert!(norm(&p.to_array()) <= 10f64.sqrt() + 1e-9);
        }
    }
}
