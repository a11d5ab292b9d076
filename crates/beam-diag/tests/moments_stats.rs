use beam_core::PhaseSpace;
use beam_diag::{get_moments, BeamMoments, BeamTable, NonlinearLensInvariants};
use proptest::prelude::*;

#[test]
fn population_moments_of_known_points() {
    let particles = [
        PhaseSpace::new(1.0, 0.0, 2.0, 1.0, 0.0, 0.0),
        PhaseSpace::new(-1.0, 0.0, -2.0, -1.0, 0.0, 0.0),
        PhaseSpace::new(1.0, 0.0, 2.0, -1.0, 0.0, 0.0),
        PhaseSpace::new(-1.0, 0.0, -2.0, 1.0, 0.0, 0.0),
    ];
    let table = BeamTable::from_particles(particles.iter().enumerate().map(|(i, p)| (i as u64, p)));
    let moments = get_moments(&table).unwrap();
    let (sigx, sigy, sigt, ex, ey, et) = moments.as_tuple();
    assert_eq!(sigx, 1.0);
    assert_eq!(sigy, 0.0);
    assert_eq!(sigt, 2.0);
    // x and px uncorrelated: emittance is the product of the RMS values
    assert_eq!(ex, 1.0);
    assert_eq!(ey, 0.0);
    assert_eq!(et, 0.0);
    assert_eq!(moments.count, 4);
}

#[test]
fn fully_correlated_plane_has_zero_emittance() {
    let particles: Vec<PhaseSpace> = (0..50)
        .map(|i| {
            let x = (i as f64 - 25.0) * 1.0e-3;
            PhaseSpace::new(x, 0.0, 0.0, 3.7 * x, 0.0, 0.0)
        })
        .collect();
    let moments = BeamMoments::from_coords(&particles).unwrap();
    let scale = moments.sigmas[0] * moments.sigmas[3];
    assert!(moments.emittances[0] >= 0.0);
    assert!(moments.emittances[0] < 1e-6 * scale);
}

#[test]
fn empty_beam_is_rejected() {
    let table = BeamTable::from_particles(std::iter::empty::<(u64, &PhaseSpace)>());
    assert_eq!(get_moments(&table).unwrap_err().info().code, "empty-beam");
}

#[test]
fn invariants_reduce_to_linear_actions_without_lens() {
    let inv = NonlinearLensInvariants::new(0.0, 4.0, 0.0, 0.5).unwrap();
    let values = inv.evaluate(0.1, 0.2, 0.3, 0.4);
    let (xn, yn) = (0.1 / 1.0, 0.2 / 1.0);
    let (pxn, pyn) = (0.3 * 4.0, 0.4 * 4.0);
    let h = (xn * xn + yn * yn + pxn * pxn + pyn * pyn) / 2.0;
    let jz = xn * pyn - yn * pxn;
    let i = jz * jz + pxn * pxn + xn * xn;
    assert!((values.h - h).abs() < 1e-12);
    assert!((values.i - i).abs() < 1e-12);
}

#[test]
fn lens_potential_is_quadratic_near_axis() {
    let inv = NonlinearLensInvariants::new(0.0, 1.0, 1.0, 1.0).unwrap();
    let (x, y) = (1e-4, 2e-4);
    let values = inv.evaluate(x, y, 0.0, 0.0);
    // Re(zeta * asin(zeta) / sqrt(1 - zeta^2)) ~ x^2 - y^2
    let expected_h = (x * x + y * y) / 2.0 + (x * x - y * y);
    assert!((values.h - expected_h).abs() < 1e-12);
    assert!(NonlinearLensInvariants::new(0.0, -1.0, 0.0, 1.0).is_err());
}

proptest! {
    #[test]
    fn moments_are_shift_invariant(
        values in prop::collection::vec((-1.0f64..1.0, -1.0f64..1.0), 2..64),
        shift in -10.0f64..10.0
    ) {
        let base: Vec<PhaseSpace> = values
            .iter()
            .map(|&(x, px)| PhaseSpace::new(x, px, x + px, px, x, x - px))
            .collect();
        let shifted: Vec<PhaseSpace> = base
            .iter()
            .map(|p| PhaseSpace::new(p.x + shift, p.y, p.t, p.px + shift, p.py, p.pt))
            .collect();
        let a = BeamMoments::from_coords(&base).unwrap().statistics();
        let b = BeamMoments::from_coords(&shifted).unwrap().statistics();
        for (u, v) in a[..3].iter().zip(&b[..3]) {
            prop_assert!((u - v).abs() <= 1e-9 * (1.0 + u.abs()));
        }
        // emittances of degenerate planes sit at the square root of a rounding
        // residue, so compare the radicands
        for (u, v) in a[3..].iter().zip(&b[3..]) {
            prop_assert!((u * u - v * v).abs() < 1e-9);
        }
        prop_assert!(a.iter().all(|u| u.is_finite() && *u >= 0.0));
    }
}
