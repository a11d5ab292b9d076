use beam_core::{BeamError, ParticleBunch, PhaseSpace, RefPart, Species};
use beam_track::{to_fixed_s, to_fixed_t, transform_bunch, Direction};
use proptest::prelude::*;

const PTD: f64 = -5.0;

fn pzd() -> f64 {
    (PTD * PTD - 1.0).sqrt()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 + 1e-9 * b.abs()
}

#[test]
fn on_axis_particle_is_unchanged() {
    let mut p = PhaseSpace::default();
    to_fixed_t(&mut p, PTD).unwrap();
    assert!(p.to_array().iter().all(|v| v.abs() < 1e-15));
    to_fixed_s(&mut p, pzd()).unwrap();
    assert!(p.to_array().iter().all(|v| v.abs() < 1e-15));
}

#[test]
fn known_fixed_t_values() {
    let mut p = PhaseSpace::new(1e-3, -2e-3, 3e-4, 1e-3, 2e-3, 1e-3);
    to_fixed_t(&mut p, PTD).unwrap();
    assert!(close(p.x, 9.99705772948408e-4));
    assert!(close(p.y, -2.000588454103184e-3));
    assert!(close(p.t, -2.9392601490883726e-4));
    assert!(close(p.px, 1e-3));
    assert!(close(p.py, 2e-3));
    assert!(close(p.pt, -1.0231441381232e-3));
}

#[test]
fn rest_frame_design_is_rejected() {
    let mut p = PhaseSpace::new(1e-3, 0.0, 0.0, 0.0, 0.0, 0.0);
    let before = p;
    let err = to_fixed_t(&mut p, -1.0).unwrap_err();
    assert!(matches!(err, BeamError::Physics(_)));
    assert_eq!(err.info().code, "fixed-t-design");
    assert_eq!(p, before);

    let err = to_fixed_s(&mut p, 0.0).unwrap_err();
    assert_eq!(err.info().code, "fixed-s-design");
}

#[test]
fn unphysical_momentum_is_rejected() {
    let mut p = PhaseSpace::new(0.0, 0.0, 0.0, 10.0, 0.0, 0.0);
    let err = to_fixed_t(&mut p, PTD).unwrap_err();
    assert_eq!(err.info().code, "fixed-t-momentum");
    assert_eq!(p.px, 10.0);
}

#[test]
fn bunch_round_trip_uses_reference() {
    let mut bunch = ParticleBunch::new(2);
    bunch.set_ref_particle(RefPart::for_species(Species::Proton, 250.0).unwrap());
    let qm = bunch.ref_particle().qm_ratio();
    let coords = vec![
        PhaseSpace::new(1e-3, 2e-3, -1e-4, 3e-4, -2e-4, 1e-3),
        PhaseSpace::new(-5e-4, 0.0, 2e-4, 0.0, 1e-4, -2e-3),
    ];
    bunch.add_particles(0, coords.clone(), qm, 1e-12).unwrap();
    bunch.add_particles(1, coords.clone(), qm, 1e-12).unwrap();

    transform_bunch(&mut bunch, Direction::ToFixedT).unwrap();
    assert_ne!(bunch.tiles()[0].coords, coords);
    transform_bunch(&mut bunch, Direction::ToFixedS).unwrap();
    for tile in bunch.tiles() {
        for (p, q) in tile.coords.iter().zip(&coords) {
            for (a, b) in p.to_array().iter().zip(q.to_array()) {
                assert!((a - b).abs() < 1e-12, "{a} vs {b}");
            }
        }
    }
}

proptest! {
    #[test]
    fn fixed_t_then_fixed_s_is_identity(
        x in -1e-2f64..1e-2,
        y in -1e-2f64..1e-2,
        t in -1e-2f64..1e-2,
        px in -1e-2f64..1e-2,
        py in -1e-2f64..1e-2,
        pt in -1e-2f64..1e-2,
    ) {
        let original = PhaseSpace::new(x, y, t, px, py, pt);
        let mut p = original;
        to_fixed_t(&mut p, PTD).unwrap();
        to_fixed_s(&mut p, pzd()).unwrap();
        for (a, b) in p.to_array().iter().zip(original.to_array()) {
            prop_assert!((a - b).abs() < 1e-11, "{} vs {}", a, b);
        }
    }
}
