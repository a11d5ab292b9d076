use beam_check::{allclose, Tolerance};
use proptest::prelude::*;

#[test]
fn particle_tolerance_matches_sampling_noise() {
    let tol = Tolerance::for_particles(10_000);
    assert_eq!(tol.atol, 1.0);
    assert!((tol.rtol - 0.01).abs() < 1e-15);
}

#[test]
fn relative_part_scales_with_expected_value() {
    let tol = Tolerance::new(0.0, 0.01);
    assert!(tol.is_close(101.0, 100.0));
    assert!(!tol.is_close(102.0, 100.0));
    // asymmetric: the reference sets the scale
    assert!(!tol.is_close(100.0, 98.9));
}

#[test]
fn nan_is_never_close_and_infinities_must_match() {
    let tol = Tolerance::for_particles(1);
    assert!(!tol.is_close(f64::NAN, 0.0));
    assert!(!tol.is_close(0.0, f64::NAN));
    assert!(!tol.is_close(f64::NAN, f64::NAN));
    assert!(tol.is_close(f64::INFINITY, f64::INFINITY));
    assert!(!tol.is_close(f64::INFINITY, f64::NEG_INFINITY));
    assert!(!tol.is_close(1e300, f64::INFINITY));
}

#[test]
fn allclose_requires_equal_lengths() {
    let tol = Tolerance::default();
    assert!(allclose(&[1.0, 2.0], &[1.0, 2.0], &tol).unwrap());
    assert!(!allclose(&[1.0, 2.1], &[1.0, 2.0], &tol).unwrap());
    let err = allclose(&[1.0], &[1.0, 2.0], &tol).unwrap_err();
    assert_eq!(err.info().code, "length-mismatch");
}

#[test]
fn tolerance_defaults_fill_in_from_yaml() {
    let tol: Tolerance = serde_yaml::from_str("rtol: 0.5").unwrap();
    assert_eq!(tol, Tolerance::new(1e-8, 0.5));
}

proptest! {
    #[test]
    fn large_atol_accepts_small_statistics(a in -0.5f64..0.5, b in -0.5f64..0.5) {
        prop_assert!(Tolerance::for_particles(10_000).is_close(a, b));
    }

    #[test]
    fn values_are_close_to_themselves(v in proptest::num::f64::NORMAL, rtol in 0.0f64..1.0) {
        prop_assert!(Tolerance::new(0.0, rtol).is_close(v, v));
    }
}
