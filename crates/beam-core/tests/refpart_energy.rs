use beam_core::{BeamError, RefPart, Species};

fn close(a: f64, b: f64, rel: f64) -> bool {
    (a - b).abs() <= rel * b.abs().max(1e-300)
}

#[test]
fn proton_at_two_gev() {
    let refpart = RefPart::for_species(Species::Proton, 2.0e3).unwrap();
    let gamma = 1.0 + 2.0e3 / 938.272_088_16;
    assert!(close(refpart.gamma(), gamma, 1e-12));
    assert!(close(refpart.energy_mev(), 2.0e3, 1e-12));
    assert!(close(refpart.pz, (gamma * gamma - 1.0).sqrt(), 1e-12));
    assert!(close(refpart.beta_gamma(), refpart.pz, 1e-12));
    assert!(close(refpart.beta() * refpart.gamma(), refpart.beta_gamma(), 1e-12));
    assert!(close(refpart.charge_qe(), 1.0, 1e-12));
    assert_eq!(refpart.px, 0.0);
    assert_eq!(refpart.py, 0.0);
}

#[test]
fn energy_requires_mass() {
    let mut refpart = RefPart::default();
    let err = refpart.set_energy_mev(10.0).unwrap_err();
    assert!(matches!(err, BeamError::Physics(ref info) if info.code == "mass-unset"));
}

#[test]
fn zero_mass_is_rejected() {
    let mut refpart = RefPart::default();
    assert!(refpart.set_mass_mev(0.0).is_err());
}

#[test]
fn changing_mass_keeps_gamma() {
    let mut refpart = RefPart::for_species(Species::Electron, 250.0).unwrap();
    let gamma = refpart.gamma();
    let pz = refpart.pz;
    refpart.set_mass_mev(Species::Proton.mass_mev()).unwrap();
    assert!(close(refpart.gamma(), gamma, 1e-9));
    assert!(close(refpart.pz, pz, 1e-9));
    assert!(close(refpart.mass_mev(), Species::Proton.mass_mev(), 1e-12));
    let scaled = 250.0 * Species::Proton.mass_mev() / Species::Electron.mass_mev();
    assert!(close(refpart.energy_mev(), scaled, 1e-9));
}

#[test]
fn species_names_parse_case_insensitively() {
    assert_eq!(Species::from_name("Electron"), Some(Species::Electron));
    assert_eq!(Species::from_name("PROTON"), Some(Species::Proton));
    assert_eq!(Species::from_name("ion"), None);
}
