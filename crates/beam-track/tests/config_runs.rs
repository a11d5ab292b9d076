use std::path::PathBuf;

use beam_diag::{read_all_files, REF_PARTICLE_FILE};
use beam_dist::KnownDistribution;
use beam_track::{run, SimConfig, Simulation};
use tempfile::tempdir;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
        .join("config.yaml")
}

const MINIMAL: &str = r#"
beam:
  npart: 20
  reference: { particle: electron, kin_energy_mev: 100.0 }
  distribution: { type: gaussian, sigmaX: 1.0e-3, sigmaY: 1.0e-3, sigmaT: 1.0e-3,
                  sigmaPx: 1.0e-4, sigmaPy: 1.0e-4, sigmaPt: 1.0e-4 }
lattice:
  elements:
    - { type: drift, ds: 1.5, nslice: 3 }
"#;

#[test]
fn defaults_are_filled_in() {
    let config = SimConfig::from_yaml_str(MINIMAL).unwrap();
    assert_eq!(config.seed, 1);
    assert_eq!(config.algo.particle_shape, 2);
    assert!(!config.algo.space_charge);
    assert_eq!(config.decomposition.ranks, 1);
    assert!(config.diagnostics.enabled);
    assert!(!config.diagnostics.slice_step);
    assert_eq!(config.diagnostics.directory, PathBuf::from("diags"));
    assert_eq!(config.lattice.nslice, 1);
    assert_eq!(config.beam.charge, 0.0);
}

#[test]
fn inconsistent_configs_are_rejected() {
    let both = MINIMAL.replace(
        "  reference:",
        "  reference_file: lattice.madx\n  reference:",
    );
    let err = SimConfig::from_yaml_str(&both).unwrap_err();
    assert_eq!(err.info().code, "reference-ambiguous");

    let no_lattice = MINIMAL.replace("    - { type: drift, ds: 1.5, nslice: 3 }", "    []");
    let err = SimConfig::from_yaml_str(&no_lattice).unwrap_err();
    assert_eq!(err.info().code, "lattice-missing");

    let ranks = format!("decomposition: {{ ranks: 0 }}\n{MINIMAL}");
    assert_eq!(
        SimConfig::from_yaml_str(&ranks).unwrap_err().info().code,
        "zero-ranks"
    );

    let space_charge = format!("algo: {{ space_charge: true }}\n{MINIMAL}");
    let config = SimConfig::from_yaml_str(&space_charge).unwrap();
    let err = Simulation::from_config(&config).unwrap_err();
    assert_eq!(err.info().code, "space-charge-unsupported");

    let bad_mu = MINIMAL.replace("sigmaPt: 1.0e-4", "sigmaPt: 1.0e-4, mutpt: 1.0");
    assert_eq!(
        SimConfig::from_yaml_str(&bad_mu).unwrap_err().info().code,
        "invalid-correlation"
    );

    let unknown = MINIMAL.replace("type: drift", "type: solenoid");
    assert_eq!(
        SimConfig::from_yaml_str(&unknown).unwrap_err().info().code,
        "config-yaml"
    );
}

#[test]
fn demo_configs_parse() {
    for name in ["cfchannel", "chicane", "iota_lens"] {
        let config = SimConfig::from_yaml_file(demo(name)).unwrap();
        assert_eq!(config.beam.npart, 10_000, "{name}");
        assert!(matches!(
            config.beam.distribution,
            KnownDistribution::Waterbag(_)
        ));
    }
    let chicane = SimConfig::from_yaml_file(demo("chicane")).unwrap();
    let file = chicane.lattice.file.unwrap();
    assert!(file.is_absolute() || file.starts_with(env!("CARGO_MANIFEST_DIR")));
    assert!(file.ends_with("chicane.madx"));
    assert_eq!(chicane.lattice.nslice, 25);
}

#[test]
fn chicane_demo_runs() {
    let dir = tempdir().unwrap();
    let mut config = SimConfig::from_yaml_file(demo("chicane")).unwrap();
    config.beam.npart = 200;
    config.decomposition.ranks = 2;
    config.diagnostics.directory = dir.path().to_path_buf();

    let summary = run(&config).unwrap();
    assert_eq!(summary.elements, 16);
    assert_eq!(summary.steps, 8 * 25 + 8);
    assert_eq!(summary.particles, 200);
    assert!(summary.ref_particle.gamma() > 9000.0);

    let fin = read_all_files(dir.path().join("beam_final.*").to_str().unwrap()).unwrap();
    assert_eq!(fin.len(), 200);
    let reflog = std::fs::read_to_string(dir.path().join(REF_PARTICLE_FILE)).unwrap();
    assert_eq!(reflog.lines().count(), 1 + 1 + summary.steps);
}

#[test]
fn runs_are_reproducible() {
    let first_dir = tempdir().unwrap();
    let second_dir = tempdir().unwrap();
    let mut config = SimConfig::from_yaml_str(MINIMAL).unwrap();
    config.diagnostics.directory = first_dir.path().to_path_buf();
    let first = run(&config).unwrap();
    config.diagnostics.directory = second_dir.path().to_path_buf();
    let second = run(&config).unwrap();

    let a = std::fs::read_to_string(first_dir.path().join("beam_final.0")).unwrap();
    let b = std::fs::read_to_string(second_dir.path().join("beam_final.0")).unwrap();
    assert_eq!(a, b);
    assert_ne!(
        first.provenance.input_hash, second.provenance.input_hash,
        "output directory is part of the hashed configuration"
    );
}
