use std::io::Write;

use beam_core::{BeamError, Species};
use beam_lattice::{
    load_lattice_file, load_ref_particle_file, AttrValue, BeamlineElement, Element, MadxDeck,
};

fn chicane_path() -> String {
    format!("{}/../../demos/chicane/chicane.madx", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn evaluates_expressions_and_constants() {
    let deck = MadxDeck::parse(
        "a = 2; b := a^2 + 3*(a - 1); c = -a^2; d = sqrt(16) / 2; e2 = 2*pi; f = 1.5d-3;",
    )
    .unwrap();
    assert_eq!(deck.variable("a"), Some(2.0));
    assert_eq!(deck.variable("b"), Some(7.0));
    assert_eq!(deck.variable("c"), Some(-4.0));
    assert_eq!(deck.variable("d"), Some(2.0));
    assert_eq!(deck.variable("E2"), Some(2.0 * std::f64::consts::PI));
    assert_eq!(deck.variable("f"), Some(1.5e-3));
}

#[test]
fn undefined_variable_reports_line() {
    let err = MadxDeck::parse("a = 1;\nb = a + missing;").unwrap_err();
    match err {
        BeamError::Parse(info) => {
            assert_eq!(info.code, "madx-undefined");
            assert_eq!(info.context.get("line").map(String::as_str), Some("2"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn chicane_expands_with_edges() {
    let lattice = load_lattice_file(chicane_path(), 25).unwrap();
    let names: Vec<_> = lattice.iter().map(|e| e.name()).collect();
    let bend = ["DipEdge", "Sbend", "DipEdge"];
    let mut expected = Vec::new();
    for segment in 0..4 {
        expected.extend(bend);
        if segment < 3 {
            expected.push("Drift");
        }
    }
    expected.push("Drift");
    assert_eq!(names, expected);

    let total: f64 = 4.0 * 0.500194828041958 + 2.0 * 5.0058489435 + 1.0 + 2.0;
    assert!((lattice.total_length() - total).abs() < 1e-12);
    match &lattice.elements()[1] {
        Element::Sbend(sbend) => {
            assert_eq!(sbend.nslice, 25);
            assert!((sbend.rc - 0.500194828041958 / -0.048345620280243).abs() < 1e-12);
        }
        other => panic!("expected a bend, got {other:?}"),
    }
    match &lattice.elements()[2] {
        Element::DipEdge(edge) => assert!((edge.psi + 0.048345620280243).abs() < 1e-15),
        other => panic!("expected an edge, got {other:?}"),
    }
}

#[test]
fn chicane_reference_particle_is_5gev_electron() {
    let refpart = load_ref_particle_file(chicane_path()).unwrap();
    let electron = Species::Electron.mass_mev();
    assert!((refpart.mass_mev() - electron).abs() < 1e-9);
    assert!((refpart.energy_mev() - (5.0e3 - electron)).abs() < 1e-6);
    assert!((refpart.charge_qe() + 1.0).abs() < 1e-12);
}

#[test]
fn beam_accepts_pc_and_gamma() {
    let deck = MadxDeck::parse("beam, particle=proton, pc=1.0;").unwrap();
    let refpart = deck.reference_particle().unwrap();
    assert!((refpart.beta_gamma() - 1.0e3 / Species::Proton.mass_mev()).abs() < 1e-9);

    let deck = MadxDeck::parse("beam, mass=0.938272, charge=1, gamma=3.0;").unwrap();
    let refpart = deck.reference_particle().unwrap();
    assert!((refpart.gamma() - 3.0).abs() < 1e-12);
}

#[test]
fn missing_beam_is_a_config_error() {
    let deck = MadxDeck::parse("d: drift, l=1; l1: line=(d);").unwrap();
    let err = deck.reference_particle().unwrap_err();
    assert!(matches!(err, BeamError::Config(ref info) if info.code == "madx-no-beam"));
}

#[test]
fn lines_repeat_reverse_and_nest() {
    let deck = MadxDeck::parse(
        "q: quadrupole, l=0.1, k1=2.0; d: drift, l=1; m: marker;
         cell: line=(q, d, m);
         ring: line=(2*cell, -cell, 2*(d, m));",
    )
    .unwrap();
    assert_eq!(deck.selected_line(), Some("ring"));
    let lattice = deck.lattice(1).unwrap();
    let names: Vec<_> = lattice.iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        [
            "Quad", "Drift", "None", "Quad", "Drift", "None", "None", "Drift", "Quad", "Drift",
            "None", "Drift", "None"
        ]
    );
}

#[test]
fn use_selects_line_and_recursion_is_rejected() {
    let deck = MadxDeck::parse("d: drift, l=1; a: line=(d); b: line=(a, b); use, period=a;").unwrap();
    assert_eq!(deck.lattice(1).unwrap().len(), 1);
    let err = deck.lattice_for("b", 1).unwrap_err();
    assert_eq!(err.info().code, "madx-recursive-line");
}

#[test]
fn multipole_takes_first_nonzero_order() {
    let deck = MadxDeck::parse("m: multipole, knl={0, 0, 0.3}, ksl={0, 0, 0.1}; l: line=(m);").unwrap();
    match &deck.lattice(1).unwrap().elements()[0] {
        Element::Multipole(m) => {
            assert_eq!(m.m, 3);
            assert_eq!((m.kn, m.ks), (0.3, 0.1));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        deck.element("m").unwrap().attrs.get("knl"),
        Some(&AttrValue::Array(vec![0.0, 0.0, 0.3]))
    );
}

#[test]
fn attribute_references_and_inheritance() {
    let deck = MadxDeck::parse(
        "b1: sbend, l=1.0, angle=0.1; b2: b1, angle=-b1->angle; nl: nllens, knll=4e-6, cnll=0.01;
         l: line=(b2, nl);",
    )
    .unwrap();
    let b2 = deck.element("b2").unwrap();
    assert_eq!(b2.kind, "sbend");
    let lattice = deck.lattice(2).unwrap();
    match &lattice.elements()[1] {
        Element::Sbend(s) => assert!((s.rc + 10.0).abs() < 1e-12),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(lattice.elements()[3].name(), "NonlinearLens");
}

#[test]
fn unknown_type_names_the_element() {
    let deck = MadxDeck::parse("cav: rfcavity, l=1; l: line=(cav);").unwrap();
    let err = deck.lattice(1).unwrap_err();
    let info = err.info();
    assert_eq!(info.code, "madx-unknown-type");
    assert_eq!(info.context.get("element").map(String::as_str), Some("cav"));
}

#[test]
fn unknown_commands_are_skipped() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "option, echo;\ntitle, 'demo';\nd: drift, l=0.5;\nline1: line=(d, d);").unwrap();
    let lattice = load_lattice_file(file.path(), 3).unwrap();
    assert_eq!(lattice.len(), 2);
    assert_eq!(lattice.total_slices(), 6);
}
