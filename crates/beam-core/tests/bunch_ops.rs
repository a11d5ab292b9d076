use beam_core::{BeamError, ParticleBunch, PhaseSpace, RefPart, Species};

fn bunch_with_ref(ranks: usize) -> ParticleBunch {
    let mut bunch = ParticleBunch::new(ranks);
    bunch.set_ref_particle(RefPart::for_species(Species::Proton, 100.0).unwrap());
    bunch
}

#[test]
fn ids_are_contiguous_across_ranks() {
    let mut bunch = bunch_with_ref(2);
    let qm = bunch.ref_particle().qm_ratio();
    bunch
        .add_particles(0, vec![PhaseSpace::default(); 3], qm, 3.0e-12)
        .unwrap();
    bunch
        .add_particles(1, vec![PhaseSpace::default(); 2], qm, 2.0e-12)
        .unwrap();
    assert_eq!(bunch.len(), 5);
    assert_eq!(bunch.tiles()[0].ids, vec![1, 2, 3]);
    assert_eq!(bunch.tiles()[1].ids, vec![4, 5]);
    let expected_weight = 1.0e-12 / beam_core::ELEMENTARY_CHARGE_C;
    let weight = bunch.tiles()[1].weights[0];
    assert!((weight - expected_weight).abs() <= 1e-9 * expected_weight);
}

#[test]
fn adding_without_reference_charge_fails() {
    let mut bunch = ParticleBunch::new(1);
    let err = bunch
        .add_particles(0, vec![PhaseSpace::default()], 1.0, 1.0e-9)
        .unwrap_err();
    assert!(matches!(err, BeamError::Config(_)));
}

#[test]
fn rank_out_of_range_is_reported() {
    let mut bunch = bunch_with_ref(1);
    let err = bunch
        .add_particles(4, vec![PhaseSpace::default()], 1.0, 1.0e-9)
        .unwrap_err();
    assert_eq!(err.info().code, "rank-out-of-range");
}

#[test]
fn particle_shape_is_set_once() {
    let mut bunch = ParticleBunch::new(1);
    assert!(bunch.set_particle_shape(4).is_err());
    bunch.set_particle_shape(2).unwrap();
    assert_eq!(bunch.particle_shape(), Some(2));
    assert!(bunch.set_particle_shape(2).is_err());
}

#[test]
fn position_statistics() {
    let mut bunch = bunch_with_ref(1);
    let coords = vec![
        PhaseSpace::new(-1.0, 0.0, 2.0, 0.0, 0.0, 0.0),
        PhaseSpace::new(1.0, 4.0, 2.0, 0.0, 0.0, 0.0),
    ];
    bunch.add_particles(0, coords, 1.0, 1.0e-12).unwrap();
    let bounds = bunch.min_and_max_positions().unwrap();
    assert_eq!(bounds.min, [-1.0, 0.0, 2.0]);
    assert_eq!(bounds.max, [1.0, 4.0, 2.0]);
    let stats = bunch.mean_and_std_positions().unwrap();
    assert_eq!(stats.mean, [0.0, 2.0, 2.0]);
    assert!((stats.std[0] - 1.0).abs() < 1e-12);
    assert!((stats.std[1] - 2.0).abs() < 1e-12);
    assert!(stats.std[2].abs() < 1e-12);
}
