use beam_core::rng::RngHandle;
use beam_core::BeamError;
use beam_dist::{BeamParams, KnownDistribution, Waterbag};

#[test]
fn parses_tagged_yaml() {
    let yaml = r#"
type: waterbag
sigmaX: 2.2951017632e-5
sigmaY: 1.3084093142e-5
sigmaT: 5.5555553e-8
sigmaPx: 1.598353425e-6
sigmaPy: 2.803697378e-6
sigmaPt: 2.0e-6
muxpx: 0.933345606203060
muypy: 0.933345606203060
mutpt: 0.999999961419755
"#;
    let dist: KnownDistribution = serde_yaml::from_str(yaml).unwrap();
    let params = dist.params().unwrap();
    assert_eq!(dist.name(), "waterbag");
    assert_eq!(params.sigma_pt, 2.0e-6);
    assert_eq!(params.mutpt, 0.999999961419755);
    dist.validate().unwrap();
}

#[test]
fn correlations_default_to_zero() {
    let yaml = "type: kurth6d\nsigma_x: 1.0\nsigma_y: 1.0\nsigma_t: 1.0\nsigma_px: 1.0\nsigma_py: 1.0\nsigma_pt: 1.0\n";
    let dist: KnownDistribution = serde_yaml::from_str(yaml).unwrap();
    let params = dist.params().unwrap();
    assert_eq!((params.muxpx, params.muypy, params.mutpt), (0.0, 0.0, 0.0));
}

#[test]
fn empty_needs_no_parameters() {
    let dist: KnownDistribution = serde_yaml::from_str("type: empty").unwrap();
    assert_eq!(dist, KnownDistribution::Empty);
    assert!(dist.params().is_none());
}

#[test]
fn rejects_unit_correlation() {
    let params = BeamParams::uncorrelated(1.0, 1.0, 1.0, 1.0, 1.0, 1.0).with_correlations(1.0, 0.0, 0.0);
    let err = Waterbag::new(params).unwrap_err();
    match err {
        BeamError::Distribution(info) => {
            assert_eq!(info.code, "invalid-correlation");
            assert_eq!(info.context.get("parameter").map(String::as_str), Some("muxpx"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn rejects_negative_sigma_before_sampling() {
    let params = BeamParams::uncorrelated(1.0, -1.0, 1.0, 1.0, 1.0, 1.0);
    let mut rng = RngHandle::from_seed(1);
    let err = KnownDistribution::Gaussian(params)
        .generate(10, &mut rng)
        .unwrap_err();
    assert_eq!(err.info().code, "invalid-sigma");
}

#[test]
fn same_seed_same_beam() {
    let dist = KnownDistribution::Kurth4d(BeamParams::uncorrelated(1e-3, 1e-3, 1e-3, 1e-3, 1e-3, 1e-3));
    let a = dist.generate(64, &mut RngHandle::from_seed(99)).unwrap();
    let b = dist.generate(64, &mut RngHandle::from_seed(99)).unwrap();
    let c = dist.generate(64, &mut RngHandle::from_seed(100)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}
