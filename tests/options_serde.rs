use line_mesh::algs::chordal::{ChordalControl, ChordalMode};
use line_mesh::algs::curve_param::CurveMeshOptions;
use line_mesh::algs::line::LineMeshOptions;
use line_mesh::algs::spline::SplineMeshOptions;
use line_mesh::algs::subdivide::SubdivideOptions;
use line_mesh::metric::GradationSign;

#[test]
fn missing_fields_take_defaults() {
    let opts: CurveMeshOptions = serde_json::from_str(r#"{ "target_h": 0.5, "high_order": 2 }"#).unwrap();
    assert_eq!(opts, CurveMeshOptions::default().with_target_h(0.5).with_high_order(2));
    assert_eq!(opts.max_bgm_remeshings, 4);
    assert!(opts.update_h0h1);

    let opts: SubdivideOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(opts, SubdivideOptions::default());
}

#[test]
fn nested_chordal_settings() {
    let json = r#"{
        "force_even": true,
        "min_n": 2,
        "chordal": { "max_chordal_error": -0.05, "mode": "Approximate" }
    }"#;
    let opts: LineMeshOptions = serde_json::from_str(json).unwrap();
    assert!(opts.force_even);
    assert_eq!((opts.min_n, opts.max_n), (2, usize::MAX));
    assert_eq!(opts.chordal, ChordalControl::relative(0.05).with_mode(ChordalMode::Approximate));
    assert!(opts.chordal.is_active());
}

#[test]
fn options_round_trip_through_json() {
    let opts = SplineMeshOptions::default()
        .with_bounds(3, 40)
        .with_max_gradation(0.3)
        .with_chordal(ChordalControl::absolute(1e-3).with_min_h(1e-4));
    let text = serde_json::to_string(&opts).unwrap();
    let back: SplineMeshOptions = serde_json::from_str(&text).unwrap();
    assert_eq!(back, opts);

    let sign: GradationSign = serde_json::from_str(r#""Both""#).unwrap();
    assert_eq!(sign, GradationSign::from_flag(0));
}

#[test]
fn unknown_mode_is_rejected() {
    let err = serde_json::from_str::<ChordalControl>(r#"{ "mode": "Sometimes" }"#);
    assert!(err.is_err());
}
