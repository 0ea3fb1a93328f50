mod util;

use std::f64::consts::PI;

use line_mesh::algs::chordal::{ChordalControl, ChordalMode};
use line_mesh::algs::curve_param::{CurveMesh, CurveMeshOptions, mesh_curve_param};
use line_mesh::data::Coordinates;
use line_mesh::mesh_error::{INTERNAL_ERROR_CODE, MeshError};
use line_mesh::progress::{LogProgress, NoProgress};
use util::*;

const PITCH: f64 = 0.2;

fn helix() -> Helix {
    Helix { r: 1.0, pitch: PITCH }
}

/// One turn of the helix, ends at nodes 0 and 1.
fn turn() -> Coordinates {
    let h = helix();
    Coordinates::from_points(&[h.point(0.0), h.point(2.0 * PI)]).unwrap()
}

fn mesh(curve: &impl line_mesh::CurveAdapter, pos: &mut Coordinates, opts: &CurveMeshOptions) -> CurveMesh {
    mesh_curve_param(curve, pos, 0, 1, 0.0, 2.0 * PI, 0.5, 0.5, opts, NoProgress).unwrap()
}

#[test]
fn helix_edges_follow_the_size() {
    let mut pos = turn();
    let m = mesh(&helix(), &mut pos, &CurveMeshOptions::default());
    let ne = m.connect.len();
    assert!((12..=14).contains(&ne), "{ne} edges");
    assert_eq!(m.connect.edge(0)[0], 0);
    assert_eq!(m.connect.edge(ne - 1)[1], 1);
    for (&n, &u) in m.nodes.iter().zip(&m.pos1d) {
        let p = pos.point3(n);
        assert!(approx((p[0] * p[0] + p[1] * p[1]).sqrt(), 1.0, 1e-12));
        assert!(approx(p[2], PITCH * u, 1e-12));
    }
    for e in m.connect.iter() {
        let l = pos.distance(e[0], e[1]);
        assert!((0.35..0.65).contains(&l), "edge length {l}");
    }
}

#[test]
fn chordal_control_uses_exact_or_estimated_curvature() {
    let coarse = mesh(&helix(), &mut turn(), &CurveMeshOptions::default());
    let control = ChordalControl::relative(0.02);
    let opts = CurveMeshOptions::default().with_chordal(control);
    let exact = mesh(&helix(), &mut turn(), &opts);
    assert!(exact.connect.len() > coarse.connect.len());
    assert!(exact.h0 < 0.5 && exact.h1 < 0.5);

    // a planar circle of the same curvature, without curvature support
    let r = 1.0 / helix().curvature();
    let circle = PlainCircle(r);
    let mut pos = Coordinates::from_points(&[[r, 0.0, 0.0], [-r, 0.0, 0.0]]).unwrap();
    let fine = mesh_curve_param(&circle, &mut pos, 0, 1, 0.0, PI, 10.0, 10.0, &opts, NoProgress).unwrap();
    let chord = 2.0 * (0.02f64 * 1.98).sqrt() * r;
    let expected = PI * r / chord;
    let ne = fine.connect.len() as f64;
    assert!((ne - expected).abs() <= 2.0, "{ne} edges, about {expected} expected");

    let approximate = opts.with_chordal(control.with_mode(ChordalMode::Approximate));
    let m = mesh(&helix(), &mut turn(), &approximate);
    assert!(m.connect.len().abs_diff(exact.connect.len()) <= 2);
}

#[test]
fn interruption_leaves_pos_untouched() {
    let mut pos = turn();
    let mut sink = AbortAfter::new(1);
    let err = mesh_curve_param(&helix(), &mut pos, 0, 1, 0.0, 2.0 * PI, 0.5, 0.5, &CurveMeshOptions::default(), &mut sink)
        .unwrap_err();
    assert_eq!(err, MeshError::Interrupted);
    assert!(err.is_interrupted());
    assert_eq!(pos.len(), 2);
    assert_eq!(sink.messages.len(), 1);

    let mut sink = AbortAfter::new(usize::MAX);
    mesh_curve_param(&helix(), &mut pos, 0, 1, 0.0, 2.0 * PI, 0.5, 0.5, &CurveMeshOptions::default(), &mut sink)
        .unwrap();
    assert!(sink.polls >= 2);
    assert!(sink.messages.is_empty());
}

#[test]
fn adapter_failures_roll_back_appends() {
    let curve = NoInverse(helix());
    let mut pos = turn();

    // end parameters must come from the inverse mapping
    let err = mesh_curve_param(&curve, &mut pos, 0, 1, 0.0, 0.0, 0.5, 0.5, &CurveMeshOptions::default(), NoProgress)
        .unwrap_err();
    assert_eq!(err.code(), INTERNAL_ERROR_CODE);
    assert_eq!(pos.len(), 2);

    // high-order nodes are projected with it after the vertices are appended
    let opts = CurveMeshOptions::default().with_high_order(2);
    let err = mesh_curve_param(&curve, &mut pos, 0, 1, 0.0, 2.0 * PI, 0.5, 0.5, &opts, LogProgress).unwrap_err();
    assert_eq!(err.code(), INTERNAL_ERROR_CODE);
    assert_eq!(pos.len(), 2);
}

#[test]
fn end_parameters_and_orientation() {
    let mut pos = turn();
    let forward = mesh_curve_param(&helix(), &mut pos, 0, 1, 0.0, 0.0, 0.3, 0.6, &CurveMeshOptions::default(), NoProgress)
        .unwrap();
    assert!(approx(forward.pos1d[0], 0.0, 1e-12));
    assert!(approx(*forward.pos1d.last().unwrap(), 2.0 * PI, 1e-12));

    let backward = mesh_curve_param(&helix(), &mut pos, 1, 0, 2.0 * PI, 0.0, 0.6, 0.3, &CurveMeshOptions::default(), NoProgress)
        .unwrap();
    assert_eq!(backward.connect.len(), forward.connect.len());
    assert_eq!(backward.connect.edge(0)[0], 1);
    assert_eq!(backward.connect.edge(backward.connect.len() - 1)[1], 0);
    assert_eq!((backward.h0, backward.h1), (0.6, 0.3));
}

#[test]
fn bounds_and_even_counts() {
    let opts = CurveMeshOptions::default().with_bounds(20, 30).with_force_even(true);
    let m = mesh(&helix(), &mut turn(), &opts);
    assert!(m.connect.len() >= 20 && m.connect.len() % 2 == 0);

    let opts = CurveMeshOptions::default().with_bounds(1, 3);
    assert_eq!(mesh(&helix(), &mut turn(), &opts).connect.len(), 3);
}
