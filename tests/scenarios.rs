mod util;

use line_mesh::algs::extrude::{Division, Origin, extrude_rotate, extrude_rotate_2d};
use line_mesh::algs::straight::{mesh_straight, mesh_straight_sized, mesh_straight_through};
use line_mesh::metric::{metrics_1d_to_3d, metrics_3d_to_1d};
use util::*;

#[test]
fn straight_line_four_edges() {
    let mut pos = points2(&[[0.0, 0.0], [1.0, 1.0]]);
    let mut indices = Vec::new();
    mesh_straight(&mut pos, 0, 1, 4, &mut indices).unwrap();
    assert_eq!(indices, vec![0, 2, 3, 4, 1]);
    for (node, t) in [(2, 0.25), (3, 0.5), (4, 0.75)] {
        let p = pos.point(node).unwrap();
        assert!(approx(p[0], t, 1e-12) && approx(p[1], t, 1e-12), "{p:?}");
    }
}

#[test]
fn force_even_never_yields_one_edge() {
    let mut pos = points2(&[[0.0, 0.0], [1.0, 0.0]]);
    let mut indices = Vec::new();
    mesh_straight_sized(&mut pos, 0, 1, 1.0, 1.0, true, &mut indices).unwrap();
    let ne = indices.len() - 1;
    assert!(ne >= 2 && ne % 2 == 0, "{ne} edges");
    assert_eq!((indices[0], indices[ne]), (0, 1));
}

#[test]
fn three_node_split_follows_lengths() {
    let mut pos = points2(&[[0.0, 0.0], [2.0, 0.0], [3.0, 0.0]]);
    let mut indices = Vec::new();
    mesh_straight_through(&mut pos, 0, 1, 2, 5, &mut indices).unwrap();
    let middle = indices.iter().position(|&n| n == 1).unwrap();
    let (first, second) = (middle, indices.len() - 1 - middle);
    assert_eq!(first + second, 5);
    assert!(first >= second);
    assert_eq!(indices.last(), Some(&2));
}

#[test]
fn rotation_about_the_start_node_is_degenerate() {
    let mut pos = points2(&[[1.0, 1.0]]);
    let mut indices = Vec::new();
    extrude_rotate(&mut pos, Origin::Node(0), &[1.0, 1.0], [0.0, 0.0, 1.0], Division::Count(4), &mut indices)
        .unwrap();
    assert_eq!(indices.len(), 5);
    assert_eq!(pos.dimension(), 3);
    for &n in &indices {
        let p = pos.point3(n);
        assert!(approx(p[0], 1.0, 1e-12) && approx(p[1], 1.0, 1e-12) && p[2].abs() < 1e-12, "{p:?}");
    }

    let mut flat = points2(&[[0.5, 0.0]]);
    let mut indices = Vec::new();
    extrude_rotate_2d(&mut flat, Origin::Node(0), [0.5, 0.0], 0.0, Division::Count(3), &mut indices).unwrap();
    assert_eq!(indices.len(), 4);
    assert_eq!(flat.dimension(), 2);
}

#[test]
fn metric_reduction_round_trip() {
    let tangents = [[3.0, 4.0, 0.0], [0.0, 0.0, 0.2]];
    let h = [0.7, 1.3];
    let h1d = metrics_3d_to_1d(&h, &tangents).unwrap();
    assert!(approx(h1d[0], 0.14, 1e-12));
    let back = metrics_1d_to_3d(&h1d, &tangents).unwrap();
    for (a, b) in back.iter().zip(&h) {
        assert!(approx(*a, *b, 1e-12));
    }
}
