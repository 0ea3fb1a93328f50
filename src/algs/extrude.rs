//! Sweep a node along a translation or a rotation into a line of edges.
//!
//! The sweep starts at an existing node or at a new point, and produces `NE`
//! new nodes, the last one being the end of the sweep. Edge sizes are either
//! uniform ([`Division::Count`]) or grow geometrically between two sizes
//! measured along the swept path ([`Division::Sizes`]).
//!
//! # Example
//! ```rust
//! # fn try_main() -> Result<(), line_mesh::mesh_error::MeshError> {
//! use line_mesh::algs::extrude::{Division, Origin, extrude_translate};
//! use line_mesh::data::Coordinates;
//!
//! let mut pos = Coordinates::from_points(&[[0.0, 0.0]])?;
//! let mut indices = Vec::new();
//! extrude_translate(&mut pos, Origin::Node(0), &[2.0, 0.0], Division::Count(4), &mut indices)?;
//! assert_eq!(indices, vec![0, 1, 2, 3, 4]);
//! assert_eq!(pos.point(2), Some(&[1.0, 0.0][..]));
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```
//!
//! A null rotation, or a start node on the rotation axis, yields degenerate
//! zero-length edges. Closing a full turn is left to the caller, who replaces
//! the last produced index with the first one.

use log::debug;

use crate::algs::subdivide::{SubdivideOptions, subdivide};
use crate::data::Coordinates;
use crate::geometry::{add, cross, norm, rotate_about_axis, scale, sub};
use crate::mesh_error::{MeshError, MeshResult};

/// Where a sweep starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Origin<'a> {
    /// An existing node of the point set.
    Node(usize),
    /// A new point, appended before the swept nodes.
    Point(&'a [f64]),
}

/// How the swept path is divided into edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Division {
    /// `ne` equal edges.
    Count(usize),
    /// Sizes `h0` at the start and `h1` at the end of the path.
    Sizes { h0: f64, h1: f64, force_even: bool },
}

impl Division {
    fn check(&self, arg: usize) -> MeshResult<()> {
        match *self {
            Division::Count(0) => Err(MeshError::invalid(arg, "at least one edge is required")),
            Division::Sizes { h0, h1, .. } if !(h0 > 0.0 && h1 > 0.0) => {
                Err(MeshError::invalid(arg, format!("sizes {h0}, {h1} must be > 0")))
            }
            _ => Ok(()),
        }
    }

    /// Path fractions of the new nodes, in `(0, 1]`, the last one being 1.
    fn fractions(&self, length: f64) -> MeshResult<Vec<f64>> {
        match *self {
            Division::Count(ne) => Ok((1..=ne).map(|k| k as f64 / ne as f64).collect()),
            Division::Sizes { h0, h1, force_even } => {
                let mut us = vec![0.0, length];
                let mut metrics = vec![h0, h1];
                let opts = SubdivideOptions::default().with_force_even(force_even);
                let order = subdivide(&mut us, &mut metrics, &[0, 1], &opts)?;
                let ne = order.len() - 1;
                Ok(order[1..]
                    .iter()
                    .enumerate()
                    .map(|(k, &j)| if length > 0.0 { us[j] / length } else { (k + 1) as f64 / ne as f64 })
                    .collect())
            }
        }
    }
}

fn as_point3(v: &[f64]) -> [f64; 3] {
    let mut p = [0.0; 3];
    for (d, x) in p.iter_mut().zip(v) {
        *d = *x;
    }
    p
}

fn check_vector(v: &[f64], arg: usize, what: &str) -> MeshResult<()> {
    if matches!(v.len(), 2 | 3) && v.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(MeshError::invalid(arg, format!("{what} needs 2 or 3 finite components")))
    }
}

fn check_origin(pos: &Coordinates, origin: &Origin<'_>, arg: usize) -> MeshResult<()> {
    match origin {
        Origin::Node(n) => pos.check_node(*n, arg),
        Origin::Point(p) => check_vector(p, arg, "origin point"),
    }
}

/// Push the origin point if needed; returns the start node.
fn start_node(pos: &mut Coordinates, origin: &Origin<'_>) -> MeshResult<usize> {
    match origin {
        Origin::Node(n) => Ok(*n),
        Origin::Point(p) => pos.push_point3(as_point3(p)),
    }
}

fn needs_3d(pos: &Coordinates, origin: &Origin<'_>, vectors: &[&[f64]]) -> bool {
    let third = |v: &[f64]| v.len() == 3;
    pos.dimension() == 2 && (matches!(origin, Origin::Point(p) if third(p)) || vectors.iter().any(|v| third(v)))
}

/// Sweep `origin` along the translation `t`.
///
/// Arguments: 1 `pos`, 2 `origin`, 3 `t`, 4 `division`, 5 `indices`. A
/// 3-component origin point or vector promotes a 2-D point set to 3-D.
pub fn extrude_translate(
    pos: &mut Coordinates,
    origin: Origin<'_>,
    t: &[f64],
    division: Division,
    indices: &mut Vec<usize>,
) -> MeshResult<()> {
    pos.check_geometric(1)?;
    check_origin(pos, &origin, 2)?;
    check_vector(t, 3, "translation")?;
    division.check(4)?;
    if needs_3d(pos, &origin, &[t]) {
        pos.promote_to_3d()?;
    }
    let t = as_point3(t);
    let fractions = division.fractions(norm(t))?;
    let start = start_node(pos, &origin)?;
    let p0 = pos.point3(start);
    sweep(pos, start, &fractions, indices, |f| add(p0, scale(t, f)))
}

/// Sweep `origin` around the axis through `center` along `rotation`, by the
/// angle `|rotation|` (radians). The point set is promoted to 3-D.
///
/// Arguments: 1 `pos`, 2 `origin`, 3 `center`, 4 `rotation`, 5 `division`,
/// 6 `indices`.
pub fn extrude_rotate(
    pos: &mut Coordinates,
    origin: Origin<'_>,
    center: &[f64],
    rotation: [f64; 3],
    division: Division,
    indices: &mut Vec<usize>,
) -> MeshResult<()> {
    pos.check_geometric(1)?;
    check_origin(pos, &origin, 2)?;
    check_vector(center, 3, "rotation center")?;
    if rotation.iter().any(|x| !x.is_finite()) {
        return Err(MeshError::invalid(4, "rotation vector is not finite"));
    }
    division.check(5)?;
    pos.promote_to_3d()?;
    rotate(pos, origin, as_point3(center), rotation, division, indices)
}

/// Planar version of [`extrude_rotate`]: rotation by `rz` radians around
/// the Z axis through `center`. The point set keeps its dimension.
///
/// Arguments: 1 `pos`, 2 `origin`, 3 `center`, 4 `rz`, 5 `division`,
/// 6 `indices`.
pub fn extrude_rotate_2d(
    pos: &mut Coordinates,
    origin: Origin<'_>,
    center: [f64; 2],
    rz: f64,
    division: Division,
    indices: &mut Vec<usize>,
) -> MeshResult<()> {
    pos.check_geometric(1)?;
    check_origin(pos, &origin, 2)?;
    if center.iter().any(|x| !x.is_finite()) {
        return Err(MeshError::invalid(3, "rotation center is not finite"));
    }
    if !rz.is_finite() {
        return Err(MeshError::invalid(4, "rotation angle is not finite"));
    }
    division.check(5)?;
    if needs_3d(pos, &origin, &[]) {
        pos.promote_to_3d()?;
    }
    rotate(pos, origin, [center[0], center[1], 0.0], [0.0, 0.0, rz], division, indices)
}

fn rotate(
    pos: &mut Coordinates,
    origin: Origin<'_>,
    center: [f64; 3],
    rotation: [f64; 3],
    division: Division,
    indices: &mut Vec<usize>,
) -> MeshResult<()> {
    let angle = norm(rotation);
    let start = start_node(pos, &origin)?;
    let p0 = pos.point3(start);
    // distance from the start point to the axis
    let radius = if angle > 0.0 {
        norm(cross(scale(rotation, 1.0 / angle), sub(p0, center)))
    } else {
        0.0
    };
    let fractions = division.fractions(angle * radius)?;
    sweep(pos, start, &fractions, indices, |f| rotate_about_axis(p0, center, rotation, f * angle))
}

fn sweep(
    pos: &mut Coordinates,
    start: usize,
    fractions: &[f64],
    indices: &mut Vec<usize>,
    at: impl Fn(f64) -> [f64; 3],
) -> MeshResult<()> {
    pos.reserve(fractions.len())?;
    indices.try_reserve(fractions.len() + 1)?;
    indices.push(start);
    for &f in fractions {
        indices.push(pos.push_point3(at(f))?);
    }
    debug!("extrude: {} edges from node {start}", fractions.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        norm(sub(a, b)) < 1e-12
    }

    #[test]
    fn translate_from_new_point() {
        let mut pos = Coordinates::new(2).unwrap();
        let mut idx = Vec::new();
        extrude_translate(&mut pos, Origin::Point(&[1.0, 1.0]), &[0.0, 3.0], Division::Count(3), &mut idx).unwrap();
        assert_eq!(idx, vec![0, 1, 2, 3]);
        assert!(close(pos.point3(3), [1.0, 4.0, 0.0]));
    }

    #[test]
    fn translate_promotes_to_3d() {
        let mut pos = Coordinates::from_points(&[[0.0, 0.0]]).unwrap();
        let mut idx = Vec::new();
        extrude_translate(&mut pos, Origin::Node(0), &[0.0, 0.0, 1.0], Division::Count(2), &mut idx).unwrap();
        assert_eq!(pos.dimension(), 3);
        assert!(close(pos.point3(1), [0.0, 0.0, 0.5]));
    }

    #[test]
    fn translate_with_sizes() {
        let mut pos = Coordinates::from_points(&[[0.0, 0.0]]).unwrap();
        let mut idx = Vec::new();
        let division = Division::Sizes { h0: 0.1, h1: 1.0, force_even: false };
        extrude_translate(&mut pos, Origin::Node(0), &[5.0, 0.0], division, &mut idx).unwrap();
        let xs: Vec<f64> = idx.iter().map(|&i| pos.point3(i)[0]).collect();
        assert!((xs[xs.len() - 1] - 5.0).abs() < 1e-12);
        assert!(xs[1] - xs[0] < xs[xs.len() - 1] - xs[xs.len() - 2]);
    }

    #[test]
    fn half_turn() {
        let mut pos = Coordinates::from_points(&[[1.0, 0.0]]).unwrap();
        let mut idx = Vec::new();
        extrude_rotate_2d(&mut pos, Origin::Node(0), [0.0, 0.0], PI, Division::Count(2), &mut idx).unwrap();
        assert_eq!(pos.dimension(), 2);
        assert!(close(pos.point3(idx[1]), [0.0, 1.0, 0.0]));
        assert!((pos.point3(idx[2])[0] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_rotation_is_not_an_error() {
        let mut pos = Coordinates::from_points(&[[2.0, 3.0]]).unwrap();
        let mut idx = Vec::new();
        extrude_rotate(&mut pos, Origin::Node(0), &[2.0, 3.0], [0.0, 0.0, 1.0], Division::Count(4), &mut idx).unwrap();
        assert_eq!(idx.len(), 5);
        for &i in &idx {
            assert!(close(pos.point3(i), [2.0, 3.0, 0.0]));
        }
        let mut pos = Coordinates::from_points(&[[2.0, 3.0]]).unwrap();
        let sizes = Division::Sizes { h0: 1.0, h1: 1.0, force_even: false };
        extrude_rotate(&mut pos, Origin::Node(0), &[0.0, 0.0], [0.0; 3], sizes, &mut idx).unwrap();
    }

    #[test]
    fn invalid_arguments() {
        let mut pos = Coordinates::from_points(&[[0.0, 0.0]]).unwrap();
        let mut idx = Vec::new();
        let err = extrude_translate(&mut pos, Origin::Node(4), &[1.0, 0.0], Division::Count(1), &mut idx);
        assert_eq!(err.unwrap_err().code(), -2);
        let err = extrude_translate(&mut pos, Origin::Node(0), &[1.0], Division::Count(1), &mut idx);
        assert_eq!(err.unwrap_err().code(), -3);
        let err = extrude_rotate(&mut pos, Origin::Node(0), &[0.0, 0.0], [0.0, 0.0, 1.0], Division::Count(0), &mut idx);
        assert_eq!(err.unwrap_err().code(), -5);
        assert_eq!(pos.dimension(), 2);
    }
}
