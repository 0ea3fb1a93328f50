//! Operators on per-node metric fields.
//!
//! Isotropic metrics are plain sizes (`f64 > 0`). A value of zero stands for
//! "no constraint yet" and is the identity of [`intersect`].

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::data::{Connectivity, Coordinates};
use crate::geometry::norm;
use crate::mesh_error::{MeshError, MeshResult};
use crate::metric::tensor::MetricTensor;

const MAX_SWEEPS: usize = 256;
const REL_TOL: f64 = 1e-12;

/// Direction in which a gradation pass may move metric values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradationSign {
    /// Only reduce sizes (`-1`).
    #[default]
    Decrease,
    /// Reduce the larger size, or raise the smaller one when the larger is frozen (`0`).
    Both,
    /// Only raise sizes (`+1`).
    Increase,
}

impl GradationSign {
    /// From the classic `-1 / 0 / +1` flag.
    pub fn from_flag(flag: i32) -> Self {
        match flag.signum() {
            -1 => GradationSign::Decrease,
            0 => GradationSign::Both,
            _ => GradationSign::Increase,
        }
    }

    fn may_decrease(self) -> bool {
        self != GradationSign::Increase
    }

    fn may_increase(self) -> bool {
        self != GradationSign::Decrease
    }
}

/// Scalar metric intersection: the smaller size, with `0` as identity.
#[inline]
pub fn intersect(a: f64, b: f64) -> f64 {
    if a <= 0.0 {
        b
    } else if b <= 0.0 {
        a
    } else {
        a.min(b)
    }
}

/// Clip every value into `[min, max]`; returns how many values changed.
///
/// `min <= 0` disables the lower bound, `max <= 0` or `max == ∞` the upper one.
pub fn clamp(metrics: &mut [f64], min: f64, max: f64) -> MeshResult<usize> {
    let (lo, hi) = bounds(min, max)?;
    let mut changed = 0;
    for m in metrics.iter_mut() {
        let v = m.max(lo).min(hi);
        if v != *m {
            *m = v;
            changed += 1;
        }
    }
    Ok(changed)
}

/// Tensor version of [`clamp`]: sizes in every direction end up in `[min, max]`.
pub fn clamp_tensors(tensors: &mut [MetricTensor], min: f64, max: f64) -> MeshResult<()> {
    let (lo, hi) = bounds(min, max)?;
    for t in tensors.iter_mut() {
        let dim = t.dimension();
        if lo > 0.0 {
            *t = MetricTensor::isotropic(dim, lo)?.union(t)?;
        }
        if hi.is_finite() {
            *t = MetricTensor::isotropic(dim, hi)?.intersect(t)?;
        }
    }
    Ok(())
}

fn bounds(min: f64, max: f64) -> MeshResult<(f64, f64)> {
    if min.is_nan() || max.is_nan() {
        return Err(MeshError::invalid(2, "NaN bound"));
    }
    let lo = if min > 0.0 { min } else { 0.0 };
    let hi = if max > 0.0 { max } else { f64::INFINITY };
    if lo > hi {
        return Err(MeshError::invalid(2, format!("min {min} > max {max}")));
    }
    Ok((lo, hi))
}

/// Lower anchor, upper anchor and local coordinate bracketing `u`.
fn bracket(params: &[f64], u: f64) -> Option<(usize, usize, f64)> {
    let first = *params.first()?;
    let last = *params.last()?;
    let tol = REL_TOL * first.abs().max(last.abs()).max(1.0);
    if u < first - tol || u > last + tol {
        return None;
    }
    let u = u.clamp(first, last);
    let k = params.partition_point(|&p| p < u);
    if k == 0 {
        return Some((0, 0, 0.0));
    }
    let span = params[k] - params[k - 1];
    let t = if span > 0.0 {
        (u - params[k - 1]) / span
    } else {
        1.0
    };
    Some((k - 1, k, t))
}

fn check_anchors(anchor_params: &[f64], n_values: usize) -> MeshResult<()> {
    if anchor_params.is_empty() {
        return Err(MeshError::invalid(1, "no anchors"));
    }
    if anchor_params.windows(2).any(|w| !(w[0] <= w[1])) {
        return Err(MeshError::invalid(1, "anchor parameters are not sorted ascending"));
    }
    if n_values != anchor_params.len() {
        return Err(MeshError::invalid(
            2,
            format!("{n_values} metrics for {} anchors", anchor_params.len()),
        ));
    }
    Ok(())
}

/// Linear interpolation of anchor metrics at `query` parameters.
pub fn interpolate(anchor_params: &[f64], anchor_metrics: &[f64], query: &[f64]) -> MeshResult<Vec<f64>> {
    check_anchors(anchor_params, anchor_metrics.len())?;
    query
        .iter()
        .map(|&u| {
            let (a, b, t) = bracket(anchor_params, u)
                .ok_or_else(|| MeshError::invalid(3, format!("parameter {u} outside the anchors")))?;
            Ok(anchor_metrics[a] + t * (anchor_metrics[b] - anchor_metrics[a]))
        })
        .collect()
}

/// Component-wise interpolation of tensors at `query` parameters.
pub fn interpolate_tensors(
    anchor_params: &[f64],
    anchor_tensors: &[MetricTensor],
    query: &[f64],
) -> MeshResult<Vec<MetricTensor>> {
    check_anchors(anchor_params, anchor_tensors.len())?;
    query
        .iter()
        .map(|&u| {
            let (a, b, t) = bracket(anchor_params, u)
                .ok_or_else(|| MeshError::invalid(3, format!("parameter {u} outside the anchors")))?;
            anchor_tensors[a].lerp(&anchor_tensors[b], t)
        })
        .collect()
}

/// Metric length of an edge of length `length` whose size varies linearly
/// from `h0` to `h1`. 1 is the optimal value.
pub fn edge_quality(length: f64, h0: f64, h1: f64) -> f64 {
    if !(h0 > 0.0 && h1 > 0.0) {
        return f64::INFINITY;
    }
    let dh = h1 - h0;
    if dh.abs() <= REL_TOL * h0.max(h1) {
        length / h0
    } else {
        length * (h1 / h0).ln() / dh
    }
}

/// Bound the H-shock `max(h0/h1, h1/h0)^(1/L) - 1` of every edge by
/// `max_gradation`, `L` being the edge metric length.
///
/// With sizes varying linearly along an edge of length `ℓ` this is
/// `|h1 - h0| <= ℓ · ln(1 + max_gradation)`. When `hard` is true, `nodes` are
/// frozen; otherwise only `nodes` may change. Returns the number of modified
/// values. `max_gradation >= f64::MAX` disables the pass.
pub fn bound_gradations(
    pos: &Coordinates,
    connect: &Connectivity,
    nodes: &[usize],
    hard: bool,
    sign: GradationSign,
    max_gradation: f64,
    metrics: &mut [f64],
) -> MeshResult<usize> {
    if max_gradation.is_nan() || max_gradation < 0.0 {
        return Err(MeshError::invalid(6, format!("max gradation {max_gradation} < 0")));
    }
    let mask = modifiable_mask(pos, connect, nodes, hard, metrics)?;
    if max_gradation >= f64::MAX {
        return Ok(0);
    }
    Ok(relax_sizes(pos, connect, &mask, sign, max_gradation.ln_1p(), metrics))
}

/// Bound `|h1 - h0| / ℓ` by `max_variation` on every edge; same conventions
/// as [`bound_gradations`].
pub fn bound_variations(
    pos: &Coordinates,
    connect: &Connectivity,
    nodes: &[usize],
    hard: bool,
    sign: GradationSign,
    max_variation: f64,
    metrics: &mut [f64],
) -> MeshResult<usize> {
    if max_variation.is_nan() || max_variation < 0.0 {
        return Err(MeshError::invalid(6, format!("max variation {max_variation} < 0")));
    }
    let mask = modifiable_mask(pos, connect, nodes, hard, metrics)?;
    if max_variation >= f64::MAX {
        return Ok(0);
    }
    Ok(relax_sizes(pos, connect, &mask, sign, max_variation, metrics))
}

fn modifiable_mask(
    pos: &Coordinates,
    connect: &Connectivity,
    nodes: &[usize],
    hard: bool,
    metrics: &[f64],
) -> MeshResult<Vec<bool>> {
    let n = metrics.len();
    connect.check_nodes(pos.len().min(n), 2)?;
    if let Some(&bad) = nodes.iter().find(|&&i| i >= n) {
        return Err(MeshError::invalid(3, format!("node {bad} has no metric")));
    }
    for e in connect.iter() {
        for &i in &e[..2] {
            if !(metrics[i] > 0.0) {
                return Err(MeshError::invalid(7, format!("metric {} at node {i} is not > 0", metrics[i])));
            }
        }
    }
    let mut mask = vec![hard; n];
    for &i in nodes {
        mask[i] = !hard;
    }
    Ok(mask)
}

/// Gauss-Seidel relaxation of `|h_i - h_j| <= rate · ℓ_ij`, alternating
/// sweep directions until nothing moves.
fn relax_sizes(
    pos: &Coordinates,
    connect: &Connectivity,
    modifiable: &[bool],
    sign: GradationSign,
    rate: f64,
    metrics: &mut [f64],
) -> usize {
    let edges: Vec<(usize, usize, f64)> = connect
        .iter()
        .map(|e| (e[0], e[1], pos.distance(e[0], e[1])))
        .collect();
    let mut touched = vec![false; metrics.len()];
    let mut sweeps = 0;
    loop {
        if sweeps == MAX_SWEEPS {
            warn!("size relaxation stopped after {MAX_SWEEPS} sweeps");
            break;
        }
        let mut moved = false;
        let mut relax = |&(i, j, len): &(usize, usize, f64)| {
            let (small, big) = if metrics[i] <= metrics[j] { (i, j) } else { (j, i) };
            let allowed = rate * len;
            if metrics[big] - metrics[small] <= allowed + REL_TOL * metrics[big] {
                return;
            }
            let (node, value) = if sign.may_decrease() && modifiable[big] {
                (big, metrics[small] + allowed)
            } else if sign.may_increase() && modifiable[small] {
                (small, metrics[big] - allowed)
            } else {
                return;
            };
            metrics[node] = value;
            touched[node] = true;
            moved = true;
        };
        if sweeps % 2 == 0 {
            edges.iter().for_each(&mut relax);
        } else {
            edges.iter().rev().for_each(&mut relax);
        }
        sweeps += 1;
        if !moved {
            break;
        }
    }
    let changed = touched.iter().filter(|&&t| t).count();
    trace!("size relaxation: {changed} values changed in {sweeps} sweeps");
    changed
}

/// `h / ||T||` per node; null tangents keep the value.
pub fn metrics_3d_to_1d(metrics: &[f64], tangents: &[[f64; 3]]) -> MeshResult<Vec<f64>> {
    scale_by_tangents(metrics, tangents, |h, t| h / t)
}

/// `h · ||T||` per node; inverse of [`metrics_3d_to_1d`].
pub fn metrics_1d_to_3d(metrics: &[f64], tangents: &[[f64; 3]]) -> MeshResult<Vec<f64>> {
    scale_by_tangents(metrics, tangents, |h, t| h * t)
}

fn scale_by_tangents(metrics: &[f64], tangents: &[[f64; 3]], f: impl Fn(f64, f64) -> f64) -> MeshResult<Vec<f64>> {
    if metrics.len() != tangents.len() {
        return Err(MeshError::invalid(
            2,
            format!("{} tangents for {} metrics", tangents.len(), metrics.len()),
        ));
    }
    Ok(metrics
        .iter()
        .zip(tangents)
        .map(|(&h, &t)| {
            let n = norm(t);
            if n > 0.0 { f(h, n) } else { h }
        })
        .collect())
}

/// Sizes prescribed by `tensors` along `directions`: `sqrt(v·v / vᵗMv)`.
pub fn aniso_to_iso(tensors: &[MetricTensor], directions: &[[f64; 3]]) -> MeshResult<Vec<f64>> {
    if tensors.len() != directions.len() {
        return Err(MeshError::invalid(
            2,
            format!("{} directions for {} tensors", directions.len(), tensors.len()),
        ));
    }
    Ok(tensors
        .iter()
        .zip(directions)
        .map(|(m, &v)| m.size_along(v))
        .collect())
}
