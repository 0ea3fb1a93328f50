//! Straight segments and broken lines through hard nodes.
//!
//! Every builder appends its new points to `pos` and the ordered node list
//! of the discretized line (first and last hard nodes included) to
//! `indices`. Arguments are validated before anything is appended.

use log::debug;

use crate::algs::polyline::{arc_lengths, length};
use crate::algs::subdivide::{MAX_EDGES, SubdivideOptions, allocate_edges, place_edges, plan_edges, validate};
use crate::data::Coordinates;
use crate::geometry::{add, lerp, normalize, sub};
use crate::mesh_error::{MeshError, MeshResult};
use crate::metric::MetricTensor;

/// `ne` equal edges between `n0` and `n1`.
///
/// Arguments: 1 `pos`, 2 `n0`, 3 `n1`, 4 `ne` (≥ 1), 5 `indices`.
pub fn mesh_straight(pos: &mut Coordinates, n0: usize, n1: usize, ne: usize, indices: &mut Vec<usize>) -> MeshResult<()> {
    pos.check_geometric(1)?;
    pos.check_node(n0, 2)?;
    pos.check_node(n1, 3)?;
    if ne == 0 {
        return Err(MeshError::invalid(4, "at least one edge is required"));
    }
    check_edge_count(ne)?;
    indices.try_reserve(ne + 1)?;
    pos.reserve(ne - 1)?;
    indices.push(n0);
    push_uniform(pos, n0, n1, ne, indices)?;
    Ok(())
}

/// `ne` edges on `n0 → n1 → n2`, split between the two segments in
/// proportion to their lengths. When the split is a tie the first segment
/// gets the extra edge.
///
/// Arguments: 1 `pos`, 2 `n0`, 3 `n1`, 4 `n2`, 5 `ne` (≥ 2), 6 `indices`.
pub fn mesh_straight_through(
    pos: &mut Coordinates,
    n0: usize,
    n1: usize,
    n2: usize,
    ne: usize,
    indices: &mut Vec<usize>,
) -> MeshResult<()> {
    pos.check_geometric(1)?;
    pos.check_node(n0, 2)?;
    pos.check_node(n1, 3)?;
    pos.check_node(n2, 4)?;
    if ne < 2 {
        return Err(MeshError::invalid(5, format!("{ne} edges cannot reach the middle node")));
    }
    check_edge_count(ne)?;
    let mut counts = [1, 1];
    allocate_edges(&[pos.distance(n0, n1), pos.distance(n1, n2)], &mut counts, ne);
    debug!("mesh_straight_through: {} + {} edges", counts[0], counts[1]);
    indices.try_reserve(ne + 1)?;
    pos.reserve(ne - 2)?;
    indices.push(n0);
    push_uniform(pos, n0, n1, counts[0], indices)?;
    push_uniform(pos, n1, n2, counts[1], indices)?;
    Ok(())
}

/// Edges from `n0` to `n1` whose sizes grow geometrically from `h0` to `h1`.
///
/// Arguments: 1 `pos`, 2 `n0`, 3 `n1`, 4 `h0`, 5 `h1`, 6 `force_even`,
/// 7 `indices`.
pub fn mesh_straight_sized(
    pos: &mut Coordinates,
    n0: usize,
    n1: usize,
    h0: f64,
    h1: f64,
    force_even: bool,
    indices: &mut Vec<usize>,
) -> MeshResult<()> {
    pos.check_geometric(1)?;
    pos.check_node(n0, 2)?;
    pos.check_node(n1, 3)?;
    if !(h0 > 0.0) {
        return Err(MeshError::invalid(4, format!("size {h0} is not > 0")));
    }
    if !(h1 > 0.0) {
        return Err(MeshError::invalid(5, format!("size {h1} is not > 0")));
    }
    broken_line(pos, &[n0, n1], vec![h0, h1], SubdivideOptions::default().with_force_even(force_even), false, indices)
}

/// About `ne` edges along the broken line `hard_nodes`, each pair of hard
/// nodes receiving a share proportional to its length. With `force_even`
/// every pair gets an even count, so the total may exceed `ne`.
///
/// Arguments: 1 `pos`, 2 `hard_nodes`, 3 `ne` (≥ 1), 4 `force_even`,
/// 5 `indices`.
pub fn mesh_broken_line(
    pos: &mut Coordinates,
    hard_nodes: &[usize],
    ne: usize,
    force_even: bool,
    indices: &mut Vec<usize>,
) -> MeshResult<()> {
    check_hard_nodes(pos, hard_nodes)?;
    if ne == 0 {
        return Err(MeshError::invalid(3, "at least one edge is required"));
    }
    check_edge_count(ne)?;
    let total = length(pos, hard_nodes)?;
    let h = if total > 0.0 { total / ne as f64 } else { 1.0 };
    let opts = SubdivideOptions::default().with_bounds(ne, ne);
    broken_line(pos, hard_nodes, vec![h; hard_nodes.len()], opts, force_even, indices)
}

/// Broken line with a target size at every hard node.
///
/// Arguments: 1 `pos`, 2 `hard_nodes`, 3 `sizes` (one per hard node,
/// > 0), 4 `force_even`, 5 `indices`.
pub fn mesh_broken_line_sized(
    pos: &mut Coordinates,
    hard_nodes: &[usize],
    sizes: &[f64],
    force_even: bool,
    indices: &mut Vec<usize>,
) -> MeshResult<()> {
    check_hard_nodes(pos, hard_nodes)?;
    if sizes.len() != hard_nodes.len() {
        return Err(MeshError::invalid(
            3,
            format!("{} sizes for {} hard nodes", sizes.len(), hard_nodes.len()),
        ));
    }
    if let Some(h) = sizes.iter().find(|&&h| !(h > 0.0)) {
        return Err(MeshError::invalid(3, format!("size {h} is not > 0")));
    }
    broken_line(pos, hard_nodes, sizes.to_vec(), SubdivideOptions::default(), force_even, indices)
}

/// Broken line with a metric tensor at every hard node. Each tensor is
/// reduced to the size it prescribes along the line direction at its node
/// (the mean direction of the incident segments).
///
/// Arguments: 1 `pos`, 2 `hard_nodes`, 3 `tensors` (valid, one per hard
/// node), 4 `force_even`, 5 `indices`.
pub fn mesh_broken_line_aniso(
    pos: &mut Coordinates,
    hard_nodes: &[usize],
    tensors: &[MetricTensor],
    force_even: bool,
    indices: &mut Vec<usize>,
) -> MeshResult<()> {
    check_hard_nodes(pos, hard_nodes)?;
    if tensors.len() != hard_nodes.len() {
        return Err(MeshError::invalid(
            3,
            format!("{} tensors for {} hard nodes", tensors.len(), hard_nodes.len()),
        ));
    }
    if tensors.iter().any(|m| !m.is_valid() || m.dimension() < pos.dimension()) {
        return Err(MeshError::invalid(3, "metric tensors must be positive definite and match the point dimension"));
    }
    let last = hard_nodes.len() - 1;
    let sizes = (0..=last)
        .map(|k| {
            let p = pos.point3(hard_nodes[k]);
            let before = (k > 0).then(|| sub(p, pos.point3(hard_nodes[k - 1]))).and_then(normalize);
            let after = (k < last).then(|| sub(pos.point3(hard_nodes[k + 1]), p)).and_then(normalize);
            let dir = match (before, after) {
                (Some(a), Some(b)) => normalize(add(a, b)).unwrap_or(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => [0.0; 3],
            };
            tensors[k].size_along(dir)
        })
        .collect();
    broken_line(pos, hard_nodes, sizes, SubdivideOptions::default(), force_even, indices)
}

/// `InsufficientMemory` for counts no buffer could hold.
fn check_edge_count(ne: usize) -> MeshResult<()> {
    if ne > MAX_EDGES {
        return Err(MeshError::InsufficientMemory);
    }
    Ok(())
}

fn check_hard_nodes(pos: &Coordinates, hard_nodes: &[usize]) -> MeshResult<()> {
    pos.check_geometric(1)?;
    if hard_nodes.len() < 2 {
        return Err(MeshError::invalid(2, "a line needs at least two hard nodes"));
    }
    hard_nodes.iter().try_for_each(|&n| pos.check_node(n, 2))
}

/// Subdivide the broken line parametrized by arc length, with `metrics` at
/// the hard nodes, and materialize the new nodes on it.
fn broken_line(
    pos: &mut Coordinates,
    hard_nodes: &[usize],
    mut metrics: Vec<f64>,
    opts: SubdivideOptions,
    even_per_segment: bool,
    indices: &mut Vec<usize>,
) -> MeshResult<()> {
    let mut us = arc_lengths(pos, hard_nodes)?;
    let local: Vec<usize> = (0..hard_nodes.len()).collect();
    validate(&us, &metrics, &local, &opts)?;
    let mut counts = plan_edges(&us, &metrics, &local, &opts)?;
    if even_per_segment {
        for c in counts.iter_mut().filter(|c| **c % 2 == 1) {
            *c = c.checked_add(1).ok_or(MeshError::InsufficientMemory)?;
        }
    }
    let order = place_edges(&mut us, &mut metrics, &local, &counts)?;
    debug!(
        "broken line: {} hard nodes, {} edges",
        hard_nodes.len(),
        order.len().saturating_sub(1)
    );
    emit_on_polyline(pos, hard_nodes, &us, &order, indices)
}

/// Append the nodes of `order` to `indices`. Entries below
/// `hard_nodes.len()` refer to hard nodes; the others are new parameters in
/// `us`, placed on the polyline between the surrounding hard nodes.
pub(crate) fn emit_on_polyline(
    pos: &mut Coordinates,
    hard_nodes: &[usize],
    us: &[f64],
    order: &[usize],
    indices: &mut Vec<usize>,
) -> MeshResult<()> {
    let n_hard = hard_nodes.len();
    pos.reserve(order.len().saturating_sub(2))?;
    indices.try_reserve(order.len())?;
    let mut seg = 0;
    for &j in order {
        if j < n_hard {
            seg = j.min(n_hard - 2);
            indices.push(hard_nodes[j]);
            continue;
        }
        while seg + 2 < n_hard && us[j] > us[seg + 1] {
            seg += 1;
        }
        let (a, b) = (hard_nodes[seg], hard_nodes[seg + 1]);
        let span = us[seg + 1] - us[seg];
        let t = if span > 0.0 { ((us[j] - us[seg]) / span).clamp(0.0, 1.0) } else { 0.0 };
        indices.push(pos.push_point3(lerp(pos.point3(a), pos.point3(b), t))?);
    }
    Ok(())
}

/// Append `ne - 1` evenly spaced points strictly between `a` and `b`, then `b`.
fn push_uniform(pos: &mut Coordinates, a: usize, b: usize, ne: usize, indices: &mut Vec<usize>) -> MeshResult<()> {
    let (pa, pb) = (pos.point3(a), pos.point3(b));
    for k in 1..ne {
        indices.push(pos.push_point3(lerp(pa, pb, k as f64 / ne as f64))?);
    }
    indices.push(b);
    Ok(())
}
