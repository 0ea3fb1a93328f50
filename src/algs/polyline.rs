//! Measurements and small utilities on polylines given as node sequences.

use itertools::Itertools;

use crate::data::{Connectivity, Coordinates};
use crate::geometry::{cross, lerp, norm, sub};
use crate::mesh_error::{MeshError, MeshResult};

fn check_nodes(pos: &Coordinates, nodes: &[usize], arg: usize) -> MeshResult<()> {
    match nodes.iter().find(|&&n| n >= pos.len()) {
        Some(&n) => Err(MeshError::invalid(
            arg,
            format!("node {n} out of range (size {})", pos.len()),
        )),
        None => Ok(()),
    }
}

/// Total Euclidean length of the polyline `nodes`.
pub fn length(pos: &Coordinates, nodes: &[usize]) -> MeshResult<f64> {
    check_nodes(pos, nodes, 2)?;
    Ok(nodes.windows(2).map(|w| pos.distance(w[0], w[1])).sum())
}

/// Cumulative arc length at every node of the polyline (starts at 0).
pub fn arc_lengths(pos: &Coordinates, nodes: &[usize]) -> MeshResult<Vec<f64>> {
    check_nodes(pos, nodes, 2)?;
    let mut acc = 0.0;
    let mut out = Vec::new();
    out.try_reserve(nodes.len())?;
    out.push(0.0);
    for w in nodes.windows(2) {
        acc += pos.distance(w[0], w[1]);
        out.push(acc);
    }
    out.truncate(nodes.len());
    Ok(out)
}

/// Discrete curvature (inverse circumradius of consecutive triples).
///
/// End nodes copy their neighbour; polylines with fewer than three nodes
/// have zero curvature.
pub fn curvatures(pos: &Coordinates, nodes: &[usize]) -> MeshResult<Vec<f64>> {
    check_nodes(pos, nodes, 2)?;
    let n = nodes.len();
    let mut out = vec![0.0; n];
    if n < 3 {
        return Ok(out);
    }
    for (k, (&a, &b, &c)) in nodes.iter().tuple_windows().enumerate() {
        let (pa, pb, pc) = (pos.point3(a), pos.point3(b), pos.point3(c));
        let ab = sub(pb, pa);
        let bc = sub(pc, pb);
        let ca = sub(pa, pc);
        let denom = norm(ab) * norm(bc) * norm(ca);
        out[k + 1] = if denom > 0.0 { 2.0 * norm(cross(ab, sub(pc, pa))) / denom } else { 0.0 };
    }
    out[0] = out[1];
    out[n - 1] = out[n - 2];
    Ok(out)
}

/// Node normals of a 2-D edge mesh.
///
/// Each edge `(i, j)` has the normal `OZ × (p_j - p_i)`; node normals are
/// the average of the incident edge normals weighted by `length^w`.
/// `w = -f64::MAX` keeps the shortest incident edge, `w = f64::MAX` the
/// longest. Nodes without edges get a null normal.
pub fn normals(pos: &Coordinates, connect: &Connectivity, w: f64, normalize: bool) -> MeshResult<Vec<[f64; 2]>> {
    if pos.dimension() != 2 {
        return Err(MeshError::invalid(1, "normals need a 2-D point set"));
    }
    connect.check_nodes(pos.len(), 2)?;
    let mut sum = vec![[0.0; 2]; pos.len()];
    let mut best = vec![None::<f64>; pos.len()];
    for e in connect.iter() {
        let (i, j) = (e[0], e[1]);
        let d = sub(pos.point3(j), pos.point3(i));
        let len = norm(d);
        if len == 0.0 {
            continue;
        }
        let unit = [-d[1] / len, d[0] / len];
        for node in [i, j] {
            if w == f64::MAX || w == -f64::MAX {
                let better = match best[node] {
                    None => true,
                    Some(b) => (w > 0.0 && len > b) || (w < 0.0 && len < b),
                };
                if better {
                    best[node] = Some(len);
                    sum[node] = unit;
                }
            } else {
                let weight = len.powf(w);
                sum[node][0] += unit[0] * weight;
                sum[node][1] += unit[1] * weight;
            }
        }
    }
    if normalize {
        for v in &mut sum {
            let n = v[0].hypot(v[1]);
            if n > 0.0 {
                *v = [v[0] / n, v[1] / n];
            }
        }
    }
    Ok(sum)
}

/// Place `nodes1` at parameters `u1` along the polyline `nodes0` whose
/// parameters are `u0` (sorted ascending).
pub fn interpolate_coordinates(
    pos: &mut Coordinates,
    nodes0: &[usize],
    u0: &[f64],
    nodes1: &[usize],
    u1: &[f64],
) -> MeshResult<()> {
    check_nodes(pos, nodes0, 2)?;
    if u0.len() != nodes0.len() || u0.is_empty() {
        return Err(MeshError::invalid(3, "one parameter per polyline node required"));
    }
    if u0.windows(2).any(|w| !(w[0] <= w[1])) {
        return Err(MeshError::invalid(3, "polyline parameters are not sorted"));
    }
    check_nodes(pos, nodes1, 4)?;
    if u1.len() != nodes1.len() {
        return Err(MeshError::invalid(5, "one parameter per new node required"));
    }
    let (first, last) = (u0[0], u0[u0.len() - 1]);
    if let Some(u) = u1.iter().find(|&&u| !(u >= first && u <= last)) {
        return Err(MeshError::invalid(5, format!("parameter {u} outside [{first}, {last}]")));
    }
    for (&node, &u) in nodes1.iter().zip(u1) {
        let k = u0.partition_point(|&p| p < u).clamp(1, u0.len().max(2) - 1);
        let p = if u0.len() == 1 {
            pos.point3(nodes0[0])
        } else {
            let span = u0[k] - u0[k - 1];
            let t = if span > 0.0 { (u - u0[k - 1]) / span } else { 0.0 };
            lerp(pos.point3(nodes0[k - 1]), pos.point3(nodes0[k]), t)
        };
        pos.set_point3(node, p);
    }
    Ok(())
}

/// Co-sort `nodes` by increasing `us` (stable).
pub fn sort(us: &mut [f64], nodes: &mut [usize]) -> MeshResult<()> {
    if us.len() != nodes.len() {
        return Err(MeshError::invalid(2, format!("{} nodes for {} parameters", nodes.len(), us.len())));
    }
    let sorted = us
        .iter()
        .copied()
        .zip(nodes.iter().copied())
        .sorted_by(|a, b| a.0.total_cmp(&b.0))
        .collect_vec();
    for (k, (u, n)) in sorted.into_iter().enumerate() {
        us[k] = u;
        nodes[k] = n;
    }
    Ok(())
}
