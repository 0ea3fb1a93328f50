//! Edge-level transforms: orientation and high-order conversion.

use std::collections::VecDeque;

use hashbrown::HashMap;
use log::debug;

use crate::data::{Connectivity, Coordinates, Validate};
use crate::geometry::lerp;
use crate::mesh_error::{MeshError, MeshResult};

/// Reverse every edge: swap the two vertices (and reverse the interior
/// nodes of high-order edges). Applying it twice is the identity.
pub fn flip(connect: &mut Connectivity) {
    for j in 0..connect.len() {
        flip_edge(connect, j);
    }
}

fn flip_edge(connect: &mut Connectivity, j: usize) {
    let e = connect.edge_mut(j);
    e.swap(0, 1);
    e[2..].reverse();
}

/// Turn linear edges into edges with `ne` evenly spaced interior nodes.
///
/// New points are appended edge after edge; edge `[a, b]` becomes
/// `[a, b, m1, ..., m_ne]` with `m_k` at `k / (ne + 1)` from `a`.
pub fn convert_e2(pos: &mut Coordinates, connect: &mut Connectivity, ne: usize) -> MeshResult<()> {
    if connect.arity() != 2 {
        return Err(MeshError::invalid(2, "edges are already high order"));
    }
    connect.check_nodes(pos.len(), 2)?;
    if ne == 0 || connect.is_empty() {
        return Ok(());
    }
    let arity = ne.checked_add(2).ok_or(MeshError::InsufficientMemory)?;
    let new_points = ne.checked_mul(connect.len()).ok_or(MeshError::InsufficientMemory)?;
    let total = arity.checked_mul(connect.len()).ok_or(MeshError::InsufficientMemory)?;
    pos.reserve(new_points)?;
    let mut nodes = Vec::new();
    nodes.try_reserve(total)?;
    for e in connect.iter() {
        let (a, b) = (pos.point3(e[0]), pos.point3(e[1]));
        nodes.extend_from_slice(e);
        for k in 1..=ne {
            nodes.push(pos.push_point3(lerp(a, b, k as f64 / (ne + 1) as f64))?);
        }
    }
    *connect = Connectivity::from_flat(arity, nodes)?;
    connect.debug_validate();
    Ok(())
}

/// Orient edges so that neighbours chain head to tail, starting from edge
/// `reference` (kept as is). With `all`, every other connected component is
/// oriented from its lowest edge; otherwise only the component of
/// `reference` is touched. Returns the number of flipped edges.
pub fn mesh_reorient(connect: &mut Connectivity, reference: usize, all: bool) -> MeshResult<usize> {
    if reference >= connect.len() {
        return Err(MeshError::invalid(
            2,
            format!("edge {reference} out of range ({} edges)", connect.len()),
        ));
    }
    let mut incident: HashMap<usize, Vec<usize>> = HashMap::new();
    for (j, e) in connect.iter().enumerate() {
        incident.entry(e[0]).or_default().push(j);
        if e[1] != e[0] {
            incident.entry(e[1]).or_default().push(j);
        }
    }
    let mut seen = vec![false; connect.len()];
    let mut flipped = 0;
    let seeds = std::iter::once(reference).chain((0..connect.len()).filter(|_| all));
    let mut queue = VecDeque::new();
    for seed in seeds {
        if seen[seed] {
            continue;
        }
        seen[seed] = true;
        queue.push_back(seed);
        while let Some(j) = queue.pop_front() {
            let (tail, head) = (connect.edge(j)[0], connect.edge(j)[1]);
            for (node, at_head) in [(head, true), (tail, false)] {
                let Some(edges) = incident.get(&node) else { continue };
                for &k in edges {
                    if seen[k] {
                        continue;
                    }
                    seen[k] = true;
                    let e = connect.edge(k);
                    // after `j`'s head comes `k`'s tail, before `j`'s tail comes `k`'s head
                    let wrong = if at_head { e[0] != node } else { e[1] != node };
                    if wrong {
                        flip_edge(connect, k);
                        flipped += 1;
                    }
                    queue.push_back(k);
                }
            }
        }
    }
    debug!("mesh_reorient: {flipped} edges flipped");
    Ok(flipped)
}
