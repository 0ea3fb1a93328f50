//! Edge connectivity: fixed-arity tuples of node indices.
//!
//! Linear edges have arity 2 (`[n0, n1]`); high-order edges append their
//! interior nodes after the two vertices (`[n0, n1, m0, m1, ...]`).

use crate::data::Validate;
use crate::mesh_error::{MeshError, MeshResult};

/// Flat storage of edges sharing one arity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connectivity {
    arity: usize,
    nodes: Vec<usize>,
}

impl Default for Connectivity {
    fn default() -> Self {
        Self {
            arity: 2,
            nodes: Vec::new(),
        }
    }
}

impl Connectivity {
    /// Empty connectivity of the given arity (≥ 2).
    pub fn new(arity: usize) -> MeshResult<Self> {
        if arity < 2 {
            return Err(MeshError::invalid(1, format!("edge arity {arity} < 2")));
        }
        Ok(Self {
            arity,
            nodes: Vec::new(),
        })
    }

    /// Linear edges from `(n0, n1)` pairs.
    pub fn from_pairs(pairs: &[[usize; 2]]) -> Self {
        Self {
            arity: 2,
            nodes: pairs.iter().flatten().copied().collect(),
        }
    }

    /// Wrap a flat buffer.
    pub fn from_flat(arity: usize, nodes: Vec<usize>) -> MeshResult<Self> {
        if arity < 2 {
            return Err(MeshError::invalid(1, format!("edge arity {arity} < 2")));
        }
        if nodes.len() % arity != 0 {
            return Err(MeshError::invalid(
                2,
                format!("{} indices do not form whole edges", nodes.len()),
            ));
        }
        Ok(Self { arity, nodes })
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Number of edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len() / self.arity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.nodes
    }

    /// Nodes of edge `j`.
    ///
    /// # Panics
    /// If `j >= self.len()`.
    #[inline]
    pub fn edge(&self, j: usize) -> &[usize] {
        &self.nodes[j * self.arity..(j + 1) * self.arity]
    }

    #[inline]
    pub fn edge_mut(&mut self, j: usize) -> &mut [usize] {
        let a = self.arity;
        &mut self.nodes[j * a..(j + 1) * a]
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[usize]> + '_ {
        self.nodes.chunks_exact(self.arity)
    }

    /// Append one edge of matching arity.
    pub fn push(&mut self, edge: &[usize]) -> MeshResult<()> {
        if edge.len() != self.arity {
            return Err(MeshError::invalid(
                1,
                format!("edge has {} nodes, expected {}", edge.len(), self.arity),
            ));
        }
        self.nodes.try_reserve(self.arity)?;
        self.nodes.extend_from_slice(edge);
        Ok(())
    }

    /// Append every edge of `other` (same arity).
    pub fn append(&mut self, other: &Connectivity) -> MeshResult<()> {
        if other.arity != self.arity {
            return Err(MeshError::invalid(
                1,
                format!("arity {} does not match {}", other.arity, self.arity),
            ));
        }
        self.nodes.try_reserve(other.nodes.len())?;
        self.nodes.extend_from_slice(&other.nodes);
        Ok(())
    }

    /// High-water mark: the current edge count.
    #[inline]
    pub fn mark(&self) -> usize {
        self.len()
    }

    /// Drop every edge appended after `mark`.
    pub fn truncate(&mut self, mark: usize) {
        self.nodes.truncate(mark * self.arity);
    }

    /// Largest referenced node index.
    pub fn max_node(&self) -> Option<usize> {
        self.nodes.iter().copied().max()
    }

    /// Fail with `InvalidArgument(arg)` if an edge refers past `n_points`.
    pub fn check_nodes(&self, n_points: usize, arg: usize) -> MeshResult<()> {
        match self.max_node() {
            Some(m) if m >= n_points => Err(MeshError::invalid(
                arg,
                format!("edge refers to node {m} but only {n_points} exist"),
            )),
            _ => Ok(()),
        }
    }

    /// Sequence of nodes → linear edges between consecutive entries.
    ///
    /// `[a, b, c]` appends `[a, b]` and `[b, c]`. Requires arity 2.
    pub fn append_indices_e2(&mut self, indices: &[usize]) -> MeshResult<()> {
        if self.arity != 2 {
            return Err(MeshError::invalid(2, "target connectivity is not linear"));
        }
        let n = indices.len().saturating_sub(1);
        self.nodes.try_reserve(2 * n)?;
        for w in indices.windows(2) {
            self.nodes.extend_from_slice(&[w[0], w[1]]);
        }
        Ok(())
    }

    /// Sequence of nodes → quadratic edges `[a, c, b]` (vertices first,
    /// middle node last). The sequence length must be odd and ≥ 3.
    pub fn append_indices_e3(&mut self, indices: &[usize]) -> MeshResult<()> {
        if self.arity != 3 {
            return Err(MeshError::invalid(2, "target connectivity is not quadratic"));
        }
        if indices.len() < 3 || indices.len() % 2 == 0 {
            return Err(MeshError::invalid(
                1,
                format!("{} nodes cannot form quadratic edges", indices.len()),
            ));
        }
        self.nodes.try_reserve(3 * (indices.len() / 2))?;
        for w in indices.windows(3).step_by(2) {
            self.nodes.extend_from_slice(&[w[0], w[2], w[1]]);
        }
        Ok(())
    }

    /// Split every quadratic edge `[a, b, m]` into `[a, m]` and `[m, b]`.
    pub fn e3_to_2e2(&self) -> MeshResult<Connectivity> {
        if self.arity != 3 {
            return Err(MeshError::invalid(1, "connectivity is not quadratic"));
        }
        let mut out = Vec::new();
        out.try_reserve(4 * self.len())?;
        for e in self.iter() {
            out.extend_from_slice(&[e[0], e[2], e[2], e[1]]);
        }
        Ok(Connectivity {
            arity: 2,
            nodes: out,
        })
    }
}

/// Linear edges between consecutive entries of `indices`.
pub fn indices_to_connect_e2(indices: &[usize]) -> Connectivity {
    Connectivity {
        arity: 2,
        nodes: indices.windows(2).flatten().copied().collect(),
    }
}

/// Quadratic edges from an odd-length node sequence, see
/// [`Connectivity::append_indices_e3`].
pub fn indices_to_connect_e3(indices: &[usize]) -> MeshResult<Connectivity> {
    let mut c = Connectivity {
        arity: 3,
        nodes: Vec::new(),
    };
    c.append_indices_e3(indices)?;
    Ok(c)
}

impl Validate for Connectivity {
    fn validate(&self) -> Result<(), MeshError> {
        if self.arity < 2 || self.nodes.len() % self.arity != 0 {
            return Err(MeshError::Internal(format!(
                "{} indices stored with arity {}",
                self.nodes.len(),
                self.arity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_edges_from_sequence() {
        let c = indices_to_connect_e2(&[0, 4, 5, 1]);
        assert_eq!(c.len(), 3);
        assert_eq!(c.edge(1), &[4, 5]);
        assert!(indices_to_connect_e2(&[7]).is_empty());
    }

    #[test]
    fn quadratic_edges_and_split() {
        let c = indices_to_connect_e3(&[0, 9, 1, 8, 2]).unwrap();
        assert_eq!(c.as_slice(), &[0, 1, 9, 1, 2, 8]);
        let split = c.e3_to_2e2().unwrap();
        assert_eq!(split.as_slice(), &[0, 9, 9, 1, 1, 8, 8, 2]);
        assert_eq!(indices_to_connect_e3(&[0, 1]).unwrap_err().code(), -1);
    }

    #[test]
    fn node_bounds_and_marks() {
        let mut c = Connectivity::from_pairs(&[[0, 1]]);
        let mark = c.mark();
        c.push(&[1, 5]).unwrap();
        assert_eq!(c.check_nodes(3, 4).unwrap_err().code(), -4);
        c.truncate(mark);
        assert!(c.check_nodes(3, 4).is_ok());
        assert!(c.push(&[1, 2, 3]).is_err());
    }
}
