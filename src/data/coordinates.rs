//! Append-only coordinate storage for mesh nodes.
//!
//! Points are stored column after column (`x0 y0 [z0] x1 y1 [z1] ...`). The
//! row count is 2 or 3 for geometric points; the engine also uses one-row
//! buffers for curvilinear coordinates. Existing points are never moved by
//! the meshing routines, only appended to.

use crate::data::Validate;
use crate::geometry::{norm, sub};
use crate::mesh_error::{MeshError, MeshResult};

/// Column-oriented point store with a fixed number of rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Coordinates {
    dimension: usize,
    values: Vec<f64>,
}

impl Coordinates {
    /// Empty store with `dimension` rows (1, 2 or 3).
    pub fn new(dimension: usize) -> MeshResult<Self> {
        check_dimension(dimension)?;
        Ok(Self {
            dimension,
            values: Vec::new(),
        })
    }

    /// Store built from fixed-size points; `D` is the row count.
    pub fn from_points<const D: usize>(points: &[[f64; D]]) -> MeshResult<Self> {
        check_dimension(D)?;
        let mut values = Vec::new();
        values.try_reserve(points.len() * D)?;
        for p in points {
            values.extend_from_slice(p);
        }
        Ok(Self {
            dimension: D,
            values,
        })
    }

    /// Wrap a flat column-major buffer.
    pub fn from_flat(dimension: usize, values: Vec<f64>) -> MeshResult<Self> {
        check_dimension(dimension)?;
        if values.len() % dimension != 0 {
            return Err(MeshError::invalid(
                2,
                format!(
                    "{} values do not form whole {dimension}-D points",
                    values.len()
                ),
            ));
        }
        Ok(Self { dimension, values })
    }

    /// Number of rows per point.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw column-major values.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Coordinates of point `i`, if it exists.
    #[inline]
    pub fn point(&self, i: usize) -> Option<&[f64]> {
        let d = self.dimension;
        self.values.get(i * d..(i + 1) * d)
    }

    /// Point `i` padded with zeros to three components.
    ///
    /// # Panics
    /// If `i` is out of range; callers validate indices first.
    pub fn point3(&self, i: usize) -> [f64; 3] {
        let d = self.dimension;
        let mut p = [0.0; 3];
        p[..d].copy_from_slice(&self.values[i * d..(i + 1) * d]);
        p
    }

    /// Iterate over the points in index order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.dimension)
    }

    /// Euclidean distance between two stored points.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        norm(sub(self.point3(j), self.point3(i)))
    }

    /// Fail with `InvalidArgument(arg)` unless `node` is a stored point.
    pub fn check_node(&self, node: usize, arg: usize) -> MeshResult<()> {
        if node < self.len() {
            Ok(())
        } else {
            Err(MeshError::invalid(
                arg,
                format!("node {node} out of range (size {})", self.len()),
            ))
        }
    }

    /// Fail with `InvalidArgument(arg)` unless the store has 2 or 3 rows.
    pub fn check_geometric(&self, arg: usize) -> MeshResult<()> {
        if matches!(self.dimension, 2 | 3) {
            Ok(())
        } else {
            Err(MeshError::invalid(
                arg,
                format!("expected 2 or 3 rows, found {}", self.dimension),
            ))
        }
    }

    /// Reserve room for `additional` more points.
    pub fn reserve(&mut self, additional: usize) -> MeshResult<()> {
        let extra = additional
            .checked_mul(self.dimension)
            .ok_or(MeshError::InsufficientMemory)?;
        self.values.try_reserve(extra)?;
        Ok(())
    }

    /// Append one point given with exactly `dimension` components; returns its index.
    pub fn push(&mut self, p: &[f64]) -> MeshResult<usize> {
        if p.len() != self.dimension {
            return Err(MeshError::invalid(
                1,
                format!("point has {} components, expected {}", p.len(), self.dimension),
            ));
        }
        self.values.try_reserve(self.dimension)?;
        self.values.extend_from_slice(p);
        Ok(self.len() - 1)
    }

    /// Append a 3-component point, dropping the components the store does not have.
    pub fn push_point3(&mut self, p: [f64; 3]) -> MeshResult<usize> {
        self.values.try_reserve(self.dimension)?;
        self.values.extend_from_slice(&p[..self.dimension]);
        Ok(self.len() - 1)
    }

    /// Overwrite point `i` (extra components dropped).
    ///
    /// # Panics
    /// If `i` is out of range.
    pub fn set_point3(&mut self, i: usize, p: [f64; 3]) {
        let d = self.dimension;
        self.values[i * d..(i + 1) * d].copy_from_slice(&p[..d]);
    }

    /// Turn the store into a 3-row one, zero-filling the new rows.
    pub fn promote_to_3d(&mut self) -> MeshResult<()> {
        if self.dimension == 3 {
            return Ok(());
        }
        let n = self.len();
        let mut values = Vec::new();
        values.try_reserve(3 * n)?;
        for p in self.values.chunks_exact(self.dimension) {
            values.extend_from_slice(p);
            values.extend(std::iter::repeat_n(0.0, 3 - p.len()));
        }
        self.values = values;
        self.dimension = 3;
        Ok(())
    }

    /// High-water mark: the current point count.
    #[inline]
    pub fn mark(&self) -> usize {
        self.len()
    }

    /// Drop every point appended after `mark`.
    pub fn truncate(&mut self, mark: usize) {
        self.values.truncate(mark * self.dimension);
    }
}

impl Validate for Coordinates {
    fn validate(&self) -> Result<(), MeshError> {
        check_dimension(self.dimension)?;
        if self.values.len() % self.dimension != 0 {
            return Err(MeshError::Internal(format!(
                "{} values in a {}-row store",
                self.values.len(),
                self.dimension
            )));
        }
        if let Some(i) = self.values.iter().position(|v| !v.is_finite()) {
            return Err(MeshError::Internal(format!(
                "non-finite coordinate in point {}",
                i / self.dimension
            )));
        }
        Ok(())
    }
}

fn check_dimension(dimension: usize) -> MeshResult<()> {
    if (1..=3).contains(&dimension) {
        Ok(())
    } else {
        Err(MeshError::invalid(
            1,
            format!("dimension must be 1, 2 or 3, got {dimension}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_read_back() {
        let mut pos = Coordinates::new(2).unwrap();
        assert_eq!(pos.push(&[1.0, 2.0]).unwrap(), 0);
        assert_eq!(pos.push_point3([3.0, 4.0, 9.0]).unwrap(), 1);
        assert_eq!(pos.point(1), Some(&[3.0, 4.0][..]));
        assert_eq!(pos.point3(0), [1.0, 2.0, 0.0]);
        assert!(pos.point(2).is_none());
        assert_eq!(pos.push(&[1.0]).unwrap_err().code(), -1);
    }

    #[test]
    fn promotion_zero_fills() {
        let mut pos = Coordinates::from_points(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        pos.promote_to_3d().unwrap();
        assert_eq!(pos.dimension(), 3);
        assert_eq!(pos.as_slice(), &[1.0, 2.0, 0.0, 3.0, 4.0, 0.0]);
        pos.validate().unwrap();
    }

    #[test]
    fn truncate_to_mark() {
        let mut pos = Coordinates::from_points(&[[0.0, 0.0, 0.0]]).unwrap();
        let mark = pos.mark();
        pos.push_point3([1.0, 1.0, 1.0]).unwrap();
        pos.push_point3([2.0, 2.0, 2.0]).unwrap();
        pos.truncate(mark);
        assert_eq!(pos.len(), 1);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(Coordinates::new(4).is_err());
        assert!(Coordinates::from_flat(2, vec![1.0, 2.0, 3.0]).is_err());
        let pos = Coordinates::new(1).unwrap();
        assert_eq!(pos.check_geometric(1).unwrap_err().code(), -1);
    }
}
