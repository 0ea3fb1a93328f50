//! Symmetric metric tensors.
//!
//! A tensor `M` prescribes the size `h(v) = sqrt(v·v / vᵗMv)` along a
//! direction `v`. Storage is the upper triangle in column-major order:
//! `[m00, m01, m11]` in 2-D and `[m00, m01, m11, m02, m12, m22]` in 3-D.

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometry::dot;
use crate::mesh_error::{MeshError, MeshResult};

/// Anisotropic metric at one node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MetricTensor {
    Sym2([f64; 3]),
    Sym3([f64; 6]),
}

impl MetricTensor {
    /// `I / h²`, the tensor of an isotropic size `h`.
    pub fn isotropic(dimension: usize, h: f64) -> MeshResult<Self> {
        if !(h > 0.0) {
            return Err(MeshError::invalid(2, format!("size {h} must be > 0")));
        }
        let s = 1.0 / (h * h);
        match dimension {
            2 => Ok(MetricTensor::Sym2([s, 0.0, s])),
            3 => Ok(MetricTensor::Sym3([s, 0.0, s, 0.0, 0.0, s])),
            d => Err(MeshError::invalid(1, format!("dimension {d} is not 2 or 3"))),
        }
    }

    /// Null tensor (no constraint), the identity of [`intersect`](Self::intersect).
    pub fn null(dimension: usize) -> MeshResult<Self> {
        match dimension {
            2 => Ok(MetricTensor::Sym2([0.0; 3])),
            3 => Ok(MetricTensor::Sym3([0.0; 6])),
            d => Err(MeshError::invalid(1, format!("dimension {d} is not 2 or 3"))),
        }
    }

    /// Rank-one tensor giving size `h` along `v` and no constraint across it.
    pub fn along(dimension: usize, v: [f64; 3], h: f64) -> MeshResult<Self> {
        let vv = dot(v, v);
        if !(vv > 0.0) {
            return Err(MeshError::invalid(2, "null direction"));
        }
        if !(h > 0.0) {
            return Err(MeshError::invalid(3, format!("size {h} must be > 0")));
        }
        let s = 1.0 / (h * h * vv);
        match dimension {
            2 => {
                let w = Vector2::new(v[0], v[1]);
                Ok(MetricTensor::Sym2(sym2(&(w * w.transpose() * s))))
            }
            3 => {
                let w = Vector3::from(v);
                Ok(MetricTensor::Sym3(sym3(&(w * w.transpose() * s))))
            }
            d => Err(MeshError::invalid(1, format!("dimension {d} is not 2 or 3"))),
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        match self {
            MetricTensor::Sym2(_) => 2,
            MetricTensor::Sym3(_) => 3,
        }
    }

    /// Stored components.
    pub fn components(&self) -> &[f64] {
        match self {
            MetricTensor::Sym2(c) => c,
            MetricTensor::Sym3(c) => c,
        }
    }

    pub fn is_null(&self) -> bool {
        self.components().iter().all(|&c| c == 0.0)
    }

    /// Positive-definite check (leading principal minors > 0).
    pub fn is_valid(&self) -> bool {
        if self.components().iter().any(|c| !c.is_finite()) {
            return false;
        }
        match self {
            MetricTensor::Sym2(c) => {
                let m = mat2(c);
                m[(0, 0)] > 0.0 && m.determinant() > 0.0
            }
            MetricTensor::Sym3(c) => {
                let m = mat3(c);
                let minor = m.fixed_view::<2, 2>(0, 0).into_owned();
                m[(0, 0)] > 0.0 && minor.determinant() > 0.0 && m.determinant() > 0.0
            }
        }
    }

    /// `vᵗ M v` (the third component is ignored in 2-D).
    pub fn quadratic_form(&self, v: [f64; 3]) -> f64 {
        match self {
            MetricTensor::Sym2(c) => {
                let w = Vector2::new(v[0], v[1]);
                w.dot(&(mat2(c) * w))
            }
            MetricTensor::Sym3(c) => {
                let w = Vector3::from(v);
                w.dot(&(mat3(c) * w))
            }
        }
    }

    fn trace(&self) -> f64 {
        match self {
            MetricTensor::Sym2(c) => mat2(c).trace(),
            MetricTensor::Sym3(c) => mat3(c).trace(),
        }
    }

    /// Size prescribed along `v`: `sqrt(v·v / vᵗMv)`.
    ///
    /// A null `v` uses the mean size `sqrt(dim / trace)`. A direction the
    /// tensor does not constrain gives `f64::INFINITY`.
    pub fn size_along(&self, v: [f64; 3]) -> f64 {
        let n = self.dimension();
        let mut w = v;
        if n == 2 {
            w[2] = 0.0;
        }
        let vv = dot(w, w);
        if vv == 0.0 {
            let trace = self.trace();
            return if trace > 0.0 {
                (n as f64 / trace).sqrt()
            } else {
                f64::INFINITY
            };
        }
        let q = self.quadratic_form(w);
        if q > 0.0 {
            (vv / q).sqrt()
        } else {
            f64::INFINITY
        }
    }

    /// Eigenvalues in ascending order.
    pub fn eigenvalues(&self) -> Vec<f64> {
        let mut out: Vec<f64> = match self {
            MetricTensor::Sym2(c) => mat2(c).symmetric_eigenvalues().iter().copied().collect(),
            MetricTensor::Sym3(c) => mat3(c).symmetric_eigenvalues().iter().copied().collect(),
        };
        out.sort_by(f64::total_cmp);
        out
    }

    /// Component-wise `a + t (b - a)`.
    pub fn lerp(&self, other: &MetricTensor, t: f64) -> MeshResult<MetricTensor> {
        match (self, other) {
            (MetricTensor::Sym2(a), MetricTensor::Sym2(b)) => {
                Ok(MetricTensor::Sym2(std::array::from_fn(|k| a[k] + t * (b[k] - a[k]))))
            }
            (MetricTensor::Sym3(a), MetricTensor::Sym3(b)) => {
                Ok(MetricTensor::Sym3(std::array::from_fn(|k| a[k] + t * (b[k] - a[k]))))
            }
            _ => Err(MeshError::invalid(2, "tensor dimensions differ")),
        }
    }

    /// Metric intersection: the largest tensor (smallest sizes in every
    /// direction) contained in both. A null operand is the identity.
    pub fn intersect(&self, other: &MetricTensor) -> MeshResult<MetricTensor> {
        self.combine(other, f64::max)
    }

    /// Metric union: the smallest tensor (largest sizes) containing both.
    pub fn union(&self, other: &MetricTensor) -> MeshResult<MetricTensor> {
        self.combine(other, f64::min)
    }

    /// Simultaneous reduction, factoring whichever operand is positive
    /// definite.
    fn combine(&self, other: &MetricTensor, pick: fn(f64, f64) -> f64) -> MeshResult<MetricTensor> {
        if other.dimension() != self.dimension() {
            return Err(MeshError::invalid(2, "tensor dimensions differ"));
        }
        if other.is_null() {
            return Ok(*self);
        }
        if self.is_null() {
            return Ok(*other);
        }
        let reduced = match (self, other) {
            (MetricTensor::Sym2(a), MetricTensor::Sym2(b)) => {
                let (a, b) = (mat2(a), mat2(b));
                reduce2(a, b, pick)
                    .or_else(|| reduce2(b, a, pick))
                    .map(|m| MetricTensor::Sym2(sym2(&m)))
            }
            (MetricTensor::Sym3(a), MetricTensor::Sym3(b)) => {
                let (a, b) = (mat3(a), mat3(b));
                reduce3(a, b, pick)
                    .or_else(|| reduce3(b, a, pick))
                    .map(|m| MetricTensor::Sym3(sym3(&m)))
            }
            _ => None,
        };
        reduced.ok_or_else(|| MeshError::invalid(1, "neither tensor is positive definite"))
    }
}

fn mat2(c: &[f64; 3]) -> Matrix2<f64> {
    Matrix2::new(c[0], c[1], c[1], c[2])
}

fn mat3(c: &[f64; 6]) -> Matrix3<f64> {
    Matrix3::new(c[0], c[1], c[3], c[1], c[2], c[4], c[3], c[4], c[5])
}

fn sym2(m: &Matrix2<f64>) -> [f64; 3] {
    [m[(0, 0)], 0.5 * (m[(0, 1)] + m[(1, 0)]), m[(1, 1)]]
}

fn sym3(m: &Matrix3<f64>) -> [f64; 6] {
    let s = |i: usize, j: usize| 0.5 * (m[(i, j)] + m[(j, i)]);
    [m[(0, 0)], s(0, 1), m[(1, 1)], s(0, 2), s(1, 2), m[(2, 2)]]
}

/// With `a = L Lᵗ` and `L⁻¹ b L⁻ᵗ = Q Λ Qᵗ`, the result is
/// `L Q pick(Λ, 1) Qᵗ Lᵗ`. `None` when `a` is not positive definite.
macro_rules! simultaneous_reduction {
    ($name:ident, $mat:ident) => {
        fn $name(a: $mat<f64>, b: $mat<f64>, pick: fn(f64, f64) -> f64) -> Option<$mat<f64>> {
            let l = a.cholesky()?.l();
            let li = l.try_inverse()?;
            let eigen = (li * b * li.transpose()).symmetric_eigen();
            let p = l * eigen.eigenvectors;
            let lambda = eigen.eigenvalues.map(|x| pick(x, 1.0));
            Some(p * $mat::from_diagonal(&lambda) * p.transpose())
        }
    };
}

simultaneous_reduction!(reduce2, Matrix2);
simultaneous_reduction!(reduce3, Matrix3);

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: &MetricTensor, b: &MetricTensor) -> bool {
        a.components()
            .iter()
            .zip(b.components())
            .all(|(x, y)| (x - y).abs() < 1e-9 * (1.0 + x.abs()))
    }

    #[test]
    fn isotropic_sizes() {
        let m = MetricTensor::isotropic(3, 0.5).unwrap();
        assert!(m.is_valid());
        assert!((m.size_along([1.0, 2.0, -1.0]) - 0.5).abs() < 1e-12);
        assert!((m.size_along([0.0; 3]) - 0.5).abs() < 1e-12);
        assert!(MetricTensor::isotropic(2, 0.0).is_err());
    }

    #[test]
    fn validity_uses_all_minors() {
        assert!(MetricTensor::Sym2([1.0, 0.5, 1.0]).is_valid());
        assert!(!MetricTensor::Sym2([1.0, 2.0, 1.0]).is_valid());
        assert!(!MetricTensor::Sym3([1.0, 0.0, 1.0, 0.0, 0.0, -1.0]).is_valid());
        assert!(!MetricTensor::null(2).unwrap().is_valid());
    }

    #[test]
    fn eigenvalues_of_sheared_tensor() {
        let m = MetricTensor::Sym2([2.0, 1.0, 2.0]);
        let ev = m.eigenvalues();
        assert!((ev[0] - 1.0).abs() < 1e-12 && (ev[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn intersection_identities() {
        let m = MetricTensor::Sym3([4.0, 0.5, 2.0, 0.1, -0.3, 1.0]);
        let zero = MetricTensor::null(3).unwrap();
        assert_eq!(m.intersect(&zero).unwrap(), m);
        assert_eq!(zero.intersect(&m).unwrap(), m);
        assert!(approx(&m.intersect(&m).unwrap(), &m));
    }

    #[test]
    fn intersection_keeps_smallest_sizes() {
        let fine = MetricTensor::isotropic(2, 1.0).unwrap();
        let coarse = MetricTensor::isotropic(2, 2.0).unwrap();
        assert!(approx(&coarse.intersect(&fine).unwrap(), &fine));
        assert!(approx(&coarse.union(&fine).unwrap(), &coarse));
    }

    #[test]
    fn crossed_anisotropy_takes_both_refinements() {
        let a = MetricTensor::Sym2([100.0, 0.0, 1.0]);
        let b = MetricTensor::Sym2([1.0, 0.0, 100.0]);
        assert!(approx(&a.intersect(&b).unwrap(), &MetricTensor::Sym2([100.0, 0.0, 100.0])));
        assert!(approx(&a.union(&b).unwrap(), &MetricTensor::Sym2([1.0, 0.0, 1.0])));
    }

    #[test]
    fn rank_one_operand_on_either_side() {
        let r = MetricTensor::along(3, [0.0, 0.0, 2.0], 0.5).unwrap();
        let m = MetricTensor::isotropic(3, 1.0).unwrap();
        let i = r.intersect(&m).unwrap();
        assert!(approx(&i, &m.intersect(&r).unwrap()));
        assert!((i.size_along([0.0, 0.0, 1.0]) - 0.5).abs() < 1e-9);
        assert!(r.intersect(&r).is_err());
    }

    #[test]
    fn rank_one_refines_one_direction() {
        let m = MetricTensor::isotropic(2, 1.0).unwrap();
        let r = MetricTensor::along(2, [1.0, 0.0, 0.0], 0.25).unwrap();
        let i = m.intersect(&r).unwrap();
        assert!((i.size_along([1.0, 0.0, 0.0]) - 0.25).abs() < 1e-9);
        assert!((i.size_along([0.0, 1.0, 0.0]) - 1.0).abs() < 1e-9);
    }
}
