//! G1 cubic Hermite spans through consecutive spline nodes.
//!
//! The span `b → c` of a poly-spline `... a b c d ...` starts along `c - a`
//! and ends along `d - b`, both tangents scaled to the chord length. A
//! tangent is *free* when its defining nodes coincide (`a == b` or
//! `d == c`), or when it points backwards along the chord; the span then
//! drops to a quadratic (one free tangent) or a straight segment (two).

use crate::data::Coordinates;
use crate::geometry::{add, cross, dot, norm, normalize, scale, sub};
use crate::mesh_error::{MeshError, MeshResult};

const GAUSS_X: [f64; 5] = [
    -0.906_179_845_938_664,
    -0.538_469_310_105_683,
    0.0,
    0.538_469_310_105_683,
    0.906_179_845_938_664,
];
const GAUSS_W: [f64; 5] = [
    0.236_926_885_056_189,
    0.478_628_670_499_366,
    0.568_888_888_888_889,
    0.478_628_670_499_366,
    0.236_926_885_056_189,
];
const LENGTH_PANELS: usize = 4;

/// One cubic Hermite span `P(s)`, `s ∈ [0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HermiteSpan {
    p0: [f64; 3],
    p1: [f64; 3],
    t0: [f64; 3],
    t1: [f64; 3],
}

impl HermiteSpan {
    /// Span from `pb` to `pc` with end tangents taken from `pa` and `pd`.
    pub fn from_nodes(pa: [f64; 3], pb: [f64; 3], pc: [f64; 3], pd: [f64; 3], free_start: bool, free_end: bool) -> Self {
        let chord = sub(pc, pb);
        let len = norm(chord);
        let tangent = |dir: [f64; 3], free: bool| -> Option<[f64; 3]> {
            if free {
                return None;
            }
            let t = scale(normalize(dir)?, len);
            (dot(t, chord) > 0.0).then_some(t)
        };
        let (t0, t1) = match (tangent(sub(pc, pa), free_start), tangent(sub(pd, pb), free_end)) {
            (Some(t0), Some(t1)) => (t0, t1),
            (None, Some(t1)) => (sub(scale(chord, 2.0), t1), t1),
            (Some(t0), None) => (t0, sub(scale(chord, 2.0), t0)),
            (None, None) => (chord, chord),
        };
        Self { p0: pb, p1: pc, t0, t1 }
    }

    pub fn point(&self, s: f64) -> [f64; 3] {
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        add(
            add(scale(self.p0, h00), scale(self.t0, h10)),
            add(scale(self.p1, h01), scale(self.t1, h11)),
        )
    }

    /// `dP/ds`.
    pub fn derivative(&self, s: f64) -> [f64; 3] {
        let s2 = s * s;
        let d00 = 6.0 * s2 - 6.0 * s;
        let d10 = 3.0 * s2 - 4.0 * s + 1.0;
        let d11 = 3.0 * s2 - 2.0 * s;
        add(
            add(scale(self.p0, d00), scale(self.t0, d10)),
            add(scale(self.p1, -d00), scale(self.t1, d11)),
        )
    }

    /// `d²P/ds²`.
    pub fn second_derivative(&self, s: f64) -> [f64; 3] {
        let d00 = 12.0 * s - 6.0;
        let d10 = 6.0 * s - 4.0;
        let d11 = 6.0 * s - 2.0;
        add(
            add(scale(self.p0, d00), scale(self.t0, d10)),
            add(scale(self.p1, -d00), scale(self.t1, d11)),
        )
    }

    /// Geometric curvature `|P' × P''| / |P'|³` (0 where `P'` vanishes).
    pub fn curvature(&self, s: f64) -> f64 {
        let d1 = self.derivative(s);
        let n = norm(d1);
        if n == 0.0 {
            return 0.0;
        }
        norm(cross(d1, self.second_derivative(s))) / (n * n * n)
    }

    /// Arc length between `s0` and `s1` (Gauss-Legendre).
    pub fn arc_length(&self, s0: f64, s1: f64) -> f64 {
        let width = (s1 - s0) / LENGTH_PANELS as f64;
        (0..LENGTH_PANELS)
            .map(|k| {
                let mid = s0 + (k as f64 + 0.5) * width;
                GAUSS_X
                    .iter()
                    .zip(GAUSS_W)
                    .map(|(&x, w)| w * norm(self.derivative(mid + 0.5 * width * x)))
                    .sum::<f64>()
                    * 0.5
                    * width
            })
            .sum()
    }

    /// Parameter `s` whose arc length from the start is `length`.
    pub fn param_at_length(&self, length: f64) -> f64 {
        let total = self.arc_length(0.0, 1.0);
        if total <= 0.0 || length <= 0.0 {
            return 0.0;
        }
        if length >= total {
            return 1.0;
        }
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut s = length / total;
        for _ in 0..64 {
            let f = self.arc_length(0.0, s) - length;
            if f.abs() <= 1e-13 * total {
                break;
            }
            if f > 0.0 {
                hi = s;
            } else {
                lo = s;
            }
            let speed = norm(self.derivative(s));
            let newton = s - f / speed;
            s = if speed > 0.0 && newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };
        }
        s
    }

    /// Largest distance between the span and its chord, sampled at `samples` points.
    pub fn chord_deviation(&self, samples: usize) -> f64 {
        let chord = sub(self.p1, self.p0);
        let cc = dot(chord, chord);
        (1..samples)
            .map(|k| {
                let p = sub(self.point(k as f64 / samples as f64), self.p0);
                let t = if cc > 0.0 { (dot(p, chord) / cc).clamp(0.0, 1.0) } else { 0.0 };
                norm(sub(p, scale(chord, t)))
            })
            .fold(0.0, f64::max)
    }
}

/// Point at `s ∈ [0, 1]` on the span `ib → ic` of the poly-spline through
/// `ia, ib, ic, id`. `ia == ib` (resp. `id == ic`) frees the start (resp.
/// end) tangent.
pub fn spline_point(pos: &Coordinates, ia: usize, ib: usize, ic: usize, id: usize, s: f64) -> MeshResult<[f64; 3]> {
    pos.check_geometric(1)?;
    for (arg, node) in [(2, ia), (3, ib), (4, ic), (5, id)] {
        pos.check_node(node, arg)?;
    }
    if !(0.0..=1.0).contains(&s) {
        return Err(MeshError::invalid(6, format!("s = {s} is outside [0, 1]")));
    }
    let span = HermiteSpan::from_nodes(
        pos.point3(ia),
        pos.point3(ib),
        pos.point3(ic),
        pos.point3(id),
        ia == ib,
        id == ic,
    );
    Ok(span.point(s))
}
