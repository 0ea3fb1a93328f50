//! Chordal-error control: shrink sizes where the curve bends.
//!
//! For a circular arc of radius `R = 1/c`, a chord of length
//! `h = 2 sqrt(ε (2 - ε)) R` deviates from the arc by at most `ε R`. The
//! controller caps every node size with that chord length.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::curve::CurveAdapter;
use crate::data::Connectivity;
use crate::geometry::{norm, normalize, scale, sub};
use crate::mesh_error::{MeshError, MeshResult};
use crate::metric::intersect;

/// Where curvatures come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordalMode {
    /// No chordal control (`0`).
    Disabled,
    /// Estimated from the variation of the tangents (`1`).
    Approximate,
    /// Exact curvatures from the curve, estimate as fallback (`2`).
    #[default]
    Exact,
}

impl ChordalMode {
    /// From the classic `0 / 1 / 2` control type.
    pub fn from_flag(flag: u32) -> Self {
        match flag {
            0 => ChordalMode::Disabled,
            1 => ChordalMode::Approximate,
            _ => ChordalMode::Exact,
        }
    }
}

/// Chordal-error settings.
///
/// `max_chordal_error > 0` is an absolute distance; `-1 <= max_chordal_error
/// < 0` is a fraction of the local curvature radius. `0`, `±f64::MAX` and
/// values below `-1` disable the control.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordalControl {
    pub max_chordal_error: f64,
    /// Sizes are never reduced below this value (`<= 0`: no limit).
    pub min_h: f64,
    pub mode: ChordalMode,
}

impl Default for ChordalControl {
    fn default() -> Self {
        Self {
            max_chordal_error: 0.0,
            min_h: 0.0,
            mode: ChordalMode::Exact,
        }
    }
}

impl ChordalControl {
    /// Absolute deviation bound.
    #[must_use]
    pub const fn absolute(distance: f64) -> Self {
        Self {
            max_chordal_error: distance,
            min_h: 0.0,
            mode: ChordalMode::Exact,
        }
    }

    /// Deviation bound relative to the curvature radius.
    #[must_use]
    pub const fn relative(fraction: f64) -> Self {
        Self {
            max_chordal_error: -fraction,
            min_h: 0.0,
            mode: ChordalMode::Exact,
        }
    }

    #[must_use]
    pub const fn with_min_h(mut self, min_h: f64) -> Self {
        self.min_h = min_h;
        self
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: ChordalMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_active(&self) -> bool {
        is_active(self.max_chordal_error, self.mode)
    }
}

fn is_active(err: f64, mode: ChordalMode) -> bool {
    mode != ChordalMode::Disabled
        && err != 0.0
        && err.abs() != f64::MAX
        && err.is_finite()
        && err >= -1.0
}

/// Cap `metrics` with the chord length allowed by the local curvature.
///
/// `tangent_norms` is read only when `relative_to_tangent` (sizes measured
/// in parameter space). Returns the number of reduced values.
pub fn bound_by_curvature(
    curvatures: &[f64],
    tangent_norms: &[f64],
    max_chordal_error: f64,
    mode: ChordalMode,
    relative_to_tangent: bool,
    min_h: f64,
    metrics: &mut [f64],
) -> MeshResult<usize> {
    if !is_active(max_chordal_error, mode) {
        return Ok(0);
    }
    if curvatures.len() != metrics.len() {
        return Err(MeshError::invalid(
            1,
            format!("{} curvatures for {} metrics", curvatures.len(), metrics.len()),
        ));
    }
    if relative_to_tangent && tangent_norms.len() != metrics.len() {
        return Err(MeshError::invalid(
            2,
            format!("{} tangents for {} metrics", tangent_norms.len(), metrics.len()),
        ));
    }
    let max_c = if min_h > 0.0 { 2.0 / min_h } else { f64::INFINITY };
    let mut changed = 0;
    for (i, &c) in curvatures.iter().enumerate() {
        if !(c > 0.0) || c > max_c {
            continue;
        }
        let eps = if max_chordal_error > 0.0 {
            max_chordal_error * c
        } else {
            -max_chordal_error
        };
        if eps > 1.0 {
            continue;
        }
        let t = if relative_to_tangent { tangent_norms[i] } else { 1.0 };
        if !(t > 0.0) {
            continue;
        }
        let h = 2.0 * (eps * (2.0 - eps)).sqrt() / (t * c);
        let bounded = intersect(metrics[i], h);
        if bounded != metrics[i] {
            metrics[i] = bounded;
            changed += 1;
        }
    }
    Ok(changed)
}

/// Curvature estimate on a 1-D mesh from the variation of unit tangents.
///
/// Edge `(i, j)` contributes `(B_j - B_i) / 2` and half its arc length to
/// both ends (`B` the unit tangent); the node curvature is the norm of the
/// accumulated difference over the accumulated length. Nodes with a single
/// incident edge copy their neighbour.
pub fn parametric_curvatures(pos1d: &[f64], connect: &Connectivity, tangents: &[[f64; 3]]) -> MeshResult<Vec<f64>> {
    let n = pos1d.len();
    connect.check_nodes(n, 2)?;
    if tangents.len() != n {
        return Err(MeshError::invalid(3, format!("{} tangents for {n} nodes", tangents.len())));
    }
    let unit: Vec<[f64; 3]> = tangents.iter().map(|&t| normalize(t).unwrap_or([0.0; 3])).collect();
    let mut acc = vec![[0.0; 3]; n];
    let mut len = vec![0.0; n];
    let mut degree = vec![0usize; n];
    let mut neighbour = vec![usize::MAX; n];
    for e in connect.iter() {
        let (i, j) = if pos1d[e[0]] <= pos1d[e[1]] { (e[0], e[1]) } else { (e[1], e[0]) };
        let ds = (pos1d[j] - pos1d[i]) * 0.5 * (norm(tangents[i]) + norm(tangents[j]));
        let half = scale(sub(unit[j], unit[i]), 0.5);
        for (node, other) in [(i, j), (j, i)] {
            for k in 0..3 {
                acc[node][k] += half[k];
            }
            len[node] += 0.5 * ds;
            degree[node] += 1;
            neighbour[node] = other;
        }
    }
    let own: Vec<f64> = acc
        .iter()
        .zip(&len)
        .map(|(a, &l)| if l > 0.0 { norm(*a) / l } else { 0.0 })
        .collect();
    Ok((0..n)
        .map(|i| {
            let j = neighbour[i];
            if degree[i] == 1 && degree[j] > 1 { own[j] } else { own[i] }
        })
        .collect())
}

/// Chordal control on background nodes of a curve.
///
/// Curvatures come from the curve when `control.mode` is `Exact` and the
/// curve supports it, from [`parametric_curvatures`] otherwise.
pub fn chordal_control<C: CurveAdapter>(
    curve: &C,
    us: &[f64],
    connect: &Connectivity,
    tangents: &[[f64; 3]],
    control: &ChordalControl,
    relative_to_tangent: bool,
    metrics: &mut [f64],
) -> MeshResult<usize> {
    if !control.is_active() {
        return Ok(0);
    }
    let exact = match control.mode {
        ChordalMode::Exact => match curve.curvatures(us) {
            Ok(c) if c.len() == us.len() && c.iter().all(|&x| x >= 0.0) => Some(c),
            Ok(_) => {
                warn!("curve returned invalid curvatures, using the tangent estimate");
                None
            }
            Err(e) => {
                warn!("exact curvatures unavailable ({e}), using the tangent estimate");
                None
            }
        },
        _ => None,
    };
    let curvatures = match exact {
        Some(c) => c,
        None => parametric_curvatures(us, connect, tangents)?,
    };
    let norms: Vec<f64> = tangents.iter().map(|&t| norm(t)).collect();
    bound_by_curvature(
        &curvatures,
        &norms,
        control.max_chordal_error,
        control.mode,
        relative_to_tangent,
        control.min_h,
        metrics,
    )
}
