//! Mesh a parametric curve given through a [`CurveAdapter`].
//!
//! The curve is first sampled by a background mesh in parameter space which
//! is remeshed until its own edges are close to unit metric length under a
//! uniform size and a 1% relative chordal bound. The sizes then set on the
//! background nodes (end sizes, target size, gradation and the caller's
//! chordal control) drive the final subdivision.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::algs::chordal::{ChordalControl, chordal_control};
use crate::algs::line::check_bounds;
use crate::algs::subdivide::{SubdivideOptions, subdivide_background};
use crate::algs::transform::convert_e2;
use crate::curve::CurveAdapter;
use crate::data::connectivity::indices_to_connect_e2;
use crate::data::{Connectivity, Coordinates, Validate};
use crate::mesh_error::{MeshError, MeshResult};
use crate::metric::{GradationSign, bound_gradations, clamp, edge_quality, metrics_3d_to_1d};
use crate::progress::ProgressSink;

/// Background remeshing stops once no background edge is longer than this
/// (in metric length).
const QH_MAX: f64 = 1.10;
/// Minimum edge count of a background remeshing.
const MIN_BGM_EDGES: usize = 5;
/// Gradation applied to the parametric sizes of the background mesh.
const BGM_GRADATION: f64 = 0.5;
/// Relative chordal error resolved by the background mesh.
const BGM_CHORDAL_ERROR: f64 = 0.01;

/// Settings of [`mesh_curve_param`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveMeshOptions {
    /// Size sought inside the curve (`<= 0`: interpolate `h0` and `h1`).
    pub target_h: f64,
    pub force_even: bool,
    pub min_n: usize,
    pub max_n: usize,
    pub chordal: ChordalControl,
    /// Maximum gradation; `f64::MAX` disables gradation control.
    pub max_gradation: f64,
    /// Interior nodes added to every edge (0: linear edges).
    pub high_order: usize,
    pub max_bgm_remeshings: usize,
    /// Report the end sizes actually used (reduced by chordal and gradation
    /// control) instead of freezing them.
    pub update_h0h1: bool,
}

impl Default for CurveMeshOptions {
    fn default() -> Self {
        Self {
            target_h: 0.0,
            force_even: false,
            min_n: 1,
            max_n: usize::MAX,
            chordal: ChordalControl::default(),
            max_gradation: f64::MAX,
            high_order: 0,
            max_bgm_remeshings: 4,
            update_h0h1: true,
        }
    }
}

impl CurveMeshOptions {
    #[must_use]
    pub const fn with_target_h(mut self, target_h: f64) -> Self {
        self.target_h = target_h;
        self
    }

    #[must_use]
    pub const fn with_force_even(mut self, force_even: bool) -> Self {
        self.force_even = force_even;
        self
    }

    #[must_use]
    pub const fn with_bounds(mut self, min_n: usize, max_n: usize) -> Self {
        self.min_n = min_n;
        self.max_n = max_n;
        self
    }

    #[must_use]
    pub const fn with_chordal(mut self, chordal: ChordalControl) -> Self {
        self.chordal = chordal;
        self
    }

    #[must_use]
    pub const fn with_max_gradation(mut self, max_gradation: f64) -> Self {
        self.max_gradation = max_gradation;
        self
    }

    #[must_use]
    pub const fn with_high_order(mut self, high_order: usize) -> Self {
        self.high_order = high_order;
        self
    }

    #[must_use]
    pub const fn with_max_bgm_remeshings(mut self, max_bgm_remeshings: usize) -> Self {
        self.max_bgm_remeshings = max_bgm_remeshings;
        self
    }

    #[must_use]
    pub const fn with_update_h0h1(mut self, update_h0h1: bool) -> Self {
        self.update_h0h1 = update_h0h1;
        self
    }

    fn check(&self, arg: usize) -> MeshResult<()> {
        check_bounds(self.min_n, self.max_n, arg)?;
        if !(self.max_gradation >= 0.0) {
            return Err(MeshError::invalid(arg, format!("max gradation {} < 0", self.max_gradation)));
        }
        if self.target_h.is_nan() {
            return Err(MeshError::invalid(arg, "target size is NaN"));
        }
        Ok(())
    }
}

/// Discretization of a parametric curve.
///
/// `nodes` lists every node of `connect` (end vertices, new vertices in
/// curve order, then high-order nodes) with its parameter in `pos1d`.
/// `h0` and `h1` are the end sizes used.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveMesh {
    pub connect: Connectivity,
    pub nodes: Vec<usize>,
    pub pos1d: Vec<f64>,
    pub h0: f64,
    pub h1: f64,
}

/// Mesh the curve between nodes `n0` (parameter `u0`) and `n1` (`u1`) with
/// sizes `h0` and `h1` at the ends.
///
/// When `u0 == u1` the end parameters are asked to the curve. `u0 > u1` is
/// allowed: the edges still run from `n0` to `n1`. A 2-row `pos` is promoted
/// to 3 rows. New points are appended to `pos`; on error `pos` is truncated
/// back to its initial length.
///
/// Arguments: 1 `curve`, 2 `pos`, 3 `n0`, 4 `n1`, 5 `u0`, 6 `u1`, 7 `h0`,
/// 8 `h1`, 9 `options`, 10 `progress`.
#[allow(clippy::too_many_arguments)]
pub fn mesh_curve_param<C: CurveAdapter, P: ProgressSink>(
    curve: &C,
    pos: &mut Coordinates,
    n0: usize,
    n1: usize,
    u0: f64,
    u1: f64,
    h0: f64,
    h1: f64,
    options: &CurveMeshOptions,
    mut progress: P,
) -> MeshResult<CurveMesh> {
    pos.check_node(n0, 3)?;
    pos.check_node(n1, 4)?;
    if !u0.is_finite() {
        return Err(MeshError::invalid(5, format!("parameter {u0} is not finite")));
    }
    if !u1.is_finite() {
        return Err(MeshError::invalid(6, format!("parameter {u1} is not finite")));
    }
    if !(h0 > 0.0) {
        return Err(MeshError::invalid(7, format!("size {h0} is not > 0")));
    }
    if !(h1 > 0.0) {
        return Err(MeshError::invalid(8, format!("size {h1} is not > 0")));
    }
    options.check(9)?;

    pos.promote_to_3d()?;
    let mark = pos.mark();
    let res = CurveMesher {
        curve,
        options,
        progress: &mut progress,
    }
    .run(pos, [n0, n1], [u0, u1], [h0, h1]);
    if res.is_err() {
        pos.truncate(mark);
    }
    res
}

struct CurveMesher<'a, C, P> {
    curve: &'a C,
    options: &'a CurveMeshOptions,
    progress: &'a mut P,
}

impl<C: CurveAdapter, P: ProgressSink> CurveMesher<'_, C, P> {
    fn run(&mut self, pos: &mut Coordinates, ends: [usize; 2], us: [f64; 2], hs: [f64; 2]) -> MeshResult<CurveMesh> {
        let [mut n0, mut n1] = ends;
        let [mut h0, mut h1] = hs;
        let [mut ua, mut ub] = if us[0] != us[1] {
            us
        } else {
            let u = sized(self.curve.coordinates_1d(&[pos.point3(n0), pos.point3(n1)])?, 2, "parameters")?;
            [u[0], u[1]]
        };
        let flipped = ua > ub;
        if flipped {
            std::mem::swap(&mut n0, &mut n1);
            std::mem::swap(&mut h0, &mut h1);
            std::mem::swap(&mut ua, &mut ub);
        }
        let sizes = EndSizes {
            ua,
            ub,
            h0,
            h1,
            target: self.options.target_h,
        };

        let (bg_us, tangents) = self.background(ua, ub, &sizes)?;
        let (metrics1d, h0, h1) = self.final_sizes(&bg_us, &tangents, &sizes)?;
        let max_h1d = ub - ua;

        self.poll(0.9)?;
        let mut us = bg_us;
        let mut metrics = metrics1d;
        let local: Vec<usize> = (0..us.len()).collect();
        let subdivide = SubdivideOptions::default()
            .with_force_even(self.options.force_even)
            .with_bounds(self.options.min_n, self.options.max_n);
        let order = subdivide_background(&mut us, &mut metrics, &local, &subdivide)?;
        let interior: Vec<f64> = order[1..order.len() - 1].iter().map(|&j| us[j]).collect();
        let points = sized(self.curve.coordinates_3d(&interior)?, interior.len(), "points")?;

        let mut nodes = Vec::new();
        let mut pos1d = Vec::new();
        nodes.try_reserve(order.len())?;
        pos1d.try_reserve(order.len())?;
        pos.reserve(points.len())?;
        nodes.push(n0);
        pos1d.push(ua);
        for (p, &u) in points.into_iter().zip(&interior) {
            nodes.push(pos.push_point3(p)?);
            pos1d.push(u);
        }
        nodes.push(n1);
        pos1d.push(ub);
        let (h0, h1) = if flipped {
            nodes.reverse();
            pos1d.reverse();
            (h1, h0)
        } else {
            (h0, h1)
        };
        let mut connect = indices_to_connect_e2(&nodes);
        debug!(
            "mesh_curve_param: {} edges on [{ua}, {ub}] (1-D size bound {max_h1d})",
            connect.len()
        );

        if self.options.high_order > 0 {
            let first = pos.len();
            convert_e2(pos, &mut connect, self.options.high_order)?;
            let added: Vec<[f64; 3]> = (first..pos.len()).map(|i| pos.point3(i)).collect();
            let params = sized(self.curve.coordinates_1d(&added)?, added.len(), "parameters")?;
            let projected = sized(self.curve.coordinates_3d(&params)?, params.len(), "points")?;
            for (k, p) in projected.into_iter().enumerate() {
                pos.set_point3(first + k, p);
            }
            nodes.extend(first..pos.len());
            pos1d.extend(params);
        }
        pos.debug_validate();
        connect.debug_validate();
        Ok(CurveMesh {
            connect,
            nodes,
            pos1d,
            h0,
            h1,
        })
    }

    /// Remesh the parameter interval until the background edges are close
    /// to unit metric length. Returns the background parameters and
    /// tangents.
    ///
    /// The background size is the uniform size of `sizes`, reduced with a
    /// fixed relative chordal error whatever the caller's chordal settings.
    fn background(&mut self, ua: f64, ub: f64, sizes: &EndSizes) -> MeshResult<(Vec<f64>, Vec<[f64; 3]>)> {
        let max_h1d = ub - ua;
        let rounds = self.options.max_bgm_remeshings;
        let h = sizes.uniform();
        let control = ChordalControl::relative(BGM_CHORDAL_ERROR).with_min_h(self.options.chordal.min_h);
        let mut us = vec![ua, ub];
        let mut iter = 0;
        loop {
            self.poll(0.8 * iter as f64 / (rounds + 1) as f64)?;
            let tangents = sized(self.curve.local_bases(&us)?, us.len(), "tangents")?;
            let n = us.len();
            let local: Vec<usize> = (0..n).collect();
            let connect = indices_to_connect_e2(&local);
            let mut metrics = metrics_3d_to_1d(&vec![h; n], &tangents)?;
            chordal_control(self.curve, &us, &connect, &tangents, &control, true, &mut metrics)?;
            clamp(&mut metrics, 0.0, max_h1d)?;
            let line = Coordinates::from_flat(1, us.clone())?;
            bound_gradations(&line, &connect, &[], true, GradationSign::Decrease, BGM_GRADATION, &mut metrics)?;

            let qh_max = us
                .windows(2)
                .zip(metrics.windows(2))
                .map(|(u, m)| edge_quality(u[1] - u[0], m[0], m[1]))
                .fold(0.0, f64::max);
            trace!("mesh_curve_param: background {iter}, {n} nodes, max metric length {qh_max:.3}");
            if qh_max < QH_MAX || iter == rounds {
                return Ok((us, tangents));
            }

            let opts = SubdivideOptions::default()
                .with_force_up(true)
                .with_bounds(MIN_BGM_EDGES, usize::MAX);
            let mut new_us = us.clone();
            let order = subdivide_background(&mut new_us, &mut metrics, &local, &opts)?;
            us = order.iter().map(|&j| new_us[j]).collect();
            iter += 1;
        }
    }

    /// 3-D sizes on the background nodes: end sizes, target inside,
    /// gradation and chordal control. Returns the 1-D sizes and the end
    /// sizes used.
    fn final_sizes(
        &self,
        us: &[f64],
        tangents: &[[f64; 3]],
        sizes: &EndSizes,
    ) -> MeshResult<(Vec<f64>, f64, f64)> {
        let n = us.len();
        let last = n - 1;
        let local: Vec<usize> = (0..n).collect();
        let connect = indices_to_connect_e2(&local);
        let points = sized(self.curve.coordinates_3d(us)?, n, "points")?;
        let line = Coordinates::from_points(&points)?;

        let mut h3d: Vec<f64> = us.iter().map(|&u| sizes.target_at(u)).collect();
        h3d[0] = sizes.h0;
        h3d[last] = sizes.h1;
        let g = self.options.max_gradation;
        let ends = [0, last];
        bound_gradations(&line, &connect, &ends, true, GradationSign::Both, g, &mut h3d)?;
        let reduced = chordal_control(self.curve, us, &connect, tangents, &self.options.chordal, false, &mut h3d)?;
        let frozen = if self.options.update_h0h1 {
            &ends[..0]
        } else {
            h3d[0] = sizes.h0;
            h3d[last] = sizes.h1;
            &ends[..]
        };
        bound_gradations(&line, &connect, frozen, true, GradationSign::Decrease, g, &mut h3d)?;
        debug!("mesh_curve_param: {n} background nodes, {reduced} sizes reduced by curvature");

        let mut metrics = metrics_3d_to_1d(&h3d, tangents)?;
        clamp(&mut metrics, 0.0, us[last] - us[0])?;
        let (h0, h1) = if self.options.update_h0h1 {
            (h3d[0], h3d[last])
        } else {
            (sizes.h0, sizes.h1)
        };
        Ok((metrics, h0, h1))
    }

    fn poll(&mut self, progress: f64) -> MeshResult<()> {
        if self.progress.should_abort(progress) {
            self.progress.report(0, "mesh_curve_param: interrupted");
            return Err(MeshError::Interrupted);
        }
        Ok(())
    }
}

/// Size field along the parameter interval before any control.
struct EndSizes {
    ua: f64,
    ub: f64,
    h0: f64,
    h1: f64,
    target: f64,
}

impl EndSizes {
    /// Target size, or the geometric mean of the end sizes.
    fn uniform(&self) -> f64 {
        if self.target > 0.0 { self.target } else { (self.h0 * self.h1).sqrt() }
    }

    fn target_at(&self, u: f64) -> f64 {
        if self.target > 0.0 {
            return self.target;
        }
        let span = self.ub - self.ua;
        let t = if span > 0.0 { ((u - self.ua) / span).clamp(0.0, 1.0) } else { 0.0 };
        self.h0 + t * (self.h1 - self.h0)
    }
}

/// Reject adapter answers of the wrong length.
fn sized<T>(values: Vec<T>, expected: usize, what: &str) -> MeshResult<Vec<T>> {
    if values.len() != expected {
        return Err(MeshError::Internal(format!(
            "curve returned {} {what} for {expected} queries",
            values.len()
        )));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_error::CurveError;
    use crate::progress::NoProgress;

    /// Circle of radius `r` in the XY plane, `u` the angle.
    struct Circle {
        r: f64,
        exact: bool,
    }

    impl CurveAdapter for Circle {
        fn coordinates_3d(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
            Ok(us.iter().map(|&u| [self.r * u.cos(), self.r * u.sin(), 0.0]).collect())
        }

        fn coordinates_1d(&self, points: &[[f64; 3]]) -> Result<Vec<f64>, CurveError> {
            Ok(points.iter().map(|p| p[1].atan2(p[0])).collect())
        }

        fn local_bases(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
            Ok(us.iter().map(|&u| [-self.r * u.sin(), self.r * u.cos(), 0.0]).collect())
        }

        fn curvatures(&self, us: &[f64]) -> Result<Vec<f64>, CurveError> {
            if self.exact {
                Ok(vec![1.0 / self.r; us.len()])
            } else {
                Err(CurveError::Unsupported)
            }
        }
    }

    /// Straight line `(2u, 0, 0)`.
    struct Line;

    impl CurveAdapter for Line {
        fn coordinates_3d(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
            Ok(us.iter().map(|&u| [2.0 * u, 0.0, 0.0]).collect())
        }

        fn coordinates_1d(&self, points: &[[f64; 3]]) -> Result<Vec<f64>, CurveError> {
            Ok(points.iter().map(|p| 0.5 * p[0]).collect())
        }

        fn local_bases(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
            Ok(vec![[2.0, 0.0, 0.0]; us.len()])
        }
    }

    /// Ellipse `(a cos u, b sin u, 0)`, sharply bent around `u = 0` when `a > b`.
    struct Ellipse {
        a: f64,
        b: f64,
    }

    impl CurveAdapter for Ellipse {
        fn coordinates_3d(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
            Ok(us.iter().map(|&u| [self.a * u.cos(), self.b * u.sin(), 0.0]).collect())
        }

        fn coordinates_1d(&self, points: &[[f64; 3]]) -> Result<Vec<f64>, CurveError> {
            Ok(points.iter().map(|p| (p[1] / self.b).atan2(p[0] / self.a)).collect())
        }

        fn local_bases(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
            Ok(us.iter().map(|&u| [-self.a * u.sin(), self.b * u.cos(), 0.0]).collect())
        }

        fn curvatures(&self, us: &[f64]) -> Result<Vec<f64>, CurveError> {
            Ok(us
                .iter()
                .map(|&u| {
                    let (s, c) = u.sin_cos();
                    let speed2 = self.a * self.a * s * s + self.b * self.b * c * c;
                    self.a * self.b / speed2.powf(1.5)
                })
                .collect())
        }
    }

    fn line_pos() -> Coordinates {
        Coordinates::from_points(&[[0.0, 0.0], [2.0, 0.0]]).unwrap()
    }

    fn quarter_circle() -> Coordinates {
        Coordinates::from_points(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]).unwrap()
    }

    #[test]
    fn straight_curve_is_uniform() {
        let mut pos = line_pos();
        let opts = CurveMeshOptions::default();
        let m = mesh_curve_param(&Line, &mut pos, 0, 1, 0.0, 1.0, 0.5, 0.5, &opts, NoProgress).unwrap();
        assert_eq!(pos.dimension(), 3);
        assert_eq!(m.connect.len(), 4);
        assert_eq!(m.nodes.first(), Some(&0));
        assert_eq!(m.nodes.last(), Some(&1));
        for (k, &u) in m.pos1d.iter().enumerate() {
            assert!((u - 0.25 * k as f64).abs() < 1e-9, "u = {u}");
        }
        assert!((pos.point3(m.nodes[2])[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn end_parameters_from_the_curve() {
        let mut pos = quarter_circle();
        let circle = Circle { r: 1.0, exact: true };
        let opts = CurveMeshOptions::default().with_target_h(0.2);
        let m = mesh_curve_param(&circle, &mut pos, 0, 1, 0.0, 0.0, 0.2, 0.2, &opts, NoProgress).unwrap();
        assert!((m.pos1d[0]).abs() < 1e-12);
        assert!((m.pos1d[m.pos1d.len() - 1] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!(m.connect.len() >= 7 && m.connect.len() <= 9, "{} edges", m.connect.len());
        for &n in &m.nodes {
            let p = pos.point3(n);
            assert!(((p[0] * p[0] + p[1] * p[1]).sqrt() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn reversed_parameters_keep_the_orientation() {
        let mut pos = line_pos();
        let opts = CurveMeshOptions::default().with_bounds(3, 3);
        let m = mesh_curve_param(&Line, &mut pos, 1, 0, 1.0, 0.0, 0.4, 0.8, &opts, NoProgress).unwrap();
        assert_eq!(m.connect.edge(0)[0], 1);
        assert_eq!(m.connect.edge(2)[1], 0);
        assert!(m.pos1d.windows(2).all(|w| w[0] > w[1]));
        assert_eq!((m.h0, m.h1), (0.4, 0.8));
    }

    #[test]
    fn chordal_control_refines_the_arc() {
        let circle = Circle { r: 1.0, exact: true };
        let coarse = CurveMeshOptions::default().with_target_h(1.0);
        let fine = coarse.with_chordal(ChordalControl::relative(0.01));
        let a = mesh_curve_param(&circle, &mut quarter_circle(), 0, 1, 0.0, 1.5, 1.0, 1.0, &coarse, NoProgress)
            .unwrap();
        let b = mesh_curve_param(&circle, &mut quarter_circle(), 0, 1, 0.0, 1.5, 1.0, 1.0, &fine, NoProgress)
            .unwrap();
        assert!(b.connect.len() > a.connect.len());
        assert!(b.h0 < 1.0);
        // the chordal bound for eps = 0.01 is 2 sqrt(0.0199) ~ 0.282
        assert!(b.connect.len() >= 5);
    }

    #[test]
    fn background_resolves_curvature_without_caller_control() {
        let ellipse = Ellipse { a: 4.0, b: 0.25 };
        let opts = CurveMeshOptions::default().with_target_h(1.0);
        assert!(!opts.chordal.is_active());
        let half_pi = std::f64::consts::FRAC_PI_2;
        let sizes = EndSizes {
            ua: 0.0,
            ub: half_pi,
            h0: 1.0,
            h1: 1.0,
            target: 1.0,
        };
        let mut progress = NoProgress;
        let mut mesher = CurveMesher {
            curve: &ellipse,
            options: &opts,
            progress: &mut progress,
        };
        let (us, tangents) = mesher.background(0.0, half_pi, &sizes).unwrap();
        assert_eq!(us.len(), tangents.len());
        assert!(us.windows(2).all(|w| w[0] < w[1]));
        // the parametric speed is lowest at the bend, so a uniform size alone
        // would space the nodes widest there
        let first = us[1] - us[0];
        let last = us[us.len() - 1] - us[us.len() - 2];
        assert!(4.0 * first < last, "first gap {first}, last gap {last}");

        // the final sizes still follow the caller, who asked for no chordal control
        let mut pos = Coordinates::from_points(&[[4.0, 0.0, 0.0], [0.0, 0.25, 0.0]]).unwrap();
        let m = mesh_curve_param(&ellipse, &mut pos, 0, 1, 0.0, half_pi, 1.0, 1.0, &opts, NoProgress).unwrap();
        let refined = opts.with_chordal(ChordalControl::relative(BGM_CHORDAL_ERROR));
        let mut pos = Coordinates::from_points(&[[4.0, 0.0, 0.0], [0.0, 0.25, 0.0]]).unwrap();
        let r = mesh_curve_param(&ellipse, &mut pos, 0, 1, 0.0, half_pi, 1.0, 1.0, &refined, NoProgress).unwrap();
        assert!(r.connect.len() > m.connect.len());
        assert!(m.connect.len() >= 3 && m.connect.len() <= 6, "{} edges", m.connect.len());
    }

    #[test]
    fn uniform_background_size() {
        let sizes = EndSizes {
            ua: 0.0,
            ub: 1.0,
            h0: 0.5,
            h1: 2.0,
            target: 0.0,
        };
        assert!((sizes.uniform() - 1.0).abs() < 1e-15);
        assert!((sizes.target_at(0.5) - 1.25).abs() < 1e-15);
        assert_eq!(EndSizes { target: 0.3, ..sizes }.uniform(), 0.3);
    }

    #[test]
    fn estimated_curvature_when_unsupported() {
        let circle = Circle { r: 1.0, exact: false };
        let opts = CurveMeshOptions::default()
            .with_target_h(1.0)
            .with_chordal(ChordalControl::relative(0.01));
        let m = mesh_curve_param(&circle, &mut quarter_circle(), 0, 1, 0.0, 1.5, 1.0, 1.0, &opts, NoProgress)
            .unwrap();
        assert!(m.connect.len() >= 5);
    }

    #[test]
    fn frozen_end_sizes() {
        let circle = Circle { r: 1.0, exact: true };
        let opts = CurveMeshOptions::default()
            .with_chordal(ChordalControl::relative(0.01))
            .with_update_h0h1(false);
        let m = mesh_curve_param(&circle, &mut quarter_circle(), 0, 1, 0.0, 1.5, 1.0, 1.0, &opts, NoProgress)
            .unwrap();
        assert_eq!((m.h0, m.h1), (1.0, 1.0));
    }

    #[test]
    fn high_order_nodes_lie_on_the_curve() {
        let circle = Circle { r: 2.0, exact: true };
        let mut pos = Coordinates::from_points(&[[2.0, 0.0, 0.0], [0.0, 2.0, 0.0]]).unwrap();
        let opts = CurveMeshOptions::default().with_target_h(1.0).with_high_order(1);
        let m = mesh_curve_param(&circle, &mut pos, 0, 1, 0.0, std::f64::consts::FRAC_PI_2, 1.0, 1.0, &opts, NoProgress)
            .unwrap();
        assert_eq!(m.connect.arity(), 3);
        assert_eq!(m.nodes.len(), m.pos1d.len());
        assert_eq!(pos.len(), 2 + (m.connect.len() - 1) + m.connect.len());
        for e in m.connect.iter() {
            let p = pos.point3(e[2]);
            assert!(((p[0] * p[0] + p[1] * p[1]).sqrt() - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn invalid_arguments_leave_pos_untouched() {
        let mut pos = line_pos();
        let o = CurveMeshOptions::default();
        let code = |r: MeshResult<CurveMesh>| r.unwrap_err().code();
        assert_eq!(code(mesh_curve_param(&Line, &mut pos, 2, 1, 0.0, 1.0, 1.0, 1.0, &o, NoProgress)), -3);
        assert_eq!(code(mesh_curve_param(&Line, &mut pos, 0, 5, 0.0, 1.0, 1.0, 1.0, &o, NoProgress)), -4);
        assert_eq!(code(mesh_curve_param(&Line, &mut pos, 0, 1, 0.0, 1.0, 0.0, 1.0, &o, NoProgress)), -7);
        assert_eq!(code(mesh_curve_param(&Line, &mut pos, 0, 1, 0.0, 1.0, 1.0, -1.0, &o, NoProgress)), -8);
        let bad = o.with_bounds(3, 2);
        assert_eq!(code(mesh_curve_param(&Line, &mut pos, 0, 1, 0.0, 1.0, 1.0, 1.0, &bad, NoProgress)), -9);
        assert_eq!(pos.dimension(), 2);
        assert_eq!(pos.len(), 2);
    }
}
