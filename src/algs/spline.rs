//! Mesh a poly-spline: G1 cubic spans through a list of nodes.
//!
//! The poly-spline `n0 n1 ... n_{N-1}` passes through `n1 ... n_{N-2}`; the
//! first and last nodes only set the end tangents. Sizes given at the spline
//! nodes are spread over a background mesh sampling every span, smoothed by
//! gradation control and reduced by chordal control, before the final
//! subdivision at equal metric length.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::algs::chordal::{ChordalControl, bound_by_curvature};
use crate::algs::line::check_bounds;
use crate::algs::subdivide::{SubdivideOptions, subdivide_background};
use crate::curve::HermiteSpan;
use crate::data::Coordinates;
use crate::data::connectivity::indices_to_connect_e2;
use crate::mesh_error::{MeshError, MeshResult};
use crate::metric::{GradationSign, bound_gradations};

/// Background samples per spline span.
const SAMPLES_PER_SPAN: usize = 16;
/// Samples used to measure the distance between a span and its chord.
const DEVIATION_SAMPLES: usize = 32;

/// Settings of [`mesh_spline`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineMeshOptions {
    pub force_even: bool,
    pub min_n: usize,
    pub max_n: usize,
    pub chordal: ChordalControl,
    /// Size sought inside the spans (`<= 0`: interpolate the node sizes).
    pub target_metric: f64,
    /// Maximum gradation; `f64::MAX` disables gradation control.
    pub max_gradation: f64,
}

impl Default for SplineMeshOptions {
    fn default() -> Self {
        Self {
            force_even: false,
            min_n: 1,
            max_n: usize::MAX,
            chordal: ChordalControl::default(),
            target_metric: 0.0,
            max_gradation: f64::MAX,
        }
    }
}

impl SplineMeshOptions {
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
    pub const fn with_target_metric(mut self, target_metric: f64) -> Self {
        self.target_metric = target_metric;
        self
    }

    #[must_use]
    pub const fn with_max_gradation(mut self, max_gradation: f64) -> Self {
        self.max_gradation = max_gradation;
        self
    }
}

/// Discretization of a poly-spline. `indices`, `us` (0 to 1) and `metrics`
/// are parallel; `g_distance` is the largest distance between the spline
/// and the broken line through its nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplineMesh {
    pub indices: Vec<usize>,
    pub us: Vec<f64>,
    pub metrics: Vec<f64>,
    pub g_distance: f64,
}

/// Spans of a poly-spline, parametrized by arc length.
struct PolySpline {
    spans: Vec<HermiteSpan>,
    /// Arc length at the start of every span, plus the total length.
    starts: Vec<f64>,
}

impl PolySpline {
    fn new(pos: &Coordinates, nodes: &[usize]) -> Self {
        let spans: Vec<HermiteSpan> = nodes
            .windows(4)
            .map(|w| {
                HermiteSpan::from_nodes(
                    pos.point3(w[0]),
                    pos.point3(w[1]),
                    pos.point3(w[2]),
                    pos.point3(w[3]),
                    w[0] == w[1],
                    w[3] == w[2],
                )
            })
            .collect();
        let mut starts = Vec::with_capacity(spans.len() + 1);
        let mut acc = 0.0;
        starts.push(acc);
        for span in &spans {
            acc += span.arc_length(0.0, 1.0);
            starts.push(acc);
        }
        Self { spans, starts }
    }

    fn length(&self) -> f64 {
        self.starts[self.spans.len()]
    }

    fn point_at_length(&self, s: f64) -> [f64; 3] {
        let k = self
            .starts
            .partition_point(|&x| x <= s)
            .saturating_sub(1)
            .min(self.spans.len() - 1);
        let span = &self.spans[k];
        span.point(span.param_at_length(s - self.starts[k]))
    }
}

/// Mesh the poly-spline through `spline_nodes[1..N-1]`.
///
/// `metrics[k]` is the size at `spline_nodes[k]`; the first and last values
/// are not used. The result starts with `spline_nodes[1]` and ends with
/// `spline_nodes[N-2]`.
///
/// Arguments: 1 `pos`, 2 `spline_nodes` (N ≥ 4), 3 `metrics`, 4 `options`.
pub fn mesh_spline(
    pos: &mut Coordinates,
    spline_nodes: &[usize],
    metrics: &[f64],
    options: &SplineMeshOptions,
) -> MeshResult<SplineMesh> {
    pos.check_geometric(1)?;
    let ns = spline_nodes.len();
    if ns < 4 {
        return Err(MeshError::invalid(2, format!("{ns} nodes cannot define a spline (4 needed)")));
    }
    spline_nodes.iter().try_for_each(|&n| pos.check_node(n, 2))?;
    if metrics.len() != ns {
        return Err(MeshError::invalid(3, format!("{} sizes for {ns} spline nodes", metrics.len())));
    }
    if let Some(h) = metrics[1..ns - 1].iter().find(|&&h| !(h > 0.0)) {
        return Err(MeshError::invalid(3, format!("size {h} is not > 0")));
    }
    check_bounds(options.min_n, options.max_n, 4)?;
    if !(options.max_gradation >= 0.0) {
        return Err(MeshError::invalid(4, format!("max gradation {} < 0", options.max_gradation)));
    }

    let spline = PolySpline::new(pos, spline_nodes);
    let n_spans = spline.spans.len();

    // background mesh: SAMPLES_PER_SPAN samples per span, spline nodes every SAMPLES_PER_SPAN
    let n_bg = n_spans * SAMPLES_PER_SPAN + 1;
    let mut bg_us = Vec::new();
    let mut bg_metrics = Vec::new();
    let mut bg_curvatures = Vec::new();
    bg_us.try_reserve(n_bg)?;
    bg_metrics.try_reserve(n_bg)?;
    bg_curvatures.try_reserve(n_bg)?;
    for (k, span) in spline.spans.iter().enumerate() {
        let (ha, hb) = (metrics[k + 1], metrics[k + 2]);
        let len = spline.starts[k + 1] - spline.starts[k];
        for i in 0..SAMPLES_PER_SPAN {
            let s = i as f64 / SAMPLES_PER_SPAN as f64;
            let local = span.arc_length(0.0, s);
            bg_us.push(spline.starts[k] + local);
            bg_metrics.push(if i == 0 {
                ha
            } else if options.target_metric > 0.0 {
                options.target_metric
            } else {
                let t = if len > 0.0 { local / len } else { s };
                ha + t * (hb - ha)
            });
            bg_curvatures.push(span.curvature(s));
        }
    }
    bg_us.push(spline.length());
    bg_metrics.push(metrics[ns - 2]);
    bg_curvatures.push(spline.spans[n_spans - 1].curvature(1.0));

    let bg_pos = Coordinates::from_flat(1, bg_us.clone())?;
    let local: Vec<usize> = (0..n_bg).collect();
    let bg_connect = indices_to_connect_e2(&local);
    let spline_samples: Vec<usize> = (0..=n_spans).map(|k| k * SAMPLES_PER_SPAN).collect();
    let g = options.max_gradation;
    bound_gradations(&bg_pos, &bg_connect, &spline_samples, true, GradationSign::Both, g, &mut bg_metrics)?;
    let chordal = &options.chordal;
    let reduced = bound_by_curvature(
        &bg_curvatures,
        &[],
        chordal.max_chordal_error,
        chordal.mode,
        false,
        chordal.min_h,
        &mut bg_metrics,
    )?;
    bound_gradations(&bg_pos, &bg_connect, &[], true, GradationSign::Decrease, g, &mut bg_metrics)?;
    debug!("mesh_spline: {n_spans} spans, length {:.4}, {reduced} sizes reduced by curvature", spline.length());

    let opts = SubdivideOptions::default()
        .with_force_even(options.force_even)
        .with_bounds(options.min_n, options.max_n);
    let order = subdivide_background(&mut bg_us, &mut bg_metrics, &local, &opts)?;

    let (first, last) = (spline_nodes[1], spline_nodes[ns - 2]);
    let mut indices = Vec::new();
    indices.try_reserve(order.len())?;
    pos.reserve(order.len().saturating_sub(2))?;
    for &j in &order {
        let node = if j == 0 {
            first
        } else if j == n_bg - 1 {
            last
        } else {
            pos.push_point3(spline.point_at_length(bg_us[j]))?
        };
        indices.push(node);
    }

    let total = spline.length();
    let n_edges = order.len() - 1;
    let us = order
        .iter()
        .enumerate()
        .map(|(k, &j)| if total > 0.0 { (bg_us[j] / total).clamp(0.0, 1.0) } else { k as f64 / n_edges as f64 })
        .collect();
    let g_distance = spline
        .spans
        .iter()
        .map(|span| span.chord_deviation(DEVIATION_SAMPLES))
        .fold(0.0, f64::max);
    Ok(SplineMesh {
        indices,
        us,
        metrics: order.iter().map(|&j| bg_metrics[j]).collect(),
        g_distance,
    })
}
