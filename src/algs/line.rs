//! Mesh a polyline whose interior nodes only carry geometry and sizes.
//!
//! Unlike the broken lines of [`straight`](crate::algs::straight), the
//! interior geometric nodes are not kept: they sample the size field, and
//! the new nodes are spread along the polyline at equal metric length.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::algs::chordal::{ChordalControl, bound_by_curvature};
use crate::algs::polyline::{arc_lengths, curvatures};
use crate::algs::straight::emit_on_polyline;
use crate::algs::subdivide::{SubdivideOptions, subdivide_background};
use crate::data::Coordinates;
use crate::mesh_error::{MeshError, MeshResult};

/// Settings of [`mesh_line`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineMeshOptions {
    pub force_even: bool,
    pub min_n: usize,
    pub max_n: usize,
    pub chordal: ChordalControl,
}

impl Default for LineMeshOptions {
    fn default() -> Self {
        Self {
            force_even: false,
            min_n: 1,
            max_n: usize::MAX,
            chordal: ChordalControl::default(),
        }
    }
}

impl LineMeshOptions {
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

    pub(crate) fn check(&self, arg: usize) -> MeshResult<()> {
        check_bounds(self.min_n, self.max_n, arg)
    }

    pub(crate) fn subdivide_options(&self) -> SubdivideOptions {
        SubdivideOptions::default()
            .with_force_even(self.force_even)
            .with_bounds(self.min_n, self.max_n)
    }
}

/// Discretization of a line.
///
/// The three vectors are parallel: node `indices[k]` has the parameter
/// `us[k]` (ascending, from 0 to 1) and the size `metrics[k]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineMesh {
    pub indices: Vec<usize>,
    pub us: Vec<f64>,
    pub metrics: Vec<f64>,
}

impl LineMesh {
    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.indices.len().saturating_sub(1)
    }
}

/// Mesh the polyline `geo_nodes` with sizes `metrics_g` given at its nodes.
///
/// The polyline is parametrized by arc length. When the chordal control is
/// active, sizes are first reduced with the discrete curvature of the
/// polyline.
///
/// Arguments: 1 `pos`, 2 `geo_nodes`, 3 `metrics_g`, 4 `options`.
pub fn mesh_line(
    pos: &mut Coordinates,
    geo_nodes: &[usize],
    metrics_g: &[f64],
    options: &LineMeshOptions,
) -> MeshResult<LineMesh> {
    check_geo_nodes(pos, geo_nodes)?;
    check_metrics(metrics_g, geo_nodes.len(), 3)?;
    options.check(4)?;
    let us = arc_lengths(pos, geo_nodes)?;
    line(pos, geo_nodes, us, metrics_g, options)
}

/// [`mesh_line`] with explicit parameters `ug` for the geometric nodes.
///
/// `ug` replaces the arc length: sizes are measured in that parameter and
/// new nodes are placed on the polyline by linear interpolation of it.
///
/// Arguments: 1 `pos`, 2 `geo_nodes`, 3 `ug`, 4 `metrics_g`, 5 `options`.
pub fn mesh_line_with_params(
    pos: &mut Coordinates,
    geo_nodes: &[usize],
    ug: &[f64],
    metrics_g: &[f64],
    options: &LineMeshOptions,
) -> MeshResult<LineMesh> {
    check_geo_nodes(pos, geo_nodes)?;
    if ug.len() != geo_nodes.len() {
        return Err(MeshError::invalid(
            3,
            format!("{} parameters for {} nodes", ug.len(), geo_nodes.len()),
        ));
    }
    if ug.windows(2).any(|w| !(w[0] <= w[1])) {
        return Err(MeshError::invalid(3, "parameters are not sorted ascending"));
    }
    check_metrics(metrics_g, geo_nodes.len(), 4)?;
    options.check(5)?;
    line(pos, geo_nodes, ug.to_vec(), metrics_g, options)
}

/// `InvalidArgument(arg)` unless `1 <= min_n <= max_n`.
pub(crate) fn check_bounds(min_n: usize, max_n: usize, arg: usize) -> MeshResult<()> {
    if min_n == 0 || min_n > max_n {
        return Err(MeshError::invalid(arg, format!("edge count bounds [{min_n}, {max_n}] are invalid")));
    }
    Ok(())
}

fn check_geo_nodes(pos: &Coordinates, geo_nodes: &[usize]) -> MeshResult<()> {
    pos.check_geometric(1)?;
    if geo_nodes.len() < 2 {
        return Err(MeshError::invalid(2, "a line needs at least two nodes"));
    }
    geo_nodes.iter().try_for_each(|&n| pos.check_node(n, 2))
}

fn check_metrics(metrics: &[f64], n: usize, arg: usize) -> MeshResult<()> {
    if metrics.len() != n {
        return Err(MeshError::invalid(arg, format!("{} sizes for {n} nodes", metrics.len())));
    }
    match metrics.iter().find(|&&h| !(h > 0.0)) {
        Some(h) => Err(MeshError::invalid(arg, format!("size {h} is not > 0"))),
        None => Ok(()),
    }
}

fn line(
    pos: &mut Coordinates,
    geo_nodes: &[usize],
    mut us: Vec<f64>,
    metrics_g: &[f64],
    options: &LineMeshOptions,
) -> MeshResult<LineMesh> {
    let mut metrics = metrics_g.to_vec();
    let chordal = &options.chordal;
    if chordal.is_active() {
        let c = curvatures(pos, geo_nodes)?;
        let n = bound_by_curvature(&c, &[], chordal.max_chordal_error, chordal.mode, false, chordal.min_h, &mut metrics)?;
        debug!("mesh_line: chordal control reduced {n} sizes");
    }
    let local: Vec<usize> = (0..geo_nodes.len()).collect();
    let order = subdivide_background(&mut us, &mut metrics, &local, &options.subdivide_options())?;
    let mut indices = Vec::new();
    emit_on_polyline(pos, geo_nodes, &us, &order, &mut indices)?;

    let (u0, u1) = (us[0], us[geo_nodes.len() - 1]);
    let span = u1 - u0;
    let last = order.len() - 1;
    let params = order
        .iter()
        .enumerate()
        .map(|(k, &j)| if span > 0.0 { ((us[j] - u0) / span).clamp(0.0, 1.0) } else { k as f64 / last as f64 })
        .collect();
    Ok(LineMesh {
        indices,
        us: params,
        metrics: order.iter().map(|&j| metrics[j]).collect(),
    })
}
