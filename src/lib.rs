//! # line-mesh
//!
//! line-mesh discretizes 1-D entities (straight segments, broken lines,
//! polylines, poly-splines, sweeps and arbitrary parametric curves) into
//! edges whose lengths follow a size field. It is the 1-D layer a surface or
//! volume mesher calls to mesh its boundary curves.
//!
//! ## Features
//! - Subdivision of a parametrized line at equal metric length, with edge
//!   count bounds and forced even counts
//! - Size fields: clamping, interpolation, gradation control and
//!   anisotropic tensors
//! - Chordal-error control from exact or estimated curvatures
//! - Builders for straight lines, polylines, poly-splines, translation and
//!   rotation sweeps, and parametric curves behind the [`CurveAdapter`]
//!   trait
//! - Linear or high-order edges
//!
//! ## Buffers
//!
//! Every builder appends new points to a caller-owned [`Coordinates`] and
//! never moves existing ones. Argument errors are detected before anything
//! is appended; [`Coordinates::mark`] / [`Coordinates::truncate`] roll back
//! the other failures.
//!
//! ## Usage
//! Add `line-mesh` as a dependency in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! line-mesh = "0.3"
//! # Optional features:
//! # features = ["strict-invariants"]
//! ```
//!
//! ```rust
//! use line_mesh::prelude::*;
//!
//! let mut pos = Coordinates::from_points(&[[0.0, 0.0], [1.0, 1.0]]).unwrap();
//! let mut indices = Vec::new();
//! mesh_straight(&mut pos, 0, 1, 4, &mut indices).unwrap();
//! assert_eq!(indices, vec![0, 2, 3, 4, 1]);
//! assert_eq!(pos.point(3), Some(&[0.5, 0.5][..]));
//! ```

// Re-export our major subsystems:
pub mod algs;
pub mod curve;
pub mod data;
pub mod geometry;
pub mod mesh_error;
pub mod metric;
pub mod progress;

pub use curve::CurveAdapter;
pub use data::{Connectivity, Coordinates};
pub use mesh_error::{CurveError, MeshError, MeshResult};

static_assertions::assert_impl_all!(Coordinates: Send, Sync, Clone);
static_assertions::assert_impl_all!(Connectivity: Send, Sync, Clone);
static_assertions::assert_impl_all!(MeshError: Send, Sync, std::error::Error);

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::chordal::{ChordalControl, ChordalMode};
    pub use crate::algs::curve_param::{CurveMesh, CurveMeshOptions, mesh_curve_param};
    pub use crate::algs::extrude::{
        Division, Origin, extrude_rotate, extrude_rotate_2d, extrude_translate,
    };
    pub use crate::algs::line::{LineMesh, LineMeshOptions, mesh_line, mesh_line_with_params};
    pub use crate::algs::spline::{SplineMesh, SplineMeshOptions, mesh_spline};
    pub use crate::algs::straight::{
        mesh_broken_line, mesh_broken_line_aniso, mesh_broken_line_sized, mesh_straight,
        mesh_straight_sized, mesh_straight_through,
    };
    pub use crate::algs::subdivide::{SubdivideOptions, subdivide, subdivide_background};
    pub use crate::algs::transform::{convert_e2, flip, mesh_reorient};
    pub use crate::curve::CurveAdapter;
    pub use crate::data::connectivity::{indices_to_connect_e2, indices_to_connect_e3};
    pub use crate::data::{Connectivity, Coordinates, Validate};
    pub use crate::mesh_error::{CurveError, MeshError, MeshResult};
    pub use crate::metric::{GradationSign, MetricTensor};
    pub use crate::progress::{LogProgress, NoProgress, ProgressSink};
}
