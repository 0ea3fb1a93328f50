//! Re-export public algorithms.

pub mod chordal;
pub mod curve_param;
pub mod extrude;
pub mod line;
pub mod polyline;
pub mod spline;
pub mod straight;
pub mod subdivide;
pub mod transform;

pub use chordal::{ChordalControl, ChordalMode, bound_by_curvature};
pub use curve_param::{CurveMesh, CurveMeshOptions, mesh_curve_param};
pub use extrude::{Division, Origin, extrude_rotate, extrude_rotate_2d, extrude_translate};
pub use line::{LineMesh, LineMeshOptions, mesh_line, mesh_line_with_params};
pub use spline::{SplineMesh, SplineMeshOptions, mesh_spline};
pub use straight::{
    mesh_broken_line, mesh_broken_line_aniso, mesh_broken_line_sized, mesh_straight,
    mesh_straight_sized, mesh_straight_through,
};
pub use subdivide::{SubdivideOptions, subdivide, subdivide_background};
pub use transform::{convert_e2, flip, mesh_reorient};
