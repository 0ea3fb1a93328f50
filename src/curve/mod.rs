//! Parametric curves seen by the discretizer.
//!
//! [`CurveAdapter`] is the capability a caller implements to expose any
//! parametric curve to [`mesh_curve_param`](crate::algs::curve_param::mesh_curve_param).
//! The four queries must agree with each other (the engine does not check
//! that `coordinates_1d(coordinates_3d(u)) == u`).

pub mod spline;

pub use spline::{HermiteSpan, spline_point};

use crate::mesh_error::CurveError;

/// A curve `P(u)` in 3-D space.
pub trait CurveAdapter {
    /// Points `P(u)` for every parameter.
    fn coordinates_3d(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError>;

    /// Parameters of points known to lie on the curve. Only called for end
    /// vertices without explicit parameters and for high-order nodes.
    fn coordinates_1d(&self, points: &[[f64; 3]]) -> Result<Vec<f64>, CurveError>;

    /// Tangents `dP/du`, not normalized.
    fn local_bases(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError>;

    /// Curvatures (inverse radii). A negative value or an error makes the
    /// chordal controller fall back to its own estimate.
    fn curvatures(&self, _us: &[f64]) -> Result<Vec<f64>, CurveError> {
        Err(CurveError::Unsupported)
    }
}

impl<C: CurveAdapter + ?Sized> CurveAdapter for &C {
    fn coordinates_3d(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
        (**self).coordinates_3d(us)
    }

    fn coordinates_1d(&self, points: &[[f64; 3]]) -> Result<Vec<f64>, CurveError> {
        (**self).coordinates_1d(points)
    }

    fn local_bases(&self, us: &[f64]) -> Result<Vec<[f64; 3]>, CurveError> {
        (**self).local_bases(us)
    }

    fn curvatures(&self, us: &[f64]) -> Result<Vec<f64>, CurveError> {
        (**self).curvatures(us)
    }
}
