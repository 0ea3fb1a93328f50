//! Small fixed-size vector helpers.
//!
//! Points and tangents travel through the engine as `[f64; 3]`; 2-D data is
//! zero-padded on the third component.

pub mod vector;

pub use vector::{add, cross, dot, lerp, norm, normalize, rotate_about_axis, scale, sub};
