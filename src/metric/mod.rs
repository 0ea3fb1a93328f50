//! Metric fields: target edge sizes attached to nodes.
//!
//! Isotropic metrics are stored as `f64` sizes, anisotropic ones as
//! [`MetricTensor`]s. [`field`] holds the operators the meshers apply to
//! whole arrays (clamping, interpolation, gradation control).

pub mod field;
pub mod tensor;

pub use field::{
    GradationSign, aniso_to_iso, bound_gradations, bound_variations, clamp, clamp_tensors,
    edge_quality, interpolate, interpolate_tensors, intersect, metrics_1d_to_3d,
    metrics_3d_to_1d,
};
pub use tensor::MetricTensor;
