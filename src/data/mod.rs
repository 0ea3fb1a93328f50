//! Buffers shared by every 1-D routine.
//!
//! [`Coordinates`] is the append-only point store, [`Connectivity`] the edge
//! tuples referring to it. Both expose a high-water mark so a caller can roll
//! back partial appends after a failed call.

pub mod connectivity;
pub mod coordinates;

pub use connectivity::Connectivity;
pub use coordinates::Coordinates;

use crate::mesh_error::MeshError;

/// Structural self-checks for the buffers.
pub trait Validate {
    /// Validate invariants and return the first violation.
    fn validate(&self) -> Result<(), MeshError>;

    /// Panic on violation in debug builds or with `strict-invariants`.
    fn debug_validate(&self) {
        #[cfg(any(debug_assertions, feature = "strict-invariants"))]
        if let Err(e) = self.validate() {
            panic!("[invariants] {e}");
        }
    }
}
