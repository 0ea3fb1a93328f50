//! Progress reporting and cooperative interruption.
//!
//! Long builders take a [`ProgressSink`] and poll it between their coarse
//! stages. Returning `true` from [`ProgressSink::should_abort`] makes the
//! builder stop with [`MeshError::Interrupted`](crate::mesh_error::MeshError::Interrupted).

use log::{debug, info, trace};

/// Observer of a running builder.
pub trait ProgressSink {
    /// Free-form message; `level` 0 is the most important.
    fn report(&mut self, _level: u32, _msg: &str) {}

    /// Polled with the current progress in `[0, 1]`.
    fn should_abort(&mut self, _progress: f64) -> bool {
        false
    }
}

/// Ignores messages and never aborts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Forwards messages to the `log` facade (level 0 at info, 1 at debug,
/// deeper levels at trace) and never aborts.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, level: u32, msg: &str) {
        match level {
            0 => info!("{msg}"),
            1 => debug!("{msg}"),
            _ => trace!("{msg}"),
        }
    }
}

impl<P: ProgressSink + ?Sized> ProgressSink for &mut P {
    fn report(&mut self, level: u32, msg: &str) {
        (**self).report(level, msg);
    }

    fn should_abort(&mut self, progress: f64) -> bool {
        (**self).should_abort(progress)
    }
}
