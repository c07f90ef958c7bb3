//! One-shot cancellable timer seam.
//!
//! The reservation timeout is the only suspension point in this crate, and
//! it is always bounded and cancellable. [`TimerService`] abstracts the
//! scheduler so the state machine can be driven by the production tokio
//! runtime or by a deterministic test double.

use std::fmt;
use std::time::Duration;

use opentrade_types::{OpentradeError, Result};

/// Callback invoked once when a scheduled timeout fires.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Schedules one-shot callbacks after a delay.
pub trait TimerService: Send + Sync {
    /// Schedule `callback` to run once after `delay`.
    ///
    /// # Errors
    /// Returns [`OpentradeError::SchedulingError`] when the underlying
    /// scheduler cannot accept the timer (e.g. no runtime on this thread).
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> Result<TimeoutHandle>;
}

/// Owned handle to one scheduled timeout.
///
/// At most one handle exists per scheduled callback; ownership transfers out
/// when the timeout is superseded. Dropping the handle cancels the timeout.
pub struct TimeoutHandle {
    cancel: Box<dyn Fn() + Send>,
}

impl TimeoutHandle {
    /// Wrap a cancellation action provided by a [`TimerService`].
    pub fn new(cancel: impl Fn() + Send + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
        }
    }

    /// Cancel the timeout. Idempotent, and a no-op on an already-fired
    /// timer — a just-fired callback cannot be retroactively cancelled, so
    /// callers must not rely on cancellation winning that race.
    pub fn cancel(&self) {
        (self.cancel)();
    }
}

impl Drop for TimeoutHandle {
    fn drop(&mut self) {
        (self.cancel)();
    }
}

impl fmt::Debug for TimeoutHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TimeoutHandle")
    }
}

/// Production timer backed by the current tokio runtime.
///
/// Each scheduled timeout is a spawned task awaiting `tokio::time::sleep`;
/// cancellation aborts the task. Under a paused-time test runtime the
/// timeouts fire deterministically.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl TimerService for TokioTimer {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> Result<TimeoutHandle> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| OpentradeError::SchedulingError {
                reason: e.to_string(),
            })?;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        let abort = task.abort_handle();
        Ok(TimeoutHandle::new(move || abort.abort()))
    }
}
