//! Deterministic test doubles for the timer and persistence seams.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use opentrade_types::{OpentradeError, Result};
use parking_lot::Mutex;

use crate::persistence::PersistenceGateway;
use crate::timer::{TimeoutHandle, TimerCallback, TimerService};

/// Counts coalescing-save requests.
#[derive(Default)]
pub(crate) struct CountingGateway {
    saves: AtomicUsize,
}

impl CountingGateway {
    pub(crate) fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl PersistenceGateway for CountingGateway {
    fn queue_save(&self) {
        self.saves.fetch_add(1, Ordering::SeqCst);
    }
}

/// Timer that queues callbacks for manual, in-order firing.
#[derive(Default)]
pub(crate) struct ManualTimer {
    queue: Mutex<VecDeque<(Arc<AtomicBool>, TimerCallback)>>,
    scheduled: AtomicUsize,
}

impl ManualTimer {
    /// Fire the oldest scheduled timeout. A cancelled entry is consumed as
    /// a silent no-op. Returns whether a callback actually ran.
    pub(crate) fn fire_next(&self) -> bool {
        let entry = self.queue.lock().pop_front();
        match entry {
            Some((cancelled, callback)) if !cancelled.load(Ordering::SeqCst) => {
                callback();
                true
            }
            _ => false,
        }
    }

    /// Total number of schedule calls observed.
    pub(crate) fn scheduled(&self) -> usize {
        self.scheduled.load(Ordering::SeqCst)
    }
}

impl TimerService for ManualTimer {
    fn schedule(&self, _delay: Duration, callback: TimerCallback) -> Result<TimeoutHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.queue.lock().push_back((cancelled.clone(), callback));
        self.scheduled.fetch_add(1, Ordering::SeqCst);
        Ok(TimeoutHandle::new(move || {
            cancelled.store(true, Ordering::SeqCst);
        }))
    }
}

/// Timer whose cancellation does nothing: models a scheduler where a
/// just-fired callback cannot be retroactively cancelled.
#[derive(Default)]
pub(crate) struct NoCancelTimer {
    queue: Mutex<VecDeque<TimerCallback>>,
}

impl NoCancelTimer {
    pub(crate) fn fire_next(&self) -> bool {
        let entry = self.queue.lock().pop_front();
        match entry {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl TimerService for NoCancelTimer {
    fn schedule(&self, _delay: Duration, callback: TimerCallback) -> Result<TimeoutHandle> {
        self.queue.lock().push_back(callback);
        Ok(TimeoutHandle::new(|| {}))
    }
}

/// Timer that always refuses to schedule.
pub(crate) struct FailingTimer;

impl TimerService for FailingTimer {
    fn schedule(&self, _delay: Duration, _callback: TimerCallback) -> Result<TimeoutHandle> {
        Err(OpentradeError::SchedulingError {
            reason: "scheduler exhausted".into(),
        })
    }
}
