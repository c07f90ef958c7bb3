//! The open-offer reservation state machine.
//!
//! Wraps one immutable [`Offer`] with its mutable lifecycle state. All
//! mutations — protocol-driven and timer-driven alike — go through
//! [`OpenOffer::set_state`], which owns the persistence trigger and the
//! reservation timeout.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use opentrade_types::{Offer, OfferId, Result, constants};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::persistence::{OpenOfferRecord, PersistenceGateway};
use crate::timer::{TimeoutHandle, TimerService};

/// Reservation timeout during the take-offer process. If the taker's deposit
/// is not completed within this window the offer reverts to AVAILABLE.
const RESERVATION_TIMEOUT: Duration = Duration::from_secs(constants::RESERVATION_TIMEOUT_SECS);

/// Lifecycle state of an open offer.
///
/// CLOSED (trade completed) and CANCELED (withdrawn) are terminal; protocol
/// legality of a transition is enforced by callers, not at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenOfferState {
    Available,
    Reserved,
    Closed,
    Canceled,
}

impl fmt::Display for OpenOfferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "AVAILABLE"),
            Self::Reserved => write!(f, "RESERVED"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// A published offer plus its mutable reservation state.
///
/// Cloning yields another handle to the same state machine; the timer
/// callback and application threads are serialized through one internal
/// lock. Holds the wrapped [`Offer`] immutably for its whole lifetime.
#[derive(Clone)]
pub struct OpenOffer {
    shared: Arc<Shared>,
}

struct Shared {
    offer: Offer,
    timer: Arc<dyn TimerService>,
    mutable: Mutex<MutableState>,
}

struct MutableState {
    state: OpenOfferState,
    /// Injected facade handle; never serialized, re-bound after reload.
    persistence: Option<Arc<dyn PersistenceGateway>>,
    /// At most one live timeout per offer.
    timeout: Option<TimeoutHandle>,
}

impl OpenOffer {
    /// Wrap a freshly published offer. Starts in AVAILABLE with no timeout.
    #[must_use]
    pub fn new(offer: Offer, timer: Arc<dyn TimerService>) -> Self {
        Self::with_state(offer, OpenOfferState::Available, timer)
    }

    /// Reconstruct from a loaded record.
    ///
    /// Expects records that already went through the post-load normalization
    /// pass ([`crate::book::normalize_loaded`]); no timeout is armed and no
    /// facade is bound — call [`Self::bind_persistence`] afterwards.
    #[must_use]
    pub fn from_record(record: OpenOfferRecord, timer: Arc<dyn TimerService>) -> Self {
        Self::with_state(record.offer, record.state, timer)
    }

    fn with_state(offer: Offer, state: OpenOfferState, timer: Arc<dyn TimerService>) -> Self {
        Self {
            shared: Arc::new(Shared {
                offer,
                timer,
                mutable: Mutex::new(MutableState {
                    state,
                    persistence: None,
                    timeout: None,
                }),
            }),
        }
    }

    #[must_use]
    pub fn offer(&self) -> &Offer {
        &self.shared.offer
    }

    #[must_use]
    pub fn id(&self) -> OfferId {
        self.shared.offer.id
    }

    #[must_use]
    pub fn short_id(&self) -> String {
        self.shared.offer.short_id()
    }

    #[must_use]
    pub fn state(&self) -> OpenOfferState {
        self.shared.mutable.lock().state
    }

    /// Whether a reservation timeout is currently armed. Holds exactly when
    /// the state is RESERVED (unless timer scheduling failed).
    #[must_use]
    pub fn has_active_timeout(&self) -> bool {
        self.shared.mutable.lock().timeout.is_some()
    }

    /// (Re-)inject the shared persistence facade handle.
    pub fn bind_persistence(&self, gateway: Arc<dyn PersistenceGateway>) {
        self.shared.mutable.lock().persistence = Some(gateway);
    }

    /// Snapshot for the persisted collection.
    #[must_use]
    pub fn to_record(&self) -> OpenOfferRecord {
        OpenOfferRecord::new(self.shared.offer.clone(), self.state())
    }

    /// Unconditionally set the lifecycle state.
    ///
    /// Side effects, in order: a save is queued iff the state actually
    /// changed; entering RESERVED arms a fresh 30 s timeout (superseding any
    /// prior one — even a RESERVED → RESERVED no-op refreshes the window);
    /// any other target state cancels an active timeout.
    ///
    /// # Errors
    /// Returns [`opentrade_types::OpentradeError::SchedulingError`] when the
    /// timeout could not be armed. The state assignment and save still took
    /// effect: the timeout is best-effort safety, not a correctness
    /// requirement for manual transitions.
    pub fn set_state(&self, new_state: OpenOfferState) -> Result<()> {
        let mut mutable = self.shared.mutable.lock();
        self.apply(&mut mutable, new_state)
    }

    fn apply(&self, mutable: &mut MutableState, new_state: OpenOfferState) -> Result<()> {
        tracing::trace!(
            offer = %self.short_id(),
            from = %mutable.state,
            to = %new_state,
            "Offer state transition"
        );
        let changed = mutable.state != new_state;
        mutable.state = new_state;
        if changed {
            if let Some(persistence) = &mutable.persistence {
                persistence.queue_save();
            }
        }

        if new_state == OpenOfferState::Reserved {
            self.start_timeout(mutable)
        } else {
            Self::stop_timeout(mutable);
            Ok(())
        }
    }

    fn start_timeout(&self, mutable: &mut MutableState) -> Result<()> {
        // Supersede before arming: never two live timers, even transiently.
        Self::stop_timeout(mutable);

        // The callback must not keep a dropped offer alive.
        let weak = Arc::downgrade(&self.shared);
        let handle = self.shared.timer.schedule(
            RESERVATION_TIMEOUT,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    OpenOffer { shared }.on_timeout();
                }
            }),
        )?;
        mutable.timeout = Some(handle);
        Ok(())
    }

    fn stop_timeout(mutable: &mut MutableState) {
        if let Some(handle) = mutable.timeout.take() {
            handle.cancel();
        }
    }

    /// Timeout callback. Re-checks state under the same lock that serializes
    /// `set_state`: a protocol-driven transition that won the race leaves
    /// nothing to do here, whether or not its cancellation beat the fire.
    fn on_timeout(&self) {
        let mut mutable = self.shared.mutable.lock();
        if mutable.state == OpenOfferState::Reserved {
            tracing::debug!(
                offer = %self.short_id(),
                "Reservation timeout reached, reverting to AVAILABLE"
            );
            if let Err(e) = self.apply(&mut mutable, OpenOfferState::Available) {
                tracing::warn!(offer = %self.short_id(), error = %e, "Timeout revert failed");
            }
        }
    }
}

/// Equal iff the wrapped offer and the current state are equal. This is the
/// in-memory dedup identity; persistent identity is the offer's id alone.
impl PartialEq for OpenOffer {
    fn eq(&self, other: &Self) -> bool {
        self.shared.offer == other.shared.offer && self.state() == other.state()
    }
}

impl Eq for OpenOffer {}

impl fmt::Debug for OpenOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenOffer")
            .field("offer", &self.shared.offer)
            .field("state", &self.state())
            .finish()
    }
}

impl fmt::Display for OpenOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpenOffer[{}] {}", self.short_id(), self.state())
    }
}
