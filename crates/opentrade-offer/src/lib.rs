//! # opentrade-offer
//!
//! **Open-offer reservation lifecycle** for OpenTrade.
//!
//! An offer published to the network must not stay invisibly locked when a
//! taker starts a trade and then disappears before completing the deposit.
//! This crate wraps an immutable [`Offer`](opentrade_types::Offer) with a
//! mutable lifecycle state and a 30-second reservation safety timeout:
//!
//! 1. **OpenOffer**: the state machine — AVAILABLE / RESERVED / CLOSED /
//!    CANCELED, timeout scheduling, persistence triggering
//! 2. **TimerService**: one-shot cancellable timer seam ([`TokioTimer`] in
//!    production)
//! 3. **PersistenceGateway**: coalesced fire-and-forget save seam plus the
//!    on-disk record layout
//! 4. **OpenOfferBook**: the persisted collection, including the post-load
//!    normalization pass that resets dangling RESERVED records
//!
//! ## Transition Flow
//!
//! ```text
//! protocol event ──▶ set_state() ──▶ queue_save() (on change)
//!                        │
//!                        └─▶ RESERVED: arm 30 s timeout ──▶ revert to
//!                            AVAILABLE if still RESERVED at fire time
//! ```
//!
//! Application-thread mutations and the timer callback are serialized
//! through the same `set_state` path; the callback re-checks state under the
//! lock, so a protocol-driven transition racing the timeout always wins.

pub mod book;
pub mod open_offer;
pub mod persistence;
pub mod timer;

pub use book::{OpenOfferBook, normalize_loaded};
pub use open_offer::{OpenOffer, OpenOfferState};
pub use persistence::{OpenOfferRecord, PersistenceGateway, decode_records};
pub use timer::{TimeoutHandle, TimerService, TokioTimer};

#[cfg(test)]
pub(crate) mod testutil;
