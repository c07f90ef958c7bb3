//! # opentrade-wire
//!
//! **Versioned P2P message envelope protocol** for OpenTrade.
//!
//! Every inter-node message travels in an [`Envelope`]: a protocol version
//! tag stamped at construction, a message-kind discriminant, a dedup UID
//! marking the *logical send*, and the kind-specific payload. The network
//! upgrades without a flag day: unknown optional fields are dropped by older
//! receivers, absent legacy fields take defaults on newer ones, and unknown
//! message kinds are recognized and skipped rather than crashing dispatch.
//!
//! 1. **Envelope**: wire shape, construction, encode/decode
//! 2. **Dispute**: the arbitration case payload
//! 3. **Dispatcher**: receiver-side version gate + UID dedup + handler
//!    fan-out
//! 4. **Transport seam**: outbound send plus the dispute outbox that reuses
//!    UIDs across retries of the same logical event
//!
//! ## Message Flow
//!
//! ```text
//! Dispute ──▶ DisputeOutbox ──▶ Envelope::encode ──▶ Transport (external)
//!                                                        │
//! ArbitrationHandler ◀── Dispatcher ◀── Envelope::decode ◀┘
//!         (dedup by UID, version-gated, unknown kinds dropped)
//! ```

pub mod dedup;
pub mod dispatch;
pub mod dispute;
pub mod envelope;
pub mod transport;

pub use dedup::DedupCache;
pub use dispatch::{DispatchOutcome, Dispatcher, DisputeHandler};
pub use dispute::{Dispute, DisputeReason};
pub use envelope::{Envelope, MessageKind, Payload};
pub use transport::{DisputeOutbox, Transport};
