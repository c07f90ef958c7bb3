//! Globally unique identifiers used throughout OpenTrade.
//!
//! All entity IDs use UUIDv7 for time-ordered lexicographic sorting.
//! [`MessageUid`] marks a *logical send* on the wire: retries of the same
//! event reuse the UID, so receivers can collapse duplicate deliveries.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants;

// ---------------------------------------------------------------------------
// OfferId
// ---------------------------------------------------------------------------

/// Globally unique offer identifier. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OfferId(pub Uuid);

impl OfferId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Short form used in logs and UIs: the first 8 characters of the
    /// canonical string form.
    #[must_use]
    pub fn short(&self) -> String {
        let s = self.0.to_string();
        s[..constants::OFFER_SHORT_ID_LEN].to_string()
    }
}

impl Default for OfferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TradeId
// ---------------------------------------------------------------------------

/// Globally unique trade identifier. A dispute references the trade it
/// escalates via this ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TradeId(pub Uuid);

impl TradeId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CaseId
// ---------------------------------------------------------------------------

/// Unique identifier for an arbitration case.
///
/// The arbitration engine keys open cases by this ID; this core only carries
/// it inside dispute payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CaseId(pub Uuid);

impl CaseId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "case:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MessageUid
// ---------------------------------------------------------------------------

/// Deduplication token for a single *logical send* of a wire message.
///
/// Distinct from any transport-layer identifier: a transport retry of the
/// same event carries the same `MessageUid`, while a genuinely new event
/// always gets a fresh one. Receivers treat two envelopes with the same UID
/// as duplicates regardless of payload equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MessageUid(pub Uuid);

impl MessageUid {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageUid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
