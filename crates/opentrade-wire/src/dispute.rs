//! Dispute payload: the arbitration case carried inside dispute-opening
//! messages.
//!
//! This core treats the case as opaque beyond identity and serializability;
//! what a dispute *resolves to* is the arbitration engine's business.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use opentrade_types::{CaseId, NodeAddress, TradeId};

/// Why the dispute was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisputeReason {
    /// The counterparty stopped responding mid-trade.
    NoReply,
    /// The trade period elapsed without completion.
    TradePeriodExpired,
    /// The peer deviated from the trade protocol.
    ProtocolViolation,
    /// Anything the trader couldn't classify.
    Other,
}

impl std::fmt::Display for DisputeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoReply => write!(f, "NO_REPLY"),
            Self::TradePeriodExpired => write!(f, "TRADE_PERIOD_EXPIRED"),
            Self::ProtocolViolation => write!(f, "PROTOCOL_VIOLATION"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

/// An arbitration case as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    /// The arbitration engine keys open cases by this ID.
    pub id: CaseId,
    /// The trade this case escalates.
    pub trade_id: TradeId,
    pub opened_at: DateTime<Utc>,
    /// Who opened the dispute (for attribution and reply routing).
    pub opener: NodeAddress,
    /// Whether the opener was the maker of the disputed offer.
    pub opener_is_maker: bool,
    pub reason: DisputeReason,
    /// Free-text account from the opener. Absent on legacy senders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Dispute {
    #[must_use]
    pub fn new(
        trade_id: TradeId,
        opener: NodeAddress,
        opener_is_maker: bool,
        reason: DisputeReason,
    ) -> Self {
        Self {
            id: CaseId::new(),
            trade_id,
            opened_at: Utc::now(),
            opener,
            opener_is_maker,
            reason,
            summary: None,
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

impl std::fmt::Display for Dispute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Dispute[{}] trade {} opened by {} ({})",
            self.id, self.trade_id, self.opener, self.reason,
        )
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Dispute {
    pub fn dummy() -> Self {
        Self::new(
            TradeId::new(),
            NodeAddress::new("trader.onion", 9999),
            true,
            DisputeReason::NoReply,
        )
    }
}
