//! Offer entity: the immutable advertisement a maker publishes to the
//! network.
//!
//! An [`Offer`] carries only advertisement data. The mutable reservation
//! lifecycle lives in `opentrade-offer`, which wraps an `Offer` without ever
//! mutating it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{NodeAddress, OfferId};

/// Which side of the trade the maker is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OfferDirection {
    Buy,
    Sell,
}

impl std::fmt::Display for OfferDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A trading pair (e.g., BTC/EUR).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MarketPair {
    pub base: String,
    pub quote: String,
}

impl MarketPair {
    #[must_use]
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

impl std::fmt::Display for MarketPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// A published trade offer. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub created_at: DateTime<Utc>,
    pub direction: OfferDirection,
    pub market: MarketPair,
    pub price: Decimal,
    /// Total tradable amount in base asset.
    pub amount: Decimal,
    /// Smallest partial amount a taker may take.
    pub min_amount: Decimal,
    /// The maker's address, for takers and dispute attribution.
    pub maker: NodeAddress,
}

impl Offer {
    /// Short form of the offer ID used in logs and UIs.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.id.short()
    }
}

impl std::fmt::Display for Offer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Offer[{}] {} {} {} @ {}",
            self.short_id(),
            self.direction,
            self.amount,
            self.market,
            self.price,
        )
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Offer {
    pub fn dummy(direction: OfferDirection, price: Decimal, amount: Decimal) -> Self {
        Self {
            id: OfferId::new(),
            created_at: Utc::now(),
            direction,
            market: MarketPair::new("BTC", "EUR"),
            price,
            amount,
            min_amount: amount,
            maker: NodeAddress::new("maker.onion", 9999),
        }
    }

    pub fn dummy_buy() -> Self {
        Self::dummy(
            OfferDirection::Buy,
            Decimal::new(50_000, 0),
            Decimal::new(1, 1), // 0.1 BTC
        )
    }
}
