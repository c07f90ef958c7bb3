//! # opentrade-types
//!
//! Shared types, errors, and configuration for the **OpenTrade** P2P trade
//! coordination core.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OfferId`], [`TradeId`], [`CaseId`], [`MessageUid`]
//! - **Routing**: [`NodeAddress`]
//! - **Offer model**: [`Offer`], [`OfferDirection`], [`MarketPair`]
//! - **Configuration**: [`WireConfig`]
//! - **Errors**: [`OpentradeError`] with `OT_ERR_` prefix codes
//! - **Constants**: protocol version, timeouts, cache sizes

pub mod address;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod offer;

// Re-export all primary types at crate root for ergonomic imports:
//   use opentrade_types::{Offer, NodeAddress, OfferId, ...};

pub use address::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use offer::*;

// Constants are accessed via `opentrade_types::constants::FOO`
// (not re-exported to avoid name collisions).
