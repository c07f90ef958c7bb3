//! System-wide constants for the OpenTrade coordination core.

/// Current P2P protocol version, stamped on every outgoing envelope at
/// construction time.
pub const PROTOCOL_VERSION: u32 = 1;

/// Oldest peer protocol version this build still accepts. Versions newer
/// than [`PROTOCOL_VERSION`] are always accepted (additive compatibility).
pub const MIN_SUPPORTED_PROTOCOL_VERSION: u32 = 1;

/// Reservation timeout in seconds. If a taker starts a trade and the deposit
/// is not completed within this window, the offer reverts to AVAILABLE.
pub const RESERVATION_TIMEOUT_SECS: u64 = 30;

/// Schema version tag written into every persisted open-offer record.
pub const TRADABLE_SCHEMA_VERSION: u32 = 1;

/// Receiver-side dedup cache size (number of message UIDs to remember).
pub const DEDUP_CACHE_SIZE: usize = 100_000;

/// Length of the short offer ID used in logs and UIs.
pub const OFFER_SHORT_ID_LEN: usize = 8;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenTrade";
