//! Error types for the OpenTrade coordination core.
//!
//! All errors use the `OT_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Offer errors
//! - 2xx: Reservation / timer errors
//! - 3xx: Persistence errors
//! - 4xx: Wire protocol errors
//! - 9xx: General / internal errors
//!
//! Two conditions are deliberately *not* errors: a duplicate message UID
//! (a no-op dispatch) and a RESERVED state found on load (silently
//! normalized to AVAILABLE).

use thiserror::Error;

use crate::OfferId;

/// Central error enum for all OpenTrade operations.
#[derive(Debug, Error)]
pub enum OpentradeError {
    // =================================================================
    // Offer Errors (1xx)
    // =================================================================
    /// The requested offer was not found in the open-offer book.
    #[error("OT_ERR_100: Offer not found: {0}")]
    OfferNotFound(OfferId),

    /// The offer failed validation (missing fields, bad values, etc.).
    #[error("OT_ERR_101: Invalid offer: {reason}")]
    InvalidOffer { reason: String },

    /// An offer with this ID is already in the open-offer book.
    #[error("OT_ERR_102: Offer already open: {0}")]
    DuplicateOffer(OfferId),

    // =================================================================
    // Reservation / Timer Errors (2xx)
    // =================================================================
    /// The reservation timeout could not be armed. The state transition
    /// itself has already taken effect; only the safety timer is missing.
    #[error("OT_ERR_200: Reservation timer could not be scheduled: {reason}")]
    SchedulingError { reason: String },

    // =================================================================
    // Persistence Errors (3xx)
    // =================================================================
    /// A persisted record could not be decoded. The record is dropped,
    /// never fatal to the load.
    #[error("OT_ERR_300: Malformed persisted record: {reason}")]
    MalformedRecord { reason: String },

    /// A persisted record was written by a newer build than this one.
    #[error("OT_ERR_301: Record schema v{found} is newer than supported v{supported}")]
    UnsupportedSchemaVersion { found: u32, supported: u32 },

    // =================================================================
    // Wire Protocol Errors (4xx)
    // =================================================================
    /// A wire message is missing required fields or is not valid JSON.
    #[error("OT_ERR_400: Malformed wire message: {reason}")]
    MalformedMessage { reason: String },

    /// The message kind is unknown to this build. Dropped, never a crash,
    /// so newer peers can coexist with us.
    #[error("OT_ERR_401: Unsupported message kind")]
    UnsupportedMessage,

    /// The sender's protocol version is older than we can still speak.
    #[error("OT_ERR_402: Incompatible protocol version {received}, minimum supported is {min_supported}")]
    IncompatibleVersion { received: u32, min_supported: u32 },

    /// The transport refused or failed the send.
    #[error("OT_ERR_403: Transport send to {to} failed: {reason}")]
    TransportFailed { to: String, reason: String },

    /// A node address string did not parse as `host:port`.
    #[error("OT_ERR_404: Invalid node address: {input}")]
    InvalidAddress { input: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("OT_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization error producing a wire or record form.
    #[error("OT_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OpentradeError>;
