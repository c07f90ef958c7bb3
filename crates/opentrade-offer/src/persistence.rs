//! Persistence facade seam and the on-disk record layout.
//!
//! The storage engine itself is an external collaborator with atomic
//! save-whole-collection semantics. This core only ever pokes its coalescing
//! save trigger — never a raw write — so state transitions never block on
//! disk I/O.

use opentrade_types::{Offer, OpentradeError, Result, constants};
use serde::{Deserialize, Serialize};

use crate::open_offer::OpenOfferState;

/// Handle to the external storage engine for one tradable collection.
///
/// `queue_save` is coalesced and asynchronous-safe: bursts of transitions
/// collapse into a single write, and no return value is observed by this
/// core. The handle is shared across all open offers in a collection and is
/// re-bound (not reloaded) after a restart.
pub trait PersistenceGateway: Send + Sync {
    /// Request an asynchronous, coalesced save of the whole collection.
    fn queue_save(&self);
}

/// On-disk record for one open offer.
///
/// Layout: `{schema version tag, offer fields, state}`. The schema version
/// lets an older build recognize (and skip) records written by a newer one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOfferRecord {
    pub schema_version: u32,
    pub offer: Offer,
    pub state: OpenOfferState,
}

impl OpenOfferRecord {
    #[must_use]
    pub fn new(offer: Offer, state: OpenOfferState) -> Self {
        Self {
            schema_version: constants::TRADABLE_SCHEMA_VERSION,
            offer,
            state,
        }
    }

    /// Encode to the stored JSON form.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| OpentradeError::Serialization(e.to_string()))
    }

    /// Decode a stored record.
    ///
    /// # Errors
    /// Returns [`OpentradeError::MalformedRecord`] when required fields are
    /// absent or the JSON is invalid. Callers log and drop the record; a bad
    /// record is never fatal to the load.
    pub fn decode(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| OpentradeError::MalformedRecord {
            reason: e.to_string(),
        })
    }

    /// Whether this build understands the record's schema.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.schema_version <= constants::TRADABLE_SCHEMA_VERSION
    }
}

/// Decode a stored collection, logging and dropping malformed entries.
/// One corrupt record never takes the rest of the collection down with it.
pub fn decode_records<'a>(frames: impl IntoIterator<Item = &'a str>) -> Vec<OpenOfferRecord> {
    frames
        .into_iter()
        .filter_map(|frame| match OpenOfferRecord::decode(frame) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed open-offer record");
                None
            }
        })
        .collect()
}
