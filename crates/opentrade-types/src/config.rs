//! Configuration types for OpenTrade nodes.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Wire protocol configuration for a receiving node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireConfig {
    /// Number of message UIDs the dedup cache remembers before evicting
    /// the oldest.
    pub dedup_cache_size: usize,
    /// Oldest peer protocol version this node accepts.
    pub min_protocol_version: u32,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            dedup_cache_size: constants::DEDUP_CACHE_SIZE,
            min_protocol_version: constants::MIN_SUPPORTED_PROTOCOL_VERSION,
        }
    }
}
