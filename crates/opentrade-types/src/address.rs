//! Network peer addressing.
//!
//! A [`NodeAddress`] identifies a peer for message routing and attribution.
//! It is a plain value type: the transport layer resolves it to an actual
//! connection (onion routing, NAT traversal, etc. are out of scope here).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{OpentradeError, Result};

/// Host + port identifying a network peer.
///
/// Compared by value; two addresses are the same peer iff host and port are
/// equal. The host is typically an onion hostname and never resolved by this
/// core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeAddress {
    pub host: String,
    pub port: u16,
}

impl NodeAddress {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Canonical `host:port` form used on the wire and in logs.
    #[must_use]
    pub fn full_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for NodeAddress {
    type Err = OpentradeError;

    /// Parse the canonical `host:port` form.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || OpentradeError::InvalidAddress { input: s.into() };
        let (host, port) = s.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port: u16 = port.parse().map_err(|_| invalid())?;
        Ok(Self::new(host, port))
    }
}
