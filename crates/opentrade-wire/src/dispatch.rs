//! Receiver-side dispatch: version gate, UID dedup, handler fan-out.
//!
//! Decoding already turned unknown kinds into a distinguishable variant;
//! dispatch turns them into [`OpentradeError::UnsupportedMessage`] and
//! drops them — a newer peer must never crash an older dispatcher.

use opentrade_types::{
    NodeAddress, OpentradeError, Result, WireConfig, constants,
};

use crate::dedup::DedupCache;
use crate::dispute::Dispute;
use crate::envelope::{Envelope, MessageKind, Payload};

/// The arbitration engine's entry points, keyed by the case identity
/// embedded in each payload. Implemented by the (external) engine; this
/// core only routes to it.
pub trait DisputeHandler {
    /// A trader asks this node (the arbitrator) to open a new case.
    fn on_dispute_opened(&mut self, dispute: Dispute, sender: Option<NodeAddress>);

    /// The arbitrator informs this node that the counterparty opened a case.
    fn on_peer_opened_dispute(&mut self, dispute: Dispute, sender: Option<NodeAddress>);
}

/// What dispatch did with an accepted envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Fresh UID; the payload was handed to the handler.
    Delivered(MessageKind),
    /// Already-seen UID; dropped without reprocessing.
    Duplicate(MessageKind),
}

/// Routes decoded envelopes to a [`DisputeHandler`], collapsing duplicate
/// deliveries by UID.
pub struct Dispatcher<H> {
    handler: H,
    dedup: DedupCache,
    min_version: u32,
}

impl<H: DisputeHandler> Dispatcher<H> {
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self::with_config(handler, &WireConfig::default())
    }

    #[must_use]
    pub fn with_config(handler: H, config: &WireConfig) -> Self {
        Self {
            handler,
            dedup: DedupCache::new(config.dedup_cache_size),
            min_version: config.min_protocol_version,
        }
    }

    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Dispatch one received envelope.
    ///
    /// # Errors
    /// - [`OpentradeError::IncompatibleVersion`] when the sender's protocol
    ///   version is older than this node still accepts.
    /// - [`OpentradeError::UnsupportedMessage`] for a kind unknown to this
    ///   build.
    /// Both mean "drop the message"; neither is fatal to the dispatcher.
    pub fn dispatch(&mut self, envelope: &Envelope) -> Result<DispatchOutcome> {
        if envelope.version < self.min_version {
            tracing::warn!(
                version = envelope.version,
                min_supported = self.min_version,
                "Dropping message from outdated peer"
            );
            return Err(OpentradeError::IncompatibleVersion {
                received: envelope.version,
                min_supported: self.min_version,
            });
        }
        if envelope.version > constants::PROTOCOL_VERSION {
            // Newer peer; additive compatibility lets us proceed on the
            // fields we know.
            tracing::debug!(version = envelope.version, "Message from newer peer");
        }

        let kind = envelope.kind();
        if kind == MessageKind::Unknown {
            tracing::debug!(uid = %envelope.uid, "Dropping message of unknown kind");
            return Err(OpentradeError::UnsupportedMessage);
        }

        if !self.dedup.insert(envelope.uid) {
            tracing::debug!(uid = %envelope.uid, kind = %kind, "Duplicate delivery dropped");
            return Ok(DispatchOutcome::Duplicate(kind));
        }

        match &envelope.payload {
            Payload::OpenNewDispute(dispute) => {
                tracing::debug!(case = %dispute.id, uid = %envelope.uid, "Dispute opened");
                self.handler
                    .on_dispute_opened(dispute.clone(), envelope.sender.clone());
            }
            Payload::PeerOpenedDispute(dispute) => {
                tracing::debug!(case = %dispute.id, uid = %envelope.uid, "Peer opened dispute");
                self.handler
                    .on_peer_opened_dispute(dispute.clone(), envelope.sender.clone());
            }
            Payload::Unknown => {}
        }
        Ok(DispatchOutcome::Delivered(kind))
    }
}
