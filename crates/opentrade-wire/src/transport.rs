//! Transport seam and the dispute outbox.
//!
//! Delivery, retry, and connection management belong to the (external)
//! transport. The one guarantee this side owes the network: resending the
//! same logical event reuses the same UID.

use std::collections::HashMap;

use opentrade_types::{CaseId, MessageUid, NodeAddress, Result};

use crate::dispute::Dispute;
use crate::envelope::{Envelope, Payload};

/// Outbound seam to the network layer.
pub trait Transport {
    /// Hand a serialized envelope to the network for delivery to `to`.
    ///
    /// # Errors
    /// Returns [`opentrade_types::OpentradeError::TransportFailed`] when the
    /// transport refuses the send. Retrying is the caller's decision; the
    /// retry will carry the same UID.
    fn send(&self, to: &NodeAddress, wire: &str) -> Result<()>;
}

/// Sends dispute-opening messages, remembering the UID per case so every
/// resend of the same case dedupes at the receiver.
pub struct DisputeOutbox<T> {
    transport: T,
    my_address: NodeAddress,
    sent: HashMap<CaseId, MessageUid>,
}

impl<T: Transport> DisputeOutbox<T> {
    #[must_use]
    pub fn new(transport: T, my_address: NodeAddress) -> Self {
        Self {
            transport,
            my_address,
            sent: HashMap::new(),
        }
    }

    /// Serialize `dispute` into an open-new-dispute envelope and hand it to
    /// the transport. A case sent before reuses its original UID — even
    /// when the earlier attempt failed in the transport.
    pub fn open_new_dispute(&mut self, arbitrator: &NodeAddress, dispute: Dispute) -> Result<MessageUid> {
        let case = dispute.id;
        let uid = *self.sent.entry(case).or_insert_with(MessageUid::new);
        let envelope = Envelope::with_uid(
            Payload::OpenNewDispute(dispute),
            Some(self.my_address.clone()),
            uid,
        );
        let wire = envelope.encode()?;
        self.transport.send(arbitrator, &wire)?;
        tracing::debug!(case = %case, uid = %uid, to = %arbitrator, "Dispute opening sent");
        Ok(uid)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use opentrade_types::OpentradeError;

    use super::*;
    use crate::envelope::MessageKind;

    /// Records every send; optionally fails the first `fail_first` of them.
    #[derive(Default)]
    struct RecordingTransport {
        sent: RefCell<Vec<(NodeAddress, String)>>,
        fail_first: RefCell<usize>,
    }

    impl Transport for RecordingTransport {
        fn send(&self, to: &NodeAddress, wire: &str) -> Result<()> {
            let mut fail_first = self.fail_first.borrow_mut();
            if *fail_first > 0 {
                *fail_first -= 1;
                return Err(OpentradeError::TransportFailed {
                    to: to.full_address(),
                    reason: "circuit build failed".into(),
                });
            }
            self.sent.borrow_mut().push((to.clone(), wire.to_string()));
            Ok(())
        }
    }

    fn arbitrator() -> NodeAddress {
        NodeAddress::new("arbitrator.onion", 9999)
    }

    #[test]
    fn sends_envelope_with_own_sender_address() {
        let me = NodeAddress::new("trader.onion", 8000);
        let mut outbox = DisputeOutbox::new(RecordingTransport::default(), me.clone());

        let uid = outbox.open_new_dispute(&arbitrator(), Dispute::dummy()).unwrap();

        let sent = outbox.transport.sent.borrow();
        let (to, wire) = &sent[0];
        assert_eq!(*to, arbitrator());

        let envelope = Envelope::decode(wire).unwrap();
        assert_eq!(envelope.kind(), MessageKind::OpenNewDispute);
        assert_eq!(envelope.uid, uid);
        assert_eq!(envelope.sender_address(), Some(&me));
    }

    #[test]
    fn resend_of_same_case_reuses_uid() {
        let mut outbox =
            DisputeOutbox::new(RecordingTransport::default(), NodeAddress::new("trader.onion", 8000));
        let dispute = Dispute::dummy();

        let first = outbox.open_new_dispute(&arbitrator(), dispute.clone()).unwrap();
        let second = outbox.open_new_dispute(&arbitrator(), dispute).unwrap();
        assert_eq!(first, second);
        assert_eq!(outbox.transport.sent.borrow().len(), 2);
    }

    #[test]
    fn distinct_cases_get_distinct_uids() {
        let mut outbox =
            DisputeOutbox::new(RecordingTransport::default(), NodeAddress::new("trader.onion", 8000));

        let first = outbox.open_new_dispute(&arbitrator(), Dispute::dummy()).unwrap();
        let second = outbox.open_new_dispute(&arbitrator(), Dispute::dummy()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn retry_after_transport_failure_reuses_uid() {
        let transport = RecordingTransport::default();
        *transport.fail_first.borrow_mut() = 1;
        let mut outbox = DisputeOutbox::new(transport, NodeAddress::new("trader.onion", 8000));
        let dispute = Dispute::dummy();

        let err = outbox
            .open_new_dispute(&arbitrator(), dispute.clone())
            .unwrap_err();
        assert!(matches!(err, OpentradeError::TransportFailed { .. }));

        let uid = outbox.open_new_dispute(&arbitrator(), dispute).unwrap();
        let sent = outbox.transport.sent.borrow();
        let envelope = Envelope::decode(&sent[0].1).unwrap();
        assert_eq!(envelope.uid, uid);
    }
}
