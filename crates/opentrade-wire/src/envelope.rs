//! The versioned wire envelope.
//!
//! Wire shape: `{version, uid, sender?, kind, body}`. The version is stamped
//! at *construction* time, so it reflects the sender's build even if the
//! envelope is serialized later. The UID marks the logical send; retries of
//! the same event are constructed with [`Envelope::with_uid`] so receivers
//! can collapse them.
//!
//! Compatibility contract: decoding tolerates unknown optional fields from
//! newer senders and fills absent legacy fields with defaults; an unknown
//! message kind decodes into [`Payload::Unknown`] instead of failing, so
//! dispatch can drop it gracefully.

use serde::{Deserialize, Serialize};

use opentrade_types::{MessageUid, NodeAddress, OpentradeError, Result, constants};

use crate::dispute::Dispute;

/// Message-kind discriminant, mirrored from [`Payload`] for dispatch and
/// logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    OpenNewDispute,
    PeerOpenedDispute,
    Unknown,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenNewDispute => write!(f, "OPEN_NEW_DISPUTE"),
            Self::PeerOpenedDispute => write!(f, "PEER_OPENED_DISPUTE"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Kind-specific payload of a wire message.
///
/// Adjacently tagged on the wire (`"kind"` / `"body"`). A tag this build
/// does not know decodes as [`Payload::Unknown`] — forward compatibility
/// with newer peers is a protocol requirement, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum Payload {
    /// A trader asks the arbitrator to open a new case.
    OpenNewDispute(Dispute),
    /// The arbitrator informs a trader that the counterparty opened a case.
    PeerOpenedDispute(Dispute),
    #[serde(other)]
    Unknown,
}

impl Payload {
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::OpenNewDispute(_) => MessageKind::OpenNewDispute,
            Self::PeerOpenedDispute(_) => MessageKind::PeerOpenedDispute,
            Self::Unknown => MessageKind::Unknown,
        }
    }
}

/// The versioned wrapper around every peer-to-peer message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Sender's protocol version, stamped at construction.
    pub version: u32,
    /// Deduplication token for this logical send.
    pub uid: MessageUid,
    /// Sender address for reply routing. Absent for broadcast-style
    /// messages; receivers must tolerate that.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<NodeAddress>,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Envelope {
    /// Build an envelope for a fresh logical send (new UID).
    #[must_use]
    pub fn new(payload: Payload, sender: Option<NodeAddress>) -> Self {
        Self::with_uid(payload, sender, MessageUid::new())
    }

    /// Build an envelope re-deriving an earlier send: a retry of the same
    /// logical event carries the same UID so receivers dedupe it.
    #[must_use]
    pub fn with_uid(payload: Payload, sender: Option<NodeAddress>, uid: MessageUid) -> Self {
        Self {
            version: constants::PROTOCOL_VERSION,
            uid,
            sender,
            payload,
        }
    }

    #[must_use]
    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    /// Sender address for reply routing, when the message carries one.
    #[must_use]
    pub fn sender_address(&self) -> Option<&NodeAddress> {
        self.sender.as_ref()
    }

    /// Produce the wire form. Cannot fail for a well-formed,
    /// fully-constructed message.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| OpentradeError::Serialization(e.to_string()))
    }

    /// Decode a received wire form.
    ///
    /// # Errors
    /// Returns [`OpentradeError::MalformedMessage`] when required fields are
    /// absent or the JSON is invalid. Unknown *fields* are ignored and an
    /// unknown *kind* decodes successfully as [`Payload::Unknown`].
    pub fn decode(wire: &str) -> Result<Self> {
        serde_json::from_str(wire).map_err(|e| OpentradeError::MalformedMessage {
            reason: e.to_string(),
        })
    }
}

/// Structural content equality: payload plus sender address. The dedup UID
/// (and the version stamp) are excluded — "equal" means *same content*, not
/// *same send*.
impl PartialEq for Envelope {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload && self.sender == other.sender
    }
}

impl Eq for Envelope {}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispute_envelope() -> Envelope {
        Envelope::new(
            Payload::OpenNewDispute(Dispute::dummy()),
            Some(NodeAddress::new("trader.onion", 9999)),
        )
    }

    #[test]
    fn construction_stamps_current_version_and_fresh_uid() {
        let a = dispute_envelope();
        let b = dispute_envelope();
        assert_eq!(a.version, constants::PROTOCOL_VERSION);
        assert_ne!(a.uid, b.uid);
    }

    #[test]
    fn with_uid_rederives_the_same_logical_send() {
        let first = dispute_envelope();
        let retry = Envelope::with_uid(first.payload.clone(), first.sender.clone(), first.uid);
        assert_eq!(first.uid, retry.uid);
        assert_eq!(first, retry);
    }

    #[test]
    fn roundtrip_preserves_every_field() {
        let envelope = dispute_envelope();
        let wire = envelope.encode().unwrap();
        let back = Envelope::decode(&wire).unwrap();

        assert_eq!(envelope, back);
        assert_eq!(envelope.uid, back.uid);
        assert_eq!(envelope.version, back.version);
        assert_eq!(envelope.kind(), back.kind());
    }

    #[test]
    fn equality_excludes_uid_and_version() {
        let a = dispute_envelope();
        let mut b = Envelope::with_uid(a.payload.clone(), a.sender.clone(), MessageUid::new());
        assert_ne!(a.uid, b.uid);
        assert_eq!(a, b);

        b.version += 1;
        assert_eq!(a, b);
    }

    #[test]
    fn equality_covers_payload_and_sender() {
        let a = dispute_envelope();

        let other_payload = Envelope::new(Payload::OpenNewDispute(Dispute::dummy()), a.sender.clone());
        assert_ne!(a, other_payload);

        let other_sender = Envelope::with_uid(a.payload.clone(), None, a.uid);
        assert_ne!(a, other_sender);
    }

    #[test]
    fn sender_is_optional_for_broadcast_style_messages() {
        let envelope = Envelope::new(Payload::OpenNewDispute(Dispute::dummy()), None);
        let wire = envelope.encode().unwrap();
        assert!(!wire.contains("\"sender\""));

        let back = Envelope::decode(&wire).unwrap();
        assert!(back.sender_address().is_none());
    }

    #[test]
    fn unknown_kind_decodes_as_unknown() {
        let wire = format!(
            r#"{{"version":{},"uid":"{}","kind":"release_funds","body":{{"amount":"0.5"}}}}"#,
            constants::PROTOCOL_VERSION + 1,
            MessageUid::new(),
        );
        let envelope = Envelope::decode(&wire).unwrap();
        assert_eq!(envelope.kind(), MessageKind::Unknown);
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let mut value = serde_json::to_value(dispute_envelope()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.insert("priority".into(), serde_json::json!("high"));
        object["body"]
            .as_object_mut()
            .unwrap()
            .insert("attachments".into(), serde_json::json!(["tx.log"]));

        let envelope = Envelope::decode(&value.to_string()).unwrap();
        assert_eq!(envelope.kind(), MessageKind::OpenNewDispute);
    }

    #[test]
    fn missing_uid_is_malformed() {
        let wire = r#"{"version":1,"kind":"open_new_dispute","body":null}"#;
        let err = Envelope::decode(wire).unwrap_err();
        assert!(matches!(err, OpentradeError::MalformedMessage { .. }));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = Envelope::decode("]not json[").unwrap_err();
        assert!(matches!(err, OpentradeError::MalformedMessage { .. }));
    }

    #[test]
    fn kind_display() {
        assert_eq!(format!("{}", MessageKind::OpenNewDispute), "OPEN_NEW_DISPUTE");
        assert_eq!(format!("{}", MessageKind::Unknown), "UNKNOWN");
    }
}
