//! The signed message unit exchanged between identities.

use hushcom_types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{Message, MessageKind, PayloadError};

/// One signed, typed message.
///
/// Field order is part of the wire format: the binary codec writes the
/// fields in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Nickname of the sender, covered by the tag.
    pub from: String,
    /// Set by the sender, covered by the tag.
    pub timestamp: Timestamp,
    /// Message tag from the closed set in [`MessageKind`], covered by the tag.
    pub msg_type: String,
    /// JSON payload whose schema depends on `msg_type`.
    pub data: Vec<u8>,
    /// Authentication tag over [`Envelope::signing_bytes`].
    pub sig: Vec<u8>,
}

impl Envelope {
    /// Build an unsigned envelope for a typed message.
    pub fn new(
        from: impl Into<String>,
        timestamp: Timestamp,
        message: &Message,
    ) -> Result<Self, PayloadError> {
        Ok(Self {
            from: from.into(),
            timestamp,
            msg_type: message.kind().tag().to_owned(),
            data: message.to_data()?,
            sig: Vec::new(),
        })
    }

    /// Canonical bytes covered by the tag:
    /// `UTF8(From) || Timestamp (8 bytes LE) || UTF8(MsgType) || Data`.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.from.len() + 8 + self.msg_type.len() + self.data.len());
        out.extend_from_slice(self.from.as_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(self.msg_type.as_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// The message tag, if it belongs to the known set.
    pub fn kind(&self) -> Option<MessageKind> {
        MessageKind::from_tag(&self.msg_type)
    }

    /// Parse the payload into its typed form.
    pub fn message(&self) -> Result<Message, PayloadError> {
        let kind = self
            .kind()
            .ok_or_else(|| PayloadError::UnknownType(self.msg_type.clone()))?;
        Message::from_parts(kind, &self.data)
    }
}
