//! Message types exchanged between Hushcom clients, peers, and the server.
//!
//! Every message travels inside an [`Envelope`]. The envelope's `msg_type`
//! tag selects one of the closed set of kinds in [`MessageKind`], and its
//! `data` field carries the JSON payload for that kind. [`Message`] is the
//! typed view over the pair.

pub mod envelope;
pub mod error;

pub use envelope::Envelope;
pub use error::PayloadError;

use hushcom_types::PublicKey;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Well-known nickname of the Hushcom server.
pub const DEFAULT_SERVER_NAME: &str = "HushComServer";

/// All message kinds in the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    // Client -> server
    Register,
    UnRegister,
    ListChans,
    NewChan,

    // Server -> client
    RegisterResp,
    ListChansResp,

    // Peer -> peer
    JoinChan,
    JoinChanResp,
    Channel,
}

impl MessageKind {
    pub const ALL: [MessageKind; 9] = [
        MessageKind::Register,
        MessageKind::UnRegister,
        MessageKind::ListChans,
        MessageKind::NewChan,
        MessageKind::RegisterResp,
        MessageKind::ListChansResp,
        MessageKind::JoinChan,
        MessageKind::JoinChanResp,
        MessageKind::Channel,
    ];

    /// The wire tag carried in `Envelope::msg_type`.
    pub fn tag(&self) -> &'static str {
        match self {
            MessageKind::Register => "Register",
            MessageKind::UnRegister => "UnRegister",
            MessageKind::ListChans => "ListChans",
            MessageKind::NewChan => "NewChan",
            MessageKind::RegisterResp => "RegisterResp",
            MessageKind::ListChansResp => "ListChansResp",
            MessageKind::JoinChan => "JoinChan",
            MessageKind::JoinChanResp => "JoinChanResp",
            MessageKind::Channel => "Channel",
        }
    }

    /// Parse a wire tag. `Unregister` is accepted as a legacy spelling.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Unregister" => Some(MessageKind::UnRegister),
            _ => Self::ALL.into_iter().find(|kind| kind.tag() == tag),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Register a nickname / public key pair with the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterMsg {
    pub key: PublicKey,
}

/// Registration response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterRespMsg {
    pub success: bool,
}

/// Create a new channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewChanMsg {
    pub chan_name: String,
    pub chan_pub_key: PublicKey,
    /// Empty means the channel is public and listable.
    #[serde(default)]
    pub chan_password: String,
}

/// Join request, sent peer-to-peer to a holder of the channel key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JoinChanMsg {
    pub channel: String,
    pub req_pub_key: PublicKey,
    #[serde(default)]
    pub password: String,
}

/// Join response carrying the channel's private key material (base64).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JoinChanRespMsg {
    pub channel: String,
    pub channel_key: String,
}

/// Content message in a channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelMsg {
    pub channel: String,
    pub text: String,
}

/// A public channel as listed by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelInfo {
    pub name: String,
    pub pub_key: PublicKey,
}

/// Public channel listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListChansRespMsg {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub channels: Vec<ChannelInfo>,
}

// An empty listing may arrive as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A message with its strongly-typed payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Register(RegisterMsg),
    UnRegister,
    ListChans,
    NewChan(NewChanMsg),
    RegisterResp(RegisterRespMsg),
    ListChansResp(ListChansRespMsg),
    JoinChan(JoinChanMsg),
    JoinChanResp(JoinChanRespMsg),
    Channel(ChannelMsg),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Register(_) => MessageKind::Register,
            Message::UnRegister => MessageKind::UnRegister,
            Message::ListChans => MessageKind::ListChans,
            Message::NewChan(_) => MessageKind::NewChan,
            Message::RegisterResp(_) => MessageKind::RegisterResp,
            Message::ListChansResp(_) => MessageKind::ListChansResp,
            Message::JoinChan(_) => MessageKind::JoinChan,
            Message::JoinChanResp(_) => MessageKind::JoinChanResp,
            Message::Channel(_) => MessageKind::Channel,
        }
    }

    /// Serialize the payload for `Envelope::data`. Bare kinds carry no bytes.
    pub fn to_data(&self) -> Result<Vec<u8>, PayloadError> {
        let encoded = match self {
            Message::UnRegister | Message::ListChans => return Ok(Vec::new()),
            Message::Register(m) => serde_json::to_vec(m),
            Message::NewChan(m) => serde_json::to_vec(m),
            Message::RegisterResp(m) => serde_json::to_vec(m),
            Message::ListChansResp(m) => serde_json::to_vec(m),
            Message::JoinChan(m) => serde_json::to_vec(m),
            Message::JoinChanResp(m) => serde_json::to_vec(m),
            Message::Channel(m) => serde_json::to_vec(m),
        };
        encoded.map_err(|e| PayloadError::Marshal {
            msg_type: self.kind().tag().to_owned(),
            reason: e.to_string(),
        })
    }

    /// Parse the payload of a message of the given kind.
    pub fn from_parts(kind: MessageKind, data: &[u8]) -> Result<Self, PayloadError> {
        fn parse<T: serde::de::DeserializeOwned>(
            kind: MessageKind,
            data: &[u8],
        ) -> Result<T, PayloadError> {
            serde_json::from_slice(data).map_err(|e| PayloadError::Unmarshal {
                msg_type: kind.tag().to_owned(),
                reason: e.to_string(),
            })
        }

        Ok(match kind {
            MessageKind::UnRegister => Message::UnRegister,
            MessageKind::ListChans => Message::ListChans,
            MessageKind::Register => Message::Register(parse(kind, data)?),
            MessageKind::NewChan => Message::NewChan(parse(kind, data)?),
            MessageKind::RegisterResp => Message::RegisterResp(parse(kind, data)?),
            MessageKind::ListChansResp => Message::ListChansResp(parse(kind, data)?),
            MessageKind::JoinChan => Message::JoinChan(parse(kind, data)?),
            MessageKind::JoinChanResp => Message::JoinChanResp(parse(kind, data)?),
            MessageKind::Channel => Message::Channel(parse(kind, data)?),
        })
    }
}
